//! Expression nodes.
//!
//! The parser produces exactly one [`Expr`] per program. Multi-parameter
//! lambdas and multi-argument calls never appear here: the parser desugars
//! them into nested single-parameter [`Lambda`]s and left-nested
//! single-argument [`Apply`]s. Every node carries the span of the source
//! region it was parsed from.

use crate::span::Span;

use super::pattern::Pattern;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64, Span),
    Float(f64, Span),
    Str(String, Span),
    Bool(bool, Span),
    Unit(Span),
    Ident(String, Span),
    Let(Box<Let>),
    Lambda(Box<Lambda>),
    Apply(Box<Apply>),
    Binary(Box<Binary>),
    Unary(Box<Unary>),
    Pipe(Box<Pipe>),
    Unwrap(Box<Unwrap>),
    Catch(Box<Catch>),
    Match(Box<Match>),
    If(Box<If>),
    List(Vec<Expr>, Span),
    Tuple(Vec<Expr>, Span),
    Record(Vec<(String, Expr)>, Span),
    Field(Box<Field>),
    Tag(Tag),
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Int(_, span)
            | Expr::Float(_, span)
            | Expr::Str(_, span)
            | Expr::Bool(_, span)
            | Expr::Unit(span)
            | Expr::Ident(_, span)
            | Expr::List(_, span)
            | Expr::Tuple(_, span)
            | Expr::Record(_, span) => span,
            Expr::Let(node) => &node.span,
            Expr::Lambda(node) => &node.span,
            Expr::Apply(node) => &node.span,
            Expr::Binary(node) => &node.span,
            Expr::Unary(node) => &node.span,
            Expr::Pipe(node) => &node.span,
            Expr::Unwrap(node) => &node.span,
            Expr::Catch(node) => &node.span,
            Expr::Match(node) => &node.span,
            Expr::If(node) => &node.span,
            Expr::Field(node) => &node.span,
            Expr::Tag(node) => &node.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Concat,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl BinOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Rem => "%",
            BinOpKind::Concat => "++",
            BinOpKind::Eq => "==",
            BinOpKind::NotEq => "!=",
            BinOpKind::Lt => "<",
            BinOpKind::Gt => ">",
            BinOpKind::LtEq => "<=",
            BinOpKind::GtEq => ">=",
            BinOpKind::And => "&&",
            BinOpKind::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Neg,
    Not,
}

impl UnaryOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOpKind::Neg => "-",
            UnaryOpKind::Not => "!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Let {
    pub name: String,
    pub recursive: bool,
    pub value: Expr,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub param: String,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apply {
    pub func: Expr,
    pub arg: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinOpKind,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOpKind,
    pub operand: Expr,
    pub span: Span,
}

/// A pipe is a distinct node rather than a binary operator: its right side
/// has special meaning when it is a bare recovery binder or a bare unwrap.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unwrap {
    pub inner: Expr,
    pub span: Span,
}

/// `catch e -> fallback`, optionally wrapping a protected expression.
///
/// A bare binder parses with `protected` empty; the evaluator fills the
/// slot with the left side of the pipe it sits to the right of.
#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    pub protected: Option<Expr>,
    pub param: String,
    pub fallback: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub subject: Expr,
    pub cases: Vec<MatchCase>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expr,
    pub then_branch: Expr,
    pub else_branch: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub record: Expr,
    pub name: String,
    pub span: Span,
}

/// Tag construction: an uppercase constructor with zero or more arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}
