//! Expression grammar: binding powers, prefix forms and desugarings.

use crate::ast::expression::{
    Apply, BinOpKind, Binary, Catch, Expr, Field, If, Lambda, Let, Match, MatchCase, Pipe, Tag,
    Unary, UnaryOpKind, Unwrap,
};
use crate::lexer::TokenKind;
use crate::span::Span;

use super::{ParseError, ParseResult, Parser};

/// Left/right binding powers. Higher binds tighter.
const PIPE_BP: (u8, u8) = (5, 6);
const UNARY_BP: u8 = 80;
const UNWRAP_BP: u8 = 90;
const FIELD_BP: u8 = 95;

/// Lambda and recovery-binder bodies start at the pipe's right binding
/// power so a following `|>` stays at the outer level:
/// `x |> fn n -> n * 2 |> g` is `x |> (fn n -> n * 2) |> g`.
const BODY_BP: u8 = PIPE_BP.1;

fn binary_power(kind: TokenKind) -> Option<(BinOpKind, (u8, u8))> {
    let entry = match kind {
        TokenKind::OrOr => (BinOpKind::Or, (10, 11)),
        TokenKind::AndAnd => (BinOpKind::And, (20, 21)),
        TokenKind::Eq => (BinOpKind::Eq, (30, 31)),
        TokenKind::NotEq => (BinOpKind::NotEq, (30, 31)),
        TokenKind::Lt => (BinOpKind::Lt, (40, 41)),
        TokenKind::Gt => (BinOpKind::Gt, (40, 41)),
        TokenKind::LtEq => (BinOpKind::LtEq, (40, 41)),
        TokenKind::GtEq => (BinOpKind::GtEq, (40, 41)),
        TokenKind::Concat => (BinOpKind::Concat, (50, 51)),
        TokenKind::Plus => (BinOpKind::Add, (60, 61)),
        TokenKind::Minus => (BinOpKind::Sub, (60, 61)),
        TokenKind::Star => (BinOpKind::Mul, (70, 71)),
        TokenKind::Slash => (BinOpKind::Div, (70, 71)),
        TokenKind::Percent => (BinOpKind::Rem, (70, 71)),
        _ => return None,
    };
    Some(entry)
}

impl Parser {
    /// Precedence climbing: read a prefix form, then fold in operators
    /// whose left binding power is at least `min_bp`.
    pub(super) fn expression(&mut self, min_bp: u8) -> ParseResult<Expr> {
        let mut lhs = self.prefix()?;

        loop {
            let kind = self.peek().kind;
            match kind {
                TokenKind::Question if UNWRAP_BP >= min_bp => {
                    let token = self.next();
                    let span = lhs.span().merge(&token.span);
                    lhs = Expr::Unwrap(Box::new(Unwrap { inner: lhs, span }));
                }
                TokenKind::Dot if FIELD_BP >= min_bp => {
                    self.next();
                    let name = self.expect(TokenKind::Ident)?;
                    let span = lhs.span().merge(&name.span);
                    lhs = Expr::Field(Box::new(Field {
                        record: lhs,
                        name: name.text,
                        span,
                    }));
                }
                TokenKind::PipeOp if PIPE_BP.0 >= min_bp => {
                    self.next();
                    let right = self.expression(PIPE_BP.1)?;
                    let span = lhs.span().merge(right.span());
                    lhs = Expr::Pipe(Box::new(Pipe {
                        left: lhs,
                        right,
                        span,
                    }));
                }
                _ => {
                    let Some((op, (left_bp, right_bp))) = binary_power(kind) else {
                        break;
                    };
                    if left_bp < min_bp {
                        break;
                    }
                    self.next();
                    let right = self.expression(right_bp)?;
                    let span = lhs.span().merge(right.span());
                    lhs = Expr::Binary(Box::new(Binary {
                        op,
                        left: lhs,
                        right,
                        span,
                    }));
                }
            }
        }

        Ok(lhs)
    }

    /// Null denotations: everything an expression can start with.
    fn prefix(&mut self) -> ParseResult<Expr> {
        let token = self.next();
        match token.kind {
            TokenKind::Int => {
                let value = token.text.parse::<i64>().map_err(|_| {
                    ParseError::new(format!("invalid integer literal '{}'", token.text), token.span)
                })?;
                Ok(Expr::Int(value, token.span))
            }
            TokenKind::Float => {
                let value = token.text.parse::<f64>().map_err(|_| {
                    ParseError::new(format!("invalid float literal '{}'", token.text), token.span)
                })?;
                Ok(Expr::Float(value, token.span))
            }
            TokenKind::Str => {
                // The lexeme still carries its quotes
                let inner = token.text[1..token.text.len() - 1].to_string();
                Ok(Expr::Str(inner, token.span))
            }
            TokenKind::True => Ok(Expr::Bool(true, token.span)),
            TokenKind::False => Ok(Expr::Bool(false, token.span)),
            TokenKind::Ident => {
                let mut expr = Expr::Ident(token.text, token.span);
                while self.at(TokenKind::LParen) {
                    expr = self.call_chain(expr)?;
                }
                Ok(expr)
            }
            TokenKind::TagIdent => self.tag(token.text, token.span),
            TokenKind::Let => self.let_binding(token.span),
            TokenKind::Fn => self.lambda(token.span),
            TokenKind::Match => self.match_expr(token.span),
            TokenKind::If => self.conditional(token.span),
            TokenKind::Catch => self.catch_binder(token.span),
            TokenKind::LBracket => self.list(token.span),
            TokenKind::LBrace => self.record(token.span),
            TokenKind::LParen => self.group_or_tuple(token.span),
            TokenKind::Minus => {
                let operand = self.expression(UNARY_BP)?;
                let span = token.span.merge(operand.span());
                Ok(Expr::Unary(Box::new(Unary {
                    op: UnaryOpKind::Neg,
                    operand,
                    span,
                })))
            }
            TokenKind::Bang => {
                let operand = self.expression(UNARY_BP)?;
                let span = token.span.merge(operand.span());
                Ok(Expr::Unary(Box::new(Unary {
                    op: UnaryOpKind::Not,
                    operand,
                    span,
                })))
            }
            _ => Err(ParseError::unexpected("an expression", &token)),
        }
    }

    /// One parenthesized argument list, desugared into left-nested
    /// single-argument applications. `f()` applies `f` to unit.
    fn call_chain(&mut self, func: Expr) -> ParseResult<Expr> {
        let open = self.expect(TokenKind::LParen)?;
        if self.at(TokenKind::RParen) {
            let close = self.next();
            let span = func.span().merge(&close.span);
            return Ok(Expr::Apply(Box::new(Apply {
                func,
                arg: Expr::Unit(open.span.merge(&close.span)),
                span,
            })));
        }

        let mut args = vec![self.expression(0)?];
        while self.at(TokenKind::Comma) {
            self.next();
            args.push(self.expression(0)?);
        }
        let close = self.expect(TokenKind::RParen)?;

        let mut expr = func;
        for arg in args {
            let span = expr.span().merge(&close.span);
            expr = Expr::Apply(Box::new(Apply {
                func: expr,
                arg,
                span,
            }));
        }
        Ok(expr)
    }

    /// A tag takes at most one argument list; `None` stays nullary.
    fn tag(&mut self, name: String, start: Span) -> ParseResult<Expr> {
        let mut args = Vec::new();
        let mut span = start;
        if self.at(TokenKind::LParen) {
            self.next();
            if !self.at(TokenKind::RParen) {
                args.push(self.expression(0)?);
                while self.at(TokenKind::Comma) {
                    self.next();
                    args.push(self.expression(0)?);
                }
            }
            let close = self.expect(TokenKind::RParen)?;
            span = span.merge(&close.span);
        }
        Ok(Expr::Tag(Tag { name, args, span }))
    }

    fn let_binding(&mut self, start: Span) -> ParseResult<Expr> {
        let recursive = if self.at(TokenKind::Rec) {
            self.next();
            true
        } else {
            false
        };
        let name = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::Assign)?;
        let value = self.expression(0)?;
        self.expect(TokenKind::In)?;
        let body = self.expression(0)?;
        let span = start.merge(body.span());
        Ok(Expr::Let(Box::new(Let {
            name: name.text,
            recursive,
            value,
            body,
            span,
        })))
    }

    /// `fn(a, b) -> E` desugars right-associatively into nested
    /// single-parameter lambdas; the outermost node spans the whole form.
    fn lambda(&mut self, start: Span) -> ParseResult<Expr> {
        let mut params = Vec::new();
        if self.at(TokenKind::LParen) {
            self.next();
            params.push(self.expect(TokenKind::Ident)?.text);
            while self.at(TokenKind::Comma) {
                self.next();
                params.push(self.expect(TokenKind::Ident)?.text);
            }
            self.expect(TokenKind::RParen)?;
        } else {
            params.push(self.expect(TokenKind::Ident)?.text);
        }
        self.expect(TokenKind::Arrow)?;
        let body = self.expression(BODY_BP)?;
        let span = start.merge(body.span());

        let mut expr = body;
        for param in params.into_iter().rev() {
            expr = Expr::Lambda(Box::new(Lambda {
                param,
                body: expr,
                span,
            }));
        }
        Ok(expr)
    }

    fn match_expr(&mut self, start: Span) -> ParseResult<Expr> {
        let subject = self.expression(0)?;
        self.expect(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        loop {
            let pattern = self.pattern()?;
            self.expect(TokenKind::Arrow)?;
            let body = self.expression(0)?;
            cases.push(MatchCase { pattern, body });
            if self.at(TokenKind::Comma) {
                self.next();
                if self.at(TokenKind::RBrace) {
                    break;
                }
                continue;
            }
            break;
        }
        let close = self.expect(TokenKind::RBrace)?;
        Ok(Expr::Match(Box::new(Match {
            subject,
            cases,
            span: start.merge(&close.span),
        })))
    }

    fn conditional(&mut self, start: Span) -> ParseResult<Expr> {
        let condition = self.expression(0)?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.expression(0)?;
        self.expect(TokenKind::Else)?;
        let else_branch = self.expression(0)?;
        let span = start.merge(else_branch.span());
        Ok(Expr::If(Box::new(If {
            condition,
            then_branch,
            else_branch,
            span,
        })))
    }

    /// A bare binder: the protected slot stays empty until a pipe fills it.
    fn catch_binder(&mut self, start: Span) -> ParseResult<Expr> {
        let param = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::Arrow)?;
        let fallback = self.expression(BODY_BP)?;
        let span = start.merge(fallback.span());
        Ok(Expr::Catch(Box::new(Catch {
            protected: None,
            param: param.text,
            fallback,
            span,
        })))
    }

    fn list(&mut self, start: Span) -> ParseResult<Expr> {
        let mut elements = Vec::new();
        if !self.at(TokenKind::RBracket) {
            elements.push(self.expression(0)?);
            while self.at(TokenKind::Comma) {
                self.next();
                elements.push(self.expression(0)?);
            }
        }
        let close = self.expect(TokenKind::RBracket)?;
        Ok(Expr::List(elements, start.merge(&close.span)))
    }

    fn record(&mut self, start: Span) -> ParseResult<Expr> {
        let mut fields = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                let name = self.expect(TokenKind::Ident)?;
                self.expect(TokenKind::Colon)?;
                let value = self.expression(0)?;
                fields.push((name.text, value));
                if self.at(TokenKind::Comma) {
                    self.next();
                    continue;
                }
                break;
            }
        }
        let close = self.expect(TokenKind::RBrace)?;
        Ok(Expr::Record(fields, start.merge(&close.span)))
    }

    /// `()` is unit; a top-level comma makes a tuple; otherwise the parens
    /// are grouping and yield the inner expression unchanged.
    fn group_or_tuple(&mut self, start: Span) -> ParseResult<Expr> {
        if self.at(TokenKind::RParen) {
            let close = self.next();
            return Ok(Expr::Unit(start.merge(&close.span)));
        }
        let first = self.expression(0)?;
        if self.at(TokenKind::Comma) {
            let mut elements = vec![first];
            while self.at(TokenKind::Comma) {
                self.next();
                elements.push(self.expression(0)?);
            }
            let close = self.expect(TokenKind::RParen)?;
            return Ok(Expr::Tuple(elements, start.merge(&close.span)));
        }
        self.expect(TokenKind::RParen)?;
        Ok(first)
    }
}
