//! Pattern nodes, used only inside match cases.
//!
//! Patterns either test the subject's shape (literals, tags, tuples,
//! records) or bind it (identifier, with wildcard as the non-binding
//! form). Record patterns list only the fields they care about; the
//! matcher ignores extras.

use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Int(i64, Span),
    Float(f64, Span),
    Str(String, Span),
    Bool(bool, Span),
    Wildcard(Span),
    Ident(String, Span),
    Tag(String, Vec<Pattern>, Span),
    Tuple(Vec<Pattern>, Span),
    Record(Vec<(String, Pattern)>, Span),
}

impl Pattern {
    pub fn span(&self) -> &Span {
        match self {
            Pattern::Int(_, span)
            | Pattern::Float(_, span)
            | Pattern::Str(_, span)
            | Pattern::Bool(_, span)
            | Pattern::Wildcard(span)
            | Pattern::Ident(_, span)
            | Pattern::Tag(_, _, span)
            | Pattern::Tuple(_, span)
            | Pattern::Record(_, span) => span,
        }
    }
}
