//! The expression and pattern trees produced by the parser.

pub mod expression;
pub mod pattern;

pub use expression::{
    Apply, BinOpKind, Binary, Catch, Expr, Field, If, Lambda, Let, Match, MatchCase, Pipe, Tag,
    Unary, UnaryOpKind, Unwrap,
};
pub use pattern::Pattern;
