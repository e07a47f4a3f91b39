//! Pratt-style expression parsing.
//!
//! The parser walks the token stream with a cursor and climbs precedence
//! using the binding-power table in [`expr`]. A program is a single
//! expression; parsing consumes every token up to and including the
//! end-of-input sentinel.

mod expr;
mod pattern;

use thiserror::Error;

use crate::ast::Expr;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn unexpected(expected: &str, found: &Token) -> Self {
        let got = match found.kind {
            TokenKind::Ident | TokenKind::TagIdent => format!("'{}'", found.text),
            _ => found.kind.describe().to_string(),
        };
        Self::new(
            format!("expected {} but got {}", expected, got),
            found.span,
        )
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a token stream into a single expression.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Expr> {
    Parser::new(tokens).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// The stream must be terminated by an `Eof` token, as the lexer
    /// guarantees.
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof)
        ));
        Self { tokens, index: 0 }
    }

    pub fn parse(mut self) -> ParseResult<Expr> {
        let expr = self.expression(0)?;
        if self.peek().kind != TokenKind::Eof {
            return Err(ParseError::unexpected("end of input", self.peek()));
        }
        Ok(expr)
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.index.min(last)]
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.next())
        } else {
            Err(ParseError::unexpected(kind.describe(), self.peek()))
        }
    }
}
