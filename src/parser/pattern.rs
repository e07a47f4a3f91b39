//! Pattern grammar for match cases.

use crate::ast::Pattern;
use crate::lexer::TokenKind;

use super::{ParseError, ParseResult, Parser};

impl Parser {
    pub(super) fn pattern(&mut self) -> ParseResult<Pattern> {
        let token = self.next();
        match token.kind {
            TokenKind::Int => {
                let value = token.text.parse::<i64>().map_err(|_| {
                    ParseError::new(format!("invalid integer literal '{}'", token.text), token.span)
                })?;
                Ok(Pattern::Int(value, token.span))
            }
            TokenKind::Float => {
                let value = token.text.parse::<f64>().map_err(|_| {
                    ParseError::new(format!("invalid float literal '{}'", token.text), token.span)
                })?;
                Ok(Pattern::Float(value, token.span))
            }
            TokenKind::Str => {
                let inner = token.text[1..token.text.len() - 1].to_string();
                Ok(Pattern::Str(inner, token.span))
            }
            TokenKind::True => Ok(Pattern::Bool(true, token.span)),
            TokenKind::False => Ok(Pattern::Bool(false, token.span)),
            TokenKind::Underscore => Ok(Pattern::Wildcard(token.span)),
            TokenKind::Ident => Ok(Pattern::Ident(token.text, token.span)),
            TokenKind::TagIdent => {
                let mut subs = Vec::new();
                let mut span = token.span;
                if self.at(TokenKind::LParen) {
                    self.next();
                    if !self.at(TokenKind::RParen) {
                        subs.push(self.pattern()?);
                        while self.at(TokenKind::Comma) {
                            self.next();
                            subs.push(self.pattern()?);
                        }
                    }
                    let close = self.expect(TokenKind::RParen)?;
                    span = span.merge(&close.span);
                }
                Ok(Pattern::Tag(token.text, subs, span))
            }
            TokenKind::LParen => {
                let first = self.pattern()?;
                if self.at(TokenKind::Comma) {
                    let mut elements = vec![first];
                    while self.at(TokenKind::Comma) {
                        self.next();
                        elements.push(self.pattern()?);
                    }
                    let close = self.expect(TokenKind::RParen)?;
                    return Ok(Pattern::Tuple(elements, token.span.merge(&close.span)));
                }
                self.expect(TokenKind::RParen)?;
                Ok(first)
            }
            TokenKind::LBrace => {
                let mut fields = Vec::new();
                if !self.at(TokenKind::RBrace) {
                    loop {
                        let name = self.expect(TokenKind::Ident)?;
                        self.expect(TokenKind::Colon)?;
                        let sub = self.pattern()?;
                        fields.push((name.text, sub));
                        if self.at(TokenKind::Comma) {
                            self.next();
                            continue;
                        }
                        break;
                    }
                }
                let close = self.expect(TokenKind::RBrace)?;
                Ok(Pattern::Record(fields, token.span.merge(&close.span)))
            }
            _ => Err(ParseError::unexpected("a pattern", &token)),
        }
    }
}
