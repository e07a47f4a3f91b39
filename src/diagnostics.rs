//! Formatted error reporting.
//!
//! Every stage of the pipeline fails with its own error enum; all of them
//! convert into a [`Diagnostic`] for the top-level API. A diagnostic
//! renders as a three-line block:
//!
//! ```text
//! Error at line 1, col 5:
//!   5 + "hello"
//!       ^^^^^^^
//! ```

use std::fmt;

use crate::interpreter::RuntimeError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::span::Span;
use crate::types::TypeError;

/// A stage failure with its message and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Render the caret block against the source the span points into.
    pub fn render(&self, source: &str) -> String {
        let line_no = self.span.start.line;
        let col = self.span.start.column;

        let mut out = format!("Error at line {}, col {}: {}", line_no, col, self.message);

        let Some(line) = source.lines().nth(line_no.saturating_sub(1)) else {
            return out;
        };

        let carets = if self.span.end.line == line_no {
            self.span.end.column.saturating_sub(col).max(1)
        } else {
            line.chars().count().saturating_sub(col - 1).max(1)
        };

        out.push_str(&format!(
            "\n  {}\n  {}{}",
            line,
            " ".repeat(col - 1),
            "^".repeat(carets)
        ));
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error at {}: {}", self.span, self.message)
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        Diagnostic::new(err.to_string(), *err.span())
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Diagnostic::new(err.message.clone(), err.span)
    }
}

impl From<TypeError> for Diagnostic {
    fn from(err: TypeError) -> Self {
        Diagnostic::new(err.to_string(), *err.span())
    }
}

impl From<RuntimeError> for Diagnostic {
    fn from(err: RuntimeError) -> Self {
        Diagnostic::new(err.to_string(), *err.span())
    }
}
