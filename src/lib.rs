//! Leverr - a small, statically typed, pipeline-oriented scripting
//! language.
//!
//! The core is a strict left-to-right pipeline: lexer, Pratt parser,
//! Hindley-Milner type inference, tree-walking evaluator with a curried
//! built-in library. [`run_source`] drives the whole pipeline;
//! [`infer_source`] stops after inference. Both return either their
//! result or a [`diagnostics::Diagnostic`] pointing into the source.

pub mod ast;
pub mod diagnostics;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod types;

use diagnostics::Diagnostic;
use interpreter::{Interpreter, Interrupt};
use types::TypeEnv;

/// The type environment with every builtin's scheme seeded.
pub fn default_type_env() -> TypeEnv {
    TypeEnv::with_bindings(interpreter::type_schemes())
}

/// Lex, parse, infer and evaluate a program; returns the rendered
/// top-level value.
pub fn run_source(source: &str) -> Result<String, Diagnostic> {
    let tokens = lexer::lex(source)?;
    let expr = parser::parse(tokens)?;
    types::infer(&expr, &default_type_env())?;

    let prelude = interpreter::prelude();
    let mut interp = Interpreter::new();
    match interp.eval(&expr, &prelude) {
        Ok(value) => Ok(value.render()),
        // An uncaught transfer reaches the program boundary; the carried
        // Err value is the program's result
        Err(Interrupt::EarlyReturn(value)) => Ok(value.render()),
        Err(Interrupt::Failure(err)) => Err(err.into()),
    }
}

/// Lex, parse and infer a program; returns the pretty-printed type.
pub fn infer_source(source: &str) -> Result<String, Diagnostic> {
    let tokens = lexer::lex(source)?;
    let expr = parser::parse(tokens)?;
    let ty = types::infer(&expr, &default_type_env())?;
    Ok(ty.pretty_names())
}
