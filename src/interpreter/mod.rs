//! The tree-walking evaluator.
//!
//! Evaluation returns `Result<Value, Interrupt>`: either a runtime error
//! or the early-return transfer the unwrap operator raises on `Err`. The
//! transfer propagates transparently through pipes, applications and
//! lambda bodies until a recovery binder catches it.

mod builtins;
mod eval;
mod scope;
mod value;

pub use builtins::{prelude, type_schemes, Builtin};
pub use eval::{match_pattern, EvalResult, Interpreter, Interrupt, RuntimeError};
pub use scope::Env;
pub use value::{BuiltinValue, Closure, Value};
