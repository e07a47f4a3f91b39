//! The Hindley-Milner type system.
//!
//! Split the same way the inference literature splits it: type
//! representation ([`ty`]), substitutions ([`subst`]), the environment of
//! schemes ([`env`]), unification ([`unify`]) and Algorithm W itself
//! ([`infer`]).

pub mod env;
pub mod infer;
pub mod subst;
pub mod ty;
pub mod unify;

pub use env::TypeEnv;
pub use infer::{Infer, TypeError};
pub use subst::Substitution;
pub use ty::{Type, TypeScheme, TypeVar};
pub use unify::{unify, UnifyError};

use crate::ast::Expr;

/// Infer the type of a whole program under `env`.
///
/// The fresh-variable counter restarts on every call so diagnostics are
/// stable across runs.
pub fn infer(expr: &Expr, env: &TypeEnv) -> Result<Type, TypeError> {
    let mut ctx = Infer::new();
    let (subst, ty) = ctx.infer_expr(env, expr)?;
    Ok(subst.apply(&ty))
}
