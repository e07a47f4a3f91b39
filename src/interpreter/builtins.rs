//! The curried built-in library.
//!
//! Builtins are enum identities with a declared arity; the evaluator's
//! application rule accumulates arguments and dispatches here once the
//! last one arrives, so partial application works transparently —
//! `[1, 2] |> map(f)` relies on `map(f)` being a one-argument function.
//!
//! The same inventory also provides the type schemes seeded into the
//! initial type environment.

use std::io::Write;

use crate::span::Span;
use crate::types::{Type, TypeScheme, TypeVar};

use super::eval::{EvalResult, Interpreter, Interrupt, RuntimeError};
use super::scope::Env;
use super::value::{BuiltinValue, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Map,
    Filter,
    Fold,
    Length,
    Head,
    Tail,
    ToString,
    Print,
    Concat,
    Each,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Map,
        Builtin::Filter,
        Builtin::Fold,
        Builtin::Length,
        Builtin::Head,
        Builtin::Tail,
        Builtin::ToString,
        Builtin::Print,
        Builtin::Concat,
        Builtin::Each,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Map => "map",
            Builtin::Filter => "filter",
            Builtin::Fold => "fold",
            Builtin::Length => "length",
            Builtin::Head => "head",
            Builtin::Tail => "tail",
            Builtin::ToString => "to_string",
            Builtin::Print => "print",
            Builtin::Concat => "concat",
            Builtin::Each => "each",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Builtin::Fold => 3,
            Builtin::Map | Builtin::Filter | Builtin::Concat | Builtin::Each => 2,
            Builtin::Length
            | Builtin::Head
            | Builtin::Tail
            | Builtin::ToString
            | Builtin::Print => 1,
        }
    }
}

/// The initial value environment: every builtin with no arguments yet.
pub fn prelude() -> Env {
    let mut env = Env::new();
    for builtin in Builtin::ALL {
        env.insert(
            builtin.name().to_string(),
            Value::Builtin(BuiltinValue {
                builtin,
                args: Vec::new(),
            }),
        );
    }
    env
}

/// Type schemes for the builtins, seeded into the initial type
/// environment.
///
/// `length` accepts both lists and strings; without type classes its
/// scheme stays at the permissive `a -> Int` and the evaluator keeps the
/// shape check.
pub fn type_schemes() -> Vec<(String, TypeScheme)> {
    let a = TypeVar::new(0);
    let b = TypeVar::new(1);
    let av = Type::Var(a.clone());
    let bv = Type::Var(b.clone());

    vec![
        (
            "map".to_string(),
            TypeScheme::polymorphic(
                vec![a.clone(), b.clone()],
                Type::func(
                    Type::func(av.clone(), bv.clone()),
                    Type::func(Type::list(av.clone()), Type::list(bv.clone())),
                ),
            ),
        ),
        (
            "filter".to_string(),
            TypeScheme::polymorphic(
                vec![a.clone()],
                Type::func(
                    Type::func(av.clone(), Type::Bool),
                    Type::func(Type::list(av.clone()), Type::list(av.clone())),
                ),
            ),
        ),
        (
            "fold".to_string(),
            TypeScheme::polymorphic(
                vec![a.clone(), b.clone()],
                Type::func(
                    bv.clone(),
                    Type::func(
                        Type::func(bv.clone(), Type::func(av.clone(), bv.clone())),
                        Type::func(Type::list(av.clone()), bv.clone()),
                    ),
                ),
            ),
        ),
        (
            "length".to_string(),
            TypeScheme::polymorphic(vec![a.clone()], Type::func(av.clone(), Type::Int)),
        ),
        (
            "head".to_string(),
            TypeScheme::polymorphic(
                vec![a.clone()],
                Type::func(Type::list(av.clone()), Type::result(av.clone())),
            ),
        ),
        (
            "tail".to_string(),
            TypeScheme::polymorphic(
                vec![a.clone()],
                Type::func(
                    Type::list(av.clone()),
                    Type::result(Type::list(av.clone())),
                ),
            ),
        ),
        (
            "to_string".to_string(),
            TypeScheme::polymorphic(vec![a.clone()], Type::func(av.clone(), Type::String)),
        ),
        (
            "print".to_string(),
            TypeScheme::polymorphic(vec![a.clone()], Type::func(av.clone(), Type::Unit)),
        ),
        (
            "concat".to_string(),
            TypeScheme::monomorphic(Type::func(
                Type::String,
                Type::func(Type::String, Type::String),
            )),
        ),
        (
            "each".to_string(),
            TypeScheme::polymorphic(
                vec![a],
                Type::func(
                    Type::func(av.clone(), Type::Unit),
                    Type::func(Type::list(av), Type::Unit),
                ),
            ),
        ),
    ]
}

fn misuse(builtin: Builtin, message: &str, span: &Span) -> Interrupt {
    RuntimeError::BuiltinMisuse {
        builtin: builtin.name(),
        message: message.to_string(),
        span: *span,
    }
    .into()
}

impl<W: Write> Interpreter<W> {
    /// Invoke a builtin once its full argument list has accumulated.
    pub(super) fn call_builtin(
        &mut self,
        builtin: Builtin,
        mut args: Vec<Value>,
        span: &Span,
    ) -> EvalResult {
        match builtin {
            Builtin::Map => {
                let f = args.remove(0);
                let xs = args.remove(0);
                let Value::List(items) = xs else {
                    return Err(misuse(builtin, "expects a list", span));
                };
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.apply(f.clone(), item, span)?);
                }
                Ok(Value::List(out))
            }

            Builtin::Filter => {
                let pred = args.remove(0);
                let xs = args.remove(0);
                let Value::List(items) = xs else {
                    return Err(misuse(builtin, "expects a list", span));
                };
                let mut out = Vec::new();
                for item in items {
                    match self.apply(pred.clone(), item.clone(), span)? {
                        Value::Bool(true) => out.push(item),
                        Value::Bool(false) => {}
                        _ => {
                            return Err(misuse(
                                builtin,
                                "predicate must return a boolean",
                                span,
                            ))
                        }
                    }
                }
                Ok(Value::List(out))
            }

            Builtin::Fold => {
                let seed = args.remove(0);
                let step = args.remove(0);
                let xs = args.remove(0);
                let Value::List(items) = xs else {
                    return Err(misuse(builtin, "expects a list", span));
                };
                let mut acc = seed;
                for item in items {
                    let partial = self.apply(step.clone(), acc, span)?;
                    acc = self.apply(partial, item, span)?;
                }
                Ok(acc)
            }

            Builtin::Length => match args.remove(0) {
                Value::List(items) => Ok(Value::Int(items.len() as i64)),
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                _ => Err(misuse(builtin, "expects a list or a string", span)),
            },

            Builtin::Head => match args.remove(0) {
                Value::List(items) => Ok(match items.into_iter().next() {
                    Some(first) => Value::Tag("Ok".to_string(), vec![first]),
                    None => Value::Tag(
                        "Err".to_string(),
                        vec![Value::Str("empty list".to_string())],
                    ),
                }),
                _ => Err(misuse(builtin, "expects a list", span)),
            },

            Builtin::Tail => match args.remove(0) {
                Value::List(items) => Ok(if items.is_empty() {
                    Value::Tag(
                        "Err".to_string(),
                        vec![Value::Str("empty list".to_string())],
                    )
                } else {
                    Value::Tag(
                        "Ok".to_string(),
                        vec![Value::List(items.into_iter().skip(1).collect())],
                    )
                }),
                _ => Err(misuse(builtin, "expects a list", span)),
            },

            Builtin::ToString => Ok(Value::Str(args.remove(0).to_text())),

            Builtin::Print => {
                let text = args.remove(0).to_text();
                self.write_line(&text);
                Ok(Value::Unit)
            }

            Builtin::Concat => {
                let left = args.remove(0);
                let right = args.remove(0);
                match (left, right) {
                    (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                    _ => Err(misuse(builtin, "expects two strings", span)),
                }
            }

            Builtin::Each => {
                let f = args.remove(0);
                let xs = args.remove(0);
                let Value::List(items) = xs else {
                    return Err(misuse(builtin, "expects a list", span));
                };
                for item in items {
                    self.apply(f.clone(), item, span)?;
                }
                Ok(Value::Unit)
            }
        }
    }
}
