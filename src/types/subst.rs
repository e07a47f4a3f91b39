//! # Type Substitutions
//!
//! A substitution maps type variables to types; unification produces them
//! and inference composes them. Applying a substitution rewrites a type
//! structurally, following variable bindings transitively until stable —
//! termination is guaranteed because the occurs check keeps the map
//! acyclic.
//!
//! Composition follows the standard Hindley-Milner convention:
//! `s2.compose(&s1)` is `s2 ∘ s1`, i.e. apply `s1` first and `s2` to its
//! results. Composition is not commutative.

use std::collections::HashMap;

use super::ty::{Type, TypeVar};

/// A finite map from type variables to types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Substitution(pub HashMap<TypeVar, Type>);

impl Substitution {
    /// The identity substitution.
    pub fn empty() -> Self {
        Substitution(HashMap::new())
    }

    /// A substitution with a single mapping `var := ty`.
    pub fn singleton(var: TypeVar, ty: Type) -> Self {
        let mut map = HashMap::new();
        map.insert(var, ty);
        Substitution(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rewrite `ty`, replacing every mapped variable (transitively).
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Int | Type::Float | Type::Bool | Type::String | Type::Unit => ty.clone(),
            Type::Var(v) => match self.0.get(v) {
                Some(mapped) => self.apply(mapped),
                None => ty.clone(),
            },
            Type::Func(param, ret) => Type::func(self.apply(param), self.apply(ret)),
            Type::List(elem) => Type::list(self.apply(elem)),
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(|t| self.apply(t)).collect()),
            Type::Record { fields, row } => Type::Record {
                fields: fields
                    .iter()
                    .map(|(name, t)| (name.clone(), self.apply(t)))
                    .collect(),
                row: row.clone(),
            },
            Type::Result(ok) => Type::result(self.apply(ok)),
            Type::Tag(name, args) => {
                Type::Tag(name.clone(), args.iter().map(|t| self.apply(t)).collect())
            }
        }
    }

    /// `self ∘ first`: apply `first`, then `self`.
    pub fn compose(&self, first: &Substitution) -> Substitution {
        let mut map = HashMap::new();
        for (var, ty) in &first.0 {
            map.insert(var.clone(), self.apply(ty));
        }
        for (var, ty) in &self.0 {
            map.entry(var.clone()).or_insert_with(|| ty.clone());
        }
        Substitution(map)
    }
}
