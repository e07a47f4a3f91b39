//! # Type Environment
//!
//! Maps identifiers to type schemes during inference. The environment is
//! persistent by copy-on-bind: `extend` returns a fresh environment, so a
//! binding introduced for a lambda body or a match arm never leaks back
//! into the enclosing scope.
//!
//! The environment's free type variables decide what a `let` may
//! generalize: only variables free in the value's type but *not* free in
//! the environment become quantified.

use std::collections::{HashMap, HashSet};

use super::subst::Substitution;
use super::ty::{TypeScheme, TypeVar};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeEnv {
    bindings: HashMap<String, TypeScheme>,
}

impl TypeEnv {
    pub fn empty() -> Self {
        TypeEnv {
            bindings: HashMap::new(),
        }
    }

    pub fn with_bindings(bindings: Vec<(String, TypeScheme)>) -> Self {
        TypeEnv {
            bindings: bindings.into_iter().collect(),
        }
    }

    /// A fresh environment with `name` bound to `scheme` (shadowing any
    /// previous binding of the same name).
    pub fn extend(&self, name: String, scheme: TypeScheme) -> TypeEnv {
        let mut bindings = self.bindings.clone();
        bindings.insert(name, scheme);
        TypeEnv { bindings }
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeScheme> {
        self.bindings.get(name)
    }

    /// Variables free in any binding's scheme.
    pub fn free_type_vars(&self) -> HashSet<TypeVar> {
        let mut set = HashSet::new();
        for scheme in self.bindings.values() {
            set.extend(scheme.free_type_vars());
        }
        set
    }

    /// Apply a substitution to every scheme's underlying type.
    pub fn apply_subst(&self, subst: &Substitution) -> TypeEnv {
        let bindings = self
            .bindings
            .iter()
            .map(|(name, scheme)| {
                (
                    name.clone(),
                    TypeScheme {
                        vars: scheme.vars.clone(),
                        ty: subst.apply(&scheme.ty),
                    },
                )
            })
            .collect();
        TypeEnv { bindings }
    }

    /// Bindings in name order, for environment listings.
    pub fn sorted_bindings(&self) -> Vec<(&str, &TypeScheme)> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, scheme)| (name.as_str(), scheme))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }
}
