//! Unification: computing the substitution that makes two types equal.
//!
//! Callers apply their current substitution to both operands before
//! unifying; `unify` itself returns only the extension.

use std::fmt;

use super::subst::Substitution;
use super::ty::{Type, TypeVar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifyError {
    Mismatch { expected: Type, found: Type },
    OccursCheck { var: TypeVar, ty: Type },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnifyError::Mismatch { expected, found } => {
                write!(
                    f,
                    "type mismatch: expected {}, found {}",
                    expected.pretty(),
                    found.pretty()
                )
            }
            UnifyError::OccursCheck { var, ty } => {
                write!(
                    f,
                    "occurs check: cannot construct infinite type {} = {}",
                    var,
                    ty.pretty()
                )
            }
        }
    }
}

/// Does `var` occur anywhere inside `ty`?
///
/// A positive answer forbids the binding `var := ty`; accepting it would
/// put a cycle into the substitution.
fn occurs_in(var: &TypeVar, ty: &Type) -> bool {
    match ty {
        Type::Int | Type::Float | Type::Bool | Type::String | Type::Unit => false,
        Type::Var(v) => v == var,
        Type::Func(param, ret) => occurs_in(var, param) || occurs_in(var, ret),
        Type::List(elem) => occurs_in(var, elem),
        Type::Tuple(elems) => elems.iter().any(|t| occurs_in(var, t)),
        Type::Record { fields, row } => {
            fields.values().any(|t| occurs_in(var, t)) || row.as_ref() == Some(var)
        }
        Type::Result(ok) => occurs_in(var, ok),
        Type::Tag(_, args) => args.iter().any(|t| occurs_in(var, t)),
    }
}

pub fn unify(t1: &Type, t2: &Type) -> Result<Substitution, UnifyError> {
    match (t1, t2) {
        // Same base constructor
        (Type::Int, Type::Int)
        | (Type::Float, Type::Float)
        | (Type::Bool, Type::Bool)
        | (Type::String, Type::String)
        | (Type::Unit, Type::Unit) => Ok(Substitution::empty()),

        // Variables bind to the other side, occurs check permitting
        (Type::Var(v1), Type::Var(v2)) if v1 == v2 => Ok(Substitution::empty()),
        (Type::Var(v), other) | (other, Type::Var(v)) => {
            if occurs_in(v, other) {
                Err(UnifyError::OccursCheck {
                    var: v.clone(),
                    ty: other.clone(),
                })
            } else {
                Ok(Substitution::singleton(v.clone(), other.clone()))
            }
        }

        (Type::Func(p1, r1), Type::Func(p2, r2)) => {
            let s1 = unify(p1, p2)?;
            let s2 = unify(&s1.apply(r1), &s1.apply(r2))?;
            Ok(s2.compose(&s1))
        }

        (Type::List(e1), Type::List(e2)) => unify(e1, e2),

        (Type::Tuple(e1), Type::Tuple(e2)) if e1.len() == e2.len() => {
            let mut subst = Substitution::empty();
            for (a, b) in e1.iter().zip(e2.iter()) {
                let s = unify(&subst.apply(a), &subst.apply(b))?;
                subst = s.compose(&subst);
            }
            Ok(subst)
        }

        (Type::Result(ok1), Type::Result(ok2)) => unify(ok1, ok2),

        // Records unify on the intersection of their field names. Open
        // rows are tolerated and extra fields pass silently; strict row
        // discipline is a known extension.
        (
            Type::Record { fields: f1, .. },
            Type::Record { fields: f2, .. },
        ) => {
            let mut subst = Substitution::empty();
            for (name, ty1) in f1 {
                if let Some(ty2) = f2.get(name) {
                    let s = unify(&subst.apply(ty1), &subst.apply(ty2))?;
                    subst = s.compose(&subst);
                }
            }
            Ok(subst)
        }

        (Type::Tag(n1, a1), Type::Tag(n2, a2)) if n1 == n2 && a1.len() == a2.len() => {
            let mut subst = Substitution::empty();
            for (a, b) in a1.iter().zip(a2.iter()) {
                let s = unify(&subst.apply(a), &subst.apply(b))?;
                subst = s.compose(&subst);
            }
            Ok(subst)
        }

        _ => Err(UnifyError::Mismatch {
            expected: t1.clone(),
            found: t2.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_unify_identical_base_types() {
        for ty in [Type::Int, Type::Float, Type::Bool, Type::String, Type::Unit] {
            assert_eq!(unify(&ty, &ty), Ok(Substitution::empty()));
        }
    }

    #[test]
    fn test_unify_var_binds_either_side() {
        let a = TypeVar::new(0);
        let expected = Ok(Substitution::singleton(a.clone(), Type::Int));
        assert_eq!(unify(&Type::Var(a.clone()), &Type::Int), expected);
        assert_eq!(unify(&Type::Int, &Type::Var(a)), expected);
    }

    #[test]
    fn test_unify_same_var_is_noop() {
        let a = TypeVar::new(0);
        assert_eq!(
            unify(&Type::Var(a.clone()), &Type::Var(a)),
            Ok(Substitution::empty())
        );
    }

    #[test]
    fn test_occurs_check_rejects_cycle() {
        let a = TypeVar::new(0);
        let ty = Type::func(Type::Var(a.clone()), Type::Int);
        let result = unify(&Type::Var(a.clone()), &ty);
        assert!(matches!(result, Err(UnifyError::OccursCheck { .. })));

        let ty = Type::list(Type::Var(a.clone()));
        let result = unify(&Type::Var(a), &ty);
        assert!(matches!(result, Err(UnifyError::OccursCheck { .. })));
    }

    #[test]
    fn test_unify_functions_thread_substitutions() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let t1 = Type::func(Type::Var(a.clone()), Type::Var(b.clone()));
        let t2 = Type::func(Type::Int, Type::String);
        let subst = unify(&t1, &t2).expect("should unify");
        assert_eq!(subst.apply(&Type::Var(a)), Type::Int);
        assert_eq!(subst.apply(&Type::Var(b)), Type::String);
    }

    #[test]
    fn test_unify_shared_var_across_function_sides() {
        let a = TypeVar::new(0);
        let t1 = Type::func(Type::Var(a.clone()), Type::Var(a));
        let t2 = Type::func(Type::Int, Type::Int);
        assert!(unify(&t1, &t2).is_ok());

        let t3 = Type::func(Type::Int, Type::String);
        assert!(unify(&t1, &t3).is_err());
    }

    #[test]
    fn test_unify_tuples_require_equal_length() {
        let t1 = Type::Tuple(vec![Type::Int, Type::Int]);
        let t2 = Type::Tuple(vec![Type::Int, Type::Int, Type::Int]);
        assert!(matches!(unify(&t1, &t2), Err(UnifyError::Mismatch { .. })));
    }

    #[test]
    fn test_unify_results_on_ok_carrier() {
        let a = TypeVar::new(0);
        let subst = unify(
            &Type::result(Type::Var(a.clone())),
            &Type::result(Type::Int),
        )
        .expect("should unify");
        assert_eq!(subst.apply(&Type::Var(a)), Type::Int);
    }

    #[test]
    fn test_unify_records_on_field_intersection() {
        let a = TypeVar::new(0);
        let t1 = Type::Record {
            fields: BTreeMap::from([
                ("x".to_string(), Type::Var(a.clone())),
                ("y".to_string(), Type::Bool),
            ]),
            row: None,
        };
        let t2 = Type::Record {
            fields: BTreeMap::from([
                ("x".to_string(), Type::Int),
                ("z".to_string(), Type::String),
            ]),
            row: None,
        };
        // `y` and `z` are not shared; only `x` must agree
        let subst = unify(&t1, &t2).expect("should unify");
        assert_eq!(subst.apply(&Type::Var(a)), Type::Int);
    }

    #[test]
    fn test_unify_records_conflicting_shared_field() {
        let t1 = Type::Record {
            fields: BTreeMap::from([("x".to_string(), Type::Int)]),
            row: None,
        };
        let t2 = Type::Record {
            fields: BTreeMap::from([("x".to_string(), Type::String)]),
            row: None,
        };
        assert!(unify(&t1, &t2).is_err());
    }

    #[test]
    fn test_unify_tags_by_name_and_arity() {
        let t1 = Type::Tag("Circle".to_string(), vec![Type::Int]);
        let t2 = Type::Tag("Circle".to_string(), vec![Type::Int]);
        assert!(unify(&t1, &t2).is_ok());

        let t3 = Type::Tag("Rect".to_string(), vec![Type::Int]);
        assert!(unify(&t1, &t3).is_err());

        let t4 = Type::Tag("Circle".to_string(), vec![Type::Int, Type::Int]);
        assert!(unify(&t1, &t4).is_err());
    }

    #[test]
    fn test_unify_shape_mismatch() {
        assert!(unify(&Type::Int, &Type::func(Type::Int, Type::Int)).is_err());
        assert!(unify(&Type::list(Type::Int), &Type::Tuple(vec![Type::Int])).is_err());
        assert!(unify(&Type::result(Type::Int), &Type::Int).is_err());
    }
}
