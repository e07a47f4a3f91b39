//! # Core Type System Definitions
//!
//! Types, type variables and type schemes for Leverr's Hindley-Milner
//! inference.
//!
//! ## Overview
//!
//! - **Type** - concrete and polymorphic types: the five base
//!   constructors (`Int`, `Float`, `Bool`, `String`, `Unit`), type
//!   variables, functions, lists, tuples, records (with an optional open
//!   row), results and structural tags
//! - **TypeVar** - a type variable identified by a unique numeric id
//! - **TypeScheme** - a polymorphic type with quantified variables
//!   (e.g. `forall a. a -> a`)
//!
//! ## Results
//!
//! `Result(T)` carries only its ok type; the error side is always text in
//! this version of the language, so it is not represented.
//!
//! ## Records and rows
//!
//! A record type maps field names to types. Field access on a record of
//! unknown shape constrains it with an *open row*: a record carrying the
//! single accessed field plus a row variable standing for "whatever other
//! fields there are".
//!
//! ## Pretty printing
//!
//! [`Type::pretty`] renders variables by their raw id (`'t3`) which keeps
//! two types comparable inside one error message. [`Type::pretty_names`]
//! renders a standalone type or scheme, naming variables `a`, `b`, ...,
//! `z`, `a1`, ... by first appearance so names never collide however many
//! variables a scheme uses.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// A type variable, unique per inference run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub id: usize,
}

impl TypeVar {
    pub fn new(id: usize) -> Self {
        Self { id }
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'t{}", self.id)
    }
}

/// All possible Leverr types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Unit,
    Var(TypeVar),
    Func(Box<Type>, Box<Type>),
    List(Box<Type>),
    Tuple(Vec<Type>),
    Record {
        fields: BTreeMap<String, Type>,
        row: Option<TypeVar>,
    },
    Result(Box<Type>),
    Tag(String, Vec<Type>),
}

impl Type {
    /// Create a function type from parameter and return types.
    pub fn func(param: Type, ret: Type) -> Self {
        Type::Func(Box::new(param), Box::new(ret))
    }

    /// Create a list type.
    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    /// Create a result type carrying `ok`.
    pub fn result(ok: Type) -> Self {
        Type::Result(Box::new(ok))
    }

    /// The set of type variables occurring free in this type.
    ///
    /// Everything is free at the `Type` level; quantification only exists
    /// on [`TypeScheme`]s.
    pub fn free_type_vars(&self) -> HashSet<TypeVar> {
        let mut set = HashSet::new();
        self.collect_free(&mut set);
        set
    }

    fn collect_free(&self, set: &mut HashSet<TypeVar>) {
        match self {
            Type::Int | Type::Float | Type::Bool | Type::String | Type::Unit => {}
            Type::Var(v) => {
                set.insert(v.clone());
            }
            Type::Func(param, ret) => {
                param.collect_free(set);
                ret.collect_free(set);
            }
            Type::List(elem) => elem.collect_free(set),
            Type::Tuple(elems) => {
                for elem in elems {
                    elem.collect_free(set);
                }
            }
            Type::Record { fields, row } => {
                for ty in fields.values() {
                    ty.collect_free(set);
                }
                if let Some(row) = row {
                    set.insert(row.clone());
                }
            }
            Type::Result(ok) => ok.collect_free(set),
            Type::Tag(_, args) => {
                for arg in args {
                    arg.collect_free(set);
                }
            }
        }
    }

    /// Render with raw variable ids (`'t0`), stable across types.
    pub fn pretty(&self) -> String {
        self.render(&mut None)
    }

    /// Render with appearance-ordered variable names (`a`, `b`, ...).
    pub fn pretty_names(&self) -> String {
        self.render(&mut Some(HashMap::new()))
    }

    fn render(&self, names: &mut Option<HashMap<usize, String>>) -> String {
        match self {
            Type::Int => "Int".to_string(),
            Type::Float => "Float".to_string(),
            Type::Bool => "Bool".to_string(),
            Type::String => "String".to_string(),
            Type::Unit => "Unit".to_string(),
            Type::Var(v) => match names {
                Some(map) => {
                    let next = map.len();
                    map.entry(v.id).or_insert_with(|| var_name(next)).clone()
                }
                None => v.to_string(),
            },
            Type::Func(param, ret) => {
                let param_str = if matches!(**param, Type::Func(_, _)) {
                    format!("({})", param.render(names))
                } else {
                    param.render(names)
                };
                format!("{} -> {}", param_str, ret.render(names))
            }
            Type::List(elem) => format!("List({})", elem.render(names)),
            Type::Tuple(elems) => {
                let parts: Vec<String> = elems.iter().map(|t| t.render(names)).collect();
                format!("({})", parts.join(", "))
            }
            Type::Record { fields, row } => {
                let mut parts: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty.render(names)))
                    .collect();
                if row.is_some() {
                    parts.push("..".to_string());
                }
                format!("{{ {} }}", parts.join(", "))
            }
            Type::Result(ok) => format!("Result({})", ok.render(names)),
            Type::Tag(name, args) => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let parts: Vec<String> = args.iter().map(|t| t.render(names)).collect();
                    format!("{}({})", name, parts.join(", "))
                }
            }
        }
    }
}

/// `a`, `b`, ..., `z`, `a1`, `b1`, ... - never reuses a name.
fn var_name(index: usize) -> String {
    let letter = (b'a' + (index % 26) as u8) as char;
    let round = index / 26;
    if round == 0 {
        letter.to_string()
    } else {
        format!("{}{}", letter, round)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

/// A polymorphic type: quantified variables plus the underlying type.
///
/// A monomorphic binding is simply a scheme with no quantified variables.
/// Quantified variables are replaced with fresh ones at every use site
/// (instantiation), so separate uses never interfere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScheme {
    pub vars: Vec<TypeVar>,
    pub ty: Type,
}

impl TypeScheme {
    pub fn monomorphic(ty: Type) -> Self {
        TypeScheme {
            vars: Vec::new(),
            ty,
        }
    }

    pub fn polymorphic(vars: Vec<TypeVar>, ty: Type) -> Self {
        TypeScheme { vars, ty }
    }

    /// Free variables of the scheme: free in the type, not quantified.
    pub fn free_type_vars(&self) -> HashSet<TypeVar> {
        let mut set = self.ty.free_type_vars();
        for var in &self.vars {
            set.remove(var);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_type_vars_concrete() {
        let ty = Type::func(Type::Int, Type::String);
        assert!(ty.free_type_vars().is_empty());
    }

    #[test]
    fn test_free_type_vars_nested() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let ty = Type::func(
            Type::list(Type::Var(a.clone())),
            Type::Tuple(vec![Type::Var(b.clone()), Type::Int]),
        );
        let free = ty.free_type_vars();
        assert_eq!(free.len(), 2);
        assert!(free.contains(&a));
        assert!(free.contains(&b));
    }

    #[test]
    fn test_free_type_vars_include_open_row() {
        let row = TypeVar::new(7);
        let ty = Type::Record {
            fields: BTreeMap::from([("x".to_string(), Type::Int)]),
            row: Some(row.clone()),
        };
        assert!(ty.free_type_vars().contains(&row));
    }

    #[test]
    fn test_scheme_free_vars_exclude_quantified() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let scheme = TypeScheme::polymorphic(
            vec![a.clone()],
            Type::func(Type::Var(a), Type::Var(b.clone())),
        );
        let free = scheme.free_type_vars();
        assert_eq!(free.len(), 1);
        assert!(free.contains(&b));
    }

    #[test]
    fn test_pretty_simple() {
        assert_eq!(Type::Int.pretty(), "Int");
        assert_eq!(Type::list(Type::Bool).pretty(), "List(Bool)");
        assert_eq!(Type::result(Type::Int).pretty(), "Result(Int)");
        assert_eq!(
            Type::Tuple(vec![Type::Int, Type::String]).pretty(),
            "(Int, String)"
        );
    }

    #[test]
    fn test_pretty_function_parenthesizes_left_nesting() {
        let ty = Type::func(Type::func(Type::Int, Type::Int), Type::String);
        assert_eq!(ty.pretty(), "(Int -> Int) -> String");

        let ty = Type::func(Type::Int, Type::func(Type::Int, Type::String));
        assert_eq!(ty.pretty(), "Int -> Int -> String");
    }

    #[test]
    fn test_pretty_names_by_appearance() {
        let a = TypeVar::new(40);
        let b = TypeVar::new(3);
        let ty = Type::func(Type::Var(a.clone()), Type::func(Type::Var(b), Type::Var(a)));
        assert_eq!(ty.pretty_names(), "a -> b -> a");
    }

    #[test]
    fn test_pretty_names_do_not_wrap_past_z() {
        let vars: Vec<Type> = (0..28).map(|id| Type::Var(TypeVar::new(id))).collect();
        let rendered = Type::Tuple(vars).pretty_names();
        assert!(rendered.contains("a, b,"));
        assert!(rendered.contains("a1"));
        assert!(rendered.contains("b1"));
    }

    #[test]
    fn test_pretty_marks_open_rows() {
        let ty = Type::Record {
            fields: BTreeMap::from([("x".to_string(), Type::Int)]),
            row: Some(TypeVar::new(0)),
        };
        assert_eq!(ty.pretty(), "{ x: Int, .. }");
    }
}
