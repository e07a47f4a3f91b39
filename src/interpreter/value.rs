//! Runtime value representation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::Expr;

use super::builtins::Builtin;
use super::scope::Env;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Unit,
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Fields keep their insertion order for rendering.
    Record(Vec<(String, Value)>),
    Tag(String, Vec<Value>),
    Closure(Rc<Closure>),
    Builtin(BuiltinValue),
}

/// A lambda closed over its definition environment.
///
/// The environment sits behind a `RefCell` only for the `let rec` fixup,
/// which installs the closure into its own captured scope. Nothing else
/// writes through it.
#[derive(Debug)]
pub struct Closure {
    pub param: String,
    pub body: Expr,
    pub env: RefCell<Env>,
}

/// A built-in with the arguments accumulated so far; applying the last
/// one invokes the underlying operation.
#[derive(Debug, Clone)]
pub struct BuiltinValue {
    pub builtin: Builtin,
    pub args: Vec<Value>,
}

impl Value {
    /// The display form: strings quoted, everything else as it renders.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// The text form `print` and `to_string` use: strings verbatim,
    /// everything else as it renders.
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Floats always show a decimal point so they re-read as floats.
fn render_float(value: f64) -> String {
    let text = value.to_string();
    if text.chars().all(|c| c.is_ascii_digit() || c == '-') {
        format!("{}.0", text)
    } else {
        text
    }
}

fn render_seq(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", render_float(*v)),
            Value::Str(v) => write!(f, "\"{}\"", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Unit => write!(f, "()"),
            Value::List(items) => write!(f, "[{}]", render_seq(items)),
            Value::Tuple(items) => write!(f, "({})", render_seq(items)),
            Value::Record(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect();
                write!(f, "{{ {} }}", parts.join(", "))
            }
            Value::Tag(name, args) => {
                if args.is_empty() {
                    write!(f, "{}", name)
                } else {
                    write!(f, "{}({})", name, render_seq(args))
                }
            }
            Value::Closure(_) => write!(f, "<fn>"),
            Value::Builtin(b) => write!(f, "<builtin:{}>", b.builtin.name()),
        }
    }
}
