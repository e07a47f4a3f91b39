//! The tree walk.
//!
//! One handler per expression shape. The walk assumes a well-typed input
//! but keeps runtime shape checks: the inferencer deliberately admits
//! programs with opaque tag matches.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use thiserror::Error;

use crate::ast::expression::{Binary, Catch, Expr, If, Match, Pipe, Unary};
use crate::ast::{BinOpKind, Pattern, UnaryOpKind};
use crate::span::Span;

use super::scope::Env;
use super::value::{Closure, Value};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("cannot call a non-function value")]
    NotCallable { span: Span },

    #[error("no matching pattern")]
    NoMatch { span: Span },

    #[error("field access on a non-record value")]
    FieldOnNonRecord { span: Span },

    #[error("no field {field}")]
    NoSuchField { field: String, span: Span },

    #[error("the ? operator requires a Result value")]
    UnwrapNonResult { span: Span },

    #[error("operator {op} cannot combine these operands")]
    InvalidOperands { op: &'static str, span: Span },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("recovery binder has no protected expression")]
    UnboundCatch { span: Span },

    #[error("{builtin}: {message}")]
    BuiltinMisuse {
        builtin: &'static str,
        message: String,
        span: Span,
    },
}

impl RuntimeError {
    pub fn span(&self) -> &Span {
        match self {
            RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::NotCallable { span }
            | RuntimeError::NoMatch { span }
            | RuntimeError::FieldOnNonRecord { span }
            | RuntimeError::NoSuchField { span, .. }
            | RuntimeError::UnwrapNonResult { span }
            | RuntimeError::InvalidOperands { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::UnboundCatch { span }
            | RuntimeError::BuiltinMisuse { span, .. } => span,
        }
    }
}

/// Why the walk stopped early: a runtime failure, or the early-return
/// control transfer carrying the failing `Err` value from an unwrap.
#[derive(Debug, Clone)]
pub enum Interrupt {
    EarlyReturn(Value),
    Failure(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Self {
        Interrupt::Failure(err)
    }
}

pub type EvalResult = Result<Value, Interrupt>;

/// The evaluator. Generic over its output sink so `print` is testable;
/// the default writes to stdout.
pub struct Interpreter<W: Write> {
    out: W,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Interpreter { out: io::stdout() }
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        Interpreter { out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub(super) fn write_line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    pub fn eval(&mut self, expr: &Expr, env: &Env) -> EvalResult {
        match expr {
            Expr::Int(value, _) => Ok(Value::Int(*value)),
            Expr::Float(value, _) => Ok(Value::Float(*value)),
            Expr::Str(value, _) => Ok(Value::Str(value.clone())),
            Expr::Bool(value, _) => Ok(Value::Bool(*value)),
            Expr::Unit(_) => Ok(Value::Unit),

            Expr::Ident(name, span) => match env.lookup(name) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::UndefinedVariable {
                    name: name.clone(),
                    span: *span,
                }
                .into()),
            },

            Expr::Let(node) => {
                let value = self.eval(&node.value, env)?;
                if node.recursive {
                    // Install the self-reference so the closure can see
                    // its own name
                    if let Value::Closure(closure) = &value {
                        closure
                            .env
                            .borrow_mut()
                            .insert(node.name.clone(), value.clone());
                    }
                }
                let env = env.bind(node.name.clone(), value);
                self.eval(&node.body, &env)
            }

            Expr::Lambda(node) => Ok(Value::Closure(Rc::new(Closure {
                param: node.param.clone(),
                body: node.body.clone(),
                env: RefCell::new(env.clone()),
            }))),

            Expr::Apply(node) => {
                let func = self.eval(&node.func, env)?;
                let arg = self.eval(&node.arg, env)?;
                self.apply(func, arg, &node.span)
            }

            Expr::Binary(node) => self.eval_binary(node, env),
            Expr::Unary(node) => self.eval_unary(node, env),
            Expr::Pipe(node) => self.eval_pipe(node, env),

            Expr::Unwrap(node) => {
                let inner = self.eval(&node.inner, env)?;
                unwrap_result(inner, &node.span)
            }

            Expr::Catch(node) => match &node.protected {
                Some(protected) => self.eval_catch(protected, node, env),
                None => Err(RuntimeError::UnboundCatch { span: node.span }.into()),
            },

            Expr::Match(node) => self.eval_match(node, env),
            Expr::If(node) => self.eval_if(node, env),

            Expr::List(items, _) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(values))
            }

            Expr::Tuple(items, _) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tuple(values))
            }

            Expr::Record(fields, _) => {
                let mut values = Vec::with_capacity(fields.len());
                for (name, value) in fields {
                    values.push((name.clone(), self.eval(value, env)?));
                }
                Ok(Value::Record(values))
            }

            Expr::Field(node) => {
                let record = self.eval(&node.record, env)?;
                match record {
                    Value::Record(fields) => fields
                        .iter()
                        .find(|(name, _)| *name == node.name)
                        .map(|(_, value)| value.clone())
                        .ok_or_else(|| {
                            RuntimeError::NoSuchField {
                                field: node.name.clone(),
                                span: node.span,
                            }
                            .into()
                        }),
                    _ => Err(RuntimeError::FieldOnNonRecord { span: node.span }.into()),
                }
            }

            Expr::Tag(node) => {
                let args = node
                    .args
                    .iter()
                    .map(|arg| self.eval(arg, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tag(node.name.clone(), args))
            }
        }
    }

    /// Apply `func` to one argument. Closures run their body in the
    /// captured environment; builtins accumulate arguments until their
    /// declared arity is reached (auto-currying).
    pub(super) fn apply(&mut self, func: Value, arg: Value, span: &Span) -> EvalResult {
        match func {
            Value::Closure(closure) => {
                let captured = closure.env.borrow().clone();
                let env = captured.bind(closure.param.clone(), arg);
                self.eval(&closure.body, &env)
            }
            Value::Builtin(mut builtin) => {
                builtin.args.push(arg);
                if builtin.args.len() == builtin.builtin.arity() {
                    self.call_builtin(builtin.builtin, builtin.args, span)
                } else {
                    Ok(Value::Builtin(builtin))
                }
            }
            _ => Err(RuntimeError::NotCallable { span: *span }.into()),
        }
    }

    fn eval_pipe(&mut self, node: &Pipe, env: &Env) -> EvalResult {
        match &node.right {
            // `x |> catch e -> d`: the pipe's left side fills the binder's
            // protected slot
            Expr::Catch(catch) if catch.protected.is_none() => {
                self.eval_catch(&node.left, catch, env)
            }

            // `x |> f?`: apply f, then unwrap what it returned
            Expr::Unwrap(unwrap) => {
                let left = self.eval(&node.left, env)?;
                let func = self.eval(&unwrap.inner, env)?;
                let result = self.apply(func, left, &node.span)?;
                unwrap_result(result, &unwrap.span)
            }

            _ => {
                let left = self.eval(&node.left, env)?;
                let right = self.eval(&node.right, env)?;
                self.apply(right, left, &node.span)
            }
        }
    }

    /// Evaluate the protected expression inside a guard that catches
    /// early-return transfers. `Ok(v)` unwraps, `Err(e)` (returned or
    /// caught) runs the fallback with `e` bound, anything else passes
    /// through unchanged.
    fn eval_catch(&mut self, protected: &Expr, node: &Catch, env: &Env) -> EvalResult {
        match self.eval(protected, env) {
            Ok(Value::Tag(name, mut args)) if name == "Ok" && args.len() == 1 => {
                Ok(args.remove(0))
            }
            Ok(Value::Tag(name, mut args)) if name == "Err" && args.len() == 1 => {
                let env = env.bind(node.param.clone(), args.remove(0));
                self.eval(&node.fallback, &env)
            }
            Ok(other) => Ok(other),
            Err(Interrupt::EarlyReturn(value)) => {
                let error = match value {
                    Value::Tag(name, mut args) if name == "Err" && args.len() == 1 => {
                        args.remove(0)
                    }
                    other => other,
                };
                let env = env.bind(node.param.clone(), error);
                self.eval(&node.fallback, &env)
            }
            Err(failure) => Err(failure),
        }
    }

    fn eval_match(&mut self, node: &Match, env: &Env) -> EvalResult {
        let subject = self.eval(&node.subject, env)?;
        for case in &node.cases {
            if let Some(bindings) = match_pattern(&case.pattern, &subject) {
                let mut env = env.clone();
                for (name, value) in bindings {
                    env.insert(name, value);
                }
                return self.eval(&case.body, &env);
            }
        }
        Err(RuntimeError::NoMatch { span: node.span }.into())
    }

    fn eval_if(&mut self, node: &If, env: &Env) -> EvalResult {
        match self.eval(&node.condition, env)? {
            Value::Bool(true) => self.eval(&node.then_branch, env),
            Value::Bool(false) => self.eval(&node.else_branch, env),
            _ => Err(RuntimeError::InvalidOperands {
                op: "if",
                span: *node.condition.span(),
            }
            .into()),
        }
    }

    fn eval_binary(&mut self, node: &Binary, env: &Env) -> EvalResult {
        // Both sides always evaluate; && and || are strict
        let left = self.eval(&node.left, env)?;
        let right = self.eval(&node.right, env)?;
        binary_op(node.op, left, right, &node.span).map_err(Into::into)
    }

    fn eval_unary(&mut self, node: &Unary, env: &Env) -> EvalResult {
        let operand = self.eval(&node.operand, env)?;
        match (node.op, operand) {
            (UnaryOpKind::Neg, Value::Int(v)) => Ok(Value::Int(-v)),
            (UnaryOpKind::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
            (UnaryOpKind::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
            (op, _) => Err(RuntimeError::InvalidOperands {
                op: op.symbol(),
                span: node.span,
            }
            .into()),
        }
    }
}

/// `Ok(v)` yields `v`; `Err(..)` raises the early-return transfer carrying
/// the whole tag; any other shape is a runtime error.
fn unwrap_result(value: Value, span: &Span) -> EvalResult {
    match value {
        Value::Tag(name, mut args) if name == "Ok" && args.len() == 1 => Ok(args.remove(0)),
        Value::Tag(name, args) if name == "Err" && args.len() == 1 => {
            Err(Interrupt::EarlyReturn(Value::Tag(name, args)))
        }
        _ => Err(RuntimeError::UnwrapNonResult { span: *span }.into()),
    }
}

/// Match a pattern against a value, producing the bindings on success.
pub fn match_pattern(pattern: &Pattern, value: &Value) -> Option<Vec<(String, Value)>> {
    match (pattern, value) {
        (Pattern::Int(p, _), Value::Int(v)) if p == v => Some(Vec::new()),
        (Pattern::Float(p, _), Value::Float(v)) if p == v => Some(Vec::new()),
        (Pattern::Str(p, _), Value::Str(v)) if p == v => Some(Vec::new()),
        (Pattern::Bool(p, _), Value::Bool(v)) if p == v => Some(Vec::new()),
        (Pattern::Wildcard(_), _) => Some(Vec::new()),
        (Pattern::Ident(name, _), _) => Some(vec![(name.clone(), value.clone())]),
        (Pattern::Tag(name, subs, _), Value::Tag(tag, args))
            if name == tag && subs.len() == args.len() =>
        {
            let mut bindings = Vec::new();
            for (sub, arg) in subs.iter().zip(args) {
                bindings.extend(match_pattern(sub, arg)?);
            }
            Some(bindings)
        }
        (Pattern::Tuple(subs, _), Value::Tuple(elems)) if subs.len() == elems.len() => {
            let mut bindings = Vec::new();
            for (sub, elem) in subs.iter().zip(elems) {
                bindings.extend(match_pattern(sub, elem)?);
            }
            Some(bindings)
        }
        // The subject may carry more fields than the pattern names
        (Pattern::Record(fields, _), Value::Record(entries)) => {
            let mut bindings = Vec::new();
            for (name, sub) in fields {
                let (_, field_value) = entries.iter().find(|(n, _)| n == name)?;
                bindings.extend(match_pattern(sub, field_value)?);
            }
            Some(bindings)
        }
        _ => None,
    }
}

fn binary_op(
    op: BinOpKind,
    left: Value,
    right: Value,
    span: &Span,
) -> Result<Value, RuntimeError> {
    let invalid = || RuntimeError::InvalidOperands {
        op: op.symbol(),
        span: *span,
    };

    match op {
        BinOpKind::Add | BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Rem => {
            match numeric_pair(&left, &right) {
                Some(NumericPair::Int(a, b)) => match op {
                    BinOpKind::Add => Ok(Value::Int(a + b)),
                    BinOpKind::Sub => Ok(Value::Int(a - b)),
                    BinOpKind::Mul => Ok(Value::Int(a * b)),
                    // Truncates toward zero
                    BinOpKind::Div if b == 0 => Err(RuntimeError::DivisionByZero { span: *span }),
                    BinOpKind::Div => Ok(Value::Int(a / b)),
                    BinOpKind::Rem if b == 0 => Err(RuntimeError::DivisionByZero { span: *span }),
                    BinOpKind::Rem => Ok(Value::Int(a % b)),
                    _ => unreachable!(),
                },
                Some(NumericPair::Float(a, b)) => match op {
                    BinOpKind::Add => Ok(Value::Float(a + b)),
                    BinOpKind::Sub => Ok(Value::Float(a - b)),
                    BinOpKind::Mul => Ok(Value::Float(a * b)),
                    BinOpKind::Div => Ok(Value::Float(a / b)),
                    BinOpKind::Rem => Ok(Value::Float(a % b)),
                    _ => unreachable!(),
                },
                None => Err(invalid()),
            }
        }

        BinOpKind::Lt | BinOpKind::Gt | BinOpKind::LtEq | BinOpKind::GtEq => {
            let (a, b) = match numeric_pair(&left, &right) {
                Some(NumericPair::Int(a, b)) => (a as f64, b as f64),
                Some(NumericPair::Float(a, b)) => (a, b),
                None => return Err(invalid()),
            };
            let result = match op {
                BinOpKind::Lt => a < b,
                BinOpKind::Gt => a > b,
                BinOpKind::LtEq => a <= b,
                BinOpKind::GtEq => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }

        BinOpKind::Eq | BinOpKind::NotEq => {
            let equal = primitive_eq(&left, &right).ok_or_else(invalid)?;
            Ok(Value::Bool(if op == BinOpKind::Eq { equal } else { !equal }))
        }

        BinOpKind::Concat => match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            _ => Err(invalid()),
        },

        BinOpKind::And => match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
            _ => Err(invalid()),
        },

        BinOpKind::Or => match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
            _ => Err(invalid()),
        },
    }
}

enum NumericPair {
    Int(i64, i64),
    Float(f64, f64),
}

/// Mixed int/float operands promote to float.
fn numeric_pair(left: &Value, right: &Value) -> Option<NumericPair> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(NumericPair::Int(*a, *b)),
        (Value::Float(a), Value::Float(b)) => Some(NumericPair::Float(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Some(NumericPair::Float(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(NumericPair::Float(*a, *b as f64)),
        _ => None,
    }
}

fn primitive_eq(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a == b),
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::Unit, Value::Unit) => Some(true),
        _ => match numeric_pair(left, right)? {
            NumericPair::Int(a, b) => Some(a == b),
            NumericPair::Float(a, b) => Some(a == b),
        },
    }
}
