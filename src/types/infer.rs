//! Algorithm W.
//!
//! Each expression shape yields a `(Substitution, Type)` pair; the driver
//! in [`crate::types::infer`] applies the final substitution to the
//! returned type. Schemes are instantiated at identifier uses and
//! generalized at non-recursive `let` bindings; recursive bindings get a
//! monomorphic placeholder that is unified with the inferred value type.
//!
//! Tag patterns are deliberately *not* unified against the match subject:
//! the language has no declared sum types, so constructors are structural
//! and open, and rejecting programs on constructor shape would be wrong.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::ast::expression::{
    Apply, BinOpKind, Binary, Catch, Expr, Field, If, Lambda, Let, Match, Pipe, Tag, Unary,
    UnaryOpKind, Unwrap,
};
use crate::ast::Pattern;
use crate::span::Span;

use super::env::TypeEnv;
use super::subst::Substitution;
use super::ty::{Type, TypeScheme, TypeVar};
use super::unify::{unify, UnifyError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("type mismatch: expected {}, found {}", .expected.pretty(), .found.pretty())]
    Mismatch {
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("cannot construct infinite type: {var} = {}", .ty.pretty())]
    InfiniteType { var: TypeVar, ty: Type, span: Span },

    #[error("no field {field} on {}", .ty.pretty())]
    NoSuchField { field: String, ty: Type, span: Span },

    #[error("field access on non-record type {}", .ty.pretty())]
    NotARecord { ty: Type, span: Span },

    #[error("the ? operator requires a Result type, found {}", .found.pretty())]
    NotAResult { found: Type, span: Span },
}

impl TypeError {
    pub fn span(&self) -> &Span {
        match self {
            TypeError::UndefinedVariable { span, .. }
            | TypeError::Mismatch { span, .. }
            | TypeError::InfiniteType { span, .. }
            | TypeError::NoSuchField { span, .. }
            | TypeError::NotARecord { span, .. }
            | TypeError::NotAResult { span, .. } => span,
        }
    }

    fn from_unify(err: UnifyError, span: Span) -> Self {
        match err {
            UnifyError::Mismatch { expected, found } => TypeError::Mismatch {
                expected,
                found,
                span,
            },
            UnifyError::OccursCheck { var, ty } => TypeError::InfiniteType { var, ty, span },
        }
    }
}

type InferResult = Result<(Substitution, Type), TypeError>;

/// Inference context: the only state is the fresh-variable counter.
pub struct Infer {
    next_var: usize,
}

impl Infer {
    pub fn new() -> Self {
        Infer { next_var: 0 }
    }

    fn fresh_var(&mut self) -> TypeVar {
        let id = self.next_var;
        self.next_var += 1;
        TypeVar::new(id)
    }

    fn fresh(&mut self) -> Type {
        Type::Var(self.fresh_var())
    }

    /// Replace every quantified variable with a fresh one.
    fn instantiate(&mut self, scheme: &TypeScheme) -> Type {
        let map: HashMap<TypeVar, Type> = scheme
            .vars
            .iter()
            .map(|v| (v.clone(), self.fresh()))
            .collect();
        Substitution(map).apply(&scheme.ty)
    }

    /// Quantify over the variables free in `ty` but not in `env`.
    fn generalize(env: &TypeEnv, ty: &Type) -> TypeScheme {
        let free_in_env = env.free_type_vars();
        let vars: Vec<TypeVar> = ty
            .free_type_vars()
            .difference(&free_in_env)
            .cloned()
            .collect();
        TypeScheme {
            vars,
            ty: ty.clone(),
        }
    }

    fn unify_at(t1: &Type, t2: &Type, span: &Span) -> Result<Substitution, TypeError> {
        unify(t1, t2).map_err(|e| TypeError::from_unify(e, *span))
    }

    pub fn infer_expr(&mut self, env: &TypeEnv, expr: &Expr) -> InferResult {
        match expr {
            Expr::Int(..) => Ok((Substitution::empty(), Type::Int)),
            Expr::Float(..) => Ok((Substitution::empty(), Type::Float)),
            Expr::Str(..) => Ok((Substitution::empty(), Type::String)),
            Expr::Bool(..) => Ok((Substitution::empty(), Type::Bool)),
            Expr::Unit(_) => Ok((Substitution::empty(), Type::Unit)),

            Expr::Ident(name, span) => match env.lookup(name) {
                Some(scheme) => {
                    let ty = self.instantiate(scheme);
                    Ok((Substitution::empty(), ty))
                }
                None => Err(TypeError::UndefinedVariable {
                    name: name.clone(),
                    span: *span,
                }),
            },

            Expr::Let(node) => self.infer_let(env, node),
            Expr::Lambda(node) => self.infer_lambda(env, node),
            Expr::Apply(node) => self.infer_apply(env, node),
            Expr::Binary(node) => self.infer_binary(env, node),
            Expr::Unary(node) => self.infer_unary(env, node),
            Expr::Pipe(node) => self.infer_pipe(env, node),
            Expr::Unwrap(node) => self.infer_unwrap(env, node),
            Expr::Catch(node) => self.infer_catch(env, node),
            Expr::Match(node) => self.infer_match(env, node),
            Expr::If(node) => self.infer_if(env, node),
            Expr::List(items, _) => self.infer_list(env, items),
            Expr::Tuple(items, _) => self.infer_tuple(env, items),
            Expr::Record(fields, _) => self.infer_record(env, fields),
            Expr::Field(node) => self.infer_field(env, node),
            Expr::Tag(node) => self.infer_tag(env, node),
        }
    }

    fn infer_let(&mut self, env: &TypeEnv, node: &Let) -> InferResult {
        if node.recursive {
            let placeholder = self.fresh();
            let env1 = env.extend(
                node.name.clone(),
                TypeScheme::monomorphic(placeholder.clone()),
            );
            let (s1, value_ty) = self.infer_expr(&env1, &node.value)?;
            let s2 = Self::unify_at(&s1.apply(&placeholder), &value_ty, node.value.span())?;
            let s12 = s2.compose(&s1);
            // No generalization at the definition's own site
            let env2 = env.apply_subst(&s12).extend(
                node.name.clone(),
                TypeScheme::monomorphic(s12.apply(&value_ty)),
            );
            let (s3, body_ty) = self.infer_expr(&env2, &node.body)?;
            Ok((s3.compose(&s12), body_ty))
        } else {
            let (s1, value_ty) = self.infer_expr(env, &node.value)?;
            let env1 = env.apply_subst(&s1);
            let scheme = Self::generalize(&env1, &value_ty);
            let env2 = env1.extend(node.name.clone(), scheme);
            let (s2, body_ty) = self.infer_expr(&env2, &node.body)?;
            Ok((s2.compose(&s1), body_ty))
        }
    }

    fn infer_lambda(&mut self, env: &TypeEnv, node: &Lambda) -> InferResult {
        let param_ty = self.fresh();
        let env1 = env.extend(
            node.param.clone(),
            TypeScheme::monomorphic(param_ty.clone()),
        );
        let (s, body_ty) = self.infer_expr(&env1, &node.body)?;
        let param_ty = s.apply(&param_ty);
        Ok((s, Type::func(param_ty, body_ty)))
    }

    fn infer_apply(&mut self, env: &TypeEnv, node: &Apply) -> InferResult {
        let (s1, func_ty) = self.infer_expr(env, &node.func)?;
        let env1 = env.apply_subst(&s1);
        let (s2, arg_ty) = self.infer_expr(&env1, &node.arg)?;

        let ret = self.fresh();
        let s3 = Self::unify_at(
            &s2.apply(&func_ty),
            &Type::func(arg_ty, ret.clone()),
            &node.span,
        )?;

        let subst = s3.compose(&s2).compose(&s1);
        let ty = subst.apply(&ret);
        Ok((subst, ty))
    }

    fn infer_binary(&mut self, env: &TypeEnv, node: &Binary) -> InferResult {
        let (s1, left_ty) = self.infer_expr(env, &node.left)?;
        let env1 = env.apply_subst(&s1);
        let (s2, right_ty) = self.infer_expr(&env1, &node.right)?;
        let left_ty = s2.apply(&left_ty);

        match node.op {
            // Same operand type in, same type out; Int vs Float is settled
            // by whatever the operands force
            BinOpKind::Add | BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Rem => {
                let s3 = Self::unify_at(&left_ty, &right_ty, node.right.span())?;
                let subst = s3.compose(&s2).compose(&s1);
                let ty = subst.apply(&right_ty);
                Ok((subst, ty))
            }
            BinOpKind::Eq
            | BinOpKind::NotEq
            | BinOpKind::Lt
            | BinOpKind::Gt
            | BinOpKind::LtEq
            | BinOpKind::GtEq => {
                let s3 = Self::unify_at(&left_ty, &right_ty, node.right.span())?;
                Ok((s3.compose(&s2).compose(&s1), Type::Bool))
            }
            BinOpKind::Concat => {
                let s3 = Self::unify_at(&left_ty, &Type::String, node.left.span())?;
                let s4 = Self::unify_at(&s3.apply(&right_ty), &Type::String, node.right.span())?;
                Ok((
                    s4.compose(&s3).compose(&s2).compose(&s1),
                    Type::String,
                ))
            }
            BinOpKind::And | BinOpKind::Or => {
                let s3 = Self::unify_at(&left_ty, &Type::Bool, node.left.span())?;
                let s4 = Self::unify_at(&s3.apply(&right_ty), &Type::Bool, node.right.span())?;
                Ok((s4.compose(&s3).compose(&s2).compose(&s1), Type::Bool))
            }
        }
    }

    fn infer_unary(&mut self, env: &TypeEnv, node: &Unary) -> InferResult {
        let (s1, operand_ty) = self.infer_expr(env, &node.operand)?;
        match node.op {
            UnaryOpKind::Not => {
                let s2 = Self::unify_at(&operand_ty, &Type::Bool, node.operand.span())?;
                Ok((s2.compose(&s1), Type::Bool))
            }
            // Int first, Float on failure
            UnaryOpKind::Neg => match unify(&operand_ty, &Type::Int) {
                Ok(s2) => Ok((s2.compose(&s1), Type::Int)),
                Err(_) => {
                    let s2 = Self::unify_at(&operand_ty, &Type::Float, node.operand.span())?;
                    Ok((s2.compose(&s1), Type::Float))
                }
            },
        }
    }

    fn infer_pipe(&mut self, env: &TypeEnv, node: &Pipe) -> InferResult {
        match &node.right {
            // `x |> catch e -> fallback`: the binder protects the pipe's
            // left side. A Result on the left unwraps to its ok type; a
            // chain that already unwrapped passes through unchanged.
            Expr::Catch(catch) if catch.protected.is_none() => {
                let (s1, left_ty) = self.infer_expr(env, &node.left)?;
                let ok_ty = self.fresh();
                let s2 = match unify(&left_ty, &Type::result(ok_ty.clone())) {
                    Ok(s) => s,
                    Err(_) => Self::unify_at(&left_ty, &ok_ty, node.left.span())?,
                };
                let s12 = s2.compose(&s1);
                let env1 = env.apply_subst(&s12).extend(
                    catch.param.clone(),
                    TypeScheme::monomorphic(Type::String),
                );
                let (s3, fallback_ty) = self.infer_expr(&env1, &catch.fallback)?;
                let s123 = s3.compose(&s12);
                let s4 = Self::unify_at(&s123.apply(&ok_ty), &fallback_ty, catch.fallback.span())?;
                let subst = s4.compose(&s123);
                let ty = subst.apply(&ok_ty);
                Ok((subst, ty))
            }

            // `x |> f?`: apply f, then unwrap the Result it must return
            Expr::Unwrap(unwrap) => {
                let (s1, left_ty) = self.infer_expr(env, &node.left)?;
                let env1 = env.apply_subst(&s1);
                let (s2, func_ty) = self.infer_expr(&env1, &unwrap.inner)?;
                let ret = self.fresh();
                let s3 = Self::unify_at(
                    &s2.apply(&func_ty),
                    &Type::func(s2.apply(&left_ty), ret.clone()),
                    &node.span,
                )?;
                let s123 = s3.compose(&s2).compose(&s1);

                let ok_ty = self.fresh();
                let returned = s123.apply(&ret);
                let s4 = match unify(&returned, &Type::result(ok_ty.clone())) {
                    Ok(s) => s,
                    Err(UnifyError::OccursCheck { var, ty }) => {
                        return Err(TypeError::InfiniteType {
                            var,
                            ty,
                            span: unwrap.span,
                        })
                    }
                    Err(UnifyError::Mismatch { .. }) => {
                        return Err(TypeError::NotAResult {
                            found: returned,
                            span: unwrap.span,
                        })
                    }
                };
                let subst = s4.compose(&s123);
                let ty = subst.apply(&ok_ty);
                Ok((subst, ty))
            }

            // Plain pipe: application with the operands swapped
            _ => {
                let (s1, left_ty) = self.infer_expr(env, &node.left)?;
                let env1 = env.apply_subst(&s1);
                let (s2, right_ty) = self.infer_expr(&env1, &node.right)?;
                let ret = self.fresh();
                let s3 = Self::unify_at(
                    &s2.apply(&right_ty),
                    &Type::func(s2.apply(&left_ty), ret.clone()),
                    &node.span,
                )?;
                let subst = s3.compose(&s2).compose(&s1);
                let ty = subst.apply(&ret);
                Ok((subst, ty))
            }
        }
    }

    fn infer_unwrap(&mut self, env: &TypeEnv, node: &Unwrap) -> InferResult {
        let (s1, inner_ty) = self.infer_expr(env, &node.inner)?;
        let ok_ty = self.fresh();
        match unify(&inner_ty, &Type::result(ok_ty.clone())) {
            Ok(s2) => {
                let subst = s2.compose(&s1);
                let ty = subst.apply(&ok_ty);
                Ok((subst, ty))
            }
            Err(UnifyError::OccursCheck { var, ty }) => Err(TypeError::InfiniteType {
                var,
                ty,
                span: node.span,
            }),
            Err(UnifyError::Mismatch { .. }) => Err(TypeError::NotAResult {
                found: inner_ty,
                span: node.span,
            }),
        }
    }

    fn infer_catch(&mut self, env: &TypeEnv, node: &Catch) -> InferResult {
        let mut subst = Substitution::empty();
        let mut env1 = env.clone();
        if let Some(protected) = &node.protected {
            let (s1, _protected_ty) = self.infer_expr(env, protected)?;
            env1 = env.apply_subst(&s1);
            subst = s1;
        }
        let env2 = env1.extend(node.param.clone(), TypeScheme::monomorphic(Type::String));
        let (s2, fallback_ty) = self.infer_expr(&env2, &node.fallback)?;
        Ok((s2.compose(&subst), fallback_ty))
    }

    fn infer_match(&mut self, env: &TypeEnv, node: &Match) -> InferResult {
        let (mut subst, subject_ty) = self.infer_expr(env, &node.subject)?;
        let ret = self.fresh();

        for case in &node.cases {
            let (pattern_ty, bindings, s_pat) = self.infer_pattern(&case.pattern)?;
            subst = s_pat.compose(&subst);

            // Tag patterns stay opaque: constructors are structural and
            // open, so there is nothing sound to unify the subject with
            if !matches!(case.pattern, Pattern::Tag(..)) {
                let s = Self::unify_at(
                    &subst.apply(&subject_ty),
                    &subst.apply(&pattern_ty),
                    case.pattern.span(),
                )?;
                subst = s.compose(&subst);
            }

            let mut env1 = env.apply_subst(&subst);
            for (name, ty) in bindings {
                env1 = env1.extend(name, TypeScheme::monomorphic(subst.apply(&ty)));
            }
            let (s_body, body_ty) = self.infer_expr(&env1, &case.body)?;
            subst = s_body.compose(&subst);
            let s = Self::unify_at(&subst.apply(&ret), &body_ty, case.body.span())?;
            subst = s.compose(&subst);
        }

        let ty = subst.apply(&ret);
        Ok((subst, ty))
    }

    fn infer_if(&mut self, env: &TypeEnv, node: &If) -> InferResult {
        let (s1, cond_ty) = self.infer_expr(env, &node.condition)?;
        let s2 = Self::unify_at(&cond_ty, &Type::Bool, node.condition.span())?;
        let mut subst = s2.compose(&s1);

        let (s3, then_ty) = self.infer_expr(&env.apply_subst(&subst), &node.then_branch)?;
        subst = s3.compose(&subst);
        let (s4, else_ty) = self.infer_expr(&env.apply_subst(&subst), &node.else_branch)?;
        subst = s4.compose(&subst);

        let s5 = Self::unify_at(&subst.apply(&then_ty), &else_ty, node.else_branch.span())?;
        subst = s5.compose(&subst);
        let ty = subst.apply(&then_ty);
        Ok((subst, ty))
    }

    fn infer_list(&mut self, env: &TypeEnv, items: &[Expr]) -> InferResult {
        let Some((first, rest)) = items.split_first() else {
            return Ok((Substitution::empty(), Type::list(self.fresh())));
        };
        let (mut subst, mut elem_ty) = self.infer_expr(env, first)?;
        for item in rest {
            let (s, ty) = self.infer_expr(&env.apply_subst(&subst), item)?;
            subst = s.compose(&subst);
            let s = Self::unify_at(&subst.apply(&elem_ty), &ty, item.span())?;
            subst = s.compose(&subst);
            elem_ty = subst.apply(&elem_ty);
        }
        Ok((subst, Type::list(elem_ty)))
    }

    fn infer_tuple(&mut self, env: &TypeEnv, items: &[Expr]) -> InferResult {
        let (subst, types) = self.infer_each(env, items)?;
        Ok((subst, Type::Tuple(types)))
    }

    fn infer_record(&mut self, env: &TypeEnv, fields: &[(String, Expr)]) -> InferResult {
        let mut subst = Substitution::empty();
        let mut typed = BTreeMap::new();
        for (name, value) in fields {
            let (s, ty) = self.infer_expr(&env.apply_subst(&subst), value)?;
            subst = s.compose(&subst);
            typed.insert(name.clone(), ty);
        }
        let typed = typed
            .into_iter()
            .map(|(name, ty)| (name, subst.apply(&ty)))
            .collect();
        Ok((
            subst,
            Type::Record {
                fields: typed,
                row: None,
            },
        ))
    }

    fn infer_field(&mut self, env: &TypeEnv, node: &Field) -> InferResult {
        let (s1, record_ty) = self.infer_expr(env, &node.record)?;
        match s1.apply(&record_ty) {
            Type::Record { fields, row } => match fields.get(&node.name) {
                Some(field_ty) => {
                    let ty = field_ty.clone();
                    Ok((s1, ty))
                }
                None => Err(TypeError::NoSuchField {
                    field: node.name.clone(),
                    ty: Type::Record { fields, row },
                    span: node.span,
                }),
            },
            // Unknown shape: constrain it with an open row carrying just
            // the accessed field
            Type::Var(v) => {
                let field_ty = self.fresh();
                let row = self.fresh_var();
                let want = Type::Record {
                    fields: BTreeMap::from([(node.name.clone(), field_ty.clone())]),
                    row: Some(row),
                };
                let s2 = Self::unify_at(&Type::Var(v), &want, &node.span)?;
                let subst = s2.compose(&s1);
                let ty = subst.apply(&field_ty);
                Ok((subst, ty))
            }
            other => Err(TypeError::NotARecord {
                ty: other,
                span: node.span,
            }),
        }
    }

    fn infer_tag(&mut self, env: &TypeEnv, node: &Tag) -> InferResult {
        let (mut subst, mut types) = self.infer_each(env, &node.args)?;
        match (node.name.as_str(), types.len()) {
            ("Ok", 1) => {
                let ok_ty = types.remove(0);
                Ok((subst, Type::result(ok_ty)))
            }
            ("Err", 1) => {
                // The error carrier is always text
                let s = Self::unify_at(&types[0], &Type::String, node.args[0].span())?;
                subst = s.compose(&subst);
                Ok((subst, Type::result(self.fresh())))
            }
            _ => Ok((subst, Type::Tag(node.name.clone(), types))),
        }
    }

    /// Infer a sequence left to right, threading the substitution.
    fn infer_each(
        &mut self,
        env: &TypeEnv,
        items: &[Expr],
    ) -> Result<(Substitution, Vec<Type>), TypeError> {
        let mut subst = Substitution::empty();
        let mut types = Vec::with_capacity(items.len());
        for item in items {
            let (s, ty) = self.infer_expr(&env.apply_subst(&subst), item)?;
            subst = s.compose(&subst);
            types.push(ty);
        }
        let types = types.into_iter().map(|t| subst.apply(&t)).collect();
        Ok((subst, types))
    }

    /// Returns the pattern's type, the bindings it introduces and the
    /// substitution accumulated by sub-patterns.
    pub fn infer_pattern(
        &mut self,
        pattern: &Pattern,
    ) -> Result<(Type, Vec<(String, Type)>, Substitution), TypeError> {
        match pattern {
            Pattern::Int(..) => Ok((Type::Int, Vec::new(), Substitution::empty())),
            Pattern::Float(..) => Ok((Type::Float, Vec::new(), Substitution::empty())),
            Pattern::Str(..) => Ok((Type::String, Vec::new(), Substitution::empty())),
            Pattern::Bool(..) => Ok((Type::Bool, Vec::new(), Substitution::empty())),
            Pattern::Wildcard(_) => Ok((self.fresh(), Vec::new(), Substitution::empty())),
            Pattern::Ident(name, _) => {
                let ty = self.fresh();
                Ok((
                    ty.clone(),
                    vec![(name.clone(), ty)],
                    Substitution::empty(),
                ))
            }
            Pattern::Tuple(subs, _) => {
                let mut subst = Substitution::empty();
                let mut types = Vec::with_capacity(subs.len());
                let mut bindings = Vec::new();
                for sub in subs {
                    let (ty, binds, s) = self.infer_pattern(sub)?;
                    subst = s.compose(&subst);
                    types.push(ty);
                    bindings.extend(binds);
                }
                Ok((Type::Tuple(types), bindings, subst))
            }
            Pattern::Record(fields, _) => {
                let mut subst = Substitution::empty();
                let mut typed = BTreeMap::new();
                let mut bindings = Vec::new();
                for (name, sub) in fields {
                    let (ty, binds, s) = self.infer_pattern(sub)?;
                    subst = s.compose(&subst);
                    typed.insert(name.clone(), ty);
                    bindings.extend(binds);
                }
                // The subject may carry more fields than the pattern names
                let row = self.fresh_var();
                Ok((
                    Type::Record {
                        fields: typed,
                        row: Some(row),
                    },
                    bindings,
                    subst,
                ))
            }
            Pattern::Tag(name, subs, _) => {
                let mut subst = Substitution::empty();
                let mut types = Vec::with_capacity(subs.len());
                let mut bindings = Vec::new();
                for sub in subs {
                    let (ty, binds, s) = self.infer_pattern(sub)?;
                    subst = s.compose(&subst);
                    types.push(ty);
                    bindings.extend(binds);
                }
                match (name.as_str(), types.len()) {
                    ("Ok", 1) => {
                        let ok_ty = types.remove(0);
                        Ok((Type::result(ok_ty), bindings, subst))
                    }
                    ("Err", 1) => {
                        let s = Self::unify_at(&types[0], &Type::String, subs[0].span())?;
                        subst = s.compose(&subst);
                        Ok((Type::result(self.fresh()), bindings, subst))
                    }
                    _ => Ok((Type::Tag(name.clone(), types), bindings, subst)),
                }
            }
        }
    }
}

impl Default for Infer {
    fn default() -> Self {
        Self::new()
    }
}
