//! AST → IR lowering.
//!
//! A deterministic, side-effect-free transform that:
//! - assigns types to literals (int/float split by integrality),
//! - rewrites every operator into a named, typed `Call`,
//! - desugars temporal keywords into `today()`/`now()` call trees,
//! - threads a variable → type environment through `let`, lambda and
//!   predicate scopes,
//! - statically rejects recursive calls in `let`-bound lambdas.
//!
//! No target syntax is chosen here; the backends decide how each call
//! renders.

use indexmap::{IndexMap, IndexSet};

use crate::ast::{Binding, Expr, LiteralValue};
use crate::ir::{Ir, IrBinding, IrProperty};
use crate::types::{self, Type};
use crate::{Error, Result};

/// Maps variable names to their inferred types. Scopes are child copies:
/// `let`/lambda/predicate clone the parent map and add their bindings.
pub type TypeEnv = IndexMap<String, Type>;

/// Binding names whose lambda/predicate body is currently being lowered.
/// A call to any of these is illegal recursion.
type DefiningSet = IndexSet<String>;

/// Lower an AST expression into typed IR.
pub fn transform(expr: &Expr) -> Result<Ir> {
    lower(expr, &TypeEnv::new(), &DefiningSet::new())
}

/// Lower an AST expression in an explicit type environment.
///
/// Useful for hosts that know the types of free variables up front.
pub fn transform_with_env(expr: &Expr, env: &TypeEnv) -> Result<Ir> {
    lower(expr, env, &DefiningSet::new())
}

fn lower(expr: &Expr, env: &TypeEnv, defining: &DefiningSet) -> Result<Ir> {
    match expr {
        Expr::Literal { value } => Ok(lower_literal(*value)),
        Expr::Str { value } => Ok(Ir::StringLiteral {
            value: value.clone(),
        }),
        // Date-format validation is deliberately not done here; the payload
        // is carried verbatim and escaped by the backends.
        Expr::Date { value } => Ok(Ir::DateLiteral {
            value: value.clone(),
        }),
        Expr::DateTime { value } => Ok(Ir::DateTimeLiteral {
            value: value.clone(),
        }),
        Expr::Duration { value } => Ok(Ir::DurationLiteral {
            value: value.clone(),
        }),
        Expr::Variable { name } => Ok(Ir::Variable {
            name: name.clone(),
            inferred_type: env.get(name).cloned().unwrap_or(Type::Any),
        }),
        Expr::Binary { op, left, right } => lower_binary(op, left, right, env, defining),
        Expr::Unary { op, operand } => lower_unary(op, operand, env, defining),
        Expr::TemporalKeyword { keyword } => lower_temporal_keyword(keyword),
        Expr::FunctionCall { name, args } => lower_function_call(name, args, env, defining),
        Expr::MemberAccess { object, property } => Ok(Ir::MemberAccess {
            object: Box::new(lower(object, env, defining)?),
            property: property.clone(),
        }),
        Expr::Let { bindings, body } => lower_let(bindings, body, env, defining),
        Expr::If {
            condition,
            then,
            otherwise,
        } => Ok(Ir::If {
            condition: Box::new(lower(condition, env, defining)?),
            then: Box::new(lower(then, env, defining)?),
            otherwise: Box::new(lower(otherwise, env, defining)?),
        }),
        Expr::Lambda { params, body } => {
            let body = lower_with_params(params, body, env, defining)?;
            Ok(Ir::Lambda {
                params: params.clone(),
                body: Box::new(body),
            })
        }
        Expr::Predicate { params, body } => {
            let body = lower_with_params(params, body, env, defining)?;
            Ok(Ir::Predicate {
                params: params.clone(),
                body: Box::new(body),
            })
        }
        Expr::Object { properties } => {
            let properties = properties
                .iter()
                .map(|p| {
                    Ok(IrProperty {
                        key: p.key.clone(),
                        value: lower(&p.value, env, defining)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Ir::Object { properties })
        }
    }
}

fn lower_literal(value: LiteralValue) -> Ir {
    match value {
        LiteralValue::Bool(value) => Ir::BoolLiteral { value },
        LiteralValue::Number(value) => {
            if value.fract() == 0.0 && value.is_finite() {
                Ir::IntLiteral {
                    value: value as i64,
                }
            } else {
                Ir::FloatLiteral { value }
            }
        }
    }
}

fn lower_binary(
    op: &str,
    left: &Expr,
    right: &Expr,
    env: &TypeEnv,
    defining: &DefiningSet,
) -> Result<Ir> {
    let name = binary_fn_name(op).ok_or_else(|| Error::UnknownBinaryOperator(op.to_string()))?;
    let left = lower(left, env, defining)?;
    let right = lower(right, env, defining)?;
    let left_type = left.infer_type();
    let right_type = right.infer_type();
    let result_type = types::binary_result(name, &left_type, &right_type);
    Ok(Ir::Call {
        name: name.to_string(),
        args: vec![left, right],
        arg_types: vec![left_type, right_type],
        result_type,
    })
}

fn lower_unary(op: &str, operand: &Expr, env: &TypeEnv, defining: &DefiningSet) -> Result<Ir> {
    let name = unary_fn_name(op).ok_or_else(|| Error::UnknownUnaryOperator(op.to_string()))?;
    let operand = lower(operand, env, defining)?;
    let operand_type = operand.infer_type();
    let result_type = types::unary_result(name, &operand_type);
    Ok(Ir::Call {
        name: name.to_string(),
        args: vec![operand],
        arg_types: vec![operand_type],
        result_type,
    })
}

/// Canonical function name for a binary operator token.
pub fn binary_fn_name(op: &str) -> Option<&'static str> {
    Some(match op {
        "+" => "add",
        "-" => "sub",
        "*" => "mul",
        "/" => "div",
        "%" => "mod",
        "^" => "pow",
        "<" => "lt",
        ">" => "gt",
        "<=" => "lte",
        ">=" => "gte",
        "==" => "eq",
        "!=" => "neq",
        "&&" => "and",
        "||" => "or",
        _ => return None,
    })
}

/// Canonical function name for a unary operator token.
pub fn unary_fn_name(op: &str) -> Option<&'static str> {
    Some(match op {
        "-" => "neg",
        "+" => "pos",
        "!" => "not",
        _ => return None,
    })
}

fn today() -> Ir {
    Ir::Call {
        name: "today".into(),
        args: vec![],
        arg_types: vec![],
        result_type: Type::Date,
    }
}

fn now() -> Ir {
    Ir::Call {
        name: "now".into(),
        args: vec![],
        arg_types: vec![],
        result_type: Type::DateTime,
    }
}

fn one_day() -> Ir {
    Ir::DurationLiteral {
        value: "P1D".into(),
    }
}

/// Desugar a temporal keyword into a canonical call tree over the two
/// primitives `today()` and `now()`.
fn lower_temporal_keyword(keyword: &str) -> Result<Ir> {
    let boundary = |name: &str| Ir::Call {
        name: name.to_string(),
        args: vec![now()],
        arg_types: vec![Type::DateTime],
        result_type: Type::DateTime,
    };

    match keyword {
        "TODAY" => Ok(today()),
        "NOW" => Ok(now()),
        "TOMORROW" => Ok(Ir::Call {
            name: "add".into(),
            args: vec![today(), one_day()],
            arg_types: vec![Type::Date, Type::Duration],
            result_type: Type::Date,
        }),
        "YESTERDAY" => Ok(Ir::Call {
            name: "sub".into(),
            args: vec![today(), one_day()],
            arg_types: vec![Type::Date, Type::Duration],
            result_type: Type::Date,
        }),
        "SOD" => Ok(boundary("start_of_day")),
        "EOD" => Ok(boundary("end_of_day")),
        "SOW" => Ok(boundary("start_of_week")),
        "EOW" => Ok(boundary("end_of_week")),
        "SOM" => Ok(boundary("start_of_month")),
        "EOM" => Ok(boundary("end_of_month")),
        "SOQ" => Ok(boundary("start_of_quarter")),
        "EOQ" => Ok(boundary("end_of_quarter")),
        "SOY" => Ok(boundary("start_of_year")),
        "EOY" => Ok(boundary("end_of_year")),
        _ => Err(Error::UnknownTemporalKeyword(keyword.to_string())),
    }
}

/// Lower a function call.
///
/// If the callee name is bound in the environment to a function-typed
/// variable, emit `Apply` (dispatch through a value); otherwise a `Call`
/// resolved against the stdlib type tables.
fn lower_function_call(
    name: &str,
    args: &[Expr],
    env: &TypeEnv,
    defining: &DefiningSet,
) -> Result<Ir> {
    if defining.contains(name) {
        return Err(Error::RecursiveCall {
            name: name.to_string(),
        });
    }

    let args = args
        .iter()
        .map(|arg| lower(arg, env, defining))
        .collect::<Result<Vec<_>>>()?;
    let arg_types: Vec<Type> = args.iter().map(Ir::infer_type).collect();

    if let Some(var_type @ Type::Fn { .. }) = env.get(name) {
        return Ok(Ir::Apply {
            function: Box::new(Ir::Variable {
                name: name.to_string(),
                inferred_type: var_type.clone(),
            }),
            args,
            arg_types,
            result_type: Type::Any,
        });
    }

    let result_type = types::function_result(name, &arg_types);
    Ok(Ir::Call {
        name: name.to_string(),
        args,
        arg_types,
        result_type,
    })
}

/// Lower a `let`. Bindings are lowered left-to-right in an accumulating
/// child scope: each binding sees prior bindings of the same `let`, never
/// later ones. The body sees all of them.
fn lower_let(
    bindings: &[Binding],
    body: &Expr,
    env: &TypeEnv,
    defining: &DefiningSet,
) -> Result<Ir> {
    let mut scope = env.clone();
    let mut lowered = Vec::with_capacity(bindings.len());

    for binding in bindings {
        // Track lambda-like bindings in the defining set so that a call to
        // the binding's own name inside its body is caught as recursion.
        let lambda_like = matches!(
            binding.value,
            Expr::Lambda { .. } | Expr::Predicate { .. }
        );
        let value = if lambda_like {
            let mut inner = defining.clone();
            inner.insert(binding.name.clone());
            lower(&binding.value, &scope, &inner)?
        } else {
            lower(&binding.value, &scope, defining)?
        };
        scope.insert(binding.name.clone(), value.infer_type());
        lowered.push(IrBinding {
            name: binding.name.clone(),
            value,
        });
    }

    let body = lower(body, &scope, defining)?;
    Ok(Ir::Let {
        bindings: lowered,
        body: Box::new(body),
    })
}

/// Lower a lambda/predicate body with its parameters bound as `any` (the
/// source language has no parameter type annotations).
fn lower_with_params(
    params: &[String],
    body: &Expr,
    env: &TypeEnv,
    defining: &DefiningSet,
) -> Result<Ir> {
    let mut scope = env.clone();
    for param in params {
        scope.insert(param.clone(), Type::Any);
    }
    lower(body, &scope, defining)
}
