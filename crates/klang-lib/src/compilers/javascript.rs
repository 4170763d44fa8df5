//! JavaScript backend.
//!
//! Temporal values are dayjs objects (`dayjs(...)`, `dayjs.duration(...)`);
//! arithmetic renders as native operators only when both operand types are
//! statically numeric (or both `string` for `+`). Anything involving `any`
//! goes through the namespaced `runtime.*` helpers, which perform the
//! duration-aware dynamic dispatch at target runtime. Power is always
//! `Math.pow`, and equality between two temporal values coerces through
//! unary `+` because native `===` on objects is reference equality.

use std::sync::LazyLock;

use crate::ast::Expr;
use crate::ir::Ir;
use crate::stdlib::{self, EmitCtx, EmitRule, Side, StdLib};
use crate::transform::transform;
use crate::types::Type;
use crate::Result;

use super::quoted;

/// JavaScript compilation options. Reserved for future flags (a fixed-clock
/// temporal mode, for example); accepted by [`compile_to_javascript`] as a
/// placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsOptions {}

/// Compile an expression to a single JavaScript expression string.
pub fn compile_to_javascript(expr: &Expr, _options: &JsOptions) -> Result<String> {
    emit(&transform(expr)?)
}

fn op_token(name: &str) -> Option<&'static str> {
    Some(match name {
        "add" => "+",
        "sub" => "-",
        "mul" => "*",
        "div" => "/",
        "mod" => "%",
        "lt" => "<",
        "gt" => ">",
        "lte" => "<=",
        "gte" => ">=",
        "eq" => "===",
        "neq" => "!==",
        "and" => "&&",
        "or" => "||",
        _ => return None,
    })
}

fn precedence(op: &str) -> u8 {
    match op {
        "||" => 0,
        "&&" => 1,
        "===" | "!==" => 2,
        "<" | ">" | "<=" | ">=" => 3,
        "+" | "-" => 4,
        "*" | "/" | "%" => 5,
        _ => 0,
    }
}

/// Whether this node renders as a native JavaScript binary operator.
/// Arithmetic is native only for statically numeric operands (string
/// concatenation included for `+`); everything else routes through
/// `runtime.*` helpers or method calls and never needs operator parens.
fn renders_as_operator(ir: &Ir) -> bool {
    let Ir::Call {
        name, arg_types, ..
    } = ir
    else {
        return false;
    };
    if arg_types.len() != 2 || op_token(name).is_none() {
        return false;
    }
    match name.as_str() {
        "add" => {
            (arg_types[0].is_numeric() && arg_types[1].is_numeric())
                || (arg_types[0] == Type::String && arg_types[1] == Type::String)
        }
        "sub" | "mul" | "div" | "mod" => arg_types[0].is_numeric() && arg_types[1].is_numeric(),
        _ => true,
    }
}

fn needs_parens(child: &Ir, parent_op: &str, side: Side) -> bool {
    if !renders_as_operator(child) {
        return false;
    }
    let Ir::Call { name, .. } = child else {
        return false;
    };
    let Some(child_op) = op_token(name) else {
        return false;
    };
    let parent = precedence(parent_op);
    let child = precedence(child_op);
    child < parent || (child == parent && side == Side::Right && matches!(parent_op, "-" | "/"))
}

/// `receiver.method(arg)`, receiver parenthesized when it would otherwise
/// bind as a binary operator.
fn dayjs_method(method: &'static str, swapped: bool) -> EmitRule {
    Box::new(move |args, ctx| {
        let (receiver, arg) = if swapped {
            (&args[1], &args[0])
        } else {
            (&args[0], &args[1])
        };
        let rendered = ctx.emit(receiver)?;
        let rendered = if renders_as_operator(receiver) {
            format!("({rendered})")
        } else {
            rendered
        };
        Ok(format!("{}.{}({})", rendered, method, ctx.emit(arg)?))
    })
}

/// Duration scaled by a number: millisecond arithmetic inside a duration
/// constructor.
fn scale_duration(op: &'static str, duration_first: bool) -> EmitRule {
    Box::new(move |args, ctx| {
        let (duration, number) = if duration_first {
            (&args[0], &args[1])
        } else {
            (&args[1], &args[0])
        };
        let scale = ctx.emit_with_parens(number, op, Side::Right)?;
        Ok(format!(
            "dayjs.duration({}.asMilliseconds() {} {})",
            ctx.emit(duration)?,
            op,
            scale
        ))
    })
}

static JS_LIB: LazyLock<StdLib> = LazyLock::new(build_lib);

fn build_lib() -> StdLib {
    let mut lib = StdLib::new();

    lib.register("today", &[], stdlib::nullary("dayjs().startOf('day')"));
    lib.register("now", &[], stdlib::nullary("dayjs()"));

    for (name, unit) in [
        ("start_of_day", "day"),
        ("end_of_day", "day"),
        ("start_of_week", "isoWeek"),
        ("end_of_week", "isoWeek"),
        ("start_of_month", "month"),
        ("end_of_month", "month"),
        ("start_of_quarter", "quarter"),
        ("end_of_quarter", "quarter"),
        ("start_of_year", "year"),
        ("end_of_year", "year"),
    ] {
        let method = if name.starts_with("start") {
            "startOf"
        } else {
            "endOf"
        };
        lib.register(
            name,
            &[Type::DateTime],
            Box::new(move |args, ctx| {
                Ok(format!("{}.{}('{}')", ctx.emit(&args[0])?, method, unit))
            }),
        );
    }

    // Numeric arithmetic: native operators only for concrete numeric pairs.
    let numeric = [Type::Int, Type::Float];
    for left in &numeric {
        for right in &numeric {
            let pair = [left.clone(), right.clone()];
            lib.register("add", &pair, stdlib::binary_op("+"));
            lib.register("sub", &pair, stdlib::binary_op("-"));
            lib.register("mul", &pair, stdlib::binary_op("*"));
            lib.register("div", &pair, stdlib::binary_op("/"));
            lib.register("mod", &pair, stdlib::binary_op("%"));
        }
    }

    // Any-typed operands fall through to the runtime helpers, which resolve
    // number-vs-duration at target runtime.
    let numeric_and_any = [Type::Int, Type::Float, Type::Any];
    for left in &numeric_and_any {
        for right in &numeric_and_any {
            let pair = [left.clone(), right.clone()];
            lib.register("pow", &pair, stdlib::fn_call("Math.pow"));
            if *left != Type::Any && *right != Type::Any {
                continue;
            }
            lib.register("add", &pair, stdlib::fn_call("runtime.add"));
            lib.register("sub", &pair, stdlib::fn_call("runtime.sub"));
            lib.register("mul", &pair, stdlib::fn_call("runtime.mul"));
            lib.register("div", &pair, stdlib::fn_call("runtime.div"));
            lib.register("mod", &pair, stdlib::fn_call("runtime.mod"));
        }
    }

    lib.register(
        "add",
        &[Type::String, Type::String],
        stdlib::binary_op("+"),
    );
    lib.register(
        "add",
        &[Type::String, Type::Any],
        stdlib::fn_call("runtime.add"),
    );
    lib.register(
        "add",
        &[Type::Any, Type::String],
        stdlib::fn_call("runtime.add"),
    );

    // Temporal arithmetic as dayjs method calls.
    lib.register("add", &[Type::Date, Type::Duration], dayjs_method("add", false));
    lib.register(
        "add",
        &[Type::DateTime, Type::Duration],
        dayjs_method("add", false),
    );
    lib.register("add", &[Type::Duration, Type::Date], dayjs_method("add", true));
    lib.register(
        "add",
        &[Type::Duration, Type::DateTime],
        dayjs_method("add", true),
    );
    lib.register(
        "add",
        &[Type::Duration, Type::Duration],
        dayjs_method("add", false),
    );
    lib.register(
        "sub",
        &[Type::Date, Type::Duration],
        dayjs_method("subtract", false),
    );
    lib.register(
        "sub",
        &[Type::DateTime, Type::Duration],
        dayjs_method("subtract", false),
    );
    lib.register(
        "sub",
        &[Type::Date, Type::Date],
        Box::new(|args, ctx| {
            Ok(format!(
                "dayjs.duration({}.diff({}))",
                ctx.emit(&args[0])?,
                ctx.emit(&args[1])?
            ))
        }),
    );

    // Duration scaling.
    lib.register("mul", &[Type::Duration, Type::Int], scale_duration("*", true));
    lib.register(
        "mul",
        &[Type::Duration, Type::Float],
        scale_duration("*", true),
    );
    lib.register("mul", &[Type::Int, Type::Duration], scale_duration("*", false));
    lib.register(
        "mul",
        &[Type::Float, Type::Duration],
        scale_duration("*", false),
    );
    lib.register("div", &[Type::Duration, Type::Int], scale_duration("/", true));
    lib.register(
        "div",
        &[Type::Duration, Type::Float],
        scale_duration("/", true),
    );

    // Comparisons are native for every type pair...
    let all = [
        Type::Int,
        Type::Float,
        Type::String,
        Type::Bool,
        Type::Date,
        Type::DateTime,
        Type::Any,
    ];
    for left in &all {
        for right in &all {
            let pair = [left.clone(), right.clone()];
            lib.register("lt", &pair, stdlib::binary_op("<"));
            lib.register("gt", &pair, stdlib::binary_op(">"));
            lib.register("lte", &pair, stdlib::binary_op("<="));
            lib.register("gte", &pair, stdlib::binary_op(">="));
            lib.register("eq", &pair, stdlib::binary_op("==="));
            lib.register("neq", &pair, stdlib::binary_op("!=="));
        }
    }

    // ...except temporal equality, which coerces to epoch numbers because
    // `===` on two dayjs objects compares references. Overrides the generic
    // registration above (last registration wins).
    let temporal = [Type::Date, Type::DateTime];
    for left in &temporal {
        for right in &temporal {
            let pair = [left.clone(), right.clone()];
            lib.register(
                "eq",
                &pair,
                Box::new(|args, ctx| {
                    Ok(format!("+{} === +{}", ctx.emit(&args[0])?, ctx.emit(&args[1])?))
                }),
            );
            lib.register(
                "neq",
                &pair,
                Box::new(|args, ctx| {
                    Ok(format!("+{} !== +{}", ctx.emit(&args[0])?, ctx.emit(&args[1])?))
                }),
            );
        }
    }

    for left in [Type::Bool, Type::Any] {
        for right in [Type::Bool, Type::Any] {
            let pair = [left.clone(), right];
            lib.register("and", &pair, stdlib::binary_op("&&"));
            lib.register("or", &pair, stdlib::binary_op("||"));
        }
    }

    for operand in [Type::Int, Type::Float, Type::Any] {
        lib.register(
            "neg",
            &[operand.clone()],
            stdlib::prefix_op("-", renders_as_operator),
        );
        lib.register("pos", &[operand], stdlib::prefix_op("+", renders_as_operator));
    }
    for operand in [Type::Bool, Type::Any] {
        lib.register("not", &[operand], stdlib::prefix_op("!", renders_as_operator));
    }

    // assert renders as an IIFE so its failure halts evaluation mid-expression.
    for condition in [Type::Bool, Type::Any] {
        lib.register(
            "assert",
            &[condition.clone()],
            Box::new(|args, ctx| {
                Ok(format!(
                    "(() => {{ if (!({})) throw new Error(\"Assertion failed\"); return true; }})()",
                    ctx.emit(&args[0])?
                ))
            }),
        );
        lib.register(
            "assert",
            &[condition, Type::String],
            Box::new(|args, ctx| {
                Ok(format!(
                    "(() => {{ if (!({})) throw new Error({}); return true; }})()",
                    ctx.emit(&args[0])?,
                    ctx.emit(&args[1])?
                ))
            }),
        );
    }

    lib.register_fallback(Box::new(|name, args, _arg_types, ctx| {
        let rendered = args
            .iter()
            .map(|arg| ctx.emit(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{}({})", name, rendered.join(", ")))
    }));

    lib
}

struct JsEmitter;

impl EmitCtx for JsEmitter {
    fn emit(&self, ir: &Ir) -> Result<String> {
        emit(ir)
    }

    fn emit_with_parens(&self, ir: &Ir, parent_op: &str, side: Side) -> Result<String> {
        let rendered = emit(ir)?;
        if needs_parens(ir, parent_op, side) {
            Ok(format!("({rendered})"))
        } else {
            Ok(rendered)
        }
    }
}

fn emit(ir: &Ir) -> Result<String> {
    match ir {
        Ir::IntLiteral { value } => Ok(value.to_string()),
        Ir::FloatLiteral { value } => Ok(value.to_string()),
        Ir::BoolLiteral { value } => Ok(value.to_string()),
        Ir::StringLiteral { value } => Ok(quoted(value)),
        Ir::DateLiteral { value } | Ir::DateTimeLiteral { value } => {
            Ok(format!("dayjs({})", quoted(value)))
        }
        Ir::DurationLiteral { value } => Ok(format!("dayjs.duration({})", quoted(value))),
        Ir::Variable { name, .. } => Ok(name.clone()),
        Ir::MemberAccess { object, property } => {
            let rendered = emit(object)?;
            let rendered = if renders_as_operator(object) {
                format!("({rendered})")
            } else {
                rendered
            };
            Ok(format!("{rendered}.{property}"))
        }
        Ir::Call {
            name,
            args,
            arg_types,
            ..
        } => JS_LIB.emit(name, args, arg_types, &JsEmitter),
        Ir::Apply { function, args, .. } => {
            let callee = emit(function)?;
            let callee = if matches!(function.as_ref(), Ir::Variable { .. }) {
                callee
            } else {
                format!("({callee})")
            };
            let rendered = args.iter().map(emit).collect::<Result<Vec<_>>>()?;
            Ok(format!("{}({})", callee, rendered.join(", ")))
        }
        Ir::Let { bindings, body } => {
            let params = bindings
                .iter()
                .map(|b| b.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let args = bindings
                .iter()
                .map(|b| emit(&b.value))
                .collect::<Result<Vec<_>>>()?
                .join(", ");
            Ok(format!("(({params}) => {})({args})", emit(body)?))
        }
        Ir::If {
            condition,
            then,
            otherwise,
        } => Ok(format!(
            "({} ? {} : {})",
            emit(condition)?,
            emit(then)?,
            emit(otherwise)?
        )),
        Ir::Lambda { params, body } | Ir::Predicate { params, body } => {
            Ok(format!("({}) => {}", params.join(", "), emit(body)?))
        }
        Ir::Object { properties } => {
            if properties.is_empty() {
                return Ok("({})".to_string());
            }
            let fields = properties
                .iter()
                .map(|p| Ok(format!("{}: {}", p.key, emit(&p.value)?)))
                .collect::<Result<Vec<_>>>()?;
            // Parenthesized so the braces cannot be read as a block body
            // when the object is a lambda's expression body.
            Ok(format!("({{ {} }})", fields.join(", ")))
        }
    }
}
