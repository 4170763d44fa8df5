//! PostgreSQL backend.
//!
//! Emits a single `SELECT`-compatible scalar expression. The engine types
//! values at the column level, not here, so operators are registered with
//! `any` wildcards and render natively across the board. Temporal literals
//! render as `DATE '…'` / `TIMESTAMP '…'` / `INTERVAL '…'`; period
//! boundaries as `date_trunc` plus interval offsets.
//!
//! Lambdas, predicates, function application and object literals have no
//! scalar SQL rendering and fail with an unsupported-construct error; this
//! backend's surface is deliberately narrower than the scripting targets.

use std::sync::LazyLock;

use crate::ast::Expr;
use crate::ir::Ir;
use crate::stdlib::{self, EmitCtx, EmitRule, Side, StdLib};
use crate::transform::transform;
use crate::types::Type;
use crate::{Error, Result};

use super::sql_quoted;

/// SQL compilation options. Reserved placeholder, accepted by
/// [`compile_to_sql`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlOptions {}

/// Compile an expression to a single SQL scalar expression string.
pub fn compile_to_sql(expr: &Expr, _options: &SqlOptions) -> Result<String> {
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
        "eq" => "=",
        "neq" => "<>",
        "and" => "AND",
        "or" => "OR",
        _ => return None,
    })
}

fn precedence(op: &str) -> u8 {
    match op {
        "OR" => 0,
        "AND" => 1,
        "=" | "<>" => 2,
        "<" | ">" | "<=" | ">=" => 3,
        "+" | "-" => 4,
        "*" | "/" | "%" => 5,
        _ => 0,
    }
}

/// Whether this node renders as a native SQL binary operator (`pow` does
/// not; it renders as `POWER(...)`).
fn renders_as_operator(ir: &Ir) -> bool {
    let Ir::Call {
        name, arg_types, ..
    } = ir
    else {
        return false;
    };
    arg_types.len() == 2 && op_token(name).is_some()
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

/// `today() ± P1D` renders as `CURRENT_DATE ± INTERVAL '1 day'`; other
/// date ± duration shapes use the native operator.
fn date_duration_op(op: &'static str) -> EmitRule {
    Box::new(move |args, ctx| {
        let today_call = matches!(&args[0], Ir::Call { name, .. } if name == "today");
        let one_day = matches!(&args[1], Ir::DurationLiteral { value } if value == "P1D");
        if today_call && one_day {
            return Ok(format!("CURRENT_DATE {op} INTERVAL '1 day'"));
        }
        let left = ctx.emit_with_parens(&args[0], op, Side::Left)?;
        let right = ctx.emit_with_parens(&args[1], op, Side::Right)?;
        Ok(format!("{left} {op} {right}"))
    })
}

static SQL_LIB: LazyLock<StdLib> = LazyLock::new(build_lib);

fn build_lib() -> StdLib {
    let mut lib = StdLib::new();

    lib.register("today", &[], stdlib::nullary("CURRENT_DATE"));
    lib.register("now", &[], stdlib::nullary("CURRENT_TIMESTAMP"));

    // Period boundaries: truncate, then offset forward for period ends.
    let boundaries: [(&str, &str, Option<&str>); 10] = [
        ("start_of_day", "day", None),
        (
            "end_of_day",
            "day",
            Some("+ INTERVAL '1 day' - INTERVAL '1 second'"),
        ),
        ("start_of_week", "week", None),
        ("end_of_week", "week", Some("+ INTERVAL '6 days'")),
        ("start_of_month", "month", None),
        (
            "end_of_month",
            "month",
            Some("+ INTERVAL '1 month' - INTERVAL '1 day'"),
        ),
        ("start_of_quarter", "quarter", None),
        (
            "end_of_quarter",
            "quarter",
            Some("+ INTERVAL '3 months' - INTERVAL '1 day'"),
        ),
        ("start_of_year", "year", None),
        (
            "end_of_year",
            "year",
            Some("+ INTERVAL '1 year' - INTERVAL '1 day'"),
        ),
    ];
    for (name, unit, offset) in boundaries {
        lib.register(
            name,
            &[Type::DateTime],
            Box::new(move |args, ctx| {
                // Desugared keywords pass now(); day boundaries keep full
                // timestamp resolution, coarser ones anchor on the date.
                let base = if matches!(&args[0], Ir::Call { name, .. } if name == "now") {
                    if name.ends_with("_day") {
                        "CURRENT_TIMESTAMP".to_string()
                    } else {
                        "CURRENT_DATE".to_string()
                    }
                } else {
                    ctx.emit(&args[0])?
                };
                let truncated = format!("date_trunc('{unit}', {base})");
                Ok(match offset {
                    Some(offset) => format!("{truncated} {offset}"),
                    None => truncated,
                })
            }),
        );
    }

    // Arithmetic: native for numeric and any operands; pow is POWER().
    let numeric_and_any = [Type::Int, Type::Float, Type::Any];
    for left in &numeric_and_any {
        for right in &numeric_and_any {
            let pair = [left.clone(), right.clone()];
            lib.register("add", &pair, stdlib::binary_op("+"));
            lib.register("sub", &pair, stdlib::binary_op("-"));
            lib.register("mul", &pair, stdlib::binary_op("*"));
            lib.register("div", &pair, stdlib::binary_op("/"));
            lib.register("mod", &pair, stdlib::binary_op("%"));
            lib.register("pow", &pair, stdlib::fn_call("POWER"));
        }
    }

    lib.register(
        "add",
        &[Type::String, Type::String],
        stdlib::binary_op("+"),
    );
    lib.register("add", &[Type::String, Type::Any], stdlib::binary_op("+"));
    lib.register("add", &[Type::Any, Type::String], stdlib::binary_op("+"));

    // Temporal arithmetic, with the today() ± P1D interval rewrites.
    lib.register("add", &[Type::Date, Type::Duration], date_duration_op("+"));
    lib.register("sub", &[Type::Date, Type::Duration], date_duration_op("-"));
    lib.register(
        "add",
        &[Type::DateTime, Type::Duration],
        stdlib::binary_op("+"),
    );
    lib.register(
        "sub",
        &[Type::DateTime, Type::Duration],
        stdlib::binary_op("-"),
    );
    lib.register("add", &[Type::Duration, Type::Date], stdlib::binary_op("+"));
    lib.register(
        "add",
        &[Type::Duration, Type::DateTime],
        stdlib::binary_op("+"),
    );
    lib.register(
        "add",
        &[Type::Duration, Type::Duration],
        stdlib::binary_op("+"),
    );
    lib.register("sub", &[Type::Date, Type::Date], stdlib::binary_op("-"));

    lib.register("mul", &[Type::Int, Type::Duration], stdlib::binary_op("*"));
    lib.register("mul", &[Type::Float, Type::Duration], stdlib::binary_op("*"));
    lib.register("mul", &[Type::Duration, Type::Int], stdlib::binary_op("*"));
    lib.register("mul", &[Type::Duration, Type::Float], stdlib::binary_op("*"));
    lib.register("div", &[Type::Duration, Type::Int], stdlib::binary_op("/"));
    lib.register("div", &[Type::Duration, Type::Float], stdlib::binary_op("/"));

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
            lib.register("eq", &pair, stdlib::binary_op("="));
            lib.register("neq", &pair, stdlib::binary_op("<>"));
        }
    }

    for left in [Type::Bool, Type::Any] {
        for right in [Type::Bool, Type::Any] {
            let pair = [left.clone(), right];
            lib.register("and", &pair, stdlib::binary_op("AND"));
            lib.register("or", &pair, stdlib::binary_op("OR"));
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
        lib.register(
            "not",
            &[operand],
            Box::new(|args, ctx| {
                let operand = ctx.emit(&args[0])?;
                Ok(if renders_as_operator(&args[0]) {
                    format!("NOT ({operand})")
                } else {
                    format!("NOT {operand}")
                })
            }),
        );
    }

    // The false arm is a cast that cannot succeed, so a failed assertion
    // aborts the query with an error instead of returning a value.
    for condition in [Type::Bool, Type::Any] {
        let rule = || -> EmitRule {
            Box::new(|args, ctx| {
                Ok(format!(
                    "CASE WHEN {} THEN TRUE ELSE CAST('assertion failed' AS BOOLEAN) END",
                    ctx.emit(&args[0])?
                ))
            })
        };
        lib.register("assert", &[condition.clone()], rule());
        lib.register("assert", &[condition, Type::String], rule());
    }

    // SQL function names are conventionally uppercase.
    lib.register_fallback(Box::new(|name, args, _arg_types, ctx| {
        let rendered = args
            .iter()
            .map(|arg| ctx.emit(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{}({})", name.to_uppercase(), rendered.join(", ")))
    }));

    lib
}

/// ISO-8601 datetime payload to `TIMESTAMP` literal content: `T` separator
/// becomes a space, fractional seconds and a trailing `Z` are dropped.
fn timestamp_payload(value: &str) -> String {
    let spaced = value.replace('T', " ");
    let trimmed = spaced.trim_end_matches('Z');
    match trimmed.split_once('.') {
        Some((head, _)) => head.to_string(),
        None => trimmed.to_string(),
    }
}

struct SqlEmitter;

impl EmitCtx for SqlEmitter {
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

fn unsupported(construct: &'static str) -> Error {
    Error::UnsupportedConstruct {
        construct,
        target: "SQL",
    }
}

fn emit(ir: &Ir) -> Result<String> {
    match ir {
        Ir::IntLiteral { value } => Ok(value.to_string()),
        Ir::FloatLiteral { value } => Ok(value.to_string()),
        Ir::BoolLiteral { value } => Ok(if *value { "TRUE" } else { "FALSE" }.to_string()),
        Ir::StringLiteral { value } => Ok(sql_quoted(value)),
        Ir::DateLiteral { value } => Ok(format!("DATE {}", sql_quoted(value))),
        Ir::DateTimeLiteral { value } => {
            Ok(format!("TIMESTAMP {}", sql_quoted(&timestamp_payload(value))))
        }
        Ir::DurationLiteral { value } => Ok(format!("INTERVAL {}", sql_quoted(value))),
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
        } => SQL_LIB.emit(name, args, arg_types, &SqlEmitter),
        Ir::Apply { .. } => Err(unsupported("function application")),
        Ir::Let { bindings, body } => {
            let columns = bindings
                .iter()
                .map(|b| Ok(format!("{} AS {}", emit(&b.value)?, b.name)))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!(
                "(SELECT {} FROM (SELECT {}) AS _let)",
                emit(body)?,
                columns.join(", ")
            ))
        }
        Ir::If {
            condition,
            then,
            otherwise,
        } => Ok(format!(
            "CASE WHEN {} THEN {} ELSE {} END",
            emit(condition)?,
            emit(then)?,
            emit(otherwise)?
        )),
        Ir::Lambda { .. } => Err(unsupported("lambdas")),
        Ir::Predicate { .. } => Err(unsupported("predicates")),
        Ir::Object { .. } => Err(unsupported("object literals")),
    }
}
