//! Ruby backend.
//!
//! Ruby's operator overloading does the heavy lifting: nearly every binary
//! operation renders as the native operator, for `any`-typed operands too,
//! and the runtime dispatches on the actual values. Temporal values are
//! `Date`/`DateTime` plus `ActiveSupport::Duration`; member access is
//! symbol-keyed hash lookup. The compiled `TOMORROW`/`YESTERDAY` shape
//! (`today() ± P1D`) is special-cased to `Date.today ± 1` for idiomatic
//! output.

use std::sync::LazyLock;

use crate::ast::Expr;
use crate::ir::Ir;
use crate::stdlib::{self, EmitCtx, EmitRule, Side, StdLib};
use crate::transform::transform;
use crate::types::Type;
use crate::Result;

use super::quoted;

/// Ruby compilation options. Reserved placeholder, accepted by
/// [`compile_to_ruby`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RubyOptions {}

/// Compile an expression to a single Ruby expression string.
pub fn compile_to_ruby(expr: &Expr, _options: &RubyOptions) -> Result<String> {
    emit(&transform(expr)?)
}

fn op_token(name: &str) -> Option<&'static str> {
    Some(match name {
        "add" => "+",
        "sub" => "-",
        "mul" => "*",
        "div" => "/",
        "mod" => "%",
        "pow" => "**",
        "lt" => "<",
        "gt" => ">",
        "lte" => "<=",
        "gte" => ">=",
        "eq" => "==",
        "neq" => "!=",
        "and" => "&&",
        "or" => "||",
        _ => return None,
    })
}

fn precedence(op: &str) -> u8 {
    match op {
        "||" => 0,
        "&&" => 1,
        "==" | "!=" => 2,
        "<" | ">" | "<=" | ">=" => 3,
        "+" | "-" => 4,
        "*" | "/" | "%" => 5,
        "**" => 6,
        _ => 0,
    }
}

/// Whether this node renders as a native Ruby binary operator. All two-arg
/// operator calls do, whatever their types — overloading handles the rest.
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
    if child < parent {
        return true;
    }
    if child > parent {
        return false;
    }
    // Equal precedence: `**` is right-associative, so a nested power on the
    // LEFT needs parens while the right operand keeps none; `-` and `/` are
    // left-associative and force them on the right.
    match parent_op {
        "**" => side == Side::Left,
        "-" | "/" => side == Side::Right,
        _ => false,
    }
}

/// `today() ± P1D` renders as `Date.today ± 1`; any other date ± duration
/// goes through the native operator.
fn date_duration_op(op: &'static str) -> EmitRule {
    Box::new(move |args, ctx| {
        let today_call = matches!(&args[0], Ir::Call { name, .. } if name == "today");
        let one_day = matches!(&args[1], Ir::DurationLiteral { value } if value == "P1D");
        if today_call && one_day {
            return Ok(format!("{} {} 1", ctx.emit(&args[0])?, op));
        }
        let left = ctx.emit_with_parens(&args[0], op, Side::Left)?;
        let right = ctx.emit_with_parens(&args[1], op, Side::Right)?;
        Ok(format!("{left} {op} {right}"))
    })
}

static RUBY_LIB: LazyLock<StdLib> = LazyLock::new(build_lib);

fn build_lib() -> StdLib {
    let mut lib = StdLib::new();

    lib.register("today", &[], stdlib::nullary("Date.today"));
    lib.register("now", &[], stdlib::nullary("DateTime.now"));

    for (name, method) in [
        ("start_of_day", "beginning_of_day"),
        ("end_of_day", "end_of_day"),
        ("start_of_week", "beginning_of_week"),
        ("end_of_week", "end_of_week"),
        ("start_of_month", "beginning_of_month"),
        ("end_of_month", "end_of_month"),
        ("start_of_quarter", "beginning_of_quarter"),
        ("end_of_quarter", "end_of_quarter"),
        ("start_of_year", "beginning_of_year"),
        ("end_of_year", "end_of_year"),
    ] {
        lib.register(
            name,
            &[Type::DateTime],
            Box::new(move |args, ctx| {
                // Desugared keywords pass now(); render those on Date.today
                // so the boundary value is date-anchored.
                if matches!(&args[0], Ir::Call { name, .. } if name == "now") {
                    return Ok(format!("Date.today.{method}"));
                }
                Ok(format!("{}.{}", ctx.emit(&args[0])?, method))
            }),
        );
    }

    // Arithmetic: native operators for numeric and any operands alike.
    let numeric_and_any = [Type::Int, Type::Float, Type::Any];
    for left in &numeric_and_any {
        for right in &numeric_and_any {
            let pair = [left.clone(), right.clone()];
            lib.register("add", &pair, stdlib::binary_op("+"));
            lib.register("sub", &pair, stdlib::binary_op("-"));
            lib.register("mul", &pair, stdlib::binary_op("*"));
            lib.register("div", &pair, stdlib::binary_op("/"));
            lib.register("mod", &pair, stdlib::binary_op("%"));
            lib.register("pow", &pair, stdlib::binary_op("**"));
        }
    }

    lib.register(
        "add",
        &[Type::String, Type::String],
        stdlib::binary_op("+"),
    );
    lib.register("add", &[Type::String, Type::Any], stdlib::binary_op("+"));
    lib.register("add", &[Type::Any, Type::String], stdlib::binary_op("+"));

    // Temporal arithmetic, with the today() ± P1D rewrites.
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

    // Duration scaling is native too.
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
            lib.register("eq", &pair, stdlib::binary_op("=="));
            lib.register("neq", &pair, stdlib::binary_op("!="));
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

    for condition in [Type::Bool, Type::Any] {
        lib.register(
            "assert",
            &[condition.clone()],
            Box::new(|args, ctx| {
                Ok(format!(
                    "(raise \"Assertion failed\" unless {}; true)",
                    ctx.emit(&args[0])?
                ))
            }),
        );
        lib.register(
            "assert",
            &[condition, Type::String],
            Box::new(|args, ctx| {
                Ok(format!(
                    "(raise {} unless {}; true)",
                    ctx.emit(&args[1])?,
                    ctx.emit(&args[0])?
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

struct RubyEmitter;

impl EmitCtx for RubyEmitter {
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
        Ir::DateLiteral { value } => Ok(format!("Date.parse({})", quoted(value))),
        Ir::DateTimeLiteral { value } => Ok(format!("DateTime.parse({})", quoted(value))),
        Ir::DurationLiteral { value } => {
            Ok(format!("ActiveSupport::Duration.parse({})", quoted(value)))
        }
        Ir::Variable { name, .. } => Ok(name.clone()),
        Ir::MemberAccess { object, property } => {
            let rendered = emit(object)?;
            let rendered = if renders_as_operator(object) {
                format!("({rendered})")
            } else {
                rendered
            };
            Ok(format!("{rendered}[:{property}]"))
        }
        Ir::Call {
            name,
            args,
            arg_types,
            ..
        } => RUBY_LIB.emit(name, args, arg_types, &RubyEmitter),
        Ir::Apply { function, args, .. } => {
            let callee = emit(function)?;
            let rendered = args.iter().map(emit).collect::<Result<Vec<_>>>()?;
            Ok(format!("{}.call({})", callee, rendered.join(", ")))
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
            Ok(format!("->({params}) {{ {} }}.call({args})", emit(body)?))
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
            Ok(format!("->({}) {{ {} }}", params.join(", "), emit(body)?))
        }
        Ir::Object { properties } => {
            if properties.is_empty() {
                return Ok("{}".to_string());
            }
            let fields = properties
                .iter()
                .map(|p| Ok(format!("{}: {}", p.key, emit(&p.value)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{{ {} }}", fields.join(", ")))
        }
    }
}
