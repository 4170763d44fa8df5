//! Semantic types for Klang expressions.
//!
//! The type set is closed: primitives, `duration`, structural `object` and
//! `fn` types, and `any` for values whose shape is not statically known
//! (unbound variables, member-access results). `any` participates in every
//! dispatch table as a first-class type; it is bidirectionally compatible
//! with everything for dispatch but never narrows a known type.
//!
//! This module also owns the result-type rules used during lowering. No rule
//! ever fails — combinations with no specific rule degrade to `any`, which is
//! the designed escape hatch for dynamically-shaped values.

use indexmap::IndexMap;
use serde::Serialize;

/// A Klang semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Duration,
    /// Ordered field-name → type mapping.
    Object { fields: IndexMap<String, Type> },
    /// Ordered parameter types plus return type.
    Fn { params: Vec<Type>, ret: Box<Type> },
    /// Statically unknown. Compatible with every type for dispatch.
    Any,
}

impl Type {
    /// Canonical type name, used to build signature keys.
    pub fn name(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Bool => "bool",
            Type::String => "string",
            Type::Date => "date",
            Type::DateTime => "datetime",
            Type::Duration => "duration",
            Type::Object { .. } => "object",
            Type::Fn { .. } => "fn",
            Type::Any => "any",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Type::Date | Type::DateTime)
    }
}

/// The ten period-boundary functions, paired with their truncation unit.
/// Temporal keywords (`SOD`, `EOW`, ...) desugar to calls to these.
pub const PERIOD_BOUNDARIES: [(&str, &str); 10] = [
    ("start_of_day", "day"),
    ("end_of_day", "day"),
    ("start_of_week", "week"),
    ("end_of_week", "week"),
    ("start_of_month", "month"),
    ("end_of_month", "month"),
    ("start_of_quarter", "quarter"),
    ("end_of_quarter", "quarter"),
    ("start_of_year", "year"),
    ("end_of_year", "year"),
];

fn is_period_boundary(name: &str) -> bool {
    PERIOD_BOUNDARIES.iter().any(|(fn_name, _)| *fn_name == name)
}

/// Result type of a binary operation, given the canonical function name
/// (`add`, `lt`, ...) and the resolved operand types.
///
/// Rule ordering matters and is fixed here: comparisons/logical first, then
/// the `any` escape, then duration arithmetic *before* float promotion (so
/// `2.5 * P1D` is a duration, not a float), then strings, then numerics.
pub fn binary_result(op: &str, left: &Type, right: &Type) -> Type {
    use Type::*;

    if matches!(op, "lt" | "gt" | "lte" | "gte" | "eq" | "neq" | "and" | "or") {
        return Bool;
    }
    if matches!(left, Any) || matches!(right, Any) {
        return Any;
    }

    match (op, left, right) {
        ("mul", Duration, Int | Float) | ("mul", Int | Float, Duration) => Duration,
        ("div", Duration, Int | Float) => Duration,

        ("add", Date, Duration) | ("add", Duration, Date) | ("sub", Date, Duration) => Date,
        ("add", DateTime, Duration) | ("add", Duration, DateTime) => DateTime,
        ("sub", DateTime, Duration) => DateTime,
        ("add", Duration, Duration) => Duration,
        ("sub", Date, Date) => Duration,

        ("add", String, String) => String,

        ("add" | "sub" | "mul" | "mod" | "pow", Int, Int) => Int,
        ("div", Int, Int) => Float,
        ("add" | "sub" | "mul" | "div" | "mod" | "pow", Int | Float, Int | Float) => Float,

        _ => Any,
    }
}

/// Result type of a unary operation (`neg`, `pos`, `not`).
pub fn unary_result(op: &str, operand: &Type) -> Type {
    match (op, operand) {
        ("not", _) => Type::Bool,
        ("neg" | "pos", Type::Int) => Type::Int,
        ("neg" | "pos", Type::Float) => Type::Float,
        _ => Type::Any,
    }
}

/// Result type of a named stdlib function call.
///
/// Covers the temporal primitives and `assert`; operator names route through
/// the binary/unary rules so programmatically-built `add(...)` calls type the
/// same as `+`. Unknown names degrade to `any`.
pub fn function_result(name: &str, arg_types: &[Type]) -> Type {
    match name {
        "today" => Type::Date,
        "now" => Type::DateTime,
        "assert" => Type::Bool,
        _ if is_period_boundary(name) => Type::DateTime,
        "neg" | "pos" | "not" if arg_types.len() == 1 => unary_result(name, &arg_types[0]),
        _ if arg_types.len() == 2 => {
            let result = binary_result(name, &arg_types[0], &arg_types[1]);
            match name {
                "add" | "sub" | "mul" | "div" | "mod" | "pow" | "lt" | "gt" | "lte" | "gte"
                | "eq" | "neq" | "and" | "or" => result,
                _ => Type::Any,
            }
        }
        _ => Type::Any,
    }
}
