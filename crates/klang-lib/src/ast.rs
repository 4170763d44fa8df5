//! Untyped AST for Klang expressions.
//!
//! Produced by the parser, or built programmatically through the constructor
//! functions at the bottom of this module. The tree is structurally valid by
//! construction but carries no types — typing happens during lowering
//! (`transform`).
//!
//! The node set is closed; every consumer matches exhaustively so that adding
//! a node kind is a compile-time-visible obligation.

use serde::Serialize;

/// A literal value carried by a `literal` node: number or boolean.
///
/// Numbers are kept as `f64` at this stage; the int/float split happens by
/// integrality check during lowering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Number(f64),
    Bool(bool),
}

/// One `name = value` pair in a `let` expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub name: String,
    pub value: Expr,
}

/// One `key: value` pair in an object literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub key: String,
    pub value: Expr,
}

/// An untyped Klang expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    Literal { value: LiteralValue },
    #[serde(rename = "string")]
    Str { value: String },
    Date { value: String },
    #[serde(rename = "datetime")]
    DateTime { value: String },
    Duration { value: String },
    Variable { name: String },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: String, operand: Box<Expr> },
    TemporalKeyword { keyword: String },
    FunctionCall { name: String, args: Vec<Expr> },
    MemberAccess {
        object: Box<Expr>,
        property: String,
    },
    Let {
        bindings: Vec<Binding>,
        body: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Predicate {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Object { properties: Vec<Property> },
}

// Constructor functions for building ASTs without going through the parser.
// Literal payloads built this way are untrusted, same as parsed text; the
// backends escape them on emission.

pub fn number(value: f64) -> Expr {
    Expr::Literal {
        value: LiteralValue::Number(value),
    }
}

pub fn boolean(value: bool) -> Expr {
    Expr::Literal {
        value: LiteralValue::Bool(value),
    }
}

pub fn string_literal(value: impl Into<String>) -> Expr {
    Expr::Str {
        value: value.into(),
    }
}

pub fn date_literal(value: impl Into<String>) -> Expr {
    Expr::Date {
        value: value.into(),
    }
}

pub fn datetime_literal(value: impl Into<String>) -> Expr {
    Expr::DateTime {
        value: value.into(),
    }
}

pub fn duration_literal(value: impl Into<String>) -> Expr {
    Expr::Duration {
        value: value.into(),
    }
}

pub fn variable(name: impl Into<String>) -> Expr {
    Expr::Variable { name: name.into() }
}

pub fn binary(op: impl Into<String>, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op: op.into(),
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn unary(op: impl Into<String>, operand: Expr) -> Expr {
    Expr::Unary {
        op: op.into(),
        operand: Box::new(operand),
    }
}

pub fn temporal_keyword(keyword: impl Into<String>) -> Expr {
    Expr::TemporalKeyword {
        keyword: keyword.into(),
    }
}

pub fn function_call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::FunctionCall {
        name: name.into(),
        args,
    }
}

pub fn member_access(object: Expr, property: impl Into<String>) -> Expr {
    Expr::MemberAccess {
        object: Box::new(object),
        property: property.into(),
    }
}
