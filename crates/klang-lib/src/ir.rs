//! Typed intermediate representation.
//!
//! Produced by lowering the AST (`transform`); consumed by the backend
//! emitters. Unlike the AST, every node carries enough information that its
//! type is derivable by the pure [`Ir::infer_type`] without re-traversing the
//! tree: literals know their kind, variables store their inferred type, calls
//! store their resolved result type.
//!
//! Operators no longer exist at this level — lowering rewrites every binary
//! and unary operator into a named `Call`, and the choice of target syntax
//! (native operator, function call, method call) is deferred entirely to the
//! backends.

use serde::Serialize;

use crate::types::Type;

/// One `name = value` pair in a lowered `let`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrBinding {
    pub name: String,
    pub value: Ir,
}

/// One `key: value` pair in a lowered object literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrProperty {
    pub key: String,
    pub value: Ir,
}

/// A typed Klang IR node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ir {
    IntLiteral { value: i64 },
    FloatLiteral { value: f64 },
    BoolLiteral { value: bool },
    StringLiteral { value: String },
    DateLiteral { value: String },
    #[serde(rename = "datetime_literal")]
    DateTimeLiteral { value: String },
    DurationLiteral { value: String },
    Variable {
        name: String,
        inferred_type: Type,
    },
    /// Property read on a dynamically-shaped value. Statically `any`.
    MemberAccess {
        object: Box<Ir>,
        property: String,
    },
    /// Stdlib function call. Carries the resolved argument types (the
    /// dispatch key) and the inferred result type.
    Call {
        name: String,
        args: Vec<Ir>,
        arg_types: Vec<Type>,
        result_type: Type,
    },
    /// Call through a variable holding a function value (a `let`-bound
    /// lambda or predicate).
    Apply {
        function: Box<Ir>,
        args: Vec<Ir>,
        arg_types: Vec<Type>,
        result_type: Type,
    },
    Let {
        bindings: Vec<IrBinding>,
        body: Box<Ir>,
    },
    If {
        condition: Box<Ir>,
        then: Box<Ir>,
        otherwise: Box<Ir>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Ir>,
    },
    Predicate {
        params: Vec<String>,
        body: Box<Ir>,
    },
    Object { properties: Vec<IrProperty> },
}

impl Ir {
    /// The node's semantic type.
    ///
    /// Pure and local: examines only the node itself (plus, for `let`/`if`/
    /// `lambda`/`object`, the already-typed immediate child), never the
    /// subtree below it. Backends rely on this being cheap at emission time.
    pub fn infer_type(&self) -> Type {
        match self {
            Ir::IntLiteral { .. } => Type::Int,
            Ir::FloatLiteral { .. } => Type::Float,
            Ir::BoolLiteral { .. } => Type::Bool,
            Ir::StringLiteral { .. } => Type::String,
            Ir::DateLiteral { .. } => Type::Date,
            Ir::DateTimeLiteral { .. } => Type::DateTime,
            Ir::DurationLiteral { .. } => Type::Duration,
            Ir::Variable { inferred_type, .. } => inferred_type.clone(),
            Ir::MemberAccess { .. } => Type::Any,
            Ir::Call { result_type, .. } | Ir::Apply { result_type, .. } => result_type.clone(),
            Ir::Let { body, .. } => body.infer_type(),
            Ir::If { then, otherwise, .. } => {
                let then_type = then.infer_type();
                if then_type == otherwise.infer_type() {
                    then_type
                } else {
                    Type::Any
                }
            }
            Ir::Lambda { params, body } => Type::Fn {
                params: vec![Type::Any; params.len()],
                ret: Box::new(body.infer_type()),
            },
            Ir::Predicate { params, .. } => Type::Fn {
                params: vec![Type::Any; params.len()],
                ret: Box::new(Type::Bool),
            },
            Ir::Object { properties } => Type::Object {
                fields: properties
                    .iter()
                    .map(|p| (p.key.clone(), p.value.infer_type()))
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_types() {
        assert_eq!(Ir::IntLiteral { value: 42 }.infer_type(), Type::Int);
        assert_eq!(Ir::FloatLiteral { value: 3.5 }.infer_type(), Type::Float);
        assert_eq!(Ir::BoolLiteral { value: true }.infer_type(), Type::Bool);
        assert_eq!(
            Ir::DurationLiteral {
                value: "P1D".into()
            }
            .infer_type(),
            Type::Duration
        );
    }

    #[test]
    fn variable_reports_stored_type() {
        let var = Ir::Variable {
            name: "age".into(),
            inferred_type: Type::Int,
        };
        assert_eq!(var.infer_type(), Type::Int);
    }

    #[test]
    fn member_access_is_any() {
        let node = Ir::MemberAccess {
            object: Box::new(Ir::Variable {
                name: "t".into(),
                inferred_type: Type::Any,
            }),
            property: "age".into(),
        };
        assert_eq!(node.infer_type(), Type::Any);
    }

    #[test]
    fn call_reports_stored_result_type() {
        let call = Ir::Call {
            name: "today".into(),
            args: vec![],
            arg_types: vec![],
            result_type: Type::Date,
        };
        assert_eq!(call.infer_type(), Type::Date);
    }

    #[test]
    fn let_reports_body_type() {
        let node = Ir::Let {
            bindings: vec![IrBinding {
                name: "x".into(),
                value: Ir::IntLiteral { value: 1 },
            }],
            body: Box::new(Ir::BoolLiteral { value: true }),
        };
        assert_eq!(node.infer_type(), Type::Bool);
    }

    #[test]
    fn if_with_mismatched_branches_is_any() {
        let node = Ir::If {
            condition: Box::new(Ir::BoolLiteral { value: true }),
            then: Box::new(Ir::IntLiteral { value: 1 }),
            otherwise: Box::new(Ir::StringLiteral { value: "x".into() }),
        };
        assert_eq!(node.infer_type(), Type::Any);
    }

    #[test]
    fn lambda_is_function_typed() {
        let node = Ir::Lambda {
            params: vec!["x".into(), "y".into()],
            body: Box::new(Ir::IntLiteral { value: 1 }),
        };
        assert_eq!(
            node.infer_type(),
            Type::Fn {
                params: vec![Type::Any, Type::Any],
                ret: Box::new(Type::Int),
            }
        );
    }

    #[test]
    fn object_collects_field_types() {
        let node = Ir::Object {
            properties: vec![
                IrProperty {
                    key: "a".into(),
                    value: Ir::IntLiteral { value: 1 },
                },
                IrProperty {
                    key: "b".into(),
                    value: Ir::StringLiteral { value: "s".into() },
                },
            ],
        };
        match node.infer_type() {
            Type::Object { fields } => {
                assert_eq!(fields["a"], Type::Int);
                assert_eq!(fields["b"], Type::String);
            }
            other => panic!("expected object type, got {other:?}"),
        }
    }
}
