use crate::ast;
use crate::ir::Ir;
use crate::parser::parse;
use crate::transform::{transform, transform_with_env, TypeEnv};
use crate::types::Type;
use crate::Error;

fn lower(source: &str) -> Ir {
    let expr = parse(source).unwrap();
    transform(&expr).unwrap()
}

fn lower_err(source: &str) -> Error {
    let expr = parse(source).unwrap();
    match transform(&expr) {
        Ok(ir) => panic!("expected transform error for {source:?}, got {ir:?}"),
        Err(err) => err,
    }
}

#[test]
fn integral_numbers_become_int_literals() {
    assert_eq!(lower("42"), Ir::IntLiteral { value: 42 });
    assert_eq!(lower("42.0"), Ir::IntLiteral { value: 42 });
    assert_eq!(lower("3.5"), Ir::FloatLiteral { value: 3.5 });
}

#[test]
fn binary_operator_becomes_typed_call() {
    let ir = lower("1 + 2");
    assert_eq!(
        ir,
        Ir::Call {
            name: "add".into(),
            args: vec![Ir::IntLiteral { value: 1 }, Ir::IntLiteral { value: 2 }],
            arg_types: vec![Type::Int, Type::Int],
            result_type: Type::Int,
        }
    );
}

#[test]
fn int_division_results_in_float() {
    match lower("10 / 4") {
        Ir::Call { name, result_type, .. } => {
            assert_eq!(name, "div");
            assert_eq!(result_type, Type::Float);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn comparison_results_in_bool() {
    match lower("1 < 2") {
        Ir::Call { name, result_type, .. } => {
            assert_eq!(name, "lt");
            assert_eq!(result_type, Type::Bool);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn string_concatenation_stays_string() {
    match lower(r#""a" + "b""#) {
        Ir::Call { name, result_type, .. } => {
            assert_eq!(name, "add");
            assert_eq!(result_type, Type::String);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn date_plus_duration_is_date() {
    match lower(r#"d"2024-01-15" + P1D"#) {
        Ir::Call {
            name,
            arg_types,
            result_type,
            ..
        } => {
            assert_eq!(name, "add");
            assert_eq!(arg_types, vec![Type::Date, Type::Duration]);
            assert_eq!(result_type, Type::Date);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn unary_operators_lower_to_calls() {
    match lower("-x") {
        Ir::Call { name, args, .. } => {
            assert_eq!(name, "neg");
            assert_eq!(args.len(), 1);
        }
        other => panic!("expected call, got {other:?}"),
    }
    match lower("!flag") {
        Ir::Call { name, result_type, .. } => {
            assert_eq!(name, "not");
            assert_eq!(result_type, Type::Bool);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn unknown_binary_operator_is_rejected() {
    let expr = ast::binary("**", ast::number(2.0), ast::number(3.0));
    assert_eq!(
        transform(&expr),
        Err(Error::UnknownBinaryOperator("**".into()))
    );
}

#[test]
fn today_keyword_desugars_to_call() {
    assert_eq!(
        lower("TODAY"),
        Ir::Call {
            name: "today".into(),
            args: vec![],
            arg_types: vec![],
            result_type: Type::Date,
        }
    );
}

#[test]
fn tomorrow_desugars_to_add_one_day() {
    match lower("TOMORROW") {
        Ir::Call {
            name,
            args,
            arg_types,
            result_type,
        } => {
            assert_eq!(name, "add");
            assert_eq!(arg_types, vec![Type::Date, Type::Duration]);
            assert_eq!(result_type, Type::Date);
            assert_eq!(args[1], Ir::DurationLiteral { value: "P1D".into() });
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn period_boundary_keywords_wrap_now() {
    match lower("EOM") {
        Ir::Call {
            name,
            args,
            result_type,
            ..
        } => {
            assert_eq!(name, "end_of_month");
            assert_eq!(result_type, Type::DateTime);
            assert!(matches!(&args[0], Ir::Call { name, .. } if name == "now"));
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn unknown_temporal_keyword_is_rejected() {
    let expr = ast::temporal_keyword("NEXT_WEEK");
    assert_eq!(
        transform(&expr),
        Err(Error::UnknownTemporalKeyword("NEXT_WEEK".into()))
    );
}

#[test]
fn unbound_variable_is_any() {
    assert_eq!(
        lower("price"),
        Ir::Variable {
            name: "price".into(),
            inferred_type: Type::Any,
        }
    );
}

#[test]
fn environment_types_flow_into_variables() {
    let mut env = TypeEnv::new();
    env.insert("price".into(), Type::Float);
    let expr = parse("price * 2").unwrap();
    match transform_with_env(&expr, &env).unwrap() {
        Ir::Call {
            arg_types,
            result_type,
            ..
        } => {
            assert_eq!(arg_types, vec![Type::Float, Type::Int]);
            assert_eq!(result_type, Type::Float);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn let_bindings_type_the_body() {
    match lower("let a = 1, b = a + 1 in a * b") {
        Ir::Let { bindings, body } => {
            assert_eq!(bindings.len(), 2);
            // `b`'s initializer saw `a: int`.
            assert_eq!(bindings[1].value.infer_type(), Type::Int);
            match *body {
                Ir::Call { arg_types, .. } => {
                    assert_eq!(arg_types, vec![Type::Int, Type::Int]);
                }
                other => panic!("expected call body, got {other:?}"),
            }
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn let_binding_does_not_see_later_bindings() {
    // `a`'s initializer refers to `b`, which is only bound afterwards, so
    // inside `a` it is a free variable of type any.
    match lower("let a = b, b = 1 in a") {
        Ir::Let { bindings, .. } => {
            assert_eq!(
                bindings[0].value,
                Ir::Variable {
                    name: "b".into(),
                    inferred_type: Type::Any,
                }
            );
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn lambda_parameters_are_any() {
    match lower("fn(x ~> x + 1)") {
        Ir::Lambda { params, body } => {
            assert_eq!(params, vec!["x".to_string()]);
            match *body {
                Ir::Call { arg_types, .. } => {
                    assert_eq!(arg_types, vec![Type::Any, Type::Int]);
                }
                other => panic!("expected call body, got {other:?}"),
            }
        }
        other => panic!("expected lambda, got {other:?}"),
    }
}

#[test]
fn predicate_is_bool_valued_function() {
    let ir = lower("fn(x | x > 10)");
    assert_eq!(
        ir.infer_type(),
        Type::Fn {
            params: vec![Type::Any],
            ret: Box::new(Type::Bool),
        }
    );
}

#[test]
fn calling_a_let_bound_lambda_is_an_apply() {
    match lower("let double = fn(x ~> x * 2) in double(21)") {
        Ir::Let { body, .. } => match *body {
            Ir::Apply { function, args, .. } => {
                assert!(matches!(&*function, Ir::Variable { name, .. } if name == "double"));
                assert_eq!(args, vec![Ir::IntLiteral { value: 21 }]);
            }
            other => panic!("expected apply, got {other:?}"),
        },
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn calling_an_unknown_name_is_a_call() {
    match lower("max(1, 2)") {
        Ir::Call { name, result_type, .. } => {
            assert_eq!(name, "max");
            assert_eq!(result_type, Type::Any);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn self_recursion_is_rejected() {
    assert_eq!(
        lower_err("let f = fn(x ~> f(x - 1)) in f(10)"),
        Error::RecursiveCall { name: "f".into() }
    );
}

#[test]
fn recursion_error_names_the_binding() {
    let err = lower_err("let fact = fn(n ~> n * fact(n - 1)) in fact(5)");
    assert_eq!(
        err.to_string(),
        "recursive function calls are not allowed: 'fact' cannot call itself"
    );
}

#[test]
fn shadowing_a_lambda_name_in_a_nested_let_is_allowed() {
    // The inner `f` is an int binding, so `f` is no longer being defined
    // when the body references it.
    let ir = lower("let f = fn(x ~> let f = 1 in x + f) in f(2)");
    assert!(matches!(ir, Ir::Let { .. }));
}

#[test]
fn member_access_lowers_to_any() {
    let ir = lower("t.person.age");
    assert_eq!(ir.infer_type(), Type::Any);
    match ir {
        Ir::MemberAccess { object, property } => {
            assert_eq!(property, "age");
            assert!(matches!(&*object, Ir::MemberAccess { .. }));
        }
        other => panic!("expected member access, got {other:?}"),
    }
}

#[test]
fn if_branches_of_equal_type() {
    let ir = lower("if x > 0 then 1 else 2");
    assert_eq!(ir.infer_type(), Type::Int);
}

#[test]
fn transform_is_deterministic() {
    let expr = parse("let a = 1 in a + TOMORROW.day").unwrap();
    assert_eq!(transform(&expr).unwrap(), transform(&expr).unwrap());
}
