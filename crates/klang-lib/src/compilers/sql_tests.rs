use crate::ast;
use crate::compilers::sql::{compile_to_sql, SqlOptions};
use crate::parser::parse;
use crate::Error;

fn compile(source: &str) -> String {
    let expr = parse(source).unwrap();
    compile_to_sql(&expr, &SqlOptions::default()).unwrap()
}

fn compile_err(source: &str) -> Error {
    let expr = parse(source).unwrap();
    match compile_to_sql(&expr, &SqlOptions::default()) {
        Ok(out) => panic!("expected error for {source:?}, got {out:?}"),
        Err(err) => err,
    }
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(compile("2 + 3 * 4"), "2 + 3 * 4");
    assert_eq!(compile("(2 + 3) * 4"), "(2 + 3) * 4");
    assert_eq!(compile("10 - 5 - 2"), "10 - 5 - 2");
    assert_eq!(compile("10 - (5 - 2)"), "10 - (5 - 2)");
}

#[test]
fn power_is_a_function() {
    assert_eq!(compile("2 ^ 3"), "POWER(2, 3)");
    assert_eq!(compile("x ^ 2"), "POWER(x, 2)");
}

#[test]
fn comparison_tokens() {
    assert_eq!(compile("x == 1"), "x = 1");
    assert_eq!(compile("x != 1"), "x <> 1");
    assert_eq!(compile("x <= 1"), "x <= 1");
}

#[test]
fn logical_keywords_and_precedence() {
    assert_eq!(compile("a && b || c"), "a AND b OR c");
    assert_eq!(compile("a && (b || c)"), "a AND (b OR c)");
    assert_eq!(compile("!done"), "NOT done");
    assert_eq!(compile("!(a && b)"), "NOT (a AND b)");
    // `--` would open a line comment.
    assert_eq!(compile("- -x"), "-(-x)");
}

#[test]
fn booleans_are_uppercase() {
    assert_eq!(compile("true"), "TRUE");
    assert_eq!(compile("false"), "FALSE");
}

#[test]
fn temporal_keywords() {
    assert_eq!(compile("TODAY"), "CURRENT_DATE");
    assert_eq!(compile("NOW"), "CURRENT_TIMESTAMP");
    assert_eq!(compile("TOMORROW"), "CURRENT_DATE + INTERVAL '1 day'");
    assert_eq!(compile("YESTERDAY"), "CURRENT_DATE - INTERVAL '1 day'");
}

#[test]
fn period_boundaries() {
    assert_eq!(compile("SOD"), "date_trunc('day', CURRENT_TIMESTAMP)");
    assert_eq!(
        compile("EOD"),
        "date_trunc('day', CURRENT_TIMESTAMP) + INTERVAL '1 day' - INTERVAL '1 second'"
    );
    assert_eq!(compile("SOM"), "date_trunc('month', CURRENT_DATE)");
    assert_eq!(
        compile("EOM"),
        "date_trunc('month', CURRENT_DATE) + INTERVAL '1 month' - INTERVAL '1 day'"
    );
    assert_eq!(
        compile("EOQ"),
        "date_trunc('quarter', CURRENT_DATE) + INTERVAL '3 months' - INTERVAL '1 day'"
    );
}

#[test]
fn temporal_literals() {
    assert_eq!(compile(r#"d"2024-01-15""#), "DATE '2024-01-15'");
    assert_eq!(
        compile(r#"dt"2024-01-15T10:30:00Z""#),
        "TIMESTAMP '2024-01-15 10:30:00'"
    );
    assert_eq!(
        compile(r#"dt"2024-01-15T10:30:00.123Z""#),
        "TIMESTAMP '2024-01-15 10:30:00'"
    );
    assert_eq!(compile("P1Y2M"), "INTERVAL 'P1Y2M'");
}

#[test]
fn date_arithmetic_outside_the_rewrite_is_native() {
    assert_eq!(
        compile(r#"d"2024-01-15" + P1D"#),
        "DATE '2024-01-15' + INTERVAL 'P1D'"
    );
    assert_eq!(
        compile("TODAY + P2D"),
        "CURRENT_DATE + INTERVAL 'P2D'"
    );
}

#[test]
fn member_access_is_dotted() {
    assert_eq!(compile("t.person.age"), "t.person.age");
}

#[test]
fn let_becomes_a_subselect() {
    assert_eq!(
        compile("let a = 1 in a + 2"),
        "(SELECT a + 2 FROM (SELECT 1 AS a) AS _let)"
    );
    assert_eq!(
        compile("let a = 1, b = a * 2 in a + b"),
        "(SELECT a + b FROM (SELECT 1 AS a, a * 2 AS b) AS _let)"
    );
}

#[test]
fn if_becomes_case_when() {
    assert_eq!(
        compile("if x > 0 then 1 else 2"),
        "CASE WHEN x > 0 THEN 1 ELSE 2 END"
    );
}

#[test]
fn assert_renders_as_failing_cast() {
    assert_eq!(
        compile("assert(x > 0)"),
        "CASE WHEN x > 0 THEN TRUE ELSE CAST('assertion failed' AS BOOLEAN) END"
    );
}

#[test]
fn lambdas_are_unsupported() {
    let err = compile_err("fn(x ~> x + 1)");
    assert_eq!(
        err,
        Error::UnsupportedConstruct {
            construct: "lambdas",
            target: "SQL",
        }
    );
    assert_eq!(err.to_string(), "SQL cannot express lambdas");
}

#[test]
fn objects_are_unsupported() {
    assert!(matches!(
        compile_err("{ a: 1 }"),
        Error::UnsupportedConstruct {
            construct: "object literals",
            ..
        }
    ));
}

#[test]
fn unknown_function_falls_back_to_uppercase_call() {
    assert_eq!(compile("max(1, 2)"), "MAX(1, 2)");
    assert_eq!(compile("coalesce(x, 0)"), "COALESCE(x, 0)");
}

#[test]
fn string_single_quotes_are_doubled() {
    assert_eq!(compile(r#""it's""#), "'it''s'");
}

#[test]
fn date_payload_injection_is_escaped() {
    let expr = ast::date_literal("' OR '1'='1");
    assert_eq!(
        compile_to_sql(&expr, &SqlOptions::default()).unwrap(),
        "DATE ''' OR ''1''=''1'"
    );
}

#[test]
fn duration_payload_injection_is_escaped() {
    let expr = ast::duration_literal("1 day'); DROP TABLE users; --");
    assert_eq!(
        compile_to_sql(&expr, &SqlOptions::default()).unwrap(),
        "INTERVAL '1 day''); DROP TABLE users; --'"
    );
}

#[test]
fn compound_expression_snapshot() {
    insta::assert_snapshot!(
        compile("let total = price * qty in total > 100"),
        @"(SELECT total > 100 FROM (SELECT price * qty AS total) AS _let)"
    );
}

#[test]
fn compilation_is_deterministic() {
    let expr = parse("let a = TOMORROW in a == t.deadline && price > 10").unwrap();
    let first = compile_to_sql(&expr, &SqlOptions::default()).unwrap();
    let second = compile_to_sql(&expr, &SqlOptions::default()).unwrap();
    assert_eq!(first, second);
}
