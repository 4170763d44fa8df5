//! Backend emitters.
//!
//! Each backend is self-contained: a precedence table, an operator→token
//! map, one dispatch library built once behind a `LazyLock`, a literal
//! formatter, and a recursive IR walker. Nothing is shared between backends
//! except the escaping helpers below — precedence and rendering decisions
//! deliberately live per target, because the target grammars disagree on
//! both.
//!
//! Literal payloads (string, date, datetime, duration) are untrusted: they
//! come from parsed source or from programmatically built ASTs, and they are
//! copied into target source text verbatim. Every payload goes through one
//! of the quoting helpers so that its content cannot terminate the enclosing
//! string token early.

pub mod javascript;
pub mod ruby;
pub mod sql;

#[cfg(test)]
mod sql_tests;

/// Double-quoted string literal with JSON-style escaping. Used by the
/// JavaScript and Ruby backends, whose double-quoted string grammars both
/// accept this escape set.
pub(crate) fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Single-quoted SQL string literal, embedded quotes doubled.
pub(crate) fn sql_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_escapes_quotes_and_backslashes() {
        assert_eq!(quoted("hello"), r#""hello""#);
        assert_eq!(quoted(r#"a"b"#), r#""a\"b""#);
        assert_eq!(quoted(r"a\b"), r#""a\\b""#);
        assert_eq!(quoted("a\nb"), r#""a\nb""#);
    }

    #[test]
    fn quoted_escapes_control_characters() {
        assert_eq!(quoted("a\u{1}b"), "\"a\\u0001b\"");
        assert_eq!(quoted("a\u{7f}b"), "\"a\\u007fb\"");
    }

    #[test]
    fn sql_quoted_doubles_single_quotes() {
        assert_eq!(sql_quoted("hello"), "'hello'");
        assert_eq!(sql_quoted("it's"), "'it''s'");
        assert_eq!(sql_quoted("' OR '1'='1"), "''' OR ''1''=''1'");
    }
}
