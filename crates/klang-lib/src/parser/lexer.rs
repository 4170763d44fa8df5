//! Lexer for Klang source text.
//!
//! Produces span-based tokens without storing text — text is sliced from the
//! source only when needed. Unknown characters surface as a parse error with
//! their byte offset rather than a panic.

use logos::Logos;
use std::ops::Range;

use crate::{Error, Result};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip(r"//[^\n]*", allow_greedy = true))]
pub enum TokenKind {
    // ISO-8601 duration, e.g. `P1D`, `PT2H30M`, `P1Y2M3DT4H5M6S`. Requires
    // at least one designator so a bare `P` still lexes as an identifier.
    #[regex(r"P([0-9]+[YMWD])+(T([0-9]+(\.[0-9]+)?[HMS])+)?", priority = 10)]
    #[regex(r"PT([0-9]+(\.[0-9]+)?[HMS])+", priority = 10)]
    DurationLiteral,

    #[regex(r#"dt"[^"]*""#)]
    DateTimeLiteral,

    #[regex(r#"d"[^"]*""#)]
    DateLiteral,

    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[token("let")]
    Let,
    #[token("in")]
    In,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("fn")]
    Fn,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("~>")]
    Arrow,
    #[token("||")]
    OrOr,
    #[token("&&")]
    AndAnd,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    Lte,
    #[token(">=")]
    Gte,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,
    #[token("=")]
    Equals,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
}

/// Zero-copy token: kind plus byte span; text retrieved via [`token_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize source into span-based tokens, failing on the first character
/// no rule accepts.
pub fn lex(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                span: lexer.span(),
            }),
            Err(()) => {
                return Err(Error::Parse {
                    message: format!("unexpected character {:?}", lexer.slice()),
                    offset: lexer.span().start,
                });
            }
        }
    }

    Ok(tokens)
}

/// The text slice for a token. O(1) slice into the source.
#[inline]
pub fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[token.span.clone()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_arithmetic() {
        assert_eq!(
            kinds("2 + 3 * 4"),
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Star,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn lexes_durations() {
        assert_eq!(kinds("P1D"), vec![TokenKind::DurationLiteral]);
        assert_eq!(kinds("PT2H30M"), vec![TokenKind::DurationLiteral]);
        assert_eq!(kinds("P1Y2M3DT4H5M6S"), vec![TokenKind::DurationLiteral]);
        // A bare `P` is an identifier, not a malformed duration.
        assert_eq!(kinds("P"), vec![TokenKind::Ident]);
    }

    #[test]
    fn lexes_temporal_string_literals() {
        assert_eq!(kinds(r#"d"2024-01-15""#), vec![TokenKind::DateLiteral]);
        assert_eq!(
            kinds(r#"dt"2024-01-15T10:30:00Z""#),
            vec![TokenKind::DateTimeLiteral]
        );
        assert_eq!(kinds(r#""hello""#), vec![TokenKind::StringLiteral]);
    }

    #[test]
    fn lexes_lambda_punctuation() {
        assert_eq!(
            kinds("fn(x ~> x)"),
            vec![
                TokenKind::Fn,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::Arrow,
                TokenKind::Ident,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn pipe_and_oror_are_distinct() {
        assert_eq!(kinds("a | b"), vec![TokenKind::Ident, TokenKind::Pipe, TokenKind::Ident]);
        assert_eq!(kinds("a || b"), vec![TokenKind::Ident, TokenKind::OrOr, TokenKind::Ident]);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(kinds("1 // trailing\n+ 2"), vec![
            TokenKind::Number,
            TokenKind::Plus,
            TokenKind::Number,
        ]);
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = lex("2 @ 3").unwrap_err();
        assert_eq!(
            err,
            Error::Parse {
                message: "unexpected character \"@\"".into(),
                offset: 2,
            }
        );
    }
}
