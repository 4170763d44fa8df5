//! Klang: a retargetable compiler for a small typed expression language.
//!
//! One parsed expression compiles, unmodified in meaning, into three target
//! surface syntaxes: JavaScript, Ruby, and PostgreSQL SQL. The pipeline is
//! source text → [`parse`] → AST → [`transform`] → typed IR → backend
//! emitter → target source string.
//!
//! # Example
//!
//! ```
//! use klang_lib::{compile_to_sql, parse, SqlOptions};
//!
//! let ast = parse("2 + 3 * 4").unwrap();
//! let sql = compile_to_sql(&ast, &SqlOptions::default()).unwrap();
//! assert_eq!(sql, "2 + 3 * 4");
//! ```
//!
//! The compiler never executes expressions and never performs I/O; it only
//! emits target source text. Compilation is pure and deterministic, so
//! concurrent compilations are safe — the only shared state is the
//! per-backend dispatch registry, built once and immutable afterwards.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ast;
pub mod compilers;
pub mod ir;
pub mod parser;
pub mod stdlib;
pub mod transform;
pub mod types;

#[cfg(test)]
mod transform_tests;

pub use ast::Expr;
pub use compilers::javascript::{compile_to_javascript, JsOptions};
pub use compilers::ruby::{compile_to_ruby, RubyOptions};
pub use compilers::sql::{compile_to_sql, SqlOptions};
pub use ir::Ir;
pub use parser::parse;
pub use transform::transform;
pub use types::Type;

/// Errors produced while parsing, lowering, or emitting an expression.
///
/// All variants are local, unrecoverable failures of the compilation call;
/// there is no partial output and no retry semantics (the pipeline is
/// deterministic, so an identical input fails identically). Runtime failures
/// of the *emitted* code are out of scope here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed source text.
    #[error("parse error at offset {offset}: {message}")]
    Parse { message: String, offset: usize },

    /// Binary operator the transform does not know — a parser/transform
    /// mismatch, or a malformed programmatically-built AST.
    #[error("unknown binary operator: {0}")]
    UnknownBinaryOperator(String),

    /// Unary operator the transform does not know.
    #[error("unknown unary operator: {0}")]
    UnknownUnaryOperator(String),

    /// Temporal keyword with no desugaring.
    #[error("unknown temporal keyword: {0}")]
    UnknownTemporalKeyword(String),

    /// A `let`-bound lambda or predicate calling its own binding name.
    /// Recursion is a language non-goal, rejected statically.
    #[error("recursive function calls are not allowed: '{name}' cannot call itself")]
    RecursiveCall { name: String },

    /// No registered signature and no fallback in the target's dispatch
    /// library. Legitimate when a backend supports a narrower function
    /// surface than another.
    #[error("no implementation for {signature}")]
    NoImplementation { signature: String },

    /// An IR construct the target has no scalar rendering for (lambdas in
    /// SQL, for example).
    #[error("{target} cannot express {construct}")]
    UnsupportedConstruct {
        construct: &'static str,
        target: &'static str,
    },
}

/// Result type for compilation operations.
pub type Result<T> = std::result::Result<T, Error>;
