//! Expression parsing: a logos lexer feeding a recursive-descent grammar.

mod grammar;
mod lexer;


pub use grammar::Parser;

use crate::ast::Expr;
use crate::Result;

/// Parse a single Klang expression from source text.
pub fn parse(source: &str) -> Result<Expr> {
    Parser::new(source)?.parse()
}
