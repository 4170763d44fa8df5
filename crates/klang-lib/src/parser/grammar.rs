//! Recursive-descent grammar for Klang expressions.
//!
//! Precedence climbing, loosest first:
//! `||` → `&&` → `==`/`!=` → `<`/`>`/`<=`/`>=` → `+`/`-` → `*`/`/`/`%` →
//! unary `-`/`+`/`!` → `^` (right-associative) → postfix member access →
//! primary.
//!
//! There is no error recovery: the language is single-expression, so the
//! first unexpected token fails the parse with its byte offset.

use crate::ast::{Binding, Expr, LiteralValue, Property};
use crate::{Error, Result};

use super::lexer::{lex, token_text, Token, TokenKind};

const TEMPORAL_KEYWORDS: [&str; 14] = [
    "TODAY", "NOW", "TOMORROW", "YESTERDAY", "SOD", "EOD", "SOW", "EOW", "SOM", "EOM", "SOQ",
    "EOQ", "SOY", "EOY",
];

pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Result<Self> {
        Ok(Self {
            source,
            tokens: lex(source)?,
            pos: 0,
        })
    }

    /// Parse a single expression. Trailing tokens are an error.
    pub fn parse(mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        if let Some(token) = self.tokens.get(self.pos) {
            return Err(self.error_at(token.span.start, "unexpected trailing input"));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = binary("||", left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            left = binary("&&", left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::EqEq) => "==",
                Some(TokenKind::NotEq) => "!=",
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Lt) => "<",
                Some(TokenKind::Gt) => ">",
                Some(TokenKind::Lte) => "<=",
                Some(TokenKind::Gte) => ">=",
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => "+",
                Some(TokenKind::Minus) => "-",
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => "*",
                Some(TokenKind::Slash) => "/",
                Some(TokenKind::Percent) => "%",
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Some(TokenKind::Minus) => "-",
            Some(TokenKind::Plus) => "+",
            Some(TokenKind::Bang) => "!",
            _ => return self.parse_power(),
        };
        self.pos += 1;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op: op.to_string(),
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let left = self.parse_postfix()?;
        if self.eat(TokenKind::Caret) {
            // Right-associative: the right operand re-enters at unary level,
            // so `2 ^ 3 ^ 2` parses as `2 ^ (3 ^ 2)`.
            let right = self.parse_unary()?;
            return Ok(binary("^", left, right));
        }
        Ok(left)
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat(TokenKind::Dot) {
            let property = self.expect_ident("property name after `.`")?;
            expr = Expr::MemberAccess {
                object: Box::new(expr),
                property,
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(self.error_at(self.source.len(), "expected expression"));
        };
        let text = token_text(self.source, &token);

        match token.kind {
            TokenKind::Number => {
                self.pos += 1;
                let value: f64 = text.parse().map_err(|_| {
                    self.error_at(token.span.start, "malformed numeric literal")
                })?;
                Ok(Expr::Literal {
                    value: LiteralValue::Number(value),
                })
            }
            TokenKind::True => {
                self.pos += 1;
                Ok(Expr::Literal {
                    value: LiteralValue::Bool(true),
                })
            }
            TokenKind::False => {
                self.pos += 1;
                Ok(Expr::Literal {
                    value: LiteralValue::Bool(false),
                })
            }
            TokenKind::StringLiteral => {
                self.pos += 1;
                let value = self.unescape(&text[1..text.len() - 1], token.span.start)?;
                Ok(Expr::Str { value })
            }
            TokenKind::DateLiteral => {
                self.pos += 1;
                Ok(Expr::Date {
                    value: text[2..text.len() - 1].to_string(),
                })
            }
            TokenKind::DateTimeLiteral => {
                self.pos += 1;
                Ok(Expr::DateTime {
                    value: text[3..text.len() - 1].to_string(),
                })
            }
            TokenKind::DurationLiteral => {
                self.pos += 1;
                Ok(Expr::Duration {
                    value: text.to_string(),
                })
            }
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::Fn => self.parse_fn(),
            TokenKind::LParen => {
                self.pos += 1;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(expr)
            }
            TokenKind::LBrace => self.parse_object(),
            TokenKind::Ident => {
                self.pos += 1;
                if self.at(TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::FunctionCall {
                        name: text.to_string(),
                        args,
                    })
                } else if TEMPORAL_KEYWORDS.contains(&text) {
                    Ok(Expr::TemporalKeyword {
                        keyword: text.to_string(),
                    })
                } else {
                    Ok(Expr::Variable {
                        name: text.to_string(),
                    })
                }
            }
            _ => Err(self.error_at(
                token.span.start,
                format!("expected expression, found `{text}`"),
            )),
        }
    }

    /// `let a = e1, b = e2 in body`
    fn parse_let(&mut self) -> Result<Expr> {
        self.pos += 1; // `let`
        let mut bindings = Vec::new();
        loop {
            let name = self.expect_ident("binding name")?;
            self.expect(TokenKind::Equals, "`=`")?;
            let value = self.parse_expr()?;
            bindings.push(Binding { name, value });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::In, "`in`")?;
        let body = self.parse_expr()?;
        Ok(Expr::Let {
            bindings,
            body: Box::new(body),
        })
    }

    /// `if cond then a else b`
    fn parse_if(&mut self) -> Result<Expr> {
        self.pos += 1; // `if`
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Then, "`then`")?;
        let then = self.parse_expr()?;
        self.expect(TokenKind::Else, "`else`")?;
        let otherwise = self.parse_expr()?;
        Ok(Expr::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// `fn(x, y ~> body)` (lambda) or `fn(x | body)` (predicate)
    fn parse_fn(&mut self) -> Result<Expr> {
        self.pos += 1; // `fn`
        self.expect(TokenKind::LParen, "`(`")?;

        let mut params = vec![self.expect_ident("parameter name")?];
        while self.eat(TokenKind::Comma) {
            params.push(self.expect_ident("parameter name")?);
        }

        let expr = if self.eat(TokenKind::Arrow) {
            let body = self.parse_expr()?;
            Expr::Lambda {
                params,
                body: Box::new(body),
            }
        } else if self.eat(TokenKind::Pipe) {
            let body = self.parse_expr()?;
            Expr::Predicate {
                params,
                body: Box::new(body),
            }
        } else {
            return Err(self.error_here("expected `~>` or `|` after parameters"));
        };

        self.expect(TokenKind::RParen, "`)`")?;
        Ok(expr)
    }

    /// `{key: value, ...}`
    fn parse_object(&mut self) -> Result<Expr> {
        self.pos += 1; // `{`
        let mut properties = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                let key = self.expect_ident("property key")?;
                self.expect(TokenKind::Colon, "`:`")?;
                let value = self.parse_expr()?;
                properties.push(Property { key, value });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(Expr::Object { properties })
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>> {
        self.pos += 1; // `(`
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(args)
    }

    fn unescape(&self, raw: &str, offset: usize) -> Result<String> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                other => {
                    return Err(self.error_at(
                        offset,
                        format!(
                            "invalid escape sequence `\\{}`",
                            other.map(String::from).unwrap_or_default()
                        ),
                    ));
                }
            }
        }
        Ok(out)
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == TokenKind::Ident => {
                let text = token_text(self.source, token).to_string();
                self.pos += 1;
                Ok(text)
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        let offset = self
            .tokens
            .get(self.pos)
            .map(|t| t.span.start)
            .unwrap_or(self.source.len());
        self.error_at(offset, message)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::Parse {
            message: message.into(),
            offset,
        }
    }
}

fn binary(op: &str, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op: op.to_string(),
        left: Box::new(left),
        right: Box::new(right),
    }
}
