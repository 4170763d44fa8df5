//! Type-directed dispatch library for backend emission rules.
//!
//! Each backend owns one [`StdLib`]: a registry mapping
//! `(function name, ordered argument types)` → emission rule, plus at most
//! one fallback. Lookup is exact-key only — O(1) and fully deterministic.
//! Backends wanting broad coverage register wildcard entries with
//! [`Type::Any`] rather than relying on the dispatcher to generalize.
//!
//! Re-registering a key overwrites silently; backends rely on this to
//! special-case a subset of a generically registered signature (the
//! `today() ± P1D` rewrites, for example).
//!
//! Registries are built once at process initialization (`LazyLock` statics in
//! the backend modules) and never mutated afterwards, so concurrent
//! compilations share them without locking.

use indexmap::IndexMap;

use crate::ir::Ir;
use crate::types::Type;
use crate::{Error, Result};

/// Which side of a parent binary operator a child expression sits on.
/// Right operands of left-associative, non-commutative operators keep their
/// parentheses at equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Recursion interface handed to every emission rule.
///
/// Implemented by each backend's IR walker; `emit_with_parens` applies the
/// backend's own precedence table, so the same rule helper parenthesizes
/// correctly under every target grammar.
pub trait EmitCtx {
    /// Render a child node, no parentheses.
    fn emit(&self, ir: &Ir) -> Result<String>;

    /// Render a child node, wrapping in parentheses when the child binds
    /// looser than `parent_op` on the given side.
    fn emit_with_parens(&self, ir: &Ir, parent_op: &str, side: Side) -> Result<String>;
}

/// An emission rule for one registered signature.
pub type EmitRule = Box<dyn Fn(&[Ir], &dyn EmitCtx) -> Result<String> + Send + Sync>;

/// Backend-wide default, invoked only when no exact signature matches.
pub type FallbackRule =
    Box<dyn Fn(&str, &[Ir], &[Type], &dyn EmitCtx) -> Result<String> + Send + Sync>;

/// Canonical dispatch key: function name plus comma-joined argument type
/// names. Stable and order-sensitive — `add(int,float)` and `add(float,int)`
/// are distinct keys.
pub fn signature_key(name: &str, arg_types: &[Type]) -> String {
    let names: Vec<&str> = arg_types.iter().map(Type::name).collect();
    format!("{}({})", name, names.join(","))
}

/// A library of emission rules for one target language.
#[derive(Default)]
pub struct StdLib {
    rules: IndexMap<String, EmitRule>,
    fallback: Option<FallbackRule>,
}

impl StdLib {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for an exact signature. Last registration wins.
    pub fn register(&mut self, name: &str, arg_types: &[Type], rule: EmitRule) -> &mut Self {
        self.rules.insert(signature_key(name, arg_types), rule);
        self
    }

    /// Register the library's fallback for unmatched signatures.
    pub fn register_fallback(&mut self, rule: FallbackRule) -> &mut Self {
        self.fallback = Some(rule);
        self
    }

    /// Render a call: exact signature first, then the fallback, then a
    /// dispatch-miss error carrying the computed key.
    pub fn emit(
        &self,
        name: &str,
        args: &[Ir],
        arg_types: &[Type],
        ctx: &dyn EmitCtx,
    ) -> Result<String> {
        if let Some(rule) = self.rules.get(&signature_key(name, arg_types)) {
            return rule(args, ctx);
        }
        if let Some(fallback) = &self.fallback {
            return fallback(name, args, arg_types, ctx);
        }
        Err(Error::NoImplementation {
            signature: signature_key(name, arg_types),
        })
    }
}

// Rule constructors shared by the backends.

/// `left <op> right` with precedence-aware parenthesization.
pub fn binary_op(op: &'static str) -> EmitRule {
    Box::new(move |args, ctx| {
        let left = ctx.emit_with_parens(&args[0], op, Side::Left)?;
        let right = ctx.emit_with_parens(&args[1], op, Side::Right)?;
        Ok(format!("{left} {op} {right}"))
    })
}

/// A fixed token, e.g. `CURRENT_DATE`.
pub fn nullary(text: &'static str) -> EmitRule {
    Box::new(move |_, _| Ok(text.to_string()))
}

/// `name(arg0, arg1, ...)`.
pub fn fn_call(name: &'static str) -> EmitRule {
    Box::new(move |args, ctx| {
        let rendered = args
            .iter()
            .map(|arg| ctx.emit(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{}({})", name, rendered.join(", ")))
    })
}

/// `arg0.method(arg1)`.
pub fn method_call(method: &'static str) -> EmitRule {
    Box::new(move |args, ctx| {
        Ok(format!(
            "{}.{}({})",
            ctx.emit(&args[0])?,
            method,
            ctx.emit(&args[1])?
        ))
    })
}

/// Prefix operator. The operand is wrapped in parentheses when `wraps` says
/// it renders as a binary operator in this target, or when it already starts
/// with the same token: `--x` is a decrement in JavaScript and opens a
/// comment in SQL, so `neg(neg(x))` must render as `-(-x)`.
pub fn prefix_op(op: &'static str, wraps: fn(&Ir) -> bool) -> EmitRule {
    Box::new(move |args, ctx| {
        let operand = ctx.emit(&args[0])?;
        Ok(if wraps(&args[0]) || operand.starts_with(op) {
            format!("{op}({operand})")
        } else {
            format!("{op}{operand}")
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlainCtx;

    impl EmitCtx for PlainCtx {
        fn emit(&self, ir: &Ir) -> Result<String> {
            match ir {
                Ir::IntLiteral { value } => Ok(value.to_string()),
                other => panic!("unexpected node in test: {other:?}"),
            }
        }

        fn emit_with_parens(&self, ir: &Ir, _parent_op: &str, _side: Side) -> Result<String> {
            self.emit(ir)
        }
    }

    fn int(value: i64) -> Ir {
        Ir::IntLiteral { value }
    }

    #[test]
    fn signature_keys_are_order_sensitive() {
        assert_eq!(
            signature_key("add", &[Type::Int, Type::Float]),
            "add(int,float)"
        );
        assert_eq!(
            signature_key("add", &[Type::Float, Type::Int]),
            "add(float,int)"
        );
        assert_eq!(signature_key("today", &[]), "today()");
    }

    #[test]
    fn exact_lookup_wins() {
        let mut lib = StdLib::new();
        lib.register("add", &[Type::Int, Type::Int], binary_op("+"));
        let out = lib
            .emit("add", &[int(1), int(2)], &[Type::Int, Type::Int], &PlainCtx)
            .unwrap();
        assert_eq!(out, "1 + 2");
    }

    #[test]
    fn last_registration_wins() {
        let mut lib = StdLib::new();
        lib.register("add", &[Type::Int, Type::Int], binary_op("+"));
        lib.register("add", &[Type::Int, Type::Int], fn_call("plus"));
        let out = lib
            .emit("add", &[int(1), int(2)], &[Type::Int, Type::Int], &PlainCtx)
            .unwrap();
        assert_eq!(out, "plus(1, 2)");
    }

    #[test]
    fn fallback_used_when_no_signature_matches() {
        let mut lib = StdLib::new();
        lib.register_fallback(Box::new(|name, args, _arg_types, ctx| {
            let rendered = args
                .iter()
                .map(|arg| ctx.emit(arg))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{}({})", name, rendered.join(", ")))
        }));
        let out = lib
            .emit("mystery", &[int(7)], &[Type::Int], &PlainCtx)
            .unwrap();
        assert_eq!(out, "mystery(7)");
    }

    #[test]
    fn dispatch_miss_names_the_signature() {
        let lib = StdLib::new();
        let err = lib
            .emit("add", &[int(1), int(2)], &[Type::Int, Type::Duration], &PlainCtx)
            .unwrap_err();
        assert_eq!(
            err,
            Error::NoImplementation {
                signature: "add(int,duration)".into()
            }
        );
    }

    #[test]
    fn nullary_ignores_args() {
        let rule = nullary("CURRENT_DATE");
        assert_eq!(rule(&[], &PlainCtx).unwrap(), "CURRENT_DATE");
    }

    #[test]
    fn prefix_op_wraps_operands_starting_with_the_same_token() {
        let rule = prefix_op("-", |_| false);
        assert_eq!(rule(&[int(5)], &PlainCtx).unwrap(), "-5");
        assert_eq!(rule(&[int(-5)], &PlainCtx).unwrap(), "-(-5)");
    }

    #[test]
    fn method_call_renders_receiver_and_argument() {
        let rule = method_call("add");
        assert_eq!(rule(&[int(1), int(2)], &PlainCtx).unwrap(), "1.add(2)");
    }
}
