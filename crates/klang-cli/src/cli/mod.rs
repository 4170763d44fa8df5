mod args;
mod commands;
mod dispatch;


pub use commands::build_cli;
pub use dispatch::{AstParams, CompileParams, IrParams};

/// Compilation target selected via `-t/--target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Javascript,
    Ruby,
    Sql,
}

impl Target {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "js" | "javascript" => Some(Target::Javascript),
            "ruby" => Some(Target::Ruby),
            "sql" => Some(Target::Sql),
            _ => None,
        }
    }
}
