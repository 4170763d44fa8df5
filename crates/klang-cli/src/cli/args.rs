//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, value_parser};

/// Expression file (positional). `-` reads from stdin.
pub fn expr_path_arg() -> Arg {
    Arg::new("expr_path")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("File containing the expression (use '-' for stdin)")
}

/// Inline expression text (-e/--expr).
pub fn expr_text_arg() -> Arg {
    Arg::new("expr_text")
        .short('e')
        .long("expr")
        .value_name("TEXT")
        .help("Inline expression text")
}

/// Compilation target (-t/--target).
pub fn target_arg() -> Arg {
    Arg::new("target")
        .short('t')
        .long("target")
        .value_name("TARGET")
        .required(true)
        .value_parser(["js", "javascript", "ruby", "sql"])
        .help("Compilation target")
}
