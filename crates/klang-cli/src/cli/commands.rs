//! Command builders for the CLI.
//!
//! Each command is built using the shared arg builders from `args.rs`.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("klang")
        .about("Retargetable compiler for typed expressions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(compile_command())
        .subcommand(ast_command())
        .subcommand(ir_command())
}

/// Compile an expression to a target language.
pub fn compile_command() -> Command {
    Command::new("compile")
        .about("Compile an expression to a target language")
        .override_usage(
            "\
  klang compile -t <TARGET> <FILE>
  klang compile -t <TARGET> -e <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  klang compile -t js -e '1 + 2 * 3'
  klang compile -t ruby -e 'TODAY + P1D'
  klang compile -t sql expr.klang
  echo 'price > 100' | klang compile -t sql -"#,
        )
        .arg(expr_path_arg())
        .arg(expr_text_arg())
        .arg(target_arg())
}

/// Show the parsed AST of an expression as JSON.
pub fn ast_command() -> Command {
    Command::new("ast")
        .about("Show the parsed AST of an expression as JSON")
        .override_usage(
            "\
  klang ast <FILE>
  klang ast -e <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  klang ast -e 'fn(x ~> x * 2)'
  klang ast expr.klang"#,
        )
        .arg(expr_path_arg())
        .arg(expr_text_arg())
}

/// Show the typed IR of an expression as JSON.
pub fn ir_command() -> Command {
    Command::new("ir")
        .about("Show the typed IR of an expression as JSON")
        .override_usage(
            "\
  klang ir <FILE>
  klang ir -e <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  klang ir -e '1 + 2.5'
  klang ir expr.klang"#,
        )
        .arg(expr_path_arg())
        .arg(expr_text_arg())
}
