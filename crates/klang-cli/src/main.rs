mod cli;
mod commands;

use cli::{AstParams, CompileParams, IrParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("compile", m)) => {
            let params = CompileParams::from_matches(m);
            commands::compile::run(params.into());
        }
        Some(("ast", m)) => {
            let params = AstParams::from_matches(m);
            commands::ast::run(params.into());
        }
        Some(("ir", m)) => {
            let params = IrParams::from_matches(m);
            commands::ir::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
