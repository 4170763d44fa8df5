use std::path::PathBuf;

use klang_lib::{
    JsOptions, RubyOptions, SqlOptions, compile_to_javascript, compile_to_ruby, compile_to_sql,
    parse,
};

use super::expr_loader::load_expr_source;
use crate::cli::Target;

pub struct CompileArgs {
    pub expr_path: Option<PathBuf>,
    pub expr_text: Option<String>,
    pub target: Target,
}

pub fn run(args: CompileArgs) {
    let source = match load_expr_source(args.expr_path.as_deref(), args.expr_text.as_deref()) {
        Ok(source) => source,
        Err(msg) => {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        }
    };

    let expr = match parse(&source) {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let output = match args.target {
        Target::Javascript => compile_to_javascript(&expr, &JsOptions::default()),
        Target::Ruby => compile_to_ruby(&expr, &RubyOptions::default()),
        Target::Sql => compile_to_sql(&expr, &SqlOptions::default()),
    };

    match output {
        Ok(code) => println!("{}", code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
