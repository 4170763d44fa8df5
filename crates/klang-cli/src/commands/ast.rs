use std::path::PathBuf;

use klang_lib::parse;

use super::expr_loader::load_expr_source;

pub struct AstArgs {
    pub expr_path: Option<PathBuf>,
    pub expr_text: Option<String>,
}

pub fn run(args: AstArgs) {
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

    match serde_json::to_string_pretty(&expr) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
