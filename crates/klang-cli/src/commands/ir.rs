use std::path::PathBuf;

use klang_lib::{parse, transform};

use super::expr_loader::load_expr_source;

pub struct IrArgs {
    pub expr_path: Option<PathBuf>,
    pub expr_text: Option<String>,
}

pub fn run(args: IrArgs) {
    let source = match load_expr_source(args.expr_path.as_deref(), args.expr_text.as_deref()) {
        Ok(source) => source,
        Err(msg) => {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        }
    };

    let ir = match parse(&source).and_then(|expr| transform(&expr)) {
        Ok(ir) => ir,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&ir) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
