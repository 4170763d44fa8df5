use std::fs;
use std::io::{self, Read};
use std::path::Path;

pub fn load_expr_source(
    expr_path: Option<&Path>,
    expr_text: Option<&str>,
) -> Result<String, String> {
    if let Some(text) = expr_text {
        return Ok(text.to_string());
    }

    if let Some(path) = expr_path {
        if path.as_os_str() == "-" {
            return load_stdin();
        }
        return fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {}", path.display(), e));
    }

    Err("expression is required: use a positional FILE argument or -e/--expr".to_string())
}

fn load_stdin() -> Result<String, String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("failed to read stdin: {}", e))?;
    Ok(buf)
}
