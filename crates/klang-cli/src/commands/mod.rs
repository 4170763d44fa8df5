pub mod ast;
pub mod compile;
pub mod expr_loader;
pub mod ir;
