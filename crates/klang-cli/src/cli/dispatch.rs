//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs that mirror command `*Args` but are populated from clap
//! - `from_matches()` extractors that pull the relevant fields
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use clap::ArgMatches;

use super::Target;
use crate::commands::ast::AstArgs;
use crate::commands::compile::CompileArgs;
use crate::commands::ir::IrArgs;

pub struct CompileParams {
    pub expr_path: Option<PathBuf>,
    pub expr_text: Option<String>,
    pub target: Target,
}

impl CompileParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        // `target` is required and restricted by clap's value_parser, so the
        // lookup cannot come back empty or unrecognized.
        let target = m
            .get_one::<String>("target")
            .and_then(|name| Target::from_name(name))
            .unwrap_or(Target::Javascript);

        Self {
            expr_path: m.get_one::<PathBuf>("expr_path").cloned(),
            expr_text: m.get_one::<String>("expr_text").cloned(),
            target,
        }
    }
}

impl From<CompileParams> for CompileArgs {
    fn from(p: CompileParams) -> Self {
        Self {
            expr_path: p.expr_path,
            expr_text: p.expr_text,
            target: p.target,
        }
    }
}

pub struct AstParams {
    pub expr_path: Option<PathBuf>,
    pub expr_text: Option<String>,
}

impl AstParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            expr_path: m.get_one::<PathBuf>("expr_path").cloned(),
            expr_text: m.get_one::<String>("expr_text").cloned(),
        }
    }
}

impl From<AstParams> for AstArgs {
    fn from(p: AstParams) -> Self {
        Self {
            expr_path: p.expr_path,
            expr_text: p.expr_text,
        }
    }
}

pub struct IrParams {
    pub expr_path: Option<PathBuf>,
    pub expr_text: Option<String>,
}

impl IrParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            expr_path: m.get_one::<PathBuf>("expr_path").cloned(),
            expr_text: m.get_one::<String>("expr_text").cloned(),
        }
    }
}

impl From<IrParams> for IrArgs {
    fn from(p: IrParams) -> Self {
        Self {
            expr_path: p.expr_path,
            expr_text: p.expr_text,
        }
    }
}
