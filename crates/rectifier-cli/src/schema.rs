//! # Schema Subcommand
//!
//! Prints the configuration JSON Schema for editors and external tooling.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use rectifier_schema::{build_schema_validator, config_schema};

/// Arguments for the `rectifier schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Print on a single line instead of pretty-printing.
    #[arg(long)]
    pub compact: bool,
}

/// Write the schema to `out` after checking that it compiles.
pub fn run_schema(args: &SchemaArgs, out: &mut impl Write) -> Result<u8> {
    build_schema_validator().context("configuration schema does not compile")?;

    let schema = config_schema()?;
    let text = if args.compact {
        serde_json::to_string(schema)?
    } else {
        serde_json::to_string_pretty(schema)?
    };
    writeln!(out, "{text}")?;
    Ok(0)
}
