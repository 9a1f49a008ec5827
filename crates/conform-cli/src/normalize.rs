//! # Normalize Subcommand
//!
//! Prints the canonical form of a schema description: shorthand expanded,
//! every node written as an object with an explicit `type`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use conform_schema::load_schema;

/// Arguments for the normalize subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Schema description file (.json, .yaml or .yml).
    pub schema: PathBuf,
}

/// Execute the normalize subcommand, writing pretty JSON to `out`.
pub fn run_normalize(args: &NormalizeArgs, out: &mut impl Write) -> Result<u8> {
    let schema = load_schema(&args.schema)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    serde_json::to_writer_pretty(&mut *out, &schema.to_value())?;
    writeln!(out)?;
    Ok(0)
}
