//! # Check Subcommand
//!
//! Validates one or more documents against a schema file.
//!
//! ```bash
//! conform check --schema user.schema.yaml alice.json bob.yaml
//! conform check --schema user.schema.json --format text alice.json
//! ```
//!
//! Exit code 0 means every document conforms, 1 means at least one does not.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use conform_schema::{find_schema_error, load_document, load_schema, Schema, SchemaError};

/// Report format for `conform check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON array with one entry per document; errors use the kind-free
    /// summary form.
    #[default]
    Json,
    /// One status line per document followed by its violations.
    Text,
}

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema description file (.json, .yaml or .yml).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Documents to validate.
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct DocumentResult {
    document: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<SchemaError>,
}

/// Execute the check subcommand, writing the report to `out`.
///
/// # Errors
///
/// Fails if the schema or any document cannot be loaded.
pub fn run_check(args: &CheckArgs, out: &mut impl Write) -> Result<u8> {
    let schema = load_schema(&args.schema)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    tracing::info!(schema = %args.schema.display(), documents = args.documents.len(), "checking documents");

    let results = args
        .documents
        .iter()
        .map(|path| check_document(path, &schema))
        .collect::<Result<Vec<_>>>()?;

    let failed = results.iter().filter(|r| !r.valid).count();
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &results)?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_text(&results, out)?,
    }

    if failed == 0 {
        Ok(0)
    } else {
        tracing::warn!(failed, total = results.len(), "documents do not match schema");
        Ok(1)
    }
}

fn check_document(path: &Path, schema: &Schema) -> Result<DocumentResult> {
    let value = load_document(path).with_context(|| format!("loading document {}", path.display()))?;
    let errors = find_schema_error(&value, schema);
    tracing::debug!(document = %path.display(), valid = errors.is_none(), "checked document");
    Ok(DocumentResult {
        document: path.display().to_string(),
        valid: errors.is_none(),
        errors,
    })
}

fn write_text(results: &[DocumentResult], out: &mut impl Write) -> Result<()> {
    for result in results {
        match &result.errors {
            None => writeln!(out, "OK: {}", result.document)?,
            Some(err) => {
                writeln!(out, "FAIL: {}", result.document)?;
                for violation in err.violations() {
                    writeln!(out, "{violation}")?;
                }
            }
        }
    }
    Ok(())
}
