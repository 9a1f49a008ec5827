//! # conform-cli: Command-Line Interface
//!
//! Provides the `conform` binary on top of `conform-schema`.
//!
//! ## Subcommands
//!
//! - `conform check`: validate documents against a schema file.
//! - `conform normalize`: print a schema in canonical form.
//!
//! ```bash
//! conform check --schema user.schema.yaml users/*.json
//! conform -v check --schema user.schema.yaml --format text alice.yaml
//! conform normalize user.schema.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; validation semantics live in
//!   `conform-schema`.
//! - Reports go to stdout, logs go to stderr.

pub mod check;
pub mod normalize;

pub use check::{run_check, CheckArgs, OutputFormat};
pub use normalize::{run_normalize, NormalizeArgs};
