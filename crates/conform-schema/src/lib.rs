//! # conform-schema: Structural Schema Validation
//!
//! Checks arbitrary JSON values against declarative schemas and reports
//! *every* divergence, not just the first.
//!
//! ```
//! use conform_schema::{find_schema_error, Schema, SchemaErrorKind};
//! use serde_json::json;
//!
//! let schema: Schema = serde_json::from_value(json!({
//!     "type": "object",
//!     "properties": {
//!         "name": "string",
//!         "tags": ["string"],
//!         "age": { "type": "int", "optional": true }
//!     }
//! }))
//! .unwrap();
//!
//! assert!(find_schema_error(&json!({ "name": "a", "tags": [] }), &schema).is_none());
//!
//! let err = find_schema_error(&json!({ "tags": ["x", 2] }), &schema).unwrap();
//! assert!(err.only(&[SchemaErrorKind::MissingProperty, SchemaErrorKind::WrongType]));
//! assert_eq!(
//!     err.to_json(),
//!     json!({
//!         "properties": {
//!             "name": { "message": "property missing" },
//!             "tags": { "properties": { "1": { "message": "expected string" } } }
//!         }
//!     })
//! );
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: the typed schema tree and the description parser, which
//!   expands the `"tag"` and `[children]` shorthands.
//! - [`matcher`]: [`find_type_error`], the recursive matcher producing an
//!   [`ErrorNode`] tree.
//! - [`report`]: [`SchemaError`], the queryable and serializable wrapper
//!   around a failed match.
//! - [`loader`]: reading schemas and documents from JSON/YAML files.
//!
//! ## Crate Policy
//!
//! - Validation is a pure function of `(value, schema)`. No caching, no
//!   coercion, no I/O outside [`loader`].
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod loader;
pub mod matcher;
mod pointer;
pub mod report;
pub mod schema;

pub use error::{LoadError, SchemaDefinitionError};
pub use loader::{load_document, load_schema, yaml_to_json_value, DocumentFormat};
pub use matcher::{conforms, find_type_error, ErrorDetail, ErrorNode, SchemaErrorKind};
pub use report::{ErrorSummary, SchemaError, Violation};
pub use schema::{Primitive, PropertySchema, Schema, SchemaKind, Validator};

use serde_json::Value;

/// Check `value` against `schema`.
///
/// Returns `None` if the value conforms, otherwise a [`SchemaError`]
/// describing every divergence.
pub fn find_schema_error(value: &Value, schema: &Schema) -> Option<SchemaError> {
    let report = find_type_error(value, schema).map(SchemaError::new);
    match &report {
        None => tracing::debug!(schema = schema.type_name(), "value conforms to schema"),
        Some(err) => tracing::debug!(
            schema = schema.type_name(),
            kinds = ?err.unique_kinds(),
            "value does not match schema"
        ),
    }
    report
}
