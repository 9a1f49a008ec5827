//! # Error Types
//!
//! Operational errors for schema descriptions and file loading. These are
//! distinct from validation results: a document that fails to match a schema
//! is reported through [`SchemaError`](crate::SchemaError), never through
//! the types below.

use thiserror::Error;

/// A schema description could not be turned into a [`Schema`](crate::Schema).
///
/// Every variant carries the JSON Pointer path inside the description where
/// the problem was found (empty for the root).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefinitionError {
    /// The `type` tag names no known schema shape.
    #[error("unknown schema type '{tag}' at {}", display_path(.path))]
    UnknownType {
        /// Location of the offending node.
        path: String,
        /// The tag as written.
        tag: String,
    },

    /// A composite tag (`array`, `object`, `union`) was written as a bare
    /// string. Only primitive tags have a string shorthand.
    #[error("'{tag}' at {} has no shorthand form; use {{\"type\": \"{tag}\", ...}}", display_path(.path))]
    NotPrimitive {
        /// Location of the offending node.
        path: String,
        /// The tag as written.
        tag: String,
    },

    /// An object-form node has no string `type` field.
    #[error("schema node at {} has no string 'type' field", display_path(.path))]
    MissingType {
        /// Location of the offending node.
        path: String,
    },

    /// A required field of a shape is absent or has the wrong form.
    #[error("schema node at {} has an invalid '{field}' field: expected {expected}", display_path(.path))]
    InvalidField {
        /// Location of the offending node.
        path: String,
        /// Field name within the node.
        field: &'static str,
        /// What the field should have been.
        expected: &'static str,
    },

    /// Array shorthand must contain exactly one element schema.
    #[error("array shorthand at {} must contain exactly one schema, found {len}", display_path(.path))]
    ShorthandArity {
        /// Location of the offending node.
        path: String,
        /// Number of elements actually present.
        len: usize,
    },

    /// The node is neither a tag string, a shorthand array, nor an object.
    #[error("schema node at {} must be a string, an array or an object, found {found}", display_path(.path))]
    InvalidNode {
        /// Location of the offending node.
        path: String,
        /// JSON type name of what was found.
        found: &'static str,
    },
}

/// Error loading a schema or document from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("invalid JSON in '{path}': {source}")]
    InvalidJson {
        /// Path that failed to parse.
        path: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The file is not valid YAML.
    #[error("invalid YAML in '{path}': {source}")]
    InvalidYaml {
        /// Path that failed to parse.
        path: String,
        /// Parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The YAML parsed but has no JSON equivalent.
    #[error("YAML-to-JSON conversion failed for '{path}': {reason}")]
    YamlConversion {
        /// Path being converted.
        path: String,
        /// Reason the conversion failed.
        reason: String,
    },

    /// The file parsed but is not a valid schema description.
    #[error("invalid schema in '{path}': {source}")]
    Definition {
        /// Path of the schema file.
        path: String,
        /// Description error.
        #[source]
        source: SchemaDefinitionError,
    },
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}
