//! # Error Report
//!
//! [`SchemaError`] owns the [`ErrorNode`] tree of one failed validation and
//! answers questions about it:
//!
//! - [`SchemaError::unique_kinds`] / [`SchemaError::only`]: which error
//!   kinds occur anywhere in the tree.
//! - [`SchemaError::summary`]: the externally visible projection of messages
//!   and nested properties, with kind tags dropped. This is what callers
//!   should send back over an API.
//! - [`SchemaError::violations`]: the tree flattened into JSON Pointer
//!   addressed entries, for logs and terminal output.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::matcher::{ErrorNode, SchemaErrorKind};
use crate::pointer;

/// A value did not match its schema.
///
/// Constructed once per failed validation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    root: ErrorNode,
}

impl SchemaError {
    pub fn new(root: ErrorNode) -> Self {
        Self { root }
    }

    /// The underlying error tree.
    pub fn error_node(&self) -> &ErrorNode {
        &self.root
    }

    pub fn into_error_node(self) -> ErrorNode {
        self.root
    }

    /// Every error kind occurring anywhere in the tree, once each.
    pub fn unique_kinds(&self) -> BTreeSet<SchemaErrorKind> {
        let mut kinds = BTreeSet::new();
        collect_kinds(&self.root, &mut kinds);
        kinds
    }

    /// True iff `kinds` covers every kind occurring in the tree.
    ///
    /// ```
    /// use conform_schema::{find_schema_error, Schema, SchemaErrorKind};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object([("a", Schema::string())]);
    /// let err = find_schema_error(&json!({ "a": "x", "b": 1 }), &schema).unwrap();
    ///
    /// assert!(err.only(&[SchemaErrorKind::UnknownProperty]));
    /// assert!(err.only(&[SchemaErrorKind::UnknownProperty, SchemaErrorKind::MissingProperty]));
    /// assert!(!err.only(&[]));
    /// ```
    pub fn only(&self, kinds: &[SchemaErrorKind]) -> bool {
        let allowed: BTreeSet<_> = kinds.iter().copied().collect();
        self.unique_kinds().is_subset(&allowed)
    }

    /// The tree with kind tags removed.
    pub fn summary(&self) -> ErrorSummary {
        ErrorSummary::from(&self.root)
    }

    /// [`summary`](Self::summary) as a JSON value.
    pub fn to_json(&self) -> Value {
        summary_to_json(&self.summary())
    }

    /// All errors in the tree, depth-first, each with its location.
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        collect_violations(&self.root, "", &mut out);
        out
    }
}

impl From<ErrorNode> for SchemaError {
    fn from(root: ErrorNode) -> Self {
        Self::new(root)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value does not match schema:")?;
        for violation in self.violations() {
            write!(f, "\n{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Serializes as the kind-free [`ErrorSummary`].
impl Serialize for SchemaError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.summary().serialize(serializer)
    }
}

/// Kind-free projection of an [`ErrorNode`].
///
/// `message` is omitted for nodes without an error of their own and
/// `properties` is omitted when no child diverged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ErrorSummary>,
}

impl From<&ErrorNode> for ErrorSummary {
    fn from(node: &ErrorNode) -> Self {
        Self {
            message: node.message().map(str::to_string),
            properties: node
                .properties
                .iter()
                .map(|(key, child)| (key.clone(), ErrorSummary::from(child)))
                .collect(),
        }
    }
}

/// A single error with its location in the validated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer to the offending value; union branches appear as
    /// `type_<n>` segments.
    pub path: String,
    pub kind: SchemaErrorKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path, self.message)
        }
    }
}

fn collect_kinds(node: &ErrorNode, out: &mut BTreeSet<SchemaErrorKind>) {
    if let Some(kind) = node.kind() {
        out.insert(kind);
    }
    for child in node.properties.values() {
        collect_kinds(child, out);
    }
}

fn collect_violations(node: &ErrorNode, path: &str, out: &mut Vec<Violation>) {
    if let Some(error) = &node.error {
        out.push(Violation {
            path: path.to_string(),
            kind: error.kind,
            message: error.message.clone(),
        });
    }
    for (key, child) in &node.properties {
        collect_violations(child, &pointer::push(path, key), out);
    }
}

fn summary_to_json(summary: &ErrorSummary) -> Value {
    let mut node = serde_json::Map::new();
    if let Some(message) = &summary.message {
        node.insert("message".into(), Value::String(message.clone()));
    }
    if !summary.properties.is_empty() {
        let properties = summary
            .properties
            .iter()
            .map(|(key, child)| (key.clone(), summary_to_json(child)))
            .collect();
        node.insert("properties".into(), Value::Object(properties));
    }
    Value::Object(node)
}
