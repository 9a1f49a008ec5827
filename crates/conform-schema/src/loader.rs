//! # Loading Schemas and Documents
//!
//! Reads schema descriptions and documents from disk. The format is chosen
//! from the file extension: `.yaml`/`.yml` are parsed as YAML and converted
//! to the JSON value model, everything else is parsed as JSON.

use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;
use crate::schema::Schema;

/// On-disk format of a schema or document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

/// Load a document as a JSON value.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let format = DocumentFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, bytes = content.len(), "loaded document");
    parse_document(&content, format, &path.display().to_string())
}

/// Load and parse a schema description.
///
/// # Errors
///
/// Returns [`LoadError::Definition`] if the file parses but is not a valid
/// schema, or any other [`LoadError`] if it cannot be read or parsed.
pub fn load_schema(path: &Path) -> Result<Schema, LoadError> {
    let description = load_document(path)?;
    Schema::from_value(&description).map_err(|source| LoadError::Definition {
        path: path.display().to_string(),
        source,
    })
}

/// Parse document text in the given format. `origin` names the source in
/// error messages.
pub fn parse_document(content: &str, format: DocumentFormat, origin: &str) -> Result<Value, LoadError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|source| LoadError::InvalidJson {
            path: origin.to_string(),
            source,
        }),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml {
                    path: origin.to_string(),
                    source,
                })?;
            yaml_to_json_value(&yaml).map_err(|reason| LoadError::YamlConversion {
                path: origin.to_string(),
                reason,
            })
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Mapping keys must be strings, numbers or booleans; non-string keys are
/// stringified. YAML tags are dropped and the tagged value kept.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
