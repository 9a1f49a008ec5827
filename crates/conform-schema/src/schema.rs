//! # Schema Model
//!
//! Typed schema trees and the parser for schema *descriptions*.
//!
//! A description is a JSON (or YAML) value in one of these forms:
//!
//! ```text
//! "string"                                       primitive shorthand
//! {"type": "int"}                                primitive
//! ["float"]                                      array shorthand
//! {"type": "array", "children": "float"}         array
//! {"type": "object", "properties": {
//!     "a": "int",
//!     "b": {"type": "bool", "optional": true}}}  object
//! {"type": "union", "types": ["string", "null"]} union
//! ```
//!
//! Shorthand forms are expanded while parsing, so a [`Schema`] is always in
//! canonical form and the matcher never sees sugar. Validators are closures
//! and can only be attached in code with [`Schema::with_validator`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::SchemaDefinitionError;
use crate::pointer;

/// Primitive schema tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    /// JSON `null`.
    Null,
    /// `true` or `false`.
    Bool,
    /// A number with no fractional part. Every `int` is also a `float`.
    Int,
    /// Any number.
    Float,
    /// A string.
    String,
    /// Any value at all.
    Unknown,
}

impl Primitive {
    /// All primitive tags, in declaration order.
    pub const ALL: [Primitive; 6] = [
        Primitive::Null,
        Primitive::Bool,
        Primitive::Int,
        Primitive::Float,
        Primitive::String,
        Primitive::Unknown,
    ];

    /// The tag as written in a description.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::String => "string",
            Primitive::Unknown => "unknown",
        }
    }

    /// Look up a primitive by its tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == tag)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type ValidatorFn = dyn Fn(&Value) -> Result<(), String> + Send + Sync;

/// A custom check run after a value has matched its schema structurally.
///
/// `Ok(())` accepts the value; `Err(message)` rejects it and the message is
/// reported verbatim. Cloning shares the underlying closure.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    /// Wrap a closure as a validator.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    /// Run the validator against a value.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        (self.0)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Two validators are equal only if they share the same closure.
impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// The structural shape of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// A primitive tag.
    Primitive(Primitive),
    /// A sequence whose every element matches `children`.
    Array {
        /// Element schema.
        children: Box<Schema>,
    },
    /// A keyed structure with a closed set of properties.
    Object {
        /// Declared properties by name.
        properties: BTreeMap<String, PropertySchema>,
    },
    /// A value matching at least one of `types`.
    Union {
        /// Alternatives, tried in order.
        types: Vec<Schema>,
    },
}

/// A schema node: a shape plus an optional validator.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaKind,
    validator: Option<Validator>,
}

/// A property of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchema {
    /// Schema the property value must match.
    pub schema: Schema,
    /// Whether the property may be absent.
    pub optional: bool,
}

impl PropertySchema {
    /// A property that must be present.
    pub fn required(schema: impl Into<Schema>) -> Self {
        Self {
            schema: schema.into(),
            optional: false,
        }
    }

    /// A property that may be absent.
    pub fn optional(schema: impl Into<Schema>) -> Self {
        Self {
            schema: schema.into(),
            optional: true,
        }
    }
}

impl From<Schema> for PropertySchema {
    fn from(schema: Schema) -> Self {
        Self::required(schema)
    }
}

impl From<Primitive> for PropertySchema {
    fn from(primitive: Primitive) -> Self {
        Self::required(primitive)
    }
}

impl From<Primitive> for Schema {
    fn from(primitive: Primitive) -> Self {
        Schema::primitive(primitive)
    }
}

impl Schema {
    /// A schema node with the given shape and no validator.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            validator: None,
        }
    }

    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(SchemaKind::Primitive(primitive))
    }

    pub fn null() -> Self {
        Self::primitive(Primitive::Null)
    }

    pub fn bool() -> Self {
        Self::primitive(Primitive::Bool)
    }

    pub fn int() -> Self {
        Self::primitive(Primitive::Int)
    }

    pub fn float() -> Self {
        Self::primitive(Primitive::Float)
    }

    pub fn string() -> Self {
        Self::primitive(Primitive::String)
    }

    pub fn unknown() -> Self {
        Self::primitive(Primitive::Unknown)
    }

    /// An array whose elements all match `children`.
    pub fn array(children: impl Into<Schema>) -> Self {
        Self::new(SchemaKind::Array {
            children: Box::new(children.into()),
        })
    }

    /// An object with the given properties.
    ///
    /// ```
    /// use conform_schema::{PropertySchema, Schema};
    ///
    /// let schema = Schema::object([
    ///     ("name", PropertySchema::required(Schema::string())),
    ///     ("age", PropertySchema::optional(Schema::int())),
    /// ]);
    /// assert_eq!(schema.type_name(), "object");
    /// ```
    pub fn object<K, P>(properties: impl IntoIterator<Item = (K, P)>) -> Self
    where
        K: Into<String>,
        P: Into<PropertySchema>,
    {
        Self::new(SchemaKind::Object {
            properties: properties
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        })
    }

    /// A union of alternatives.
    pub fn union(types: impl IntoIterator<Item = Schema>) -> Self {
        Self::new(SchemaKind::Union {
            types: types.into_iter().collect(),
        })
    }

    /// Attach a validator, replacing any previous one.
    pub fn with_validator<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Validator::new(check));
        self
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// The `type` tag of this node.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            SchemaKind::Primitive(p) => p.as_str(),
            SchemaKind::Array { .. } => "array",
            SchemaKind::Object { .. } => "object",
            SchemaKind::Union { .. } => "union",
        }
    }

    /// Parse a schema description, expanding shorthand forms.
    ///
    /// Unrecognised fields of object-form nodes are ignored, so descriptions
    /// may carry annotations such as `description`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] naming the first malformed node.
    pub fn from_value(description: &Value) -> Result<Self, SchemaDefinitionError> {
        parse_node(description, "")
    }

    /// The canonical description of this schema.
    ///
    /// Every node is written in object form. Validators cannot be
    /// represented and are omitted.
    pub fn to_value(&self) -> Value {
        let mut node = Map::new();
        node.insert("type".into(), Value::String(self.type_name().into()));
        match &self.kind {
            SchemaKind::Primitive(_) => {}
            SchemaKind::Array { children } => {
                node.insert("children".into(), children.to_value());
            }
            SchemaKind::Object { properties } => {
                let props = properties
                    .iter()
                    .map(|(name, property)| {
                        let mut value = property.schema.to_value();
                        if property.optional {
                            if let Value::Object(map) = &mut value {
                                map.insert("optional".into(), Value::Bool(true));
                            }
                        }
                        (name.clone(), value)
                    })
                    .collect();
                node.insert("properties".into(), Value::Object(props));
            }
            SchemaKind::Union { types } => {
                node.insert(
                    "types".into(),
                    Value::Array(types.iter().map(Schema::to_value).collect()),
                );
            }
        }
        Value::Object(node)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let description = Value::deserialize(deserializer)?;
        Schema::from_value(&description).map_err(serde::de::Error::custom)
    }
}

fn parse_node(value: &Value, path: &str) -> Result<Schema, SchemaDefinitionError> {
    match value {
        Value::String(tag) => parse_tag(tag, path),
        Value::Array(items) => match items.as_slice() {
            [children] => Ok(Schema::array(parse_node(children, &pointer::push(path, "0"))?)),
            _ => Err(SchemaDefinitionError::ShorthandArity {
                path: path.to_string(),
                len: items.len(),
            }),
        },
        Value::Object(node) => parse_object_form(node, path),
        other => Err(SchemaDefinitionError::InvalidNode {
            path: path.to_string(),
            found: pointer::json_type_name(other),
        }),
    }
}

fn parse_tag(tag: &str, path: &str) -> Result<Schema, SchemaDefinitionError> {
    if let Some(primitive) = Primitive::from_tag(tag) {
        return Ok(Schema::primitive(primitive));
    }
    match tag {
        "array" | "object" | "union" => Err(SchemaDefinitionError::NotPrimitive {
            path: path.to_string(),
            tag: tag.to_string(),
        }),
        _ => Err(SchemaDefinitionError::UnknownType {
            path: path.to_string(),
            tag: tag.to_string(),
        }),
    }
}

fn parse_object_form(node: &Map<String, Value>, path: &str) -> Result<Schema, SchemaDefinitionError> {
    let tag = node
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaDefinitionError::MissingType {
            path: path.to_string(),
        })?;

    if let Some(primitive) = Primitive::from_tag(tag) {
        return Ok(Schema::primitive(primitive));
    }

    match tag {
        "array" => {
            let children = node.get("children").ok_or(SchemaDefinitionError::InvalidField {
                path: path.to_string(),
                field: "children",
                expected: "a schema",
            })?;
            let children = parse_node(children, &pointer::push(path, "children"))?;
            Ok(Schema::array(children))
        }
        "object" => {
            let declared = node
                .get("properties")
                .and_then(Value::as_object)
                .ok_or(SchemaDefinitionError::InvalidField {
                    path: path.to_string(),
                    field: "properties",
                    expected: "an object mapping names to schemas",
                })?;
            let props_path = pointer::push(path, "properties");
            let mut properties = BTreeMap::new();
            for (name, description) in declared {
                let prop_path = pointer::push(&props_path, name);
                let property = parse_property(description, &prop_path)?;
                properties.insert(name.clone(), property);
            }
            Ok(Schema::new(SchemaKind::Object { properties }))
        }
        "union" => {
            let alternatives = node
                .get("types")
                .and_then(Value::as_array)
                .ok_or(SchemaDefinitionError::InvalidField {
                    path: path.to_string(),
                    field: "types",
                    expected: "an array of schemas",
                })?;
            let types_path = pointer::push(path, "types");
            let types = alternatives
                .iter()
                .enumerate()
                .map(|(i, t)| parse_node(t, &pointer::push(&types_path, &i.to_string())))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Schema::union(types))
        }
        _ => Err(SchemaDefinitionError::UnknownType {
            path: path.to_string(),
            tag: tag.to_string(),
        }),
    }
}

/// Shorthand property descriptions are always required.
fn parse_property(description: &Value, path: &str) -> Result<PropertySchema, SchemaDefinitionError> {
    let optional = match description.get("optional") {
        None => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => {
            return Err(SchemaDefinitionError::InvalidField {
                path: path.to_string(),
                field: "optional",
                expected: "a boolean",
            })
        }
    };
    Ok(PropertySchema {
        schema: parse_node(description, path)?,
        optional,
    })
}
