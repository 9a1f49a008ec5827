//! # Matcher
//!
//! Recursive structural matching of a value against a [`Schema`].
//!
//! [`find_type_error`] walks the value and schema together and returns an
//! [`ErrorNode`] tree describing every divergence, or `None` when the value
//! conforms. Errors are aggregated rather than short-circuited: every array
//! element and every object property is checked. Two rules limit the walk:
//!
//! - An undeclared object property is reported as
//!   [`SchemaErrorKind::UnknownProperty`] and its value is not inspected.
//! - A union reports its branch errors only if *every* branch fails.
//!
//! A node's validator runs only once the node has matched structurally, so a
//! node never carries both a structural error and a validator error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::schema::{Primitive, PropertySchema, Schema, SchemaKind};

const PROPERTY_NOT_ALLOWED: &str = "property not allowed";
const PROPERTY_MISSING: &str = "property missing";
const NO_APPLICABLE_UNION_TYPE: &str = "does not match any type in the union type";

/// The closed set of ways a value can diverge from its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaErrorKind {
    /// The value has a property its object schema does not declare.
    UnknownProperty,
    /// A required declared property is absent.
    MissingProperty,
    /// The value's runtime type does not match the schema tag.
    WrongType,
    /// The value matched structurally but its validator rejected it.
    ValidatorFailed,
    /// No alternative of a union matched.
    NoApplicableUnionType,
}

impl SchemaErrorKind {
    pub const ALL: [SchemaErrorKind; 5] = [
        SchemaErrorKind::UnknownProperty,
        SchemaErrorKind::MissingProperty,
        SchemaErrorKind::WrongType,
        SchemaErrorKind::ValidatorFailed,
        SchemaErrorKind::NoApplicableUnionType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaErrorKind::UnknownProperty => "unknown_property",
            SchemaErrorKind::MissingProperty => "missing_property",
            SchemaErrorKind::WrongType => "wrong_type",
            SchemaErrorKind::ValidatorFailed => "validator_failed",
            SchemaErrorKind::NoApplicableUnionType => "no_applicable_union_type",
        }
    }
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error recorded at a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub kind: SchemaErrorKind,
    pub message: String,
}

/// Divergence at one point of the value tree.
///
/// `properties` holds child errors keyed by property name, array index, or
/// `type_<n>` for union branches. An empty map means no child diverged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorNode {
    pub error: Option<ErrorDetail>,
    pub properties: BTreeMap<String, ErrorNode>,
}

impl ErrorNode {
    /// A node carrying only its own error.
    pub fn leaf(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: Some(ErrorDetail {
                kind,
                message: message.into(),
            }),
            properties: BTreeMap::new(),
        }
    }

    /// A node carrying only child errors.
    pub fn branch(properties: BTreeMap<String, ErrorNode>) -> Self {
        Self {
            error: None,
            properties,
        }
    }

    /// True if the node records no divergence at all.
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.properties.is_empty()
    }

    pub fn kind(&self) -> Option<SchemaErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Child error under `key`.
    pub fn get(&self, key: &str) -> Option<&ErrorNode> {
        self.properties.get(key)
    }
}

/// Match `value` against `schema`.
///
/// Returns `None` if the value conforms, otherwise the tree of every
/// divergence found.
pub fn find_type_error(value: &Value, schema: &Schema) -> Option<ErrorNode> {
    let structural = match schema.kind() {
        SchemaKind::Primitive(primitive) => match_primitive(value, *primitive),
        SchemaKind::Array { children } => match_array(value, children),
        SchemaKind::Object { properties } => match_object(value, properties),
        SchemaKind::Union { types } => match_union(value, types),
    };

    if !structural.is_empty() {
        return Some(structural);
    }

    let validator = schema.validator()?;
    match validator.check(value) {
        Ok(()) => None,
        Err(message) => Some(ErrorNode::leaf(SchemaErrorKind::ValidatorFailed, message)),
    }
}

fn wrong_type(tag: &str) -> ErrorNode {
    ErrorNode::leaf(SchemaErrorKind::WrongType, format!("expected {tag}"))
}

fn match_primitive(value: &Value, primitive: Primitive) -> ErrorNode {
    let conforming = match primitive {
        Primitive::Null => value.is_null(),
        Primitive::Bool => value.is_boolean(),
        Primitive::Int => matches!(value, Value::Number(n) if is_integral(n)),
        Primitive::Float => value.is_number(),
        Primitive::String => value.is_string(),
        Primitive::Unknown => true,
    };
    if conforming {
        ErrorNode::default()
    } else {
        wrong_type(primitive.as_str())
    }
}

/// Integers and floats with no fractional part, e.g. `3` and `3.0`.
fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn match_array(value: &Value, children: &Schema) -> ErrorNode {
    let Some(items) = value.as_array() else {
        return wrong_type("array");
    };

    let properties = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            find_type_error(item, children).map(|err| (index.to_string(), err))
        })
        .collect();
    ErrorNode::branch(properties)
}

fn match_object(value: &Value, declared: &BTreeMap<String, PropertySchema>) -> ErrorNode {
    let Some(fields) = value.as_object() else {
        return wrong_type("object");
    };

    let mut properties = BTreeMap::new();
    check_present_fields(fields, declared, &mut properties);
    check_missing_fields(fields, declared, &mut properties);
    ErrorNode::branch(properties)
}

fn check_present_fields(
    fields: &Map<String, Value>,
    declared: &BTreeMap<String, PropertySchema>,
    out: &mut BTreeMap<String, ErrorNode>,
) {
    for (key, field) in fields {
        let Some(property) = declared.get(key) else {
            out.insert(
                key.clone(),
                ErrorNode::leaf(SchemaErrorKind::UnknownProperty, PROPERTY_NOT_ALLOWED),
            );
            continue;
        };
        if let Some(err) = find_type_error(field, &property.schema) {
            out.insert(key.clone(), err);
        }
    }
}

// Only touches keys absent from `fields`, so it never overwrites an entry
// from `check_present_fields`.
fn check_missing_fields(
    fields: &Map<String, Value>,
    declared: &BTreeMap<String, PropertySchema>,
    out: &mut BTreeMap<String, ErrorNode>,
) {
    for (key, property) in declared {
        if !property.optional && !fields.contains_key(key) {
            out.insert(
                key.clone(),
                ErrorNode::leaf(SchemaErrorKind::MissingProperty, PROPERTY_MISSING),
            );
        }
    }
}

fn match_union(value: &Value, types: &[Schema]) -> ErrorNode {
    let mut branch_errors = BTreeMap::new();
    let mut matched = false;
    for (index, alternative) in types.iter().enumerate() {
        match find_type_error(value, alternative) {
            None => matched = true,
            Some(err) => {
                branch_errors.insert(format!("type_{index}"), err);
            }
        }
    }

    if matched {
        return ErrorNode::default();
    }
    ErrorNode {
        error: Some(ErrorDetail {
            kind: SchemaErrorKind::NoApplicableUnionType,
            message: NO_APPLICABLE_UNION_TYPE.to_string(),
        }),
        properties: branch_errors,
    }
}

/// Convenience for callers that only need a yes/no answer.
pub fn conforms(value: &Value, schema: &Schema) -> bool {
    find_type_error(value, schema).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn parse(description: Value) -> Schema {
        Schema::from_value(&description).unwrap()
    }

    fn kinds(node: &ErrorNode) -> Vec<SchemaErrorKind> {
        let mut out = Vec::new();
        if let Some(kind) = node.kind() {
            out.push(kind);
        }
        for child in node.properties.values() {
            out.extend(kinds(child));
        }
        out.sort();
        out.dedup();
        out
    }

    #[test]
    fn validates_number_types() {
        let schema = Schema::float();
        assert_eq!(find_type_error(&json!(1), &schema), None);
        assert_eq!(find_type_error(&json!(1.5), &schema), None);
        assert!(find_type_error(&json!(""), &schema).is_some());
    }

    #[test]
    fn validates_boolean_types() {
        let schema = Schema::bool();
        assert_eq!(find_type_error(&json!(true), &schema), None);
        assert!(find_type_error(&json!(1), &schema).is_some());
    }

    #[test]
    fn validates_string_types() {
        assert_eq!(find_type_error(&json!(""), &Schema::string()), None);
        assert!(find_type_error(&json!(null), &Schema::string()).is_some());
    }

    #[test]
    fn validates_null_type() {
        assert_eq!(find_type_error(&json!(null), &Schema::null()), None);
        assert!(find_type_error(&json!(0), &Schema::null()).is_some());
        assert!(find_type_error(&json!(false), &Schema::null()).is_some());
    }

    #[test]
    fn validates_int_types() {
        let schema = Schema::int();
        assert_eq!(find_type_error(&json!(1), &schema), None);
        assert_eq!(find_type_error(&json!(-7), &schema), None);
        assert_eq!(find_type_error(&json!(u64::MAX), &schema), None);
        assert_eq!(find_type_error(&json!(2.0), &schema), None);
        assert!(find_type_error(&json!(0.5), &schema).is_some());
        assert!(find_type_error(&json!(""), &schema).is_some());
    }

    #[test]
    fn unknown_accepts_everything() {
        for value in [json!(null), json!(1), json!("x"), json!([1]), json!({ "a": 1 })] {
            assert_eq!(find_type_error(&value, &Schema::unknown()), None);
        }
    }

    #[test]
    fn wrong_type_messages_name_the_tag() {
        for (schema, value, message) in [
            (Schema::null(), json!(0), "expected null"),
            (Schema::bool(), json!("true"), "expected bool"),
            (Schema::int(), json!("1"), "expected int"),
            (Schema::float(), json!([1.5]), "expected float"),
            (Schema::string(), json!(null), "expected string"),
            (Schema::array(Schema::int()), json!({}), "expected array"),
            (Schema::object::<&str, PropertySchema>([]), json!([]), "expected object"),
        ] {
            let err = find_type_error(&value, &schema).unwrap();
            assert_eq!(err.kind(), Some(SchemaErrorKind::WrongType));
            assert_eq!(err.message(), Some(message));
            assert!(err.properties.is_empty());
        }
    }

    #[test]
    fn works_with_arrays() {
        let schema = parse(json!(["int"]));
        assert!(find_type_error(&json!(1), &schema).is_some());
        assert_eq!(find_type_error(&json!([0, 1, 2]), &schema), None);
        assert_eq!(find_type_error(&json!([]), &schema), None);
    }

    #[test]
    fn checks_all_elements_in_an_array() {
        let schema = parse(json!(["int"]));
        let err = find_type_error(&json!([-1, 0.5, 1, 2, true]), &schema).unwrap();
        assert_eq!(err.error, None);
        let keys: Vec<_> = err.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["1", "4"]);
        assert_eq!(err.get("4").and_then(ErrorNode::message), Some("expected int"));
    }

    #[test]
    fn works_with_objects() {
        let schema = parse(json!({
            "type": "object",
            "properties": {
                "a": "bool",
                "b": ["int"],
                "c": {
                    "type": "object",
                    "properties": { "d": { "type": "string", "optional": true } }
                }
            }
        }));
        assert_eq!(
            find_type_error(&json!({ "a": false, "b": [1], "c": { "d": "" } }), &schema),
            None
        );
        assert_eq!(find_type_error(&json!({ "a": false, "b": [1], "c": {} }), &schema), None);
    }

    #[test]
    fn object_rejects_non_objects() {
        let schema = parse(json!({ "type": "object", "properties": {} }));
        for value in [json!(null), json!([]), json!("x"), json!(3)] {
            let err = find_type_error(&value, &schema).unwrap();
            assert_eq!(err.message(), Some("expected object"));
            assert!(err.properties.is_empty());
        }
    }

    #[test]
    fn missing_required_property_only() {
        let schema = parse(json!({
            "type": "object",
            "properties": {
                "a": "string",
                "b": { "type": "bool", "optional": true }
            }
        }));
        let err = find_type_error(&json!({}), &schema).unwrap();
        assert_eq!(kinds(&err), [SchemaErrorKind::MissingProperty]);
        assert_eq!(err.properties.len(), 1);
        assert_eq!(err.get("a").and_then(ErrorNode::message), Some("property missing"));
    }

    #[test]
    fn unknown_property_only() {
        let schema = parse(json!({
            "type": "object",
            "properties": {
                "a": "string",
                "b": { "type": "bool", "optional": true }
            }
        }));
        let err = find_type_error(&json!({ "a": "x", "c": 1 }), &schema).unwrap();
        assert_eq!(kinds(&err), [SchemaErrorKind::UnknownProperty]);
        assert_eq!(err.properties.len(), 1);
        assert_eq!(
            err.get("c").and_then(ErrorNode::message),
            Some("property not allowed")
        );
    }

    #[test]
    fn unknown_property_value_is_not_inspected() {
        let schema = Schema::object::<&str, PropertySchema>([]);
        let err = find_type_error(&json!({ "x": { "deep": [1, 2, 3] } }), &schema).unwrap();
        let x = err.get("x").unwrap();
        assert_eq!(x.kind(), Some(SchemaErrorKind::UnknownProperty));
        assert!(x.properties.is_empty());
    }

    #[test]
    fn null_property_is_present_not_missing() {
        let schema = Schema::object([("a", PropertySchema::required(Schema::string()))]);
        let err = find_type_error(&json!({ "a": null }), &schema).unwrap();
        let a = err.get("a").unwrap();
        assert_eq!(a.kind(), Some(SchemaErrorKind::WrongType));
    }

    #[test]
    fn optional_property_is_still_type_checked() {
        let schema = Schema::object([("b", PropertySchema::optional(Schema::bool()))]);
        assert_eq!(find_type_error(&json!({}), &schema), None);
        let err = find_type_error(&json!({ "b": "yes" }), &schema).unwrap();
        assert_eq!(err.get("b").and_then(ErrorNode::kind), Some(SchemaErrorKind::WrongType));
    }

    #[test]
    fn nested_errors_keep_their_paths() {
        let schema = parse(json!({
            "type": "object",
            "properties": {
                "items": [{ "type": "object", "properties": { "id": "int" } }]
            }
        }));
        let err = find_type_error(&json!({ "items": [{ "id": 1 }, { "id": "2" }, {}] }), &schema)
            .unwrap();
        let items = err.get("items").unwrap();
        assert_eq!(items.error, None);
        assert_eq!(
            items.get("1").and_then(|n| n.get("id")).and_then(ErrorNode::kind),
            Some(SchemaErrorKind::WrongType)
        );
        assert_eq!(
            items.get("2").and_then(|n| n.get("id")).and_then(ErrorNode::kind),
            Some(SchemaErrorKind::MissingProperty)
        );
        assert!(items.get("0").is_none());
    }

    #[test]
    fn union_accepts_any_branch() {
        let schema = parse(json!({ "type": "union", "types": ["string", "null"] }));
        assert_eq!(find_type_error(&json!("x"), &schema), None);
        assert_eq!(find_type_error(&json!(null), &schema), None);
    }

    #[test]
    fn union_reports_every_branch() {
        let first = Schema::string();
        let second = parse(json!(["int"]));
        let schema = Schema::union([first.clone(), second.clone()]);
        let value = json!(["a"]);

        let err = find_type_error(&value, &schema).unwrap();
        assert_eq!(err.kind(), Some(SchemaErrorKind::NoApplicableUnionType));
        assert_eq!(err.message(), Some("does not match any type in the union type"));
        assert_eq!(err.properties.len(), 2);
        assert_eq!(err.get("type_0"), find_type_error(&value, &first).as_ref());
        assert_eq!(err.get("type_1"), find_type_error(&value, &second).as_ref());
    }

    #[test]
    fn empty_union_matches_nothing() {
        let schema = Schema::union([]);
        let err = find_type_error(&json!(1), &schema).unwrap();
        assert_eq!(err.kind(), Some(SchemaErrorKind::NoApplicableUnionType));
        assert!(err.properties.is_empty());
    }

    #[test]
    fn int_and_float_union_overlap() {
        let schema = Schema::union([Schema::int(), Schema::float()]);
        assert_eq!(find_type_error(&json!(3), &schema), None);
        assert_eq!(find_type_error(&json!(3.5), &schema), None);
    }

    #[test]
    fn works_with_custom_validators() {
        let schema = Schema::float().with_validator(|n| {
            if n == &json!(42) {
                Ok(())
            } else {
                Err("number must be 42".into())
            }
        });
        let err = find_type_error(&json!(1), &schema).unwrap();
        assert_eq!(err.kind(), Some(SchemaErrorKind::ValidatorFailed));
        assert_eq!(err.message(), Some("number must be 42"));
        assert_eq!(find_type_error(&json!(42), &schema), None);
    }

    #[test]
    fn structural_error_suppresses_validator() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = Schema::string().with_validator(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("bad".into())
        });

        let err = find_type_error(&json!(5), &schema).unwrap();
        assert_eq!(err.kind(), Some(SchemaErrorKind::WrongType));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let err = find_type_error(&json!("s"), &schema).unwrap();
        assert_eq!(err.kind(), Some(SchemaErrorKind::ValidatorFailed));
        assert_eq!(err.message(), Some("bad"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn child_errors_suppress_container_validator() {
        let schema = Schema::array(Schema::int()).with_validator(|_| Err("never".into()));
        let err = find_type_error(&json!([1, "x"]), &schema).unwrap();
        assert_eq!(err.error, None);
        assert!(err.get("1").is_some());
    }

    #[test]
    fn validator_runs_on_matched_union() {
        let schema = Schema::union([Schema::int(), Schema::string()])
            .with_validator(|v| if v.is_string() { Err("no strings".into()) } else { Ok(()) });
        assert_eq!(find_type_error(&json!(1), &schema), None);
        let err = find_type_error(&json!("a"), &schema).unwrap();
        assert_eq!(err.kind(), Some(SchemaErrorKind::ValidatorFailed));
        assert!(err.properties.is_empty());
    }

    #[test]
    fn validator_on_unknown() {
        let schema = Schema::unknown().with_validator(|v| {
            if v.is_null() {
                Err("must not be null".into())
            } else {
                Ok(())
            }
        });
        assert!(conforms(&json!(0), &schema));
        assert!(!conforms(&json!(null), &schema));
    }
}
