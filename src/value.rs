//! The format-agnostic dynamic value tree consumed by the binding engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A string-keyed mapping of dynamic values, the shape every decoded
/// configuration document must have at its root.
pub type Mapping = BTreeMap<String, Value>;

/// A decoded configuration value, independent of the source format.
///
/// JSON and YAML documents deserialize directly into `Value`; TOML goes
/// through [`From<toml::Value>`] so datetimes can be carried as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

/// The kind of a [`Value`], used to describe coercion failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Sequence,
    Mapping,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Mapping(_) => ValueKind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Sequence(v)
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Value::Mapping(v)
    }
}

impl From<toml::Value> for Value {
    fn from(v: toml::Value) -> Self {
        match v {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Integer(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Into::into).collect())
            }
            toml::Value::Table(table) => Value::Mapping(
                table.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

/// Produces a copy of `mapping` with every mapping key lower-cased,
/// recursively through nested mappings.
///
/// Only mapping values are descended into; sequence elements and scalars
/// are left untouched. Keys that collide after lower-casing resolve to the
/// lexicographically last original key's value.
pub fn normalize_keys(mapping: &Mapping) -> Mapping {
    mapping
        .iter()
        .map(|(key, value)| {
            let folded = match value {
                Value::Mapping(nested) => Value::Mapping(normalize_keys(nested)),
                other => other.clone(),
            };
            (key.to_lowercase(), folded)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keys_recurses_into_mappings() {
        let mut inner = Mapping::new();
        inner.insert("Port".into(), Value::Integer(80));
        let mut outer = Mapping::new();
        outer.insert("Server".into(), Value::Mapping(inner));

        let folded = normalize_keys(&outer);
        let server = folded["server"].as_mapping().unwrap();
        assert_eq!(server["port"], Value::Integer(80));
    }

    #[test]
    fn test_normalize_keys_skips_sequence_elements() {
        let mut element = Mapping::new();
        element.insert("Name".into(), Value::from("x"));
        let mut outer = Mapping::new();
        outer.insert(
            "Items".into(),
            Value::Sequence(vec![Value::Mapping(element)]),
        );

        let folded = normalize_keys(&outer);
        let Value::Sequence(items) = &folded["items"] else {
            panic!("expected sequence");
        };
        // mappings inside sequences keep their original key case
        assert!(items[0].as_mapping().unwrap().contains_key("Name"));
    }

    #[test]
    fn test_json_decodes_into_value() {
        let value: Value =
            serde_json::from_str(r#"{"a": 1, "b": [true, null], "c": 1.5}"#).unwrap();
        let root = value.as_mapping().unwrap();
        assert_eq!(root["a"], Value::Integer(1));
        assert_eq!(
            root["b"],
            Value::Sequence(vec![Value::Bool(true), Value::Null])
        );
        assert_eq!(root["c"], Value::Float(1.5));
    }

    #[test]
    fn test_value_serializes_back_to_json() {
        let mut root = Mapping::new();
        root.insert("name".into(), Value::from("svc"));
        root.insert("port".into(), Value::Integer(80));
        let text = serde_json::to_string(&Value::Mapping(root)).unwrap();
        assert_eq!(text, r#"{"name":"svc","port":80}"#);
    }

    #[test]
    fn test_toml_datetime_becomes_string() {
        let parsed: toml::Value = toml::from_str("when = 2024-01-02T03:04:05Z").unwrap();
        let value = Value::from(parsed);
        let root = value.as_mapping().unwrap();
        assert_eq!(root["when"], Value::from("2024-01-02T03:04:05Z"));
    }
}
