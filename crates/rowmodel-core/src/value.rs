//! Column values.
//!
//! A [`Value`] is what a row stores under a column name: a scalar, an embedded
//! array, or an embedded object carrying its runtime type. `Value::Null` doubles
//! as the marker for an absent column.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::type_name::TypeName;

/// A value stored in a row column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL, or no such column.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Embedded sequence.
    Array(Vec<Value>),
    /// Embedded composite value with a runtime type.
    Object(EmbeddedObject),
}

/// An embedded composite value.
///
/// Serialized as a JSON object whose `$type` member names the runtime type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedObject {
    #[serde(rename = "$type")]
    pub type_name: TypeName,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl EmbeddedObject {
    /// Create an object of the given runtime type with no fields.
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl Value {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer payload, if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text payload, if this is `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean payload, if this is `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Array elements, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Embedded object, if this is an `Object`.
    pub fn as_object(&self) -> Option<&EmbeddedObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short description of the runtime shape, used in error messages.
    pub fn type_label(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "boolean".to_string(),
            Value::Int(_) => "integer".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Text(_) => "string".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Object(obj) => format!("instance of '{}'", obj.type_name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => write!(f, "{}{{..}}", obj.type_name),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<EmbeddedObject> for Value {
    fn from(v: EmbeddedObject) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_scalars() {
        let v: Value = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(v, Value::Int(42));
        let v: Value = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(v, Value::Float(1.5));
        let v: Value = serde_json::from_value(json!("x")).unwrap();
        assert_eq!(v, Value::Text("x".to_string()));
        let v: Value = serde_json::from_value(json!(null)).unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_deserialize_embedded_object() {
        let v: Value =
            serde_json::from_value(json!({"$type": "model::Address", "city": "Brno"})).unwrap();
        let obj = v.as_object().expect("object");
        assert_eq!(obj.type_name.as_str(), "model::Address");
        assert_eq!(obj.fields["city"], Value::Text("Brno".to_string()));
    }

    #[test]
    fn test_type_label() {
        assert_eq!(Value::Int(1).type_label(), "integer");
        assert_eq!(
            Value::Object(EmbeddedObject::new("model::Tag")).type_label(),
            "instance of 'model::Tag'"
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".to_string()));
    }
}
