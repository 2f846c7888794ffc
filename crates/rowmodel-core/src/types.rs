//! Scalar property types and the coercion policy applied on property reads.
//!
//! | target    | Int            | Float              | Bool      | Text                              | Array / Object |
//! |-----------|----------------|--------------------|-----------|-----------------------------------|----------------|
//! | `Integer` | as is          | truncated, saturating, NaN → 0 | 0 / 1 | parsed as i64, else as f64 then truncated | mismatch |
//! | `Float`   | widened        | as is              | 0.0 / 1.0 | parsed as f64                     | mismatch       |
//! | `String`  | decimal text   | shortest text      | "1" / ""  | as is                             | mismatch       |
//! | `Boolean` | != 0           | != 0.0             | as is     | not "" and not "0"                | mismatch       |
//! | `Array`   | wrapped        | wrapped            | wrapped   | wrapped                           | Array as is, Object wrapped |
//!
//! Text that is not a decimal number (including `inf` and `nan` spellings) is a type
//! mismatch for numeric targets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Declared type of a scalar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Integer,
    Float,
    String,
    Boolean,
    Array,
}

impl ScalarType {
    /// Parse a type keyword as written in a property declaration.
    ///
    /// Returns `None` for anything that is not a scalar keyword (i.e. an entity type).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "int" | "integer" => Some(ScalarType::Integer),
            "float" | "double" => Some(ScalarType::Float),
            "string" => Some(ScalarType::String),
            "bool" | "boolean" => Some(ScalarType::Boolean),
            "array" => Some(ScalarType::Array),
            _ => None,
        }
    }

    /// Canonical keyword.
    pub const fn keyword(self) -> &'static str {
        match self {
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::String => "string",
            ScalarType::Boolean => "boolean",
            ScalarType::Array => "array",
        }
    }

    /// Check whether `value` already has this type.
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ScalarType::Integer, Value::Int(_))
                | (ScalarType::Float, Value::Float(_))
                | (ScalarType::String, Value::Text(_))
                | (ScalarType::Boolean, Value::Bool(_))
                | (ScalarType::Array, Value::Array(_))
        )
    }

    /// Coerce a non-null raw column value of `property` to this type.
    ///
    /// `Value::Null` is passed through untouched; nullability is the caller's concern.
    pub fn coerce(self, property: &str, value: Value) -> Result<Value> {
        if value.is_null() || self.matches(&value) {
            return Ok(value);
        }
        let mismatch = |value: &Value| Error::TypeMismatch {
            property: property.to_string(),
            expected: self.keyword().to_string(),
            found: value.type_label(),
        };
        match self {
            ScalarType::Integer => match &value {
                Value::Float(f) => Ok(Value::Int(float_to_int(*f))),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Text(s) => parse_int(s).map(Value::Int).ok_or_else(|| mismatch(&value)),
                _ => Err(mismatch(&value)),
            },
            ScalarType::Float => match &value {
                Value::Int(i) => Ok(Value::Float(*i as f64)),
                Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
                Value::Text(s) => parse_float(s)
                    .map(Value::Float)
                    .ok_or_else(|| mismatch(&value)),
                _ => Err(mismatch(&value)),
            },
            ScalarType::String => match &value {
                Value::Int(i) => Ok(Value::Text(i.to_string())),
                Value::Float(f) => Ok(Value::Text(f.to_string())),
                Value::Bool(b) => Ok(Value::Text(if *b { "1" } else { "" }.to_string())),
                _ => Err(mismatch(&value)),
            },
            ScalarType::Boolean => match &value {
                Value::Int(i) => Ok(Value::Bool(*i != 0)),
                Value::Float(f) => Ok(Value::Bool(*f != 0.0)),
                Value::Text(s) => Ok(Value::Bool(!(s.is_empty() || s == "0"))),
                _ => Err(mismatch(&value)),
            },
            ScalarType::Array => Ok(Value::Array(vec![value])),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

fn float_to_int(f: f64) -> i64 {
    // `as` saturates at the i64 bounds and maps NaN to 0.
    f.trunc() as i64
}

/// Decimal text only: `f64::from_str` also takes `inf` and `nan` spellings.
fn is_decimal(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if !is_decimal(s) {
        return None;
    }
    s.parse::<f64>().ok()
}

fn parse_int(s: &str) -> Option<i64> {
    s.trim()
        .parse::<i64>()
        .ok()
        .or_else(|| parse_float(s).map(float_to_int))
}
