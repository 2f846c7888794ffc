//! Enumerations of legal property values (the `m:enum` flag).
//!
//! A definition references a set of named constants on a type, optionally
//! narrowed to the constants whose names start with a prefix:
//!
//! ```text
//! self::STATUS_*          constants of the declaring type starting with STATUS_
//! static::*               every constant of the declaring type
//! parent::KIND_*          constants of the supertype
//! model::Status::*        constants of another type (aliases apply)
//! ```
//!
//! Membership uses array-key semantics: integers, floats, booleans and
//! canonical integer strings (`"1"`, not `"01"`) share one key space, so `1`,
//! `1.0`, `true` and `"1"` are the same member. Floats are truncated toward
//! zero first, so `1.5` is a member wherever `1` is. Other strings compare
//! exactly; null, arrays and objects are never members.

use std::collections::HashSet;

use rowmodel_core::{Error, Result, TypeName, Value};
use serde::Serialize;

use crate::definition::Constant;
use crate::grammar;

/// Where an enumeration definition looks up constants.
pub trait ConstantSource {
    /// The type the definition is declared on.
    fn declaring_type(&self) -> &TypeName;

    /// Constants of the declaring type, inherited ones included.
    fn own_constants(&self) -> Vec<Constant>;

    /// Constants of the declaring type's supertype, or `None` without one.
    fn parent_constants(&self) -> Option<Vec<Constant>>;

    /// Resolve a type reference written in the declaration.
    fn translate(&self, reference: &str) -> TypeName;

    /// Constants of any known type, or `None` for an unknown type.
    fn constants_of(&self, type_name: &TypeName) -> Option<Vec<Constant>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Int(i64),
    Text(String),
}

fn index_key(value: &Value) -> Option<IndexKey> {
    match value {
        Value::Int(i) => Some(IndexKey::Int(*i)),
        Value::Bool(b) => Some(IndexKey::Int(i64::from(*b))),
        // `as` truncates, saturates and maps NaN to 0.
        Value::Float(f) => Some(IndexKey::Int(*f as i64)),
        Value::Text(s) => match s.parse::<i64>() {
            Ok(i) if i.to_string() == *s => Some(IndexKey::Int(i)),
            _ => Some(IndexKey::Text(s.clone())),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Legal values of an enumerated property.
#[derive(Debug, Clone, Serialize)]
pub struct EnumeratedValues {
    values: Vec<(String, Value)>,
    #[serde(skip)]
    index: HashSet<IndexKey>,
}

impl EnumeratedValues {
    /// Build from an ordered list of named values.
    pub fn from_constants(constants: impl IntoIterator<Item = Constant>) -> Self {
        let mut values = Vec::new();
        let mut index = HashSet::new();
        for constant in constants {
            if let Some(key) = index_key(&constant.value) {
                index.insert(key);
            }
            values.push((constant.name, constant.value));
        }
        Self { values, index }
    }

    /// Parse an enumeration definition in the context of its declaring type.
    pub fn parse(definition: &str, source: &dyn ConstantSource) -> Result<Self> {
        let Some(caps) = grammar::enumeration().captures(definition.trim()) else {
            return Err(Error::annotation(
                definition,
                "expected <Type>::<prefix>* where <Type> is self, static, parent or a type name",
            ));
        };
        let type_ref = caps.get(1).map_or("", |m| m.as_str());
        let prefix = caps.get(2).map_or("", |m| m.as_str());

        let constants = match type_ref {
            "self" | "static" => source.own_constants(),
            "parent" => source.parent_constants().ok_or_else(|| {
                Error::schema(
                    source.declaring_type().as_str(),
                    format!("enumeration '{definition}' references parent of a type without one"),
                )
            })?,
            other => {
                let target = source.translate(other);
                source.constants_of(&target).ok_or_else(|| {
                    Error::schema(
                        source.declaring_type().as_str(),
                        format!("enumeration '{definition}' references unknown type {target}"),
                    )
                })?
            }
        };

        Ok(Self::from_constants(
            constants.into_iter().filter(|c| c.name.starts_with(prefix)),
        ))
    }

    /// Whether `value` is one of the enumerated values. O(1).
    pub fn is_allowed(&self, value: &Value) -> bool {
        index_key(value).is_some_and(|key| self.index.contains(&key))
    }

    /// The enumerated constants, in declaration order.
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    /// Value of the constant called `name`.
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for EnumeratedValues {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Aliases;
    use rowmodel_core::ErrorKind;
    use std::collections::HashMap;

    struct Fixture {
        declaring: TypeName,
        own: Vec<Constant>,
        parent: Option<Vec<Constant>>,
        aliases: Aliases,
        others: HashMap<TypeName, Vec<Constant>>,
    }

    impl ConstantSource for Fixture {
        fn declaring_type(&self) -> &TypeName {
            &self.declaring
        }

        fn own_constants(&self) -> Vec<Constant> {
            self.own.clone()
        }

        fn parent_constants(&self) -> Option<Vec<Constant>> {
            self.parent.clone()
        }

        fn translate(&self, reference: &str) -> TypeName {
            self.aliases.translate(reference)
        }

        fn constants_of(&self, type_name: &TypeName) -> Option<Vec<Constant>> {
            self.others.get(type_name).cloned()
        }
    }

    fn fixture() -> Fixture {
        let mut others = HashMap::new();
        others.insert(
            TypeName::new("model::Color"),
            vec![Constant::new("RED", "red"), Constant::new("BLUE", "blue")],
        );
        Fixture {
            declaring: TypeName::new("model::Book"),
            own: vec![
                Constant::new("STATUS_ACTIVE", 1),
                Constant::new("STATUS_INACTIVE", 2),
                Constant::new("OTHER", 9),
            ],
            parent: None,
            aliases: Aliases::new("model"),
            others,
        }
    }

    #[test]
    fn test_self_with_prefix() {
        let values = EnumeratedValues::parse("self::STATUS_*", &fixture()).unwrap();
        assert_eq!(
            values.values(),
            [
                ("STATUS_ACTIVE".to_string(), Value::Int(1)),
                ("STATUS_INACTIVE".to_string(), Value::Int(2)),
            ]
        );
        assert!(values.is_allowed(&Value::Int(1)));
        assert!(values.is_allowed(&Value::Int(2)));
        assert!(!values.is_allowed(&Value::Int(9)));
    }

    #[test]
    fn test_static_without_prefix_takes_all() {
        let values = EnumeratedValues::parse("static::*", &fixture()).unwrap();
        assert_eq!(values.len(), 3);
        assert!(values.is_allowed(&Value::Int(9)));
    }

    #[test]
    fn test_other_type_through_namespace() {
        let values = EnumeratedValues::parse("Color::*", &fixture()).unwrap();
        assert_eq!(values.value_of("BLUE"), Some(&Value::from("blue")));
        assert!(values.is_allowed(&Value::from("red")));
        assert!(!values.is_allowed(&Value::from("green")));
    }

    #[test]
    fn test_parent_without_supertype() {
        let err = EnumeratedValues::parse("parent::*", &fixture()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSchema);
    }

    #[test]
    fn test_parent_constants() {
        let mut fx = fixture();
        fx.parent = Some(vec![Constant::new("KIND_A", "a")]);
        let values = EnumeratedValues::parse("parent::KIND_*", &fx).unwrap();
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_unknown_type() {
        let err = EnumeratedValues::parse("Missing::*", &fixture()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSchema);
    }

    #[test]
    fn test_malformed_definition() {
        for definition in ["self::STATUS_", "STATUS_*", "self:STATUS_*", "self::1X*"] {
            let err = EnumeratedValues::parse(definition, &fixture()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedAnnotation, "{definition}");
        }
    }

    #[test]
    fn test_membership_key_space() {
        let values = EnumeratedValues::from_constants([Constant::new("ONE", 1)]);
        assert!(values.is_allowed(&Value::from("1")));
        assert!(values.is_allowed(&Value::Float(1.0)));
        assert!(values.is_allowed(&Value::Bool(true)));
        assert!(!values.is_allowed(&Value::from("01")));
        assert!(!values.is_allowed(&Value::Null));
    }

    #[test]
    fn test_float_members_truncate() {
        let values = EnumeratedValues::from_constants([
            Constant::new("ONE", 1),
            Constant::new("HALF", 0.5),
        ]);
        assert!(values.is_allowed(&Value::Float(1.5)));
        assert!(values.is_allowed(&Value::Float(1.99)));
        assert!(values.is_allowed(&Value::Int(0)));
        assert!(values.is_allowed(&Value::from("0")));
        assert!(!values.is_allowed(&Value::Float(2.0)));
        assert!(!values.is_allowed(&Value::from("1.5")));
    }
}
