//! Access methods of a property (the `m:useMethods` flag).
//!
//! A definition names the getter and, for writable properties, the setter:
//!
//! ```text
//! getterName
//! getterName | setterName
//! ```
//!
//! Slots left empty keep their defaults, `get<Name>` and `set<Name>`.

use rowmodel_core::{Error, Result, ucfirst};
use serde::Serialize;

use crate::grammar;

/// Getter/setter pair used to access a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyAccessMethods {
    getter: String,
    setter: Option<String>,
}

impl PropertyAccessMethods {
    /// Create from explicit method names.
    pub fn new(getter: impl Into<String>, setter: Option<String>) -> Self {
        Self {
            getter: getter.into(),
            setter,
        }
    }

    /// Parse the access methods of `property`.
    ///
    /// With no definition the defaults are returned: `get<Property>` and, when
    /// `writable`, `set<Property>`.
    pub fn parse(property: &str, writable: bool, definition: Option<&str>) -> Result<Self> {
        let uc_name = ucfirst(property);
        let mut getter = format!("get{uc_name}");
        let mut setter = writable.then(|| format!("set{uc_name}"));

        let Some(definition) = definition else {
            return Ok(Self { getter, setter });
        };

        for (position, method) in definition.trim().split('|').map(str::trim).enumerate() {
            if position >= 2 {
                return Err(Error::annotation(
                    definition,
                    "property methods cannot have more than two parts",
                ));
            }
            if method.is_empty() {
                continue;
            }
            if !grammar::identifier().is_match(method) {
                return Err(Error::annotation(
                    definition,
                    format!("malformed access method name '{method}'"),
                ));
            }
            if position == 0 {
                getter = method.to_string();
            } else {
                if !writable {
                    return Err(Error::annotation(
                        definition,
                        "read-only properties can only declare a getter",
                    ));
                }
                setter = Some(method.to_string());
            }
        }

        Ok(Self { getter, setter })
    }

    /// Getter method name.
    pub fn getter(&self) -> &str {
        &self.getter
    }

    /// Setter method name, if the property is writable.
    pub fn setter(&self) -> Option<&str> {
        self.setter.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowmodel_core::ErrorKind;

    #[test]
    fn test_explicit_getter_and_setter() {
        let methods = PropertyAccessMethods::parse("name", true, Some("getName|setName")).unwrap();
        assert_eq!(methods.getter(), "getName");
        assert_eq!(methods.setter(), Some("setName"));
    }

    #[test]
    fn test_defaults_without_definition() {
        let methods = PropertyAccessMethods::parse("title", true, None).unwrap();
        assert_eq!(methods.getter(), "getTitle");
        assert_eq!(methods.setter(), Some("setTitle"));

        let methods = PropertyAccessMethods::parse("title", false, None).unwrap();
        assert_eq!(methods.setter(), None);
    }

    #[test]
    fn test_whitespace_around_separator() {
        let methods =
            PropertyAccessMethods::parse("name", true, Some("  fetchName |  storeName ")).unwrap();
        assert_eq!(methods.getter(), "fetchName");
        assert_eq!(methods.setter(), Some("storeName"));
    }

    #[test]
    fn test_empty_segment_keeps_default() {
        let methods = PropertyAccessMethods::parse("name", true, Some("|storeName")).unwrap();
        assert_eq!(methods.getter(), "getName");
        assert_eq!(methods.setter(), Some("storeName"));

        let methods = PropertyAccessMethods::parse("name", false, Some("fetchName|")).unwrap();
        assert_eq!(methods.getter(), "fetchName");
        assert_eq!(methods.setter(), None);
    }

    #[test]
    fn test_too_many_segments() {
        let err = PropertyAccessMethods::parse("name", true, Some("a|b|c")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedAnnotation);
    }

    #[test]
    fn test_setter_on_read_only() {
        let err = PropertyAccessMethods::parse("name", false, Some("getX|setX")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedAnnotation);
    }

    #[test]
    fn test_malformed_identifier() {
        let err = PropertyAccessMethods::parse("name", true, Some("get-name")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedAnnotation);
        assert!(err.to_string().contains("get-name"));
    }

    #[test]
    fn test_unicode_method_names() {
        let methods = PropertyAccessMethods::parse("jméno", false, Some("dejJméno")).unwrap();
        assert_eq!(methods.getter(), "dejJméno");
    }
}
