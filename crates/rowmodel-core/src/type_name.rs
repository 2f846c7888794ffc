//! Fully-qualified domain type names.
//!
//! Domain types are identified by a `::`-separated path such as `model::Book`.
//! The last segment is the short name; everything before it is the namespace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace separator used in type names.
pub const SEPARATOR: &str = "::";

/// Identity of a domain type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// Create a type name, dropping a leading `::` (absolute path marker).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix(SEPARATOR) {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(name),
        }
    }

    /// Join a namespace and a short name.
    pub fn join(namespace: &str, short_name: &str) -> Self {
        if namespace.is_empty() {
            Self::new(short_name)
        } else {
            Self::new(format!("{namespace}{SEPARATOR}{short_name}"))
        }
    }

    /// The full path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last separator, or `""` for a top-level type.
    pub fn namespace(&self) -> &str {
        self.0.rfind(SEPARATOR).map_or("", |idx| &self.0[..idx])
    }

    /// The last path segment.
    pub fn short_name(&self) -> &str {
        self.0
            .rfind(SEPARATOR)
            .map_or(self.0.as_str(), |idx| &self.0[idx + SEPARATOR.len()..])
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Uppercase the first character, leaving the rest untouched.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character, leaving the rest untouched.
pub fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
