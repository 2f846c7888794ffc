//! Error types for RowModel.
//!
//! Every failure of schema construction or property resolution is reported
//! through [`Error`]. Nothing is retried or silently downgraded: a property
//! read either yields a value (possibly null, when permitted) or fails with one
//! of the variants below.

use std::error::Error as StdError;
use std::fmt;

/// Result alias used across the RowModel crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Fieldless discriminant of [`Error`], convenient for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownProperty,
    NullViolation,
    TypeMismatch,
    AmbiguousRelationship,
    MalformedAnnotation,
    MalformedSchema,
    UnsupportedOperation,
    DataSource,
}

/// Errors raised while building type metadata or resolving entity properties.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The property has no metadata and no `get<Name>` accessor exists.
    UnknownProperty { type_name: String, property: String },
    /// A non-nullable property resolved to an absent value.
    NullViolation { type_name: String, property: String },
    /// A value does not have the shape or runtime type its declaration requires.
    TypeMismatch {
        property: String,
        expected: String,
        found: String,
    },
    /// A single-owning relationship found more than one referencing row.
    AmbiguousRelationship {
        type_name: String,
        property: String,
        target_table: String,
        count: usize,
    },
    /// A property-access or enumeration definition failed its grammar.
    MalformedAnnotation { definition: String, reason: String },
    /// A type's declared property schema is unparseable or inconsistent.
    MalformedSchema(Box<SchemaError>),
    /// A called method name matches no accessor convention.
    UnsupportedOperation { type_name: String, method: String },
    /// The row data source reported a failure.
    DataSource(String),
}

/// Details of a [`Error::MalformedSchema`] failure.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// Type whose schema failed to build.
    pub type_name: String,
    /// Property line at fault, when the failure is tied to one.
    pub property: Option<String>,
    /// Human readable reason.
    pub message: String,
    /// Underlying annotation error, if any.
    pub source: Option<Error>,
}

impl Error {
    /// Build a schema error not tied to a specific property.
    pub fn schema(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedSchema(Box::new(SchemaError {
            type_name: type_name.into(),
            property: None,
            message: message.into(),
            source: None,
        }))
    }

    /// Build a schema error for one property declaration.
    pub fn schema_property(
        type_name: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::MalformedSchema(Box::new(SchemaError {
            type_name: type_name.into(),
            property: Some(property.into()),
            message: message.into(),
            source: None,
        }))
    }

    /// Build an annotation grammar error.
    pub fn annotation(definition: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedAnnotation {
            definition: definition.into(),
            reason: reason.into(),
        }
    }

    /// Wrap this error as the source of a schema error for `property` of `type_name`.
    #[must_use]
    pub fn in_schema(self, type_name: impl Into<String>, property: impl Into<String>) -> Self {
        match self {
            // Already attributed; keep the innermost context.
            Error::MalformedSchema(_) => self,
            other => Error::MalformedSchema(Box::new(SchemaError {
                type_name: type_name.into(),
                property: Some(property.into()),
                message: other.to_string(),
                source: Some(other),
            })),
        }
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownProperty { .. } => ErrorKind::UnknownProperty,
            Error::NullViolation { .. } => ErrorKind::NullViolation,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::AmbiguousRelationship { .. } => ErrorKind::AmbiguousRelationship,
            Error::MalformedAnnotation { .. } => ErrorKind::MalformedAnnotation,
            Error::MalformedSchema(_) => ErrorKind::MalformedSchema,
            Error::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Error::DataSource(_) => ErrorKind::DataSource,
        }
    }

    /// Whether this error comes from schema/annotation parsing, i.e. a
    /// configuration problem rather than a runtime data condition.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedAnnotation | ErrorKind::MalformedSchema
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownProperty {
                type_name,
                property,
            } => write!(f, "undefined property '{}' on {}", property, type_name),
            Error::NullViolation {
                type_name,
                property,
            } => write!(f, "property '{}' of {} cannot be null", property, type_name),
            Error::TypeMismatch {
                property,
                expected,
                found,
            } => write!(
                f,
                "property '{}' is expected to contain {}, {} given",
                property, expected, found
            ),
            Error::AmbiguousRelationship {
                type_name,
                property,
                target_table,
                count,
            } => write!(
                f,
                "property '{}' of {}: {} rows of '{}' reference an entity declared as single-owning",
                property, type_name, count, target_table
            ),
            Error::MalformedAnnotation { definition, reason } => {
                write!(f, "malformed annotation '{}': {}", definition, reason)
            }
            Error::MalformedSchema(err) => fmt::Display::fmt(err, f),
            Error::UnsupportedOperation { type_name, method } => {
                write!(f, "method '{}' is not callable on {}", method, type_name)
            }
            Error::DataSource(msg) => write!(f, "data source error: {}", msg),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(
                f,
                "malformed schema of {} (property '{}'): {}",
                self.type_name, property, self.message
            ),
            None => write!(f, "malformed schema of {}: {}", self.type_name, self.message),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::MalformedSchema(err) => err
                .source
                .as_ref()
                .map(|e| e as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DataSource(err.to_string())
    }
}
