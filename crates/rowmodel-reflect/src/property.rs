//! Metadata of one virtual property.

use rowmodel_core::{ScalarType, TypeName, Value};
use serde::Serialize;

use crate::enumeration::EnumeratedValues;
use crate::methods::PropertyAccessMethods;
use crate::relationship::RelationshipDescriptor;

/// What a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// A primitive value read from a column.
    Scalar,
    /// A single related entity.
    Entity,
    /// A sequence of entities.
    Collection,
}

/// Declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyType {
    Scalar(ScalarType),
    Entity(TypeName),
}

/// Full metadata of one property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub(crate) name: String,
    pub(crate) column: String,
    pub(crate) kind: PropertyKind,
    pub(crate) property_type: PropertyType,
    pub(crate) nullable: bool,
    pub(crate) writable: bool,
    pub(crate) relationship: Option<RelationshipDescriptor>,
    pub(crate) access_methods: Option<PropertyAccessMethods>,
    pub(crate) enumerated_values: Option<EnumeratedValues>,
}

impl PropertyDescriptor {
    /// Property name, unique within its type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column the value of a scalar or embedded property is read from.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn property_type(&self) -> &PropertyType {
        &self.property_type
    }

    /// Scalar type, present exactly when `kind` is `Scalar`.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.property_type {
            PropertyType::Scalar(ty) => Some(ty),
            PropertyType::Entity(_) => None,
        }
    }

    /// Declared related-entity type, present when `kind` is `Entity` or `Collection`.
    pub fn target_type(&self) -> Option<&TypeName> {
        match &self.property_type {
            PropertyType::Entity(name) => Some(name),
            PropertyType::Scalar(_) => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Declared with `@property` rather than `@property-read`.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_scalar(&self) -> bool {
        self.kind == PropertyKind::Scalar
    }

    pub fn contains_collection(&self) -> bool {
        self.kind == PropertyKind::Collection
    }

    pub fn relationship(&self) -> Option<&RelationshipDescriptor> {
        self.relationship.as_ref()
    }

    pub fn has_relationship(&self) -> bool {
        self.relationship.is_some()
    }

    pub fn access_methods(&self) -> Option<&PropertyAccessMethods> {
        self.access_methods.as_ref()
    }

    pub fn enumerated_values(&self) -> Option<&EnumeratedValues> {
        self.enumerated_values.as_ref()
    }

    /// Whether `value` is acceptable for this property's enumeration.
    ///
    /// Properties without an enumeration accept everything; null is accepted
    /// only by nullable properties.
    pub fn is_value_allowed(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.nullable;
        }
        self.enumerated_values
            .as_ref()
            .is_none_or(|values| values.is_allowed(value))
    }
}
