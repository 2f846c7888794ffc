//! Resolved property values.

use rowmodel_core::{Row, Value};

use crate::entity::Entity;

/// The value of one virtual property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue<R: Row> {
    /// Absent value of a nullable property.
    Null,
    /// A scalar column value, coerced to the declared type.
    Scalar(Value),
    /// An embedded object or array stored in a column.
    Embedded(Value),
    /// A related entity.
    Entity(Entity<R>),
    /// Related entities, in data-source order.
    Collection(Vec<Entity<R>>),
}

impl<R: Row> PropertyValue<R> {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Column value of a scalar or embedded property.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            PropertyValue::Scalar(value) | PropertyValue::Embedded(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity<R>> {
        match self {
            PropertyValue::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Entity<R>]> {
        match self {
            PropertyValue::Collection(entities) => Some(entities.as_slice()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    /// Convert into the column value; `Null` maps to `Value::Null`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            PropertyValue::Null => Some(Value::Null),
            PropertyValue::Scalar(value) | PropertyValue::Embedded(value) => Some(value),
            PropertyValue::Entity(_) | PropertyValue::Collection(_) => None,
        }
    }

    pub fn into_entity(self) -> Option<Entity<R>> {
        match self {
            PropertyValue::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn into_collection(self) -> Option<Vec<Entity<R>>> {
        match self {
            PropertyValue::Collection(entities) => Some(entities),
            _ => None,
        }
    }
}

impl<R: Row> From<Value> for PropertyValue<R> {
    fn from(value: Value) -> Self {
        if value.is_null() {
            PropertyValue::Null
        } else {
            PropertyValue::Scalar(value)
        }
    }
}

impl<R: Row> From<Entity<R>> for PropertyValue<R> {
    fn from(entity: Entity<R>) -> Self {
        PropertyValue::Entity(entity)
    }
}

impl<R: Row> From<Vec<Entity<R>>> for PropertyValue<R> {
    fn from(entities: Vec<Entity<R>>) -> Self {
        PropertyValue::Collection(entities)
    }
}
