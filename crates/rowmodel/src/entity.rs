//! Entities: typed views over one row.
//!
//! An [`Entity`] never stores property values. Every [`Entity::get`] consults
//! the type's descriptor and reads the row, traversing relationships through
//! the [`Row`] contract when the property declares one:
//!
//! | kind       | relationship     | resolution                                              |
//! |------------|------------------|---------------------------------------------------------|
//! | scalar     | none             | column value coerced to the declared scalar type        |
//! | entity     | none             | embedded object of exactly the declared type            |
//! | collection | none             | embedded array                                          |
//! | entity     | `hasOne`         | `referenced(target_table, column)`                      |
//! | collection | `hasMany`        | association rows, each followed to its target           |
//! | entity     | `belongsToOne`   | `referencing(target_table, column)`, at most one row    |
//! | collection | `belongsToMany`  | `referencing(target_table, column)`                     |

use std::fmt;
use std::sync::Arc;

use rowmodel_core::{Error, Result, Row, TypeName, Value, lcfirst, ucfirst};
use rowmodel_reflect::{
    PropertyDescriptor, PropertyKind, PropertyType, RelationshipDescriptor, TypeDescriptor,
};

use crate::mapper::Mapper;
use crate::value::PropertyValue;

/// A domain object backed by one row.
///
/// Two entities are equal when they have the same type and equal rows.
#[derive(Clone)]
pub struct Entity<R: Row> {
    row: R,
    descriptor: Arc<TypeDescriptor>,
    mapper: Arc<Mapper<R>>,
}

impl<R: Row> Entity<R> {
    pub(crate) fn from_parts(
        row: R,
        descriptor: Arc<TypeDescriptor>,
        mapper: Arc<Mapper<R>>,
    ) -> Self {
        Self {
            row,
            descriptor,
            mapper,
        }
    }

    /// The backing row.
    pub fn row(&self) -> &R {
        &self.row
    }

    pub fn into_row(self) -> R {
        self.row
    }

    pub fn type_name(&self) -> &TypeName {
        self.descriptor.type_name()
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn mapper(&self) -> &Arc<Mapper<R>> {
        &self.mapper
    }

    /// Read a column of the backing row without any conversion.
    pub fn column(&self, name: &str) -> Value {
        self.row.column(name)
    }

    /// Read the property `name`.
    ///
    /// Undeclared names fall back to an accessor method `get<Name>`. Properties
    /// declaring `m:useMethods` are read through their getter.
    #[tracing::instrument(level = "trace", skip(self), fields(type_name = %self.type_name()))]
    pub fn get(&self, name: &str) -> Result<PropertyValue<R>> {
        let Some(property) = self.descriptor.property(name) else {
            let getter = format!("get{}", ucfirst(name));
            return match self.mapper.accessor(self.type_name(), &getter) {
                Some(accessor) => accessor(self),
                None => Err(Error::UnknownProperty {
                    type_name: self.type_name().to_string(),
                    property: name.to_string(),
                }),
            };
        };

        match property.access_methods() {
            Some(methods) => self.invoke(methods.getter(), property.name()),
            None => self.resolve(property),
        }
    }

    /// Read the declared property `name` from the row, bypassing accessor methods.
    ///
    /// This is what accessor implementations use to reach the stored value.
    pub fn get_declared(&self, name: &str) -> Result<PropertyValue<R>> {
        match self.descriptor.property(name) {
            Some(property) => self.resolve(property),
            None => Err(Error::UnknownProperty {
                type_name: self.type_name().to_string(),
                property: name.to_string(),
            }),
        }
    }

    /// Call a method by name.
    ///
    /// Registered accessor methods are invoked directly. Otherwise `get<Name>`
    /// reads the property `name` with its first letter lowercased; any other
    /// name is unsupported.
    pub fn call(&self, method: &str) -> Result<PropertyValue<R>> {
        if let Some(accessor) = self.mapper.accessor(self.type_name(), method) {
            return accessor(self);
        }
        match method.strip_prefix("get") {
            Some(tail) if !tail.is_empty() => self.get(&lcfirst(tail)),
            _ => Err(Error::UnsupportedOperation {
                type_name: self.type_name().to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn invoke(&self, method: &str, property: &str) -> Result<PropertyValue<R>> {
        match self.mapper.accessor(self.type_name(), method) {
            Some(accessor) => accessor(self),
            None => Err(Error::schema_property(
                self.type_name().as_str(),
                property,
                format!("accessor method '{method}' has no implementation"),
            )),
        }
    }

    fn resolve(&self, property: &PropertyDescriptor) -> Result<PropertyValue<R>> {
        match property.relationship() {
            None => self.read_column(property),
            Some(relationship) => self.traverse(property, relationship),
        }
    }

    fn absent(&self, property: &PropertyDescriptor) -> Result<PropertyValue<R>> {
        if property.is_nullable() {
            Ok(PropertyValue::Null)
        } else {
            Err(Error::NullViolation {
                type_name: self.type_name().to_string(),
                property: property.name().to_string(),
            })
        }
    }

    fn read_column(&self, property: &PropertyDescriptor) -> Result<PropertyValue<R>> {
        let name = property.name();
        let value = self.row.column(property.column());
        if value.is_null() {
            return self.absent(property);
        }

        match (property.property_type(), property.kind()) {
            (PropertyType::Scalar(scalar), _) => {
                Ok(PropertyValue::Scalar(scalar.coerce(name, value)?))
            }
            (PropertyType::Entity(target), PropertyKind::Collection) => match value {
                Value::Array(_) => Ok(PropertyValue::Embedded(value)),
                other => Err(Error::TypeMismatch {
                    property: name.to_string(),
                    expected: format!("an array of '{target}' instances"),
                    found: other.type_label(),
                }),
            },
            (PropertyType::Entity(target), _) => {
                if value
                    .as_object()
                    .is_some_and(|object| object.type_name == *target)
                {
                    Ok(PropertyValue::Embedded(value))
                } else {
                    Err(Error::TypeMismatch {
                        property: name.to_string(),
                        expected: format!("an instance of '{target}'"),
                        found: value.type_label(),
                    })
                }
            }
        }
    }

    fn traverse(
        &self,
        property: &PropertyDescriptor,
        relationship: &RelationshipDescriptor,
    ) -> Result<PropertyValue<R>> {
        let target_table = relationship.target_table();
        tracing::debug!(
            target: "rowmodel::resolve",
            type_name = %self.type_name(),
            property = property.name(),
            relationship = relationship.flag(),
            target_table,
            "Traversing relationship"
        );

        match relationship {
            RelationshipDescriptor::SingleOwned { column, .. } => {
                match self.row.referenced(target_table, column)? {
                    Some(row) => Ok(PropertyValue::Entity(self.wrap(target_table, row)?)),
                    None => self.absent(property),
                }
            }
            RelationshipDescriptor::ManyOwning {
                source_column,
                association_table,
                target_column,
                ..
            } => {
                let links = self.row.referencing(association_table, source_column)?;
                let mut rows = Vec::with_capacity(links.len());
                for link in links {
                    // Dangling association rows are skipped.
                    if let Some(row) = link.referenced(target_table, target_column)? {
                        rows.push(row);
                    }
                }
                self.wrap_all(target_table, rows).map(PropertyValue::Collection)
            }
            RelationshipDescriptor::SingleOwning { column, .. } => {
                let mut rows = self.row.referencing(target_table, column)?;
                if rows.len() > 1 {
                    tracing::warn!(
                        target: "rowmodel::resolve",
                        type_name = %self.type_name(),
                        property = property.name(),
                        target_table,
                        count = rows.len(),
                        "Single-owning relationship matched several rows"
                    );
                    return Err(Error::AmbiguousRelationship {
                        type_name: self.type_name().to_string(),
                        property: property.name().to_string(),
                        target_table: target_table.to_string(),
                        count: rows.len(),
                    });
                }
                match rows.pop() {
                    Some(row) => Ok(PropertyValue::Entity(self.wrap(target_table, row)?)),
                    None => self.absent(property),
                }
            }
            RelationshipDescriptor::ManyOwned { column, .. } => {
                let rows = self.row.referencing(target_table, column)?;
                self.wrap_all(target_table, rows).map(PropertyValue::Collection)
            }
        }
    }

    fn target_descriptor(&self, table: &str) -> Result<Arc<TypeDescriptor>> {
        let target = self.mapper.type_for_table(self.type_name(), table);
        self.mapper.descriptor(&target)
    }

    fn wrap(&self, table: &str, row: R) -> Result<Entity<R>> {
        let descriptor = self.target_descriptor(table)?;
        Ok(Entity::from_parts(row, descriptor, Arc::clone(&self.mapper)))
    }

    fn wrap_all(&self, table: &str, rows: Vec<R>) -> Result<Vec<Entity<R>>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let descriptor = self.target_descriptor(table)?;
        Ok(rows
            .into_iter()
            .map(|row| Entity::from_parts(row, Arc::clone(&descriptor), Arc::clone(&self.mapper)))
            .collect())
    }
}

impl<R: Row> PartialEq for Entity<R> {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.row == other.row
    }
}

impl<R: Row + fmt::Debug> fmt::Debug for Entity<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type_name", self.type_name())
            .field("row", &self.row)
            .finish_non_exhaustive()
    }
}
