//! Built, immutable metadata of one domain type.

use std::collections::HashMap;

use rowmodel_core::TypeName;
use serde::Serialize;

use crate::property::PropertyDescriptor;

/// Property metadata of a domain type, in declaration order.
///
/// Inherited properties come first; a redeclared property keeps the position
/// of the declaration it replaces.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDescriptor {
    type_name: TypeName,
    table: String,
    properties: Vec<PropertyDescriptor>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    methods: Vec<String>,
}

impl TypeDescriptor {
    pub(crate) fn new(type_name: TypeName, table: String) -> Self {
        Self {
            type_name,
            table,
            properties: Vec::new(),
            index: HashMap::new(),
            methods: Vec::new(),
        }
    }

    /// Insert or replace a property. Returns `true` when an existing one was replaced.
    pub(crate) fn put_property(&mut self, property: PropertyDescriptor) -> bool {
        if let Some(&position) = self.index.get(property.name()) {
            self.properties[position] = property;
            true
        } else {
            self.index
                .insert(property.name().to_string(), self.properties.len());
            self.properties.push(property);
            false
        }
    }

    pub(crate) fn add_method(&mut self, name: &str) {
        if !self.has_method(name) {
            self.methods.push(name.to_string());
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Table the type's rows live in.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Metadata of `name`, or `None` when the type declares no such property.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index.get(name).map(|&position| &self.properties[position])
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(PropertyDescriptor::name)
    }

    /// Accessor method names declared on the type or its supertypes.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m == name)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.table == other.table
            && self.properties == other.properties
            && self.methods == other.methods
    }
}
