//! Declared schema of a domain type.
//!
//! A [`TypeDefinition`] is what an application registers: the property
//! declaration lines, named constants, accessor method names and the name
//! aliases used to resolve type references inside the declarations. It is
//! turned into a [`TypeDescriptor`](crate::TypeDescriptor) on first use.
//!
//! # Example
//!
//! ```
//! use rowmodel_reflect::TypeDefinition;
//!
//! let book = TypeDefinition::new("model::Book")
//!     .property("@property-read int $id")
//!     .property("@property string $title")
//!     .property("@property-read Author $author m:hasOne")
//!     .property("@property-read Tag[] $tags m:hasMany")
//!     .property("@property int $status m:enum(self::STATUS_*)")
//!     .constant("STATUS_DRAFT", 1)
//!     .constant("STATUS_PUBLISHED", 2);
//!
//! assert_eq!(book.name().short_name(), "Book");
//! assert_eq!(book.properties().len(), 5);
//! ```

use std::collections::HashMap;

use rowmodel_core::{TypeName, Value};
use rowmodel_core::type_name::SEPARATOR;
use serde::Serialize;

/// A named constant of a domain type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    pub value: Value,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Short-name aliases in effect for a type's declarations, plus its namespace.
///
/// Resolution of a reference:
/// - `::a::B` is absolute;
/// - `B` or `B::C` whose first segment is an alias is rewritten through the alias;
/// - anything else is relative to the namespace of the declaring type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aliases {
    namespace: String,
    aliases: HashMap<String, TypeName>,
}

impl Aliases {
    /// Aliases for declarations living in `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            aliases: HashMap::new(),
        }
    }

    /// Register `alias` as a short name of `target`.
    pub fn insert(&mut self, alias: impl Into<String>, target: impl Into<TypeName>) {
        self.aliases.insert(alias.into(), target.into());
    }

    /// Resolve a type reference to a fully-qualified name.
    pub fn translate(&self, reference: &str) -> TypeName {
        if reference.starts_with(SEPARATOR) {
            return TypeName::new(reference);
        }
        let (first, rest) = match reference.find(SEPARATOR) {
            Some(idx) => (&reference[..idx], Some(&reference[idx + SEPARATOR.len()..])),
            None => (reference, None),
        };
        match (self.aliases.get(first), rest) {
            (Some(target), Some(rest)) => TypeName::join(target.as_str(), rest),
            (Some(target), None) => target.clone(),
            (None, _) => TypeName::join(&self.namespace, reference),
        }
    }
}

/// Declared schema of one domain type.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    name: TypeName,
    parent: Option<TypeName>,
    table: Option<String>,
    properties: Vec<String>,
    constants: Vec<Constant>,
    methods: Vec<String>,
    aliases: Aliases,
}

impl TypeDefinition {
    /// Start a definition for the fully-qualified type `name`.
    pub fn new(name: impl Into<TypeName>) -> Self {
        let name = name.into();
        let aliases = Aliases::new(name.namespace());
        Self {
            name,
            parent: None,
            table: None,
            properties: Vec::new(),
            constants: Vec::new(),
            methods: Vec::new(),
            aliases,
        }
    }

    /// Declare the supertype. Properties, constants and methods are inherited.
    pub fn extends(mut self, parent: impl Into<TypeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Override the table name derived by the naming convention.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add a property declaration line.
    pub fn property(mut self, declaration: impl Into<String>) -> Self {
        self.properties.push(declaration.into());
        self
    }

    /// Add a named constant.
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.push(Constant::new(name, value));
        self
    }

    /// Declare an accessor method name.
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.add_method(name);
        self
    }

    /// Declare an accessor method name in place.
    pub fn add_method(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.methods.contains(&name) {
            self.methods.push(name);
        }
    }

    /// Make `alias` resolve to `target` in this type's declarations.
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<TypeName>) -> Self {
        self.aliases.insert(alias, target);
        self
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn parent(&self) -> Option<&TypeName> {
        self.parent.as_ref()
    }

    pub fn table_override(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }
}
