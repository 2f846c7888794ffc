//! The mapping context: registered entity classes plus naming collaborators.
//!
//! A [`Mapper`] is built once and shared behind an `Arc`; every [`Entity`]
//! holds a handle to the mapper it was created by.
//!
//! ```
//! use rowmodel::prelude::*;
//! # use rowmodel_memory::MemoryRow;
//!
//! let mapper = Mapper::<MemoryRow>::builder()
//!     .register(EntityClass::new(
//!         TypeDefinition::new("model::Author").property("@property-read string $name"),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! assert!(mapper.registry().contains(&TypeName::new("model::Author")));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rowmodel_core::{
    DefaultConvention, Error, MapperConfig, NamingConvention, Result, Row, TableToTypeResolver,
    TypeName,
};
use rowmodel_reflect::{SchemaRegistry, TypeDefinition, TypeDescriptor};

use crate::entity::Entity;
use crate::value::PropertyValue;

/// Implementation of an accessor method.
pub type Accessor<R> = Arc<dyn Fn(&Entity<R>) -> Result<PropertyValue<R>> + Send + Sync>;

/// A type definition together with the implementations of its accessor methods.
pub struct EntityClass<R: Row> {
    definition: TypeDefinition,
    accessors: HashMap<String, Accessor<R>>,
}

impl<R: Row> EntityClass<R> {
    pub fn new(definition: TypeDefinition) -> Self {
        Self {
            definition,
            accessors: HashMap::new(),
        }
    }

    /// Declare the accessor method `name` and provide its implementation.
    ///
    /// A method `get<Name>` also answers reads of the undeclared property `name`.
    pub fn method<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&Entity<R>) -> Result<PropertyValue<R>> + Send + Sync + 'static,
    {
        let name = name.into();
        self.definition.add_method(name.clone());
        self.accessors.insert(name, Arc::new(accessor));
        self
    }

    pub fn name(&self) -> &TypeName {
        self.definition.name()
    }

    pub fn definition(&self) -> &TypeDefinition {
        &self.definition
    }
}

impl<R: Row> From<TypeDefinition> for EntityClass<R> {
    fn from(definition: TypeDefinition) -> Self {
        Self::new(definition)
    }
}

impl<R: Row> fmt::Debug for EntityClass<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.accessors.keys().collect();
        methods.sort();
        f.debug_struct("EntityClass")
            .field("definition", &self.definition)
            .field("methods", &methods)
            .finish()
    }
}

/// Builder for [`Mapper`].
pub struct MapperBuilder<R: Row> {
    config: MapperConfig,
    convention: Option<Arc<dyn NamingConvention>>,
    resolver: Option<Arc<dyn TableToTypeResolver>>,
    classes: Vec<EntityClass<R>>,
}

impl<R: Row> MapperBuilder<R> {
    /// Naming configuration for the default convention and resolver.
    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the naming convention used for property columns and relationship defaults.
    pub fn convention(mut self, convention: Arc<dyn NamingConvention>) -> Self {
        self.convention = Some(convention);
        self
    }

    /// Replace the resolver mapping traversed tables to entity types.
    pub fn resolver(mut self, resolver: Arc<dyn TableToTypeResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Add an entity class.
    pub fn register(mut self, class: impl Into<EntityClass<R>>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Build the mapper.
    ///
    /// Fails when a type is registered twice or declares a method without an
    /// implementation. Property declarations are parsed lazily, see
    /// [`Mapper::warm_up`] to validate them eagerly.
    pub fn build(self) -> Result<Arc<Mapper<R>>> {
        let default = Arc::new(DefaultConvention::with_config(self.config.clone()));
        let convention: Arc<dyn NamingConvention> = match self.convention {
            Some(convention) => convention,
            None => Arc::clone(&default) as Arc<dyn NamingConvention>,
        };
        let resolver: Arc<dyn TableToTypeResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => default,
        };

        let mut registry = SchemaRegistry::with_convention(convention);
        let mut accessors = HashMap::new();
        for EntityClass {
            definition,
            accessors: methods,
        } in self.classes
        {
            if let Some(missing) = definition
                .methods()
                .iter()
                .find(|method| !methods.contains_key(method.as_str()))
            {
                return Err(Error::schema(
                    definition.name().as_str(),
                    format!("method '{missing}' has no implementation"),
                ));
            }
            let name = definition.name().clone();
            registry.register(definition)?;
            accessors.insert(name, methods);
        }

        tracing::debug!(types = accessors.len(), "Mapper built");
        Ok(Arc::new(Mapper {
            config: self.config,
            registry,
            resolver,
            accessors,
        }))
    }
}

/// Runtime context of entity resolution.
pub struct Mapper<R: Row> {
    config: MapperConfig,
    registry: SchemaRegistry,
    resolver: Arc<dyn TableToTypeResolver>,
    accessors: HashMap<TypeName, HashMap<String, Accessor<R>>>,
}

impl<R: Row> Mapper<R> {
    pub fn builder() -> MapperBuilder<R> {
        MapperBuilder {
            config: MapperConfig::default(),
            convention: None,
            resolver: None,
            classes: Vec::new(),
        }
    }

    /// Wrap `row` as an entity of `type_name`.
    pub fn entity(self: &Arc<Self>, type_name: impl Into<TypeName>, row: R) -> Result<Entity<R>> {
        let descriptor = self.descriptor(&type_name.into())?;
        Ok(Entity::from_parts(row, descriptor, Arc::clone(self)))
    }

    /// Wrap every row of `rows` as an entity of `type_name`.
    pub fn entities(
        self: &Arc<Self>,
        type_name: impl Into<TypeName>,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Vec<Entity<R>>> {
        let descriptor = self.descriptor(&type_name.into())?;
        Ok(rows
            .into_iter()
            .map(|row| Entity::from_parts(row, Arc::clone(&descriptor), Arc::clone(self)))
            .collect())
    }

    /// Descriptor of a registered type.
    pub fn descriptor(&self, type_name: &TypeName) -> Result<Arc<TypeDescriptor>> {
        self.registry.for_type(type_name)
    }

    /// Entity type for rows of `table` reached from an entity of `current`.
    pub fn type_for_table(&self, current: &TypeName, table: &str) -> TypeName {
        self.resolver.type_for_table(current, table)
    }

    /// Implementation of `method` on `type_name` or its nearest supertype declaring it.
    pub fn accessor(&self, type_name: &TypeName, method: &str) -> Option<&Accessor<R>> {
        let mut current = Some(type_name);
        let mut depth = 0;
        while let Some(name) = current {
            if let Some(accessor) = self
                .accessors
                .get(name)
                .and_then(|methods| methods.get(method))
            {
                return Some(accessor);
            }
            // Parent cycles are reported when descriptors are built.
            depth += 1;
            if depth > self.accessors.len() {
                return None;
            }
            current = self.registry.definition(name).and_then(TypeDefinition::parent);
        }
        None
    }

    /// Build and validate every registered descriptor.
    ///
    /// Returns the number of descriptors built.
    pub fn warm_up(&self) -> Result<usize> {
        let count = self.registry.build_all()?;
        tracing::info!(descriptors = count, "Type descriptors ready");
        Ok(count)
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }
}

impl<R: Row> fmt::Debug for Mapper<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
