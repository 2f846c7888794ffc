//! Registry of type definitions and cache of their descriptors.
//!
//! The registry is the injectable replacement for a process-wide metadata
//! table: create one per mapping context and share it. Descriptors are built
//! on first request and every later request returns the same `Arc`.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rowmodel_core::{DefaultConvention, Error, NamingConvention, Result, TypeName};

use crate::definition::{Constant, TypeDefinition};
use crate::descriptor::TypeDescriptor;
use crate::enumeration::ConstantSource;
use crate::parser::{DeclarationContext, parse_declaration};

/// Registered type definitions plus a memoized descriptor per type.
pub struct SchemaRegistry {
    definitions: HashMap<TypeName, TypeDefinition>,
    convention: Arc<dyn NamingConvention>,
    cache: RwLock<HashMap<TypeName, Arc<TypeDescriptor>>>,
}

impl SchemaRegistry {
    /// Create an empty registry using [`DefaultConvention`].
    pub fn new() -> Self {
        Self::with_convention(Arc::new(DefaultConvention::new()))
    }

    /// Create an empty registry using `convention` for relationship defaults.
    pub fn with_convention(convention: Arc<dyn NamingConvention>) -> Self {
        Self {
            definitions: HashMap::new(),
            convention,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Register a type definition.
    ///
    /// Definitions are only parsed when their descriptor is first requested,
    /// so types may be registered in any order.
    pub fn register(&mut self, definition: TypeDefinition) -> Result<()> {
        match self.definitions.entry(definition.name().clone()) {
            Entry::Occupied(entry) => Err(Error::schema(
                entry.key().as_str(),
                "type is registered more than once",
            )),
            Entry::Vacant(entry) => {
                entry.insert(definition);
                Ok(())
            }
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, definition: TypeDefinition) -> Result<Self> {
        self.register(definition)?;
        Ok(self)
    }

    pub fn definition(&self, type_name: &TypeName) -> Option<&TypeDefinition> {
        self.definitions.get(type_name)
    }

    pub fn contains(&self, type_name: &TypeName) -> bool {
        self.definitions.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&TypeName> {
        let mut names: Vec<_> = self.definitions.keys().collect();
        names.sort();
        names
    }

    pub fn convention(&self) -> &dyn NamingConvention {
        self.convention.as_ref()
    }

    /// Descriptor of `type_name`, built on first request.
    ///
    /// Concurrent first requests may both build; exactly one result is
    /// installed and returned to every caller.
    pub fn for_type(&self, type_name: &TypeName) -> Result<Arc<TypeDescriptor>> {
        // Fast path: already built
        if let Some(descriptor) = self.read_cache().get(type_name) {
            return Ok(Arc::clone(descriptor));
        }

        // Slow path: build outside the lock, install if still absent
        let built = Arc::new(self.build(type_name)?);
        match self.write_cache().entry(type_name.clone()) {
            Entry::Occupied(entry) => {
                tracing::warn!(
                    type_name = %type_name,
                    "Descriptor built concurrently, keeping the installed one"
                );
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => Ok(Arc::clone(entry.insert(built))),
        }
    }

    /// Build every registered descriptor, failing on the first malformed schema.
    ///
    /// Returns the number of descriptors in the cache afterwards.
    pub fn build_all(&self) -> Result<usize> {
        for type_name in self.type_names() {
            self.for_type(type_name)?;
        }
        Ok(self.cached_count())
    }

    /// Number of descriptors built so far.
    pub fn cached_count(&self) -> usize {
        self.read_cache().len()
    }

    /// Constants of `type_name` and its supertypes, or `None` for an unknown type.
    ///
    /// A constant redeclared by a subtype replaces the inherited value in place.
    pub fn constants_of(&self, type_name: &TypeName) -> Option<Vec<Constant>> {
        self.lineage(type_name).ok().map(|lineage| merge_constants(&lineage))
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<TypeName, Arc<TypeDescriptor>>> {
        // Entries are inserted whole; a poisoned map is still consistent.
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<TypeName, Arc<TypeDescriptor>>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Definitions from the root supertype down to `type_name`.
    fn lineage(&self, type_name: &TypeName) -> Result<Vec<&TypeDefinition>> {
        let mut lineage = Vec::new();
        let mut visited = HashSet::new();
        let mut current = type_name;
        loop {
            let Some(definition) = self.definitions.get(current) else {
                let message = if current == type_name {
                    "type is not registered".to_string()
                } else {
                    format!("supertype {current} is not registered")
                };
                return Err(Error::schema(type_name.as_str(), message));
            };
            if !visited.insert(current) {
                return Err(Error::schema(
                    type_name.as_str(),
                    format!("inheritance cycle through {current}"),
                ));
            }
            lineage.push(definition);
            match definition.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        lineage.reverse();
        Ok(lineage)
    }

    fn build(&self, type_name: &TypeName) -> Result<TypeDescriptor> {
        let lineage = self.lineage(type_name)?;
        let table = lineage
            .iter()
            .rev()
            .find_map(|definition| definition.table_override())
            .map_or_else(|| self.convention.table_for_type(type_name), str::to_string);

        let mut descriptor = TypeDescriptor::new(type_name.clone(), table.clone());
        for definition in &lineage {
            for method in definition.methods() {
                descriptor.add_method(method);
            }
        }

        for (depth, &declaring) in lineage.iter().enumerate() {
            let scope = Scope {
                registry: self,
                declaring,
                lineage: &lineage[..=depth],
            };
            let ctx = DeclarationContext {
                type_name,
                table: &table,
                aliases: declaring.aliases(),
                convention: self.convention.as_ref(),
                constants: &scope,
            };
            let mut declared = HashSet::new();
            for line in declaring.properties() {
                let property = parse_declaration(line, &ctx)?;
                if !declared.insert(property.name().to_string()) {
                    return Err(Error::schema_property(
                        type_name.as_str(),
                        property.name(),
                        format!("property is declared more than once on {}", declaring.name()),
                    ));
                }
                descriptor.put_property(property);
            }
        }

        for property in descriptor.properties() {
            if let Some(methods) = property.access_methods() {
                if !descriptor.has_method(methods.getter()) {
                    return Err(Error::schema_property(
                        type_name.as_str(),
                        property.name(),
                        format!("getter '{}' is not declared", methods.getter()),
                    ));
                }
            }
        }

        tracing::debug!(
            type_name = %type_name,
            table = %descriptor.table(),
            properties = descriptor.properties().len(),
            "Built type descriptor"
        );
        Ok(descriptor)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("types", &self.type_names())
            .field("cached", &self.cached_count())
            .finish_non_exhaustive()
    }
}

fn merge_constants(lineage: &[&TypeDefinition]) -> Vec<Constant> {
    let mut merged: Vec<Constant> = Vec::new();
    for definition in lineage {
        for constant in definition.constants() {
            match merged.iter_mut().find(|c| c.name == constant.name) {
                Some(existing) => existing.value = constant.value.clone(),
                None => merged.push(constant.clone()),
            }
        }
    }
    merged
}

/// Constant lookup for declarations of one definition in a lineage.
struct Scope<'a> {
    registry: &'a SchemaRegistry,
    declaring: &'a TypeDefinition,
    /// Root supertype down to `declaring`.
    lineage: &'a [&'a TypeDefinition],
}

impl ConstantSource for Scope<'_> {
    fn declaring_type(&self) -> &TypeName {
        self.declaring.name()
    }

    fn own_constants(&self) -> Vec<Constant> {
        merge_constants(self.lineage)
    }

    fn parent_constants(&self) -> Option<Vec<Constant>> {
        match self.lineage.split_last() {
            Some((_, ancestors)) if !ancestors.is_empty() => Some(merge_constants(ancestors)),
            _ => None,
        }
    }

    fn translate(&self, reference: &str) -> TypeName {
        self.declaring.aliases().translate(reference)
    }

    fn constants_of(&self, type_name: &TypeName) -> Option<Vec<Constant>> {
        self.registry.constants_of(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyKind;
    use crate::relationship::RelationshipDescriptor;
    use rowmodel_core::{ErrorKind, MapperConfig, Value};

    fn library() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                TypeDefinition::new("model::Base")
                    .property("@property-read int $id")
                    .property("@property string|null $note")
                    .constant("STATE_DRAFT", 1)
                    .constant("STATE_DONE", 2),
            )
            .unwrap()
            .with(
                TypeDefinition::new("model::Book")
                    .extends("model::Base")
                    .property("@property string $note")
                    .property("@property string $title")
                    .property("@property-read Author $author m:hasOne")
                    .property("@property int $state m:enum(parent::STATE_*)")
                    .constant("STATE_DONE", 3),
            )
            .unwrap()
            .with(TypeDefinition::new("model::Author").property("@property-read int $id"))
            .unwrap()
    }

    #[test]
    fn test_for_type_returns_same_arc() {
        let registry = library();
        let book = TypeName::new("model::Book");
        let first = registry.for_type(&book).unwrap();
        let second = registry.for_type(&book).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.cached_count(), 1);
    }

    #[test]
    fn test_inherited_properties_parent_first() {
        let registry = library();
        let book = registry.for_type(&TypeName::new("model::Book")).unwrap();
        let names: Vec<_> = book.property_names().collect();
        assert_eq!(names, ["id", "note", "title", "author", "state"]);
        // Redeclared in place, nullability taken from the child.
        assert!(!book.property("note").unwrap().is_nullable());
        assert_eq!(book.table(), "book");
        assert_eq!(
            book.property("author").unwrap().relationship(),
            Some(&RelationshipDescriptor::SingleOwned {
                column: "author_id".to_string(),
                target_table: "author".to_string(),
            })
        );
    }

    #[test]
    fn test_parent_constants_in_enumeration() {
        let registry = library();
        let book = registry.for_type(&TypeName::new("model::Book")).unwrap();
        let state = book.property("state").unwrap();
        assert!(state.is_value_allowed(&Value::Int(2)));
        assert!(!state.is_value_allowed(&Value::Int(3)));
    }

    #[test]
    fn test_constants_of_merges_lineage() {
        let registry = library();
        let constants = registry.constants_of(&TypeName::new("model::Book")).unwrap();
        assert_eq!(constants.len(), 2);
        assert_eq!(constants[1].value, Value::Int(3));
        assert!(registry.constants_of(&TypeName::new("model::Missing")).is_none());
    }

    #[test]
    fn test_inherited_relationship_uses_concrete_table() {
        let registry = SchemaRegistry::new()
            .with(
                TypeDefinition::new("model::Owned")
                    .property("@property-read Tag[] $tags m:hasMany"),
            )
            .unwrap()
            .with(TypeDefinition::new("model::Post").extends("model::Owned").table("posts"))
            .unwrap();
        let post = registry.for_type(&TypeName::new("model::Post")).unwrap();
        let tags = post.property("tags").unwrap();
        assert_eq!(tags.kind(), PropertyKind::Collection);
        assert_eq!(
            tags.relationship(),
            Some(&RelationshipDescriptor::ManyOwning {
                source_column: "posts_id".to_string(),
                association_table: "posts_tag".to_string(),
                target_column: "tag_id".to_string(),
                target_table: "tag".to_string(),
            })
        );
    }

    #[test]
    fn test_custom_convention() {
        let convention = DefaultConvention::with_config(
            MapperConfig::new().primary_key("pk").relationship_table_glue("_x_"),
        );
        let registry = SchemaRegistry::with_convention(Arc::new(convention))
            .with(TypeDefinition::new("Book").property("@property-read Tag[] $tags m:hasMany"))
            .unwrap();
        let book = registry.for_type(&TypeName::new("Book")).unwrap();
        assert_eq!(
            book.property("tags").unwrap().relationship(),
            Some(&RelationshipDescriptor::ManyOwning {
                source_column: "book_pk".to_string(),
                association_table: "book_x_tag".to_string(),
                target_column: "tag_pk".to_string(),
                target_table: "tag".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_registration() {
        let err = SchemaRegistry::new()
            .with(TypeDefinition::new("model::Book"))
            .unwrap()
            .with(TypeDefinition::new("model::Book"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSchema);
    }

    #[test]
    fn test_duplicate_property_in_one_definition() {
        let registry = SchemaRegistry::new()
            .with(
                TypeDefinition::new("model::Book")
                    .property("@property int $id")
                    .property("@property string $id"),
            )
            .unwrap();
        let err = registry.for_type(&TypeName::new("model::Book")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSchema);
        assert_eq!(registry.cached_count(), 0);
    }

    #[test]
    fn test_unregistered_and_cyclic_types() {
        let registry = SchemaRegistry::new()
            .with(TypeDefinition::new("model::A").extends("model::B"))
            .unwrap()
            .with(TypeDefinition::new("model::B").extends("model::A"))
            .unwrap()
            .with(TypeDefinition::new("model::C").extends("model::Missing"))
            .unwrap();
        for name in ["model::A", "model::C", "model::Nope"] {
            let err = registry.for_type(&TypeName::new(name)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedSchema, "{name}");
        }
    }

    #[test]
    fn test_getter_must_be_declared() {
        let registry = SchemaRegistry::new()
            .with(
                TypeDefinition::new("model::Book")
                    .property("@property-read string $title m:useMethods(readTitle)"),
            )
            .unwrap()
            .with(
                TypeDefinition::new("model::Novel")
                    .property("@property-read string $title m:useMethods(readTitle)")
                    .method("readTitle"),
            )
            .unwrap();
        let err = registry.for_type(&TypeName::new("model::Book")).unwrap_err();
        assert!(err.to_string().contains("readTitle"));
        assert!(registry.for_type(&TypeName::new("model::Novel")).is_ok());
    }

    #[test]
    fn test_descriptor_serializes_for_inspection() {
        let registry = library();
        let book = registry.for_type(&TypeName::new("model::Book")).unwrap();
        let json = serde_json::to_value(&*book).unwrap();
        assert_eq!(json["type_name"], "model::Book");
        assert_eq!(json["properties"][3]["name"], "author");
        assert_eq!(json["properties"][3]["kind"], "entity");
        assert_eq!(json["properties"][3]["property_type"], "model::Author");
        assert_eq!(json["properties"][3]["relationship"]["kind"], "single_owned");
        assert_eq!(json["properties"][4]["enumerated_values"]["values"][0][0], "STATE_DRAFT");
    }

    #[test]
    fn test_build_all() {
        let registry = library();
        assert_eq!(registry.build_all().unwrap(), 3);
    }

    #[test]
    fn test_concurrent_first_requests_share_descriptor() {
        let registry = Arc::new(library());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.for_type(&TypeName::new("model::Book")).unwrap()
                })
            })
            .collect();
        let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for descriptor in &descriptors[1..] {
            assert!(Arc::ptr_eq(&descriptors[0], descriptor));
        }
    }
}
