//! RowModel: relational rows as typed entities with lazily resolved relationships.
//!
//! This is the facade crate. It ties the metadata layer (`rowmodel-reflect`)
//! to a row data source implementing [`Row`]:
//!
//! - [`EntityClass`] pairs a [`TypeDefinition`] with its accessor methods.
//! - [`Mapper`] owns the schema registry, the naming collaborators and the
//!   accessor tables; build one with [`Mapper::builder`].
//! - [`Entity`] wraps one row and resolves properties on demand.
//!
//! # Example
//!
//! ```
//! use rowmodel::prelude::*;
//! use rowmodel_memory::MemoryStore;
//! use serde_json::json;
//!
//! let store = MemoryStore::from_json(json!({
//!     "author": [{ "id": 1, "name": "Karel Čapek" }],
//!     "book": [{ "id": 10, "title": "R.U.R.", "author_id": 1 }],
//! }))
//! .unwrap();
//!
//! let mapper = Mapper::builder()
//!     .register(TypeDefinition::new("model::Author").property("@property string $name"))
//!     .register(
//!         TypeDefinition::new("model::Book")
//!             .property("@property string $title")
//!             .property("@property-read Author $author m:hasOne"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let book = mapper.entity("model::Book", store.row("book", 0).unwrap()).unwrap();
//! let author = book.get("author").unwrap().into_entity().unwrap();
//! assert_eq!(author.get("name").unwrap().as_str(), Some("Karel Čapek"));
//! ```

pub mod entity;
pub mod mapper;
pub mod value;

pub use entity::Entity;
pub use mapper::{Accessor, EntityClass, Mapper, MapperBuilder};
pub use value::PropertyValue;

pub use rowmodel_core::{
    DefaultConvention, EmbeddedObject, Error, ErrorKind, MapperConfig, NamingConvention, Result,
    Row, ScalarType, SchemaError, TableToTypeResolver, TypeName, Value,
};
pub use rowmodel_reflect::{
    EnumeratedValues, PropertyAccessMethods, PropertyDescriptor, PropertyKind, PropertyType,
    RelationshipDescriptor, SchemaRegistry, TypeDefinition, TypeDescriptor,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Entity, EntityClass, Error, ErrorKind, Mapper, MapperConfig, PropertyKind, PropertyValue,
        RelationshipDescriptor, Result, Row, TypeDefinition, TypeName, Value,
    };
}
