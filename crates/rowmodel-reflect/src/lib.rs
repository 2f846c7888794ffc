//! Property schemas and type descriptors for RowModel.
//!
//! `rowmodel-reflect` is the **metadata layer**. Domain types are described by
//! registered [`TypeDefinition`]s whose property declarations are parsed into
//! immutable [`TypeDescriptor`]s, built once per type and shared.
//!
//! # Role In The Architecture
//!
//! - **Grammar**: property declaration lines with their `m:` flags, the
//!   `m:useMethods` definition ([`PropertyAccessMethods`]) and the `m:enum`
//!   definition ([`EnumeratedValues`]).
//! - **Metadata**: [`PropertyDescriptor`] and [`RelationshipDescriptor`] tell
//!   the resolver how each virtual property is produced.
//! - **Cache**: [`SchemaRegistry`] owns the definitions and memoizes
//!   descriptors; it is `Send + Sync` and meant to be shared behind an `Arc`.
//!
//! # Example
//!
//! ```
//! use rowmodel_core::TypeName;
//! use rowmodel_reflect::{PropertyKind, SchemaRegistry, TypeDefinition};
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         TypeDefinition::new("model::Book")
//!             .property("@property-read int $id")
//!             .property("@property-read Author $author m:hasOne"),
//!     )
//!     .unwrap();
//!
//! let book = registry.for_type(&TypeName::new("model::Book")).unwrap();
//! assert_eq!(book.property("author").unwrap().kind(), PropertyKind::Entity);
//! ```

pub mod definition;
pub mod descriptor;
pub mod enumeration;
mod grammar;
pub mod methods;
mod parser;
pub mod property;
pub mod registry;
pub mod relationship;

pub use definition::{Aliases, Constant, TypeDefinition};
pub use descriptor::TypeDescriptor;
pub use enumeration::{ConstantSource, EnumeratedValues};
pub use methods::PropertyAccessMethods;
pub use property::{PropertyDescriptor, PropertyKind, PropertyType};
pub use registry::SchemaRegistry;
pub use relationship::RelationshipDescriptor;
