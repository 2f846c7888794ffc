//! Core types and traits for RowModel.
//!
//! `rowmodel-core` is the **foundation layer** of the workspace. It defines the
//! data model and the collaborator contracts every other crate builds on.
//!
//! # Role In The Architecture
//!
//! - **Data model**: `Value`, `ScalarType` and `TypeName` describe what rows
//!   store and how domain types are identified.
//! - **Contract layer**: `Row` is implemented by data sources; `TableToTypeResolver`
//!   and `NamingConvention` are the pluggable naming collaborators.
//! - **Errors**: one `Error` enum covering schema construction and property resolution.
//!
//! # Who Uses This Crate
//!
//! - `rowmodel-reflect` parses type schemas into descriptors using `ScalarType`,
//!   `TypeName` and `NamingConvention`.
//! - `rowmodel` resolves entity properties against any `Row` implementation.
//! - `rowmodel-memory` implements `Row` over in-memory tables.

pub mod config;
pub mod error;
pub mod naming;
pub mod row;
pub mod type_name;
pub mod types;
pub mod value;

pub use config::MapperConfig;
pub use error::{Error, ErrorKind, Result, SchemaError};
pub use naming::{DefaultConvention, NamingConvention, TableToTypeResolver};
pub use row::Row;
pub use type_name::{TypeName, lcfirst, ucfirst};
pub use types::ScalarType;
pub use value::{EmbeddedObject, Value};
