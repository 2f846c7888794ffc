//! Naming conventions between tables, columns and domain types.
//!
//! Two collaborators are pluggable:
//!
//! - [`TableToTypeResolver`] maps a traversed table to the domain type its rows
//!   are wrapped in.
//! - [`NamingConvention`] supplies the column each property is stored in, and the
//!   default table and column names used when a relationship declaration leaves
//!   them out.
//!
//! [`DefaultConvention`] implements both: table `book` ↔ type `<namespace>::Book`,
//! primary key `id`, association table `book_tag`, foreign key column `author_id`.

use crate::config::MapperConfig;
use crate::type_name::{TypeName, ucfirst};

/// Resolve the domain type for rows of a table reached from `current`.
pub trait TableToTypeResolver: Send + Sync {
    fn type_for_table(&self, current: &TypeName, table: &str) -> TypeName;
}

/// Default table and column naming.
pub trait NamingConvention: Send + Sync {
    /// Primary key column of `table`.
    fn primary_key(&self, table: &str) -> String;

    /// Table storing rows of `type_name`.
    fn table_for_type(&self, type_name: &TypeName) -> String;

    /// Association table linking `source_table` to `target_table`.
    fn relationship_table(&self, source_table: &str, target_table: &str) -> String;

    /// Column of a row in `source_table` referencing `target_table`.
    fn relationship_column(&self, source_table: &str, target_table: &str) -> String;

    /// Column backing the scalar or embedded `property` of `type_name`.
    fn column(&self, _type_name: &TypeName, property: &str) -> String {
        property.to_string()
    }
}

/// The stock convention, driven by [`MapperConfig`].
#[derive(Debug, Clone, Default)]
pub struct DefaultConvention {
    config: MapperConfig,
}

impl DefaultConvention {
    /// Create the convention with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the convention from an explicit configuration.
    pub fn with_config(config: MapperConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }
}

impl TableToTypeResolver for DefaultConvention {
    fn type_for_table(&self, current: &TypeName, table: &str) -> TypeName {
        let namespace = self
            .config
            .entity_namespace
            .as_deref()
            .unwrap_or_else(|| current.namespace());
        TypeName::join(namespace, &ucfirst(table))
    }
}

impl NamingConvention for DefaultConvention {
    fn primary_key(&self, _table: &str) -> String {
        self.config.primary_key.clone()
    }

    fn table_for_type(&self, type_name: &TypeName) -> String {
        type_name.short_name().to_lowercase()
    }

    fn relationship_table(&self, source_table: &str, target_table: &str) -> String {
        format!(
            "{}{}{}",
            source_table, self.config.relationship_table_glue, target_table
        )
    }

    fn relationship_column(&self, _source_table: &str, target_table: &str) -> String {
        format!("{}_{}", target_table, self.primary_key(target_table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_for_table_uses_current_namespace() {
        let convention = DefaultConvention::new();
        let current = TypeName::new("app::model::Book");
        assert_eq!(
            convention.type_for_table(&current, "review").as_str(),
            "app::model::Review"
        );
    }

    #[test]
    fn test_type_for_table_top_level() {
        let convention = DefaultConvention::new();
        let current = TypeName::new("Book");
        assert_eq!(convention.type_for_table(&current, "author").as_str(), "Author");
    }

    #[test]
    fn test_type_for_table_fixed_namespace() {
        let convention =
            DefaultConvention::with_config(MapperConfig::new().entity_namespace("entity"));
        let current = TypeName::new("model::Book");
        assert_eq!(
            convention.type_for_table(&current, "author").as_str(),
            "entity::Author"
        );
    }

    #[test]
    fn test_default_names() {
        let convention = DefaultConvention::new();
        assert_eq!(convention.table_for_type(&TypeName::new("model::Book")), "book");
        assert_eq!(convention.relationship_table("book", "tag"), "book_tag");
        assert_eq!(convention.relationship_column("book", "author"), "author_id");
        assert_eq!(
            convention.column(&TypeName::new("model::Book"), "publishedAt"),
            "publishedAt"
        );
    }
}
