//! Mapper configuration.

use serde::{Deserialize, Serialize};

/// Configuration of the default naming conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Namespace entity types live in.
    ///
    /// `None` resolves related types relative to the namespace of the entity
    /// being read.
    pub entity_namespace: Option<String>,
    /// Primary key column of every table.
    pub primary_key: String,
    /// Glue between table names in derived association-table names.
    pub relationship_table_glue: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            entity_namespace: None,
            primary_key: "id".to_string(),
            relationship_table_glue: "_".to_string(),
        }
    }
}

impl MapperConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve related types inside a fixed namespace.
    pub fn entity_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.entity_namespace = Some(namespace.into());
        self
    }

    /// Set the primary key column name.
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Set the association-table glue.
    pub fn relationship_table_glue(mut self, glue: impl Into<String>) -> Self {
        self.relationship_table_glue = glue.into();
        self
    }
}
