//! Relationship metadata.
//!
//! A relationship describes how to get from the current row to the related
//! row(s). There are four traversal shapes:
//!
//! | variant        | flag              | traversal                                                   | result     |
//! |----------------|-------------------|-------------------------------------------------------------|------------|
//! | `SingleOwned`  | `m:hasOne`        | follow `column` of the current row into `target_table`      | 0..1 row   |
//! | `ManyOwning`   | `m:hasMany`       | association rows referencing us, each followed to a target  | 0..n rows  |
//! | `SingleOwning` | `m:belongsToOne`  | rows of `target_table` whose `column` references us         | 0..1 row (checked) |
//! | `ManyOwned`    | `m:belongsToMany` | rows of `target_table` whose `column` references us         | 0..n rows  |

use serde::Serialize;

/// How a relational property is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationshipDescriptor {
    /// The current row holds a foreign key to exactly one target row.
    SingleOwned {
        /// Column of the current row referencing `target_table`.
        column: String,
        target_table: String,
    },
    /// Many targets linked through an association table.
    ManyOwning {
        /// Column of the association table referencing the current table.
        source_column: String,
        association_table: String,
        /// Column of the association table referencing `target_table`.
        target_column: String,
        target_table: String,
    },
    /// At most one row of the target table references the current row.
    SingleOwning {
        /// Column of `target_table` referencing the current table.
        column: String,
        target_table: String,
    },
    /// Any number of rows of the target table reference the current row.
    ManyOwned {
        /// Column of `target_table` referencing the current table.
        column: String,
        target_table: String,
    },
}

impl RelationshipDescriptor {
    /// Table the resolved entities are read from.
    pub fn target_table(&self) -> &str {
        match self {
            RelationshipDescriptor::SingleOwned { target_table, .. }
            | RelationshipDescriptor::ManyOwning { target_table, .. }
            | RelationshipDescriptor::SingleOwning { target_table, .. }
            | RelationshipDescriptor::ManyOwned { target_table, .. } => target_table,
        }
    }

    /// Whether the relationship yields a sequence of entities.
    pub const fn is_many(&self) -> bool {
        matches!(
            self,
            RelationshipDescriptor::ManyOwning { .. } | RelationshipDescriptor::ManyOwned { .. }
        )
    }

    /// Flag name as written in declarations.
    pub const fn flag(&self) -> &'static str {
        match self {
            RelationshipDescriptor::SingleOwned { .. } => "hasOne",
            RelationshipDescriptor::ManyOwning { .. } => "hasMany",
            RelationshipDescriptor::SingleOwning { .. } => "belongsToOne",
            RelationshipDescriptor::ManyOwned { .. } => "belongsToMany",
        }
    }
}
