//! In-memory tables implementing the RowModel [`Row`] contract.
//!
//! `rowmodel-memory` keeps every table as an ordered list of records in
//! memory. It is meant for tests, demos and fixtures, not as a database:
//! lookups are linear scans.
//!
//! Foreign keys follow the naming convention of the mapper: a row of `book`
//! references `author` through its `author_id` column, and `referenced`
//! matches that value against the primary key column of `author`.
//!
//! # Example
//!
//! ```
//! use rowmodel_core::{Row, Value};
//! use rowmodel_memory::MemoryStore;
//! use serde_json::json;
//!
//! let store = MemoryStore::from_json(json!({
//!     "author": [{ "id": 1, "name": "Jan Neruda" }],
//!     "book": [
//!         { "id": 1, "title": "Povídky malostranské", "author_id": 1 },
//!         { "id": 2, "title": "Písně kosmické", "author_id": 1 },
//!     ],
//! }))
//! .unwrap();
//!
//! let author = store.find("author", 1).unwrap();
//! assert_eq!(author.referencing("book", "author_id").unwrap().len(), 2);
//! assert_eq!(author.column("name"), Value::from("Jan Neruda"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rowmodel_core::{Error, MapperConfig, Result, Row, Value};

/// Column values of one stored row.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Default)]
struct Tables {
    primary_key: String,
    tables: BTreeMap<String, Vec<Record>>,
}

/// Builder for [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryStoreBuilder {
    inner: Tables,
}

impl MemoryStoreBuilder {
    /// Primary key column used to match foreign keys. Defaults to `id`.
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.inner.primary_key = column.into();
        self
    }

    /// Take the primary key column from a mapper configuration.
    pub fn config(self, config: &MapperConfig) -> Self {
        self.primary_key(config.primary_key.clone())
    }

    /// Declare a table, which may stay empty.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.inner.tables.entry(table.into()).or_default();
        self
    }

    /// Append a row to `table`.
    pub fn insert<K, V>(
        mut self,
        table: impl Into<String>,
        columns: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let record = columns
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        self.inner.tables.entry(table.into()).or_default().push(record);
        self
    }

    /// Load tables from a JSON document of the form
    /// `{ "table": [ { "column": value, ... }, ... ], ... }`.
    ///
    /// Column values deserialize into [`Value`]; embedded objects carry their
    /// type in a `$type` member.
    pub fn load_json(mut self, document: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(tables) = document else {
            return Err(Error::DataSource(
                "fixture must be an object mapping table names to row arrays".to_string(),
            ));
        };

        let mut loaded = 0;
        for (table, rows) in tables {
            let serde_json::Value::Array(rows) = rows else {
                return Err(Error::DataSource(format!(
                    "fixture table '{table}' must be an array of rows"
                )));
            };
            let stored = self.inner.tables.entry(table.clone()).or_default();
            for row in rows {
                let serde_json::Value::Object(columns) = row else {
                    return Err(Error::DataSource(format!(
                        "fixture table '{table}' contains a row that is not an object"
                    )));
                };
                let mut record = Record::new();
                for (column, value) in columns {
                    record.insert(column, serde_json::from_value(value)?);
                }
                stored.push(record);
                loaded += 1;
            }
        }

        tracing::debug!(
            tables = self.inner.tables.len(),
            rows = loaded,
            "Loaded JSON fixture"
        );
        Ok(self)
    }

    pub fn build(self) -> MemoryStore {
        MemoryStore {
            inner: Arc::new(self.inner),
        }
    }
}

/// Shared, immutable set of in-memory tables.
///
/// Cloning the store is cheap; rows keep the store alive.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Tables>,
}

impl MemoryStore {
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder {
            inner: Tables {
                primary_key: MapperConfig::default().primary_key,
                tables: BTreeMap::new(),
            },
        }
    }

    /// Build a store from a JSON fixture, see [`MemoryStoreBuilder::load_json`].
    pub fn from_json(document: serde_json::Value) -> Result<Self> {
        Ok(Self::builder().load_json(document)?.build())
    }

    /// Build a store from JSON fixture text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_json(serde_json::from_str(text)?)
    }

    pub fn primary_key(&self) -> &str {
        &self.inner.primary_key
    }

    /// Names of the stored tables, sorted.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.inner.tables.keys().map(String::as_str)
    }

    /// Number of rows in `table`, `None` for an unknown table.
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.inner.tables.get(table).map(Vec::len)
    }

    /// Row `index` of `table`.
    pub fn row(&self, table: &str, index: usize) -> Option<MemoryRow> {
        let len = self.row_count(table)?;
        (index < len).then(|| self.handle(table, index))
    }

    /// Every row of `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<MemoryRow> {
        let len = self.row_count(table).unwrap_or(0);
        (0..len).map(|index| self.handle(table, index)).collect()
    }

    /// First row of `table` whose primary key equals `key`.
    pub fn find(&self, table: &str, key: impl Into<Value>) -> Option<MemoryRow> {
        let key = key.into();
        let rows = self.inner.tables.get(table)?;
        rows.iter()
            .position(|record| {
                record
                    .get(self.primary_key())
                    .is_some_and(|pk| keys_match(pk, &key))
            })
            .map(|index| self.handle(table, index))
    }

    fn handle(&self, table: &str, index: usize) -> MemoryRow {
        MemoryRow {
            store: self.clone(),
            table: Arc::from(table),
            index,
        }
    }

    fn table(&self, table: &str) -> Result<&[Record]> {
        self.inner
            .tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::DataSource(format!("no such table '{table}'")))
    }
}

/// Key comparison: equal values, or integers and their canonical text form.
fn keys_match(left: &Value, right: &Value) -> bool {
    fn integer(value: &Value) -> Option<i64> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Text(s) => s.parse().ok().filter(|i: &i64| i.to_string() == *s),
            _ => None,
        }
    }
    if left.is_null() || right.is_null() {
        return false;
    }
    left == right || integer(left).is_some_and(|l| integer(right) == Some(l))
}

/// Handle to one row of a [`MemoryStore`].
///
/// Handles are equal when they point at the same row of the same store.
#[derive(Clone)]
pub struct MemoryRow {
    store: MemoryStore,
    table: Arc<str>,
    index: usize,
}

impl MemoryRow {
    /// Position of the row within its table.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    fn record(&self) -> Option<&Record> {
        self.store.inner.tables.get(&*self.table)?.get(self.index)
    }
}

impl Row for MemoryRow {
    fn table(&self) -> &str {
        &self.table
    }

    fn column(&self, name: &str) -> Value {
        self.record()
            .and_then(|record| record.get(name))
            .cloned()
            .unwrap_or_default()
    }

    fn referenced(&self, target_table: &str, via_column: &str) -> Result<Option<Self>> {
        let key = self.column(via_column);
        let rows = self.store.table(target_table)?;
        if key.is_null() {
            return Ok(None);
        }
        let primary_key = self.store.primary_key();
        Ok(rows
            .iter()
            .position(|record| record.get(primary_key).is_some_and(|pk| keys_match(pk, &key)))
            .map(|index| self.store.handle(target_table, index)))
    }

    fn referencing(&self, target_table: &str, via_column: &str) -> Result<Vec<Self>> {
        let key = self.column(self.store.primary_key());
        let rows = self.store.table(target_table)?;
        if key.is_null() {
            return Ok(Vec::new());
        }
        Ok(rows
            .iter()
            .enumerate()
            .filter(|(_, record)| record.get(via_column).is_some_and(|fk| keys_match(fk, &key)))
            .map(|(index, _)| self.store.handle(target_table, index))
            .collect())
    }
}

impl PartialEq for MemoryRow {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store.inner, &other.store.inner)
            && self.table == other.table
            && self.index == other.index
    }
}

impl Eq for MemoryRow {}

impl fmt::Debug for MemoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRow")
            .field("table", &self.table)
            .field("index", &self.index)
            .field("columns", &self.record())
            .finish()
    }
}
