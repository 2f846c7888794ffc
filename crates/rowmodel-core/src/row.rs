//! The row data-source contract.
//!
//! A [`Row`] is a handle to one relational tuple. Besides column reads it
//! exposes the two graph-traversal primitives relationship resolution is built
//! on: following a foreign key outward ([`Row::referenced`]) and finding the
//! rows that point back at this one ([`Row::referencing`]).
//!
//! Implementations may perform blocking I/O; failures are reported as
//! [`Error::DataSource`](crate::Error::DataSource).

use crate::error::Result;
use crate::value::Value;

/// One relational row with foreign-key traversal.
///
/// Handles are cheap to clone and compare equal when they denote the same
/// underlying tuple.
pub trait Row: Clone + PartialEq {
    /// Name of the table this row belongs to.
    fn table(&self) -> &str;

    /// Read a column. Absent columns read as `Value::Null`.
    fn column(&self, name: &str) -> Value;

    /// Follow the foreign key stored in `via_column` of this row to the
    /// referenced row of `target_table`.
    ///
    /// Returns `Ok(None)` when the key is null or dangles.
    fn referenced(&self, target_table: &str, via_column: &str) -> Result<Option<Self>>;

    /// Rows of `target_table` whose `via_column` references this row, in the
    /// order the data source returns them.
    fn referencing(&self, target_table: &str, via_column: &str) -> Result<Vec<Self>>;
}
