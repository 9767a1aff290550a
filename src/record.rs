//! The insertable-record capability.
//!
//! Each concrete row type (session, command) knows its table name and its
//! ordered column/value list; the store derives the `INSERT` column list and
//! placeholder tuple from that, so the two can never drift apart.

use crate::storage::Value;

/// A typed row that can be inserted into the history database.
pub trait InsertableRecord {
    /// The logical table this record belongs to.
    fn table(&self) -> &'static str;

    /// Ordered (column, value) pairs; the ordering is stable between the
    /// generated column list and the bound value tuple.
    fn fields(&self) -> Vec<(&'static str, Value)>;
}
