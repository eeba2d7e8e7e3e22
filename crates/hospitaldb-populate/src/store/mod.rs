//! Persistence seam for generated rows.

mod memory;
mod sqlite;

pub use memory::{MemoryStore, StoredRow};
pub use sqlite::{SqliteStore, connect};

use async_trait::async_trait;
use hospitaldb_core::{SqlValue, Table};

use crate::errors::PopulateError;

/// Destination for generated rows.
///
/// Implementations assign the primary key and return it, so callers can
/// build key sets from exactly the rows they wrote.
#[async_trait]
pub trait RecordStore: Send {
    /// Insert one row given values for the table's insertable columns.
    async fn insert(&mut self, table: &Table, values: Vec<SqlValue>)
    -> Result<i64, PopulateError>;

    /// Number of rows currently held by the table.
    async fn count(&mut self, table: &Table) -> Result<u64, PopulateError>;

    /// Delete every row of the table, returning how many were removed.
    async fn clear(&mut self, table: &Table) -> Result<u64, PopulateError>;
}

pub(crate) fn check_arity(table: &Table, values: &[SqlValue]) -> Result<(), PopulateError> {
    let expected = table.insertable_columns().len();
    if values.len() != expected {
        return Err(PopulateError::ArityMismatch {
            table: table.name.clone(),
            expected,
            found: values.len(),
        });
    }
    Ok(())
}
