use std::collections::BTreeMap;

use async_trait::async_trait;
use hospitaldb_core::{SqlValue, Table};

use super::{RecordStore, check_arity};
use crate::errors::PopulateError;

/// Row kept by [`MemoryStore`], keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub key: i64,
    pub values: BTreeMap<String, SqlValue>,
}

impl StoredRow {
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values.get(column)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_i64)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(SqlValue::as_str)
    }
}

/// In-memory record store that assigns sequential keys and, like a database
/// with foreign keys enabled, rejects rows pointing at missing parents.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<StoredRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &str) -> &[StoredRow] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn has_key(&self, table: &str, key: i64) -> bool {
        self.rows(table).iter().any(|row| row.key == key)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(
        &mut self,
        table: &Table,
        values: Vec<SqlValue>,
    ) -> Result<i64, PopulateError> {
        check_arity(table, &values)?;

        let row_values: BTreeMap<String, SqlValue> = table
            .insertable_columns()
            .into_iter()
            .map(|column| column.name.clone())
            .zip(values)
            .collect();

        for fk in table.foreign_keys() {
            for column in &fk.columns {
                let value = row_values.get(column).unwrap_or(&SqlValue::Null);
                if value.is_null() {
                    continue;
                }
                let resolved = value
                    .as_i64()
                    .map(|key| self.has_key(&fk.referenced_table, key))
                    .unwrap_or(false);
                if !resolved {
                    return Err(PopulateError::DanglingReference {
                        table: table.name.clone(),
                        column: column.clone(),
                        value: value.render(),
                    });
                }
            }
        }

        let rows = self.tables.entry(table.name.clone()).or_default();
        let key = rows.last().map(|row| row.key + 1).unwrap_or(1);
        rows.push(StoredRow {
            key,
            values: row_values,
        });
        Ok(key)
    }

    async fn count(&mut self, table: &Table) -> Result<u64, PopulateError> {
        Ok(self.rows(&table.name).len() as u64)
    }

    async fn clear(&mut self, table: &Table) -> Result<u64, PopulateError> {
        Ok(self
            .tables
            .remove(&table.name)
            .map(|rows| rows.len() as u64)
            .unwrap_or(0))
    }
}
