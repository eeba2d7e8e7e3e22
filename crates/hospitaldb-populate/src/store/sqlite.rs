use std::str::FromStr;

use async_trait::async_trait;
use hospitaldb_core::{SqlValue, Table};
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};

use super::{RecordStore, check_arity};
use crate::errors::PopulateError;

/// Open the single connection used for a run, creating the database file
/// when needed and enforcing foreign keys.
pub async fn connect(url: &str) -> Result<SqliteConnection, PopulateError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    Ok(options.connect().await?)
}

/// Record store writing through an exclusively borrowed SQLite connection
/// (usually an open transaction).
pub struct SqliteStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RecordStore for SqliteStore<'_> {
    async fn insert(
        &mut self,
        table: &Table,
        values: Vec<SqlValue>,
    ) -> Result<i64, PopulateError> {
        check_arity(table, &values)?;
        let sql = insert_statement(table)?;

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in values {
            query = match value {
                SqlValue::Null => query.bind(None::<i64>),
                SqlValue::Int(value) => query.bind(value),
                SqlValue::Float(value) => query.bind(value),
                SqlValue::Text(value) => query.bind(value),
                SqlValue::Date(value) => query.bind(value),
                SqlValue::Timestamp(value) => query.bind(value),
            };
        }

        Ok(query.fetch_one(&mut *self.conn).await?)
    }

    async fn count(&mut self, table: &Table) -> Result<u64, PopulateError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name);
        let rows: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *self.conn).await?;
        Ok(rows.max(0) as u64)
    }

    async fn clear(&mut self, table: &Table) -> Result<u64, PopulateError> {
        let sql = format!("DELETE FROM {}", table.name);
        let result = sqlx::query(&sql).execute(&mut *self.conn).await?;
        Ok(result.rows_affected())
    }
}

fn insert_statement(table: &Table) -> Result<String, PopulateError> {
    let pk = table.primary_key_column().ok_or_else(|| {
        hospitaldb_core::Error::Unsupported(format!(
            "table {} needs a single-column primary key",
            table.name
        ))
    })?;
    let columns: Vec<&str> = table
        .insertable_columns()
        .into_iter()
        .map(|column| column.name.as_str())
        .collect();
    let placeholders = vec!["?"; columns.len()].join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table.name,
        columns.join(", "),
        placeholders,
        pk
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospitaldb_core::{Entity, hospital_schema};

    #[test]
    fn insert_statement_skips_primary_key() {
        let schema = hospital_schema();
        let billing = schema.table(Entity::Billing.table_name()).unwrap();
        assert_eq!(
            insert_statement(billing).unwrap(),
            "INSERT INTO Billing (patient_id, amount, billing_date, payment_status) \
             VALUES (?, ?, ?, ?) RETURNING billing_id"
        );
    }
}
