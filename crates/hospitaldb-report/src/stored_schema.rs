use sqlx::sqlite::SqliteConnection;

use crate::errors::ReportError;

/// A table as recorded in `sqlite_master`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredTable {
    pub name: String,
    pub sql: String,
}

/// Every user table with its stored DDL, in creation order.
pub async fn list_stored_schema(
    conn: &mut SqliteConnection,
) -> Result<Vec<StoredTable>, ReportError> {
    let tables = sqlx::query_as::<_, StoredTable>(
        "SELECT name, sql FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
    )
    .fetch_all(conn)
    .await?;
    Ok(tables)
}
