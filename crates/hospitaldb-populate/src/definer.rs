use std::collections::BTreeSet;

use hospitaldb_core::{
    DatabaseSchema, Table, build_fk_graph_report, render_create_table, validate_schema,
};
use sqlx::Connection;
use sqlx::sqlite::SqliteConnection;
use tracing::{debug, info, warn};

use crate::errors::PopulateError;

/// Ensure every table of `schema` exists, creating missing ones in FK order.
///
/// Existing tables are left untouched. Each table is then compared with its
/// declaration; a missing column or foreign key is a schema conflict. All
/// tables are created in one transaction, so a conflict leaves the database
/// as it was.
pub async fn define_schema(
    conn: &mut SqliteConnection,
    schema: &DatabaseSchema,
) -> Result<(), PopulateError> {
    validate_schema(schema)?;
    let order = build_fk_graph_report(schema).topo_order.ok_or_else(|| {
        hospitaldb_core::Error::InvalidSchema("cyclic FK graph".to_string())
    })?;

    let mut tx = conn.begin().await?;
    match ensure_tables(&mut tx, schema, &order).await {
        Ok(()) => tx.commit().await?,
        Err(err) => {
            warn!(error = %err, "schema definition failed; rolling back");
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "schema rollback failed");
            }
            return Err(err);
        }
    }

    info!(tables = order.len(), "schema ready");
    Ok(())
}

async fn ensure_tables(
    conn: &mut SqliteConnection,
    schema: &DatabaseSchema,
    order: &[String],
) -> Result<(), PopulateError> {
    for name in order {
        let table = schema
            .table(name)
            .ok_or_else(|| PopulateError::UnknownTable(name.clone()))?;
        let ddl = render_create_table(table);
        sqlx::query(&ddl).execute(&mut *conn).await?;
        verify_table(conn, table).await?;
        debug!(table = %name, "table ensured");
    }
    Ok(())
}

async fn verify_table(conn: &mut SqliteConnection, table: &Table) -> Result<(), PopulateError> {
    let stored_columns: BTreeSet<String> =
        sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
            .bind(table.name.clone())
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .map(|name| name.to_lowercase())
            .collect();

    for column in &table.columns {
        if !stored_columns.contains(&column.name.to_lowercase()) {
            return Err(conflict(
                table,
                format!("existing table has no column '{}'", column.name),
            ));
        }
    }

    let stored_fks: BTreeSet<(String, String)> = sqlx::query_as::<_, (String, String)>(
        r#"SELECT "table", "from" FROM pragma_foreign_key_list(?)"#,
    )
    .bind(table.name.clone())
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|(parent, column)| (parent.to_lowercase(), column.to_lowercase()))
    .collect();

    for fk in table.foreign_keys() {
        for column in &fk.columns {
            let expected = (fk.referenced_table.to_lowercase(), column.to_lowercase());
            if !stored_fks.contains(&expected) {
                return Err(conflict(
                    table,
                    format!(
                        "existing table lacks foreign key {} -> {}",
                        column, fk.referenced_table
                    ),
                ));
            }
        }
    }

    Ok(())
}

fn conflict(table: &Table, message: String) -> PopulateError {
    PopulateError::SchemaConflict {
        table: table.name.clone(),
        message,
    }
}
