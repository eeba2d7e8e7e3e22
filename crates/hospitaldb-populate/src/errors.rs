use thiserror::Error;

/// Errors emitted while defining or populating the schema.
///
/// Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error(transparent)]
    Core(#[from] hospitaldb_core::Error),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("schema conflict on {table}: {message}")]
    SchemaConflict { table: String, message: String },
    #[error("cannot generate {table}: no committed rows in {referenced}")]
    EmptyReferencePool { table: String, referenced: String },
    #[error("{table} already holds {rows} row(s); rerun with reset or append")]
    AlreadyPopulated { table: String, rows: u64 },
    #[error("dangling reference {table}.{column} = {value}")]
    DanglingReference {
        table: String,
        column: String,
        value: String,
    },
    #[error("row for {table} has {found} value(s), expected {expected}")]
    ArityMismatch {
        table: String,
        expected: usize,
        found: usize,
    },
    #[error("unknown table: {0}")]
    UnknownTable(String),
}
