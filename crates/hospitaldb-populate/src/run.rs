use hospitaldb_core::{PopulateConfig, hospital_schema};
use sqlx::Connection;
use sqlx::sqlite::SqliteConnection;
use tracing::{info, warn};

use crate::definer::define_schema;
use crate::errors::PopulateError;
use crate::model::PopulationOutcome;
use crate::populator::{Populator, hash_seed};
use crate::sources::FakerSource;
use crate::store::SqliteStore;

/// Seed for a run: the configured one, or a fresh random seed.
pub fn resolve_seed(config: &PopulateConfig) -> u64 {
    config.seed.unwrap_or_else(rand::random)
}

/// Define the hospital schema and populate it in a single transaction.
///
/// Nothing is committed unless every table is populated; on error the
/// transaction is dropped and SQLite rolls it back.
pub async fn populate_database(
    conn: &mut SqliteConnection,
    config: &PopulateConfig,
) -> Result<PopulationOutcome, PopulateError> {
    let schema = hospital_schema();
    let seed = resolve_seed(config);
    if config.seed.is_none() {
        info!(seed, "no seed configured; using a random one");
    }
    let source = FakerSource::seeded(hash_seed(seed, "values"));
    // Settings are validated here, before any table is created.
    let mut populator = Populator::new(&schema, config, source, seed)?;

    define_schema(conn, &schema).await?;

    let mut tx = conn.begin().await?;
    let outcome = {
        let mut store = SqliteStore::new(&mut tx);
        populator.populate(&mut store).await
    };

    match outcome {
        Ok(outcome) => {
            tx.commit().await?;
            Ok(outcome)
        }
        Err(err) => {
            warn!(error = %err, "population failed; rolling back");
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "rollback failed");
            }
            Err(err)
        }
    }
}
