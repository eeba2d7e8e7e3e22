use chrono::NaiveDateTime;
use hospitaldb_core::ExistingRows;
use serde::{Deserialize, Serialize};

use crate::keys::KeyRegistry;

/// Summary of a populated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows_requested: u64,
    pub rows_generated: u64,
    pub duration_ms: u64,
}

/// Report for a population run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationReport {
    pub run_id: String,
    pub seed: u64,
    pub anchor: NaiveDateTime,
    pub if_populated: ExistingRows,
    pub rows_cleared: u64,
    pub tables: Vec<TableReport>,
    pub duration_ms: u64,
}

impl PopulationReport {
    pub fn new(
        run_id: String,
        seed: u64,
        anchor: NaiveDateTime,
        if_populated: ExistingRows,
    ) -> Self {
        Self {
            run_id,
            seed,
            anchor,
            if_populated,
            rows_cleared: 0,
            tables: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn rows_generated(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|report| report.table == table)
            .map(|report| report.rows_generated)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|report| report.rows_generated).sum()
    }
}

/// Result of a successful population run.
#[derive(Debug, Clone)]
pub struct PopulationOutcome {
    pub report: PopulationReport,
    /// Keys written by this run, per entity.
    pub keys: KeyRegistry,
}
