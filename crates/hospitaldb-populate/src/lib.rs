//! Integrity-preserving population of the hospital schema.
//!
//! Tables are filled in foreign-key dependency order. Every foreign key is
//! drawn from the keys already persisted for the referenced table, so no row
//! can ever point at a missing parent.

pub mod definer;
pub mod errors;
pub mod keys;
pub mod model;
pub mod planner;
pub mod populator;
pub mod run;
pub mod sources;
pub mod store;

pub use definer::define_schema;
pub use errors::PopulateError;
pub use keys::{ForeignContext, KeyRegistry, KeySet};
pub use model::{PopulationOutcome, PopulationReport, TableReport};
pub use planner::{PopulationTask, plan_population};
pub use populator::Populator;
pub use run::{populate_database, resolve_seed};
pub use sources::{AddressSource, DateSource, FakerSource, NameSource, TextSource, ValueSource};
pub use store::{MemoryStore, RecordStore, SqliteStore, StoredRow, connect};
