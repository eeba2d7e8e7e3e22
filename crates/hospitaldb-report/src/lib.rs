//! Read-only views over a populated hospital database.

pub mod errors;
pub mod output;
pub mod projection;
pub mod render;
pub mod stored_schema;

pub use errors::ReportError;
pub use output::csv::write_report_csv;
pub use projection::{Report, ReportRow, project};
pub use render::{render_report, render_stored_schema};
pub use stored_schema::{StoredTable, list_stored_schema};
