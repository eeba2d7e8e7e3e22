use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use hospitaldb_populate::PopulationReport;
use serde::Serialize;

use crate::CliError;

/// Human-readable summary of a population run.
pub fn render_population_summary(report: &PopulationReport) -> String {
    let mut lines = vec![format!(
        "Population run {} (seed {}, anchor {})",
        report.run_id, report.seed, report.anchor
    )];
    if report.rows_cleared > 0 {
        lines.push(format!("  cleared {} existing row(s)", report.rows_cleared));
    }
    for table in &report.tables {
        lines.push(format!("  {:<18}{:>6} row(s)", table.table, table.rows_generated));
    }
    lines.push(format!(
        "  {:<18}{:>6} row(s) in {} ms",
        "total",
        report.total_rows(),
        report.duration_ms
    ));
    lines.join("\n")
}

/// Write `value` as pretty JSON, replacing `path` only once fully written.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let data = serde_json::to_vec_pretty(value)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(&data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf, CliError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| CliError::InvalidArgs(format!("invalid output path {}", path.display())))?;
    Ok(path.with_file_name(format!("{}.tmp", file_name.to_string_lossy())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospitaldb_core::ExistingRows;
    use hospitaldb_populate::TableReport;

    fn report() -> PopulationReport {
        let anchor = "2026-03-01T08:00:00".parse().unwrap();
        let mut report =
            PopulationReport::new("run-7".to_string(), 7, anchor, ExistingRows::Refuse);
        report.tables.push(TableReport {
            table: "Patient".to_string(),
            rows_requested: 50,
            rows_generated: 50,
            duration_ms: 3,
        });
        report.duration_ms = 5;
        report
    }

    #[test]
    fn summary_lists_tables_and_total() {
        let summary = render_population_summary(&report());
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "Population run run-7 (seed 7, anchor 2026-03-01 08:00:00)");
        assert_eq!(lines[1], format!("  {:<18}{:>6} row(s)", "Patient", 50));
        assert!(lines[2].ends_with("50 row(s) in 5 ms"));
    }

    #[test]
    fn json_report_is_written_whole() {
        let dir = std::env::temp_dir().join(format!("hospitaldb-json-{}", std::process::id()));
        let path = dir.join("nested").join("report.json");

        write_json_atomic(&path, &report()).unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["run_id"], "run-7");
        assert_eq!(value["tables"][0]["rows_generated"], 50);
        assert!(!path.with_file_name("report.json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
