use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::ReportError;
use crate::projection::Report;

/// Write the joined view as CSV, header first, returning the rows written.
pub fn write_report_csv(path: &Path, report: &Report) -> Result<u64, ReportError> {
    let file = BufWriter::new(File::create(path)?);
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);

    for row in &report.rows {
        writer.serialize(row)?;
    }
    if report.rows.is_empty() {
        writer.write_record(crate::projection::ReportRow::COLUMNS)?;
    }

    writer.flush()?;
    let mut file = writer.into_inner().map_err(|err| err.into_error())?;
    file.flush()?;
    Ok(report.rows.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ReportRow;

    #[test]
    fn writes_header_and_nulls_as_empty() {
        let dir = std::env::temp_dir().join(format!("hospitaldb-report-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.csv");

        let report = Report {
            rows: vec![ReportRow {
                patient_first_name: "Ann".to_string(),
                patient_last_name: "Doe".to_string(),
                patient_insurance_info: None,
                appointment_date: Some("2026-03-02 09:30:00".to_string()),
                appointment_status: Some("Scheduled".to_string()),
                doctor_first_name: Some("Gregory".to_string()),
                doctor_last_name: Some("House".to_string()),
                billing_amount: Some(99.5),
                payment_status: Some("Pending".to_string()),
            }],
            patient_count: 1,
            doctor_count: 1,
        };

        assert_eq!(write_report_csv(&path, &report).unwrap(), 1);
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some(ReportRow::COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("Ann,Doe,,2026-03-02 09:30:00,Scheduled,Gregory,House,99.5,Pending")
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_report_still_has_a_header() {
        let dir = std::env::temp_dir().join(format!("hospitaldb-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.csv");

        let report = Report {
            rows: Vec::new(),
            patient_count: 0,
            doctor_count: 0,
        };
        assert_eq!(write_report_csv(&path, &report).unwrap(), 0);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), ReportRow::COLUMNS.join(","));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
