use crate::projection::{Report, ReportRow};
use crate::stored_schema::StoredTable;

const REPORT_HEADER: &str = "Patient information with appointments and billing:";
const SCHEMA_RULE_WIDTH: usize = 50;

/// Render the joined view as an aligned text table followed by the counts.
///
/// At most `max_rows` rows are printed when a limit is given; the number of
/// omitted rows is noted below the table.
pub fn render_report(report: &Report, max_rows: Option<usize>) -> String {
    let shown = max_rows.unwrap_or(report.rows.len()).min(report.rows.len());
    let cells: Vec<[String; 9]> = report.rows[..shown].iter().map(ReportRow::cells).collect();

    let mut widths = ReportRow::COLUMNS.map(|column| column.len());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(shown + 5);
    lines.push(REPORT_HEADER.to_string());
    lines.push(format_line(&ReportRow::COLUMNS.map(|column| column.to_string()), &widths));
    for row in &cells {
        lines.push(format_line(row, &widths));
    }
    if shown < report.rows.len() {
        lines.push(format!("... {} more row(s)", report.rows.len() - shown));
    }
    lines.push(String::new());
    lines.push(format!("Number of patients: {}", report.patient_count));
    lines.push(format!("Number of doctors: {}", report.doctor_count));

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

fn format_line(cells: &[String; 9], widths: &[usize; 9]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render each stored table as its name and DDL, separated by a rule.
pub fn render_stored_schema(tables: &[StoredTable]) -> String {
    let rule = "-".repeat(SCHEMA_RULE_WIDTH);
    let mut rendered = String::new();
    for table in tables {
        rendered.push_str(&format!(
            "Table Name: {}\nSchema:\n{}\n{}\n",
            table.name, table.sql, rule
        ));
    }
    rendered
}
