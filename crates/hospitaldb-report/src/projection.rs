use hospitaldb_core::Entity;
use serde::Serialize;
use sqlx::sqlite::SqliteConnection;
use tracing::debug;

use crate::errors::ReportError;

/// Patients joined with their appointments, doctors and invoices. Patients
/// without appointments still yield one row.
const PROJECTION_SQL: &str = r#"
SELECT
    p.first_name AS patient_first_name,
    p.last_name AS patient_last_name,
    p.insurance_info AS patient_insurance_info,
    a.appointment_date,
    a.status AS appointment_status,
    d.first_name AS doctor_first_name,
    d.last_name AS doctor_last_name,
    b.amount AS billing_amount,
    b.payment_status
FROM Patient p
LEFT JOIN Appointment a ON p.patient_id = a.patient_id
LEFT JOIN Doctor d ON a.doctor_id = d.doctor_id
LEFT JOIN Billing b ON p.patient_id = b.patient_id
ORDER BY p.patient_id, a.appointment_id, b.billing_id
"#;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReportRow {
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_insurance_info: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_status: Option<String>,
    pub doctor_first_name: Option<String>,
    pub doctor_last_name: Option<String>,
    pub billing_amount: Option<f64>,
    pub payment_status: Option<String>,
}

impl ReportRow {
    pub const COLUMNS: [&'static str; 9] = [
        "patient_first_name",
        "patient_last_name",
        "patient_insurance_info",
        "appointment_date",
        "appointment_status",
        "doctor_first_name",
        "doctor_last_name",
        "billing_amount",
        "payment_status",
    ];

    /// Display cells in [`Self::COLUMNS`] order; NULL renders as `-`.
    pub fn cells(&self) -> [String; 9] {
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        [
            self.patient_first_name.clone(),
            self.patient_last_name.clone(),
            text(&self.patient_insurance_info),
            text(&self.appointment_date),
            text(&self.appointment_status),
            text(&self.doctor_first_name),
            text(&self.doctor_last_name),
            self.billing_amount
                .map(|amount| format!("{amount:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            text(&self.payment_status),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub patient_count: u64,
    pub doctor_count: u64,
}

/// Read the joined view and the patient/doctor counts.
pub async fn project(conn: &mut SqliteConnection) -> Result<Report, ReportError> {
    let rows: Vec<ReportRow> = sqlx::query_as(PROJECTION_SQL)
        .fetch_all(&mut *conn)
        .await?;
    let patient_count = count(conn, Entity::Patient).await?;
    let doctor_count = count(conn, Entity::Doctor).await?;

    debug!(
        rows = rows.len(),
        patients = patient_count,
        doctors = doctor_count,
        "report projected"
    );

    Ok(Report {
        rows,
        patient_count,
        doctor_count,
    })
}

async fn count(conn: &mut SqliteConnection, entity: Entity) -> Result<u64, ReportError> {
    let sql = format!("SELECT COUNT(*) FROM {}", entity.table_name());
    let rows: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
    Ok(rows.max(0) as u64)
}
