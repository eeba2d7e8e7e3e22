use anyhow::Result;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnection;

use hospitaldb_core::{ExistingRows, PopulateConfig, hospital_schema};
use hospitaldb_populate::{PopulateError, connect, define_schema, populate_database};

const TABLES: [&str; 6] = [
    "Patient",
    "Doctor",
    "Inventory",
    "MachineInventory",
    "Appointment",
    "Billing",
];

fn config() -> PopulateConfig {
    PopulateConfig {
        seed: Some(7),
        anchor: NaiveDate::from_ymd_opt(2026, 3, 1).and_then(|date| date.and_hms_opt(8, 0, 0)),
        ..PopulateConfig::default()
    }
}

async fn count(conn: &mut SqliteConnection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    Ok(sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?)
}

async fn orphans(
    conn: &mut SqliteConnection,
    child: &str,
    column: &str,
    parent: &str,
    parent_key: &str,
) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {child} c LEFT JOIN {parent} p ON c.{column} = p.{parent_key} \
         WHERE c.{column} IS NOT NULL AND p.{parent_key} IS NULL"
    );
    Ok(sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?)
}

async fn stored_tables(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    Ok(sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?)
}

#[tokio::test]
async fn define_schema_is_idempotent() -> Result<()> {
    let mut conn = connect("sqlite::memory:").await?;
    let schema = hospital_schema();

    define_schema(&mut conn, &schema).await?;
    define_schema(&mut conn, &schema).await?;

    let tables = stored_tables(&mut conn).await?;
    let mut expected: Vec<String> = TABLES.iter().map(|name| name.to_string()).collect();
    expected.sort();
    assert_eq!(tables, expected);
    Ok(())
}

#[tokio::test]
async fn incompatible_existing_table_is_a_conflict() -> Result<()> {
    let mut conn = connect("sqlite::memory:").await?;
    sqlx::query("CREATE TABLE Patient (patient_id INTEGER PRIMARY KEY)")
        .execute(&mut conn)
        .await?;

    let err = define_schema(&mut conn, &hospital_schema())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PopulateError::SchemaConflict { ref table, .. } if table == "Patient"
    ));
    Ok(())
}

#[tokio::test]
async fn late_conflict_leaves_no_tables_behind() -> Result<()> {
    let mut conn = connect("sqlite::memory:").await?;
    sqlx::query("CREATE TABLE Billing (billing_id INTEGER PRIMARY KEY)")
        .execute(&mut conn)
        .await?;

    let err = define_schema(&mut conn, &hospital_schema())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PopulateError::SchemaConflict { ref table, .. } if table == "Billing"
    ));
    assert_eq!(stored_tables(&mut conn).await?, vec!["Billing".to_string()]);
    Ok(())
}

#[tokio::test]
async fn invalid_config_creates_no_tables() -> Result<()> {
    let mut conn = connect("sqlite::memory:").await?;
    let mut config = config();
    config.inventory_quantity.min = 10;
    config.inventory_quantity.max = 1;

    let err = populate_database(&mut conn, &config).await.unwrap_err();
    assert!(matches!(err, PopulateError::Core(_)));
    assert!(stored_tables(&mut conn).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn populated_database_has_no_orphans() -> Result<()> {
    let mut conn = connect("sqlite::memory:").await?;
    let outcome = populate_database(&mut conn, &config()).await?;

    for (table, expected) in TABLES.iter().zip([50, 20, 10, 32, 100, 50]) {
        assert_eq!(count(&mut conn, table).await?, expected, "{table}");
    }
    assert_eq!(outcome.report.total_rows(), 262);

    for (child, column, parent, key) in [
        ("MachineInventory", "inventory_id", "Inventory", "inventory_id"),
        ("Appointment", "patient_id", "Patient", "patient_id"),
        ("Appointment", "doctor_id", "Doctor", "doctor_id"),
        ("Appointment", "machine_id", "MachineInventory", "machine_id"),
        ("Billing", "patient_id", "Patient", "patient_id"),
    ] {
        assert_eq!(orphans(&mut conn, child, column, parent, key).await?, 0);
    }

    let violations: Vec<(String, i64, String, i64)> =
        sqlx::query_as("PRAGMA foreign_key_check").fetch_all(&mut conn).await?;
    assert!(violations.is_empty());
    Ok(())
}

#[tokio::test]
async fn dates_are_stored_as_iso_text() -> Result<()> {
    let mut conn = connect("sqlite::memory:").await?;
    populate_database(&mut conn, &config()).await?;

    let dob: String = sqlx::query_scalar("SELECT dob FROM Patient LIMIT 1")
        .fetch_one(&mut conn)
        .await?;
    assert!(NaiveDate::parse_from_str(&dob, "%Y-%m-%d").is_ok(), "{dob}");

    let at: String = sqlx::query_scalar("SELECT appointment_date FROM Appointment LIMIT 1")
        .fetch_one(&mut conn)
        .await?;
    assert!(
        chrono::NaiveDateTime::parse_from_str(&at, "%Y-%m-%d %H:%M:%S").is_ok(),
        "{at}"
    );
    Ok(())
}

#[tokio::test]
async fn second_run_is_refused_then_reset_or_appended() -> Result<()> {
    let mut conn = connect("sqlite::memory:").await?;
    populate_database(&mut conn, &config()).await?;

    let err = populate_database(&mut conn, &config()).await.unwrap_err();
    assert!(matches!(err, PopulateError::AlreadyPopulated { .. }));
    assert_eq!(count(&mut conn, "Patient").await?, 50);

    let mut reset = config();
    reset.if_populated = ExistingRows::Reset;
    let outcome = populate_database(&mut conn, &reset).await?;
    assert_eq!(outcome.report.rows_cleared, 262);
    assert_eq!(count(&mut conn, "Appointment").await?, 100);

    let mut append = config();
    append.if_populated = ExistingRows::Append;
    populate_database(&mut conn, &append).await?;
    assert_eq!(count(&mut conn, "Patient").await?, 100);
    assert_eq!(count(&mut conn, "Billing").await?, 100);
    assert_eq!(
        orphans(&mut conn, "Billing", "patient_id", "Patient", "patient_id").await?,
        0
    );
    Ok(())
}

#[tokio::test]
async fn failed_run_commits_nothing() -> Result<()> {
    let mut conn = connect("sqlite::memory:").await?;
    let mut config = config();
    config.volumes.doctors = 0;

    let err = populate_database(&mut conn, &config).await.unwrap_err();
    assert!(matches!(
        err,
        PopulateError::EmptyReferencePool { ref referenced, .. } if referenced == "Doctor"
    ));

    for table in TABLES {
        assert_eq!(count(&mut conn, table).await?, 0, "{table}");
    }
    Ok(())
}
