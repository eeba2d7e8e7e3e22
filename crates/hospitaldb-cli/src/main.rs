mod logging;
mod output;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use hospitaldb_core::{Error as CoreError, ExistingRows, hospital_schema};
use hospitaldb_populate::{PopulateError, connect, define_schema, populate_database};
use hospitaldb_report::{
    ReportError, list_stored_schema, project, render_report, render_stored_schema,
    write_report_csv,
};
use logging::{LogFormat, init_logging};
use settings::{Overrides, load_config};
use sqlx::Connection;
use sqlx::sqlite::SqliteConnection;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://hospital_management.db";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Populate(#[from] PopulateError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Config(#[from] toml::de::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "hospitaldb",
    version,
    about = "Hospital operations schema and synthetic data"
)]
struct Cli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the hospital tables if they do not exist.
    Init(DatabaseArgs),
    /// Create the tables and fill them with synthetic records.
    Populate(PopulateArgs),
    /// Print patients joined with appointments, doctors and billing.
    Report(ReportArgs),
    /// Print the stored table definitions.
    Schema(DatabaseArgs),
    /// Create, populate, then print the schema and the report.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct DatabaseArgs {
    /// SQLite connection URL.
    #[arg(long, value_name = "URL", default_value = DEFAULT_DATABASE_URL)]
    database: String,
}

#[derive(Args, Debug)]
struct PopulationArgs {
    /// TOML file with population settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for every random draw (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,
    /// Delete existing rows before populating.
    #[arg(long, conflicts_with = "append")]
    reset: bool,
    /// Add rows next to existing ones.
    #[arg(long)]
    append: bool,
    /// Write the population report as JSON.
    #[arg(long, value_name = "FILE")]
    report_json: Option<PathBuf>,
}

impl PopulationArgs {
    fn overrides(&self) -> Overrides {
        let if_populated = if self.reset {
            Some(ExistingRows::Reset)
        } else if self.append {
            Some(ExistingRows::Append)
        } else {
            None
        };
        Overrides {
            seed: self.seed,
            if_populated,
        }
    }
}

#[derive(Args, Debug)]
struct ReportOutputArgs {
    /// Print at most this many report rows.
    #[arg(long, value_name = "N")]
    max_rows: Option<usize>,
    /// Also export the report rows as CSV.
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PopulateArgs {
    #[command(flatten)]
    db: DatabaseArgs,
    #[command(flatten)]
    population: PopulationArgs,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    db: DatabaseArgs,
    #[command(flatten)]
    output: ReportOutputArgs,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    db: DatabaseArgs,
    #[command(flatten)]
    population: PopulationArgs,
    #[command(flatten)]
    output: ReportOutputArgs,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_file.as_deref())?;

    let timer = Instant::now();
    let result = match cli.command {
        Command::Init(args) => run_init(args).await,
        Command::Populate(args) => run_populate(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Schema(args) => run_schema(args).await,
        Command::Run(args) => run_all(args).await,
    };

    let duration_ms = timer.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => tracing::info!(status = "success", duration_ms, "command finished"),
        Err(err) => {
            tracing::error!(status = "failed", error = %err, duration_ms, "command finished")
        }
    }
    result
}

async fn open(db: &DatabaseArgs) -> Result<SqliteConnection, CliError> {
    tracing::info!(database = %db.database, "opening database");
    Ok(connect(&db.database).await?)
}

async fn run_init(args: DatabaseArgs) -> Result<(), CliError> {
    let mut conn = open(&args).await?;
    define_schema(&mut conn, &hospital_schema()).await?;
    println!("Database schema created successfully.");
    conn.close().await?;
    Ok(())
}

async fn run_populate(args: PopulateArgs) -> Result<(), CliError> {
    let mut conn = open(&args.db).await?;
    populate(&mut conn, &args.population).await?;
    conn.close().await?;
    Ok(())
}

async fn run_report(args: ReportArgs) -> Result<(), CliError> {
    let mut conn = open(&args.db).await?;
    report(&mut conn, &args.output).await?;
    conn.close().await?;
    Ok(())
}

async fn run_schema(args: DatabaseArgs) -> Result<(), CliError> {
    let mut conn = open(&args).await?;
    print!("{}", render_stored_schema(&list_stored_schema(&mut conn).await?));
    conn.close().await?;
    Ok(())
}

async fn run_all(args: RunArgs) -> Result<(), CliError> {
    let mut conn = open(&args.db).await?;
    populate(&mut conn, &args.population).await?;
    print!("{}", render_stored_schema(&list_stored_schema(&mut conn).await?));
    println!();
    report(&mut conn, &args.output).await?;
    conn.close().await?;
    println!("Database closed.");
    Ok(())
}

async fn populate(conn: &mut SqliteConnection, args: &PopulationArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref(), &args.overrides())?;
    let outcome = populate_database(conn, &config).await?;

    println!("{}", output::render_population_summary(&outcome.report));
    println!("Data populated successfully.");

    if let Some(path) = &args.report_json {
        output::write_json_atomic(path, &outcome.report)?;
        tracing::info!(path = %path.display(), "population report written");
    }
    Ok(())
}

async fn report(conn: &mut SqliteConnection, args: &ReportOutputArgs) -> Result<(), CliError> {
    let report = project(conn).await?;
    print!("{}", render_report(&report, args.max_rows));

    if let Some(path) = &args.csv {
        let rows = write_report_csv(path, &report)?;
        tracing::info!(path = %path.display(), rows, "report csv written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn populate_flags_map_to_overrides() {
        let cli = Cli::parse_from(["hospitaldb", "populate", "--seed", "5", "--reset"]);
        let Command::Populate(args) = cli.command else {
            panic!("expected populate");
        };
        assert_eq!(args.db.database, DEFAULT_DATABASE_URL);
        let overrides = args.population.overrides();
        assert_eq!(overrides.seed, Some(5));
        assert_eq!(overrides.if_populated, Some(ExistingRows::Reset));
    }

    #[test]
    fn reset_and_append_are_exclusive() {
        let parsed = Cli::try_parse_from(["hospitaldb", "populate", "--reset", "--append"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_log_flags_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "hospitaldb",
            "report",
            "--database",
            "sqlite::memory:",
            "--max-rows",
            "3",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.log_format, LogFormat::Json);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.output.max_rows, Some(3));
        assert_eq!(args.db.database, "sqlite::memory:");
    }
}
