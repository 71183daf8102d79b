//! CLI entry point for the EFT daily rollup.
//!
//! Provides subcommands for transforming a transaction export into daily
//! per-bank aggregates, loading a staged aggregate file into its sinks, and
//! running both steps the way the daily scheduled job does.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use eft_rollup::config::{LoadConfig, RunConfig};
use eft_rollup::output::print_json;
use eft_rollup::pipeline::{load_file, run, transform_file};
use eft_rollup::sink::{AggregateSink, CsvSink, S3Sink, SqliteSink};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "eft_rollup")]
#[command(about = "Clean EFT transactions and roll them up per day and bank", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a transaction CSV and write daily per-bank aggregates
    Transform {
        /// Path or URL of the transaction CSV
        #[arg(long = "in", value_name = "FILE_OR_URL")]
        input: String,

        /// Aggregate CSV to write
        #[arg(long = "out", value_name = "FILE")]
        output: PathBuf,
    },
    /// Append a staged aggregate CSV to one or more sinks
    Load {
        /// Aggregate CSV produced by `transform`
        #[arg(long = "in", value_name = "FILE")]
        input: PathBuf,

        /// Destination table (env: TRANSACTIONS_TARGET_TABLE)
        #[arg(long)]
        table: Option<String>,

        /// SQLite database file (env: ROLLUP_DATABASE)
        #[arg(long)]
        database: Option<String>,

        /// Skip the SQLite sink
        #[arg(long, default_value_t = false)]
        no_database: bool,

        /// Optional: also append rows to this CSV file
        #[arg(long, value_name = "FILE")]
        append_csv: Option<PathBuf>,

        /// Optional: S3 bucket to upload the aggregates to
        #[arg(long, requires = "s3_key")]
        s3_bucket: Option<String>,

        /// Object key used with --s3-bucket
        #[arg(long)]
        s3_key: Option<String>,

        /// Gzip compress the S3 object
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Transform into the staging directory, then load into SQLite
    Run {
        /// Path or URL of the transaction CSV (env: TRANSACTIONS_INPUT_CSV)
        #[arg(long = "in", value_name = "FILE_OR_URL")]
        input: Option<String>,

        /// Directory for daily_agg_<date>.csv (env: ROLLUP_STAGING_DIR)
        #[arg(long)]
        staging_dir: Option<String>,

        /// Logical run date used in the staging file name, YYYY-MM-DD
        #[arg(long)]
        run_date: Option<NaiveDate>,

        /// Destination table (env: TRANSACTIONS_TARGET_TABLE)
        #[arg(long)]
        table: Option<String>,

        /// SQLite database file (env: ROLLUP_DATABASE)
        #[arg(long)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/eft_rollup.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("eft_rollup.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform { input, output } => {
            let summary = transform_file(&input, &output).await?;
            print_json(&summary)?;
        }
        Commands::Load {
            input,
            table,
            database,
            no_database,
            append_csv,
            s3_bucket,
            s3_key,
            gzip,
        } => {
            let mut sinks: Vec<Box<dyn AggregateSink>> = Vec::new();

            if !no_database {
                let load = LoadConfig::from_env(database, table);
                sinks.push(Box::new(SqliteSink::new(load.database, &load.table)?));
            }
            if let Some(path) = append_csv {
                sinks.push(Box::new(CsvSink::new(path)));
            }
            if let (Some(bucket), Some(key)) = (s3_bucket, s3_key) {
                info!(bucket = %bucket, gzip, "S3 upload enabled");
                sinks.push(Box::new(S3Sink::from_env(&bucket, &key, gzip).await));
            }

            if sinks.is_empty() {
                warn!("No sinks selected, nothing to load");
            } else {
                let rows = load_file(&input, &sinks).await?;
                info!(rows, sinks = sinks.len(), "Load complete");
            }
        }
        Commands::Run {
            input,
            staging_dir,
            run_date,
            table,
            database,
        } => {
            let load = LoadConfig::from_env(database, table);
            let config = RunConfig::from_env(input, staging_dir, run_date, load);
            info!(
                input = %config.input,
                staged = %config.staging_file().display(),
                table = %config.load.table,
                "Starting scheduled run"
            );

            let summary = run(&config).await?;
            print_json(&summary)?;
        }
    }

    Ok(())
}
