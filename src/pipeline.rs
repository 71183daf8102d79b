//! End-to-end runs: parse → clean → aggregate → write, then load.
//!
//! Every entry point takes its paths and destinations as arguments; nothing
//! here reads global configuration.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::cleaning::{CleanReport, clean_with_report};
use crate::config::RunConfig;
use crate::fetch::load_source;
use crate::output::{read_aggregates, write_aggregates};
use crate::parser::parse_transactions;
use crate::schema::{DailyAggregate, RawRecord};
use crate::sink::{AggregateSink, SqliteSink};

/// What a transform run read, dropped and wrote.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub output: String,
    pub cleaning: CleanReport,
    pub groups_written: usize,
    pub rows_loaded: Option<usize>,
}

/// Cleans and aggregates an in-memory batch.
pub fn transform_records(rows: &[RawRecord]) -> (Vec<DailyAggregate>, CleanReport) {
    let (cleaned, report) = clean_with_report(rows);
    (aggregate(&cleaned), report)
}

/// Parses CSV bytes, then cleans and aggregates them.
pub fn transform_bytes(bytes: &[u8]) -> Result<(Vec<DailyAggregate>, CleanReport)> {
    let rows = parse_transactions(bytes)?;
    Ok(transform_records(&rows))
}

/// Reads `input` (path or URL), writes the aggregate CSV to `output`.
#[tracing::instrument(skip_all, fields(input = %input, output = %output.display()))]
pub async fn transform_file(input: &str, output: &Path) -> Result<RunSummary> {
    let bytes = load_source(input).await?;
    let (aggregates, cleaning) = transform_bytes(&bytes)?;

    if cleaning.rows_out == 0 {
        warn!(rows_in = cleaning.rows_in, "No valid transactions survived cleaning");
    }

    write_aggregates(output, &aggregates)?;
    info!(
        rows_in = cleaning.rows_in,
        rows_clean = cleaning.rows_out,
        groups = aggregates.len(),
        "Transform complete"
    );

    Ok(RunSummary {
        input: input.to_string(),
        output: output.display().to_string(),
        cleaning,
        groups_written: aggregates.len(),
        rows_loaded: None,
    })
}

/// Reads a staged aggregate file and appends it to every sink in order.
///
/// Stops at the first failing sink; sinks already written keep their rows.
#[tracing::instrument(skip_all, fields(staged = %staged.display()))]
pub async fn load_file(staged: &Path, sinks: &[Box<dyn AggregateSink>]) -> Result<usize> {
    let rows = read_aggregates(staged)?;

    for sink in sinks {
        let written = sink.append(&rows).await?;
        info!(sink = %sink.describe(), rows = written, "Loaded aggregates");
    }

    Ok(rows.len())
}

/// One scheduled run: transform into the staging file, then load it into
/// the configured SQLite table.
#[tracing::instrument(skip_all, fields(run_date = %config.run_date))]
pub async fn run(config: &RunConfig) -> Result<RunSummary> {
    let staged = config.staging_file();
    let mut summary = transform_file(&config.input, &staged).await?;

    let sink: Box<dyn AggregateSink> =
        Box::new(SqliteSink::new(&config.load.database, &config.load.table)?);
    summary.rows_loaded = Some(load_file(&staged, &[sink]).await?);

    Ok(summary)
}
