//! Output formatting and persistence for daily aggregates.
//!
//! Supports JSON logging of run summaries and CSV read/write of aggregate
//! tables.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::schema::DailyAggregate;

/// Header row of every aggregate CSV.
pub const AGGREGATE_HEADER: [&str; 6] = [
    "txn_date",
    "bank_id",
    "total_volume",
    "total_value",
    "avg_value",
    "median_value",
];

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes aggregates as CSV to `writer`. The header is always written.
pub fn write_aggregates_to<W: Write>(writer: W, rows: &[DailyAggregate]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(AGGREGATE_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Renders aggregates as an in-memory CSV document.
pub fn aggregates_to_csv(rows: &[DailyAggregate]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_aggregates_to(&mut buf, rows)?;
    Ok(buf)
}

/// Writes aggregates to `path`, replacing any existing file.
pub fn write_aggregates(path: &Path, rows: &[DailyAggregate]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing aggregate CSV");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create output {}", path.display()))?;
    write_aggregates_to(file, rows)
}

/// Reads a previously written aggregate CSV back into memory.
pub fn read_aggregates(path: &Path) -> Result<Vec<DailyAggregate>> {
    let file =
        File::open(path).with_context(|| format!("failed to open aggregates {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: DailyAggregate = result?;
        rows.push(record);
    }

    Ok(rows)
}
