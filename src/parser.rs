//! CSV parser for transaction exports.

use anyhow::{Result, bail};
use std::io::Read;

use crate::schema::{REQUIRED_COLUMNS, RawRecord};

/// Reads delimited transaction text into raw records.
///
/// Header names are trimmed and matched case-sensitively; cell values are
/// kept verbatim. Extra columns are kept as-is; a short row simply lacks its
/// trailing cells.
///
/// # Errors
///
/// Returns an error if the header lacks any of `transaction_id`, `bank_id`,
/// `amount` or `timestamp`, if a row has more fields than the header, or if
/// the CSV itself cannot be read.
pub fn parse_transactions<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        bail!("input is missing required columns: {}", missing.join(", "));
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |pos| pos.line());
            bail!(
                "line {}: expected at most {} fields, found {}",
                line,
                headers.len(),
                record.len()
            );
        }

        let mut raw = RawRecord::new();
        for (column, value) in headers.iter().zip(record.iter()) {
            raw.push(column, value);
        }
        rows.push(raw);
    }

    Ok(rows)
}
