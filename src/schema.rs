//! Record types shared by the cleaning and aggregation stages.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TRANSACTION_ID: &str = "transaction_id";
pub const BANK_ID: &str = "bank_id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const AMOUNT: &str = "amount";
pub const TIMESTAMP: &str = "timestamp";

/// The five typed columns, in canonical order.
pub const TYPED_COLUMNS: [&str; 5] = [TRANSACTION_ID, BANK_ID, CUSTOMER_ID, AMOUNT, TIMESTAMP];

/// Columns a row must carry (non-null) to survive cleaning.
pub const REQUIRED_COLUMNS: [&str; 4] = [TRANSACTION_ID, BANK_ID, AMOUNT, TIMESTAMP];

/// An untyped input row: `(column, text)` cells in source order.
///
/// An empty cell is the null value. Whitespace is data and is kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    cells: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell insertion, mostly for tests and adapters.
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: &str, value: &str) {
        self.cells.push((column.to_string(), value.to_string()));
    }

    /// Returns the raw text for `column`, or `None` when the column is
    /// absent or the cell is empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// True when every cell is absent or empty.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_empty())
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A transaction moment, keeping whatever offset the source carried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Calendar day of the value in its own offset. No UTC normalization.
    pub fn date(&self) -> NaiveDate {
        match self {
            Timestamp::Naive(dt) => dt.date(),
            Timestamp::Offset(dt) => dt.date_naive(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Offset(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// A row that passed cleaning: required fields present, `amount > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub transaction_id: String,
    pub bank_id: String,
    pub customer_id: Option<String>,
    pub amount: f64,
    pub timestamp: Timestamp,
    /// Columns outside the typed schema, untouched and in input order.
    pub extra: Vec<(String, String)>,
}

impl CleanRecord {
    /// Renders the record back into raw form so it can be cleaned again.
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new()
            .with(TRANSACTION_ID, &self.transaction_id)
            .with(BANK_ID, &self.bank_id)
            .with(CUSTOMER_ID, self.customer_id.as_deref().unwrap_or(""))
            .with(AMOUNT, &self.amount.to_string())
            .with(TIMESTAMP, &self.timestamp.to_string());

        for (column, value) in &self.extra {
            raw.push(column, value);
        }

        raw
    }
}

/// One summarized row per `(txn_date, bank_id)` group.
///
/// Field order is the output CSV header order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub txn_date: NaiveDate,
    pub bank_id: String,
    pub total_volume: u64,
    pub total_value: f64,
    pub avg_value: f64,
    pub median_value: f64,
}
