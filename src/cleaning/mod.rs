//! Validation and cleaning of raw transaction rows.
//!
//! Cleaning runs in two phases: every typed cell is coerced into an
//! `Option` (see [`coerce`]), then a completeness and positivity policy
//! decides which rows survive. Malformed cells never abort a run; they
//! become nulls and their rows are filtered out.

pub mod coerce;

use serde::Serialize;
use tracing::debug;

use crate::schema::{
    AMOUNT, BANK_ID, CUSTOMER_ID, CleanRecord, RawRecord, TIMESTAMP, TRANSACTION_ID,
    TYPED_COLUMNS, Timestamp,
};
use coerce::{coerce_amount, coerce_string, coerce_timestamp};

/// Row counts collected while cleaning a batch.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CleanReport {
    pub rows_in: usize,
    pub blank_rows: usize,
    pub missing_required: usize,
    pub non_positive_amount: usize,
    pub rows_out: usize,
}

/// A row after coercion, before any policy is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedRecord {
    pub transaction_id: Option<String>,
    pub bank_id: Option<String>,
    pub customer_id: Option<String>,
    pub amount: Option<f64>,
    pub timestamp: Option<Timestamp>,
    pub extra: Vec<(String, String)>,
}

/// Why a coerced row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingRequired,
    NonPositiveAmount,
}

impl CoercedRecord {
    /// Applies the row policy: required fields present, then `amount > 0`.
    pub fn into_clean(self) -> Result<CleanRecord, Rejection> {
        let (Some(transaction_id), Some(bank_id), Some(amount), Some(timestamp)) =
            (self.transaction_id, self.bank_id, self.amount, self.timestamp)
        else {
            return Err(Rejection::MissingRequired);
        };

        if amount <= 0.0 {
            return Err(Rejection::NonPositiveAmount);
        }

        Ok(CleanRecord {
            transaction_id,
            bank_id,
            customer_id: self.customer_id,
            amount,
            timestamp,
            extra: self.extra,
        })
    }
}

/// Coerces each typed column of `raw`. Absent columns simply stay `None`.
pub fn coerce_record(raw: &RawRecord) -> CoercedRecord {
    let extra = raw
        .cells()
        .filter(|(column, _)| !TYPED_COLUMNS.contains(column))
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .collect();

    CoercedRecord {
        transaction_id: coerce_string(raw.get(TRANSACTION_ID)),
        bank_id: coerce_string(raw.get(BANK_ID)),
        customer_id: coerce_string(raw.get(CUSTOMER_ID)),
        amount: coerce_amount(raw.get(AMOUNT)),
        timestamp: coerce_timestamp(raw.get(TIMESTAMP)),
        extra,
    }
}

/// Cleans a batch of raw rows. The input is left untouched.
pub fn clean(rows: &[RawRecord]) -> Vec<CleanRecord> {
    clean_with_report(rows).0
}

/// Like [`clean`], also returning how many rows each step discarded.
pub fn clean_with_report(rows: &[RawRecord]) -> (Vec<CleanRecord>, CleanReport) {
    let mut report = CleanReport {
        rows_in: rows.len(),
        ..Default::default()
    };

    let mut cleaned = Vec::with_capacity(rows.len());

    for raw in rows {
        if raw.is_blank() {
            report.blank_rows += 1;
            continue;
        }

        match coerce_record(raw).into_clean() {
            Ok(record) => cleaned.push(record),
            Err(Rejection::MissingRequired) => report.missing_required += 1,
            Err(Rejection::NonPositiveAmount) => report.non_positive_amount += 1,
        }
    }

    report.rows_out = cleaned.len();
    debug!(
        rows_in = report.rows_in,
        blank_rows = report.blank_rows,
        missing_required = report.missing_required,
        non_positive_amount = report.non_positive_amount,
        rows_out = report.rows_out,
        "Cleaned transaction batch"
    );

    (cleaned, report)
}
