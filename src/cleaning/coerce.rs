//! Tolerant per-cell coercion. Every parser returns `None` instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::schema::Timestamp;

/// Naive layouts tried after RFC 3339, most specific first. Only ISO-8601
/// shapes are accepted; slash-separated or named-month dates coerce to null.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Any non-empty text is a valid string and is kept byte-for-byte.
pub fn coerce_string(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Parses a finite `f64`. `NaN` and infinities count as unparseable.
pub fn coerce_amount(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

pub fn coerce_timestamp(value: Option<&str>) -> Option<Timestamp> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(Timestamp::Offset(dt));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Timestamp::Naive(dt));
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Timestamp::Naive)
}
