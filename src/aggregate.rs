//! Per-day, per-institution rollup of cleaned transactions.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::schema::{CleanRecord, DailyAggregate};
use crate::stats::{mean, median};

/// Groups `rows` by `(txn_date, bank_id)` and summarizes each group's amounts.
///
/// `txn_date` is the timestamp truncated to its calendar day, in whatever
/// offset the timestamp carries. Output is sorted by `(txn_date, bank_id)`.
/// Duplicate transaction ids are counted as separate transactions.
pub fn aggregate(rows: &[CleanRecord]) -> Vec<DailyAggregate> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<f64>> = BTreeMap::new();

    for row in rows {
        groups
            .entry((row.timestamp.date(), row.bank_id.as_str()))
            .or_default()
            .push(row.amount);
    }

    groups
        .into_iter()
        .map(|((txn_date, bank_id), amounts)| DailyAggregate {
            txn_date,
            bank_id: bank_id.to_string(),
            total_volume: amounts.len() as u64,
            total_value: amounts.iter().sum(),
            avg_value: mean(&amounts),
            median_value: median(&amounts),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::clean;
    use crate::schema::{RawRecord, Timestamp};
    use std::collections::BTreeSet;

    fn record(id: &str, bank: &str, amount: f64, ts: &str) -> CleanRecord {
        CleanRecord {
            transaction_id: id.to_string(),
            bank_id: bank.to_string(),
            customer_id: None,
            amount,
            timestamp: crate::cleaning::coerce::coerce_timestamp(Some(ts)).unwrap(),
            extra: vec![],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_single_group_statistics() {
        let rows = vec![
            record("t1", "B1", 10.0, "2025-01-01T08:00"),
            record("t2", "B1", 20.0, "2025-01-01T12:00"),
            record("t3", "B1", 30.0, "2025-01-01T23:59"),
        ];

        let out = aggregate(&rows);

        assert_eq!(
            out,
            vec![DailyAggregate {
                txn_date: date(2025, 1, 1),
                bank_id: "B1".into(),
                total_volume: 3,
                total_value: 60.0,
                avg_value: 20.0,
                median_value: 20.0,
            }]
        );
    }

    #[test]
    fn test_groups_by_day_and_bank_sorted() {
        let rows = vec![
            record("t1", "B2", 5.0, "2025-01-02T10:00"),
            record("t2", "B1", 1.0, "2025-01-02T10:00"),
            record("t3", "B2", 7.0, "2025-01-01T10:00"),
            record("t4", "B1", 3.0, "2025-01-02T11:00"),
        ];

        let keys: Vec<(NaiveDate, String)> = aggregate(&rows)
            .into_iter()
            .map(|a| (a.txn_date, a.bank_id))
            .collect();

        assert_eq!(
            keys,
            vec![
                (date(2025, 1, 1), "B2".to_string()),
                (date(2025, 1, 2), "B1".to_string()),
                (date(2025, 1, 2), "B2".to_string()),
            ]
        );
    }

    #[test]
    fn test_even_group_median() {
        let rows = vec![
            record("t1", "B1", 100.0, "2025-01-01T10:00"),
            record("t2", "B1", 200.0, "2025-01-01T15:00"),
        ];
        let out = aggregate(&rows);
        assert_eq!(out[0].median_value, 150.0);
        assert_eq!(out[0].avg_value, 150.0);
    }

    #[test]
    fn test_truncates_in_carried_offset() {
        // Same instant in UTC, different local calendar days.
        let rows = vec![
            record("t1", "B1", 1.0, "2025-01-01T23:30:00-05:00"),
            record("t2", "B1", 1.0, "2025-01-02T04:30:00Z"),
        ];

        let dates: Vec<NaiveDate> = aggregate(&rows).iter().map(|a| a.txn_date).collect();
        assert_eq!(dates, vec![date(2025, 1, 1), date(2025, 1, 2)]);
    }

    #[test]
    fn test_naive_and_offset_on_same_day_share_a_group() {
        let rows = vec![
            record("t1", "B1", 1.0, "2025-01-01T10:00"),
            record("t2", "B1", 2.0, "2025-01-01T11:00:00+09:00"),
        ];
        let out = aggregate(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].total_volume, 2);
    }

    #[test]
    fn test_duplicate_ids_double_count() {
        let rows = vec![
            record("t1", "B1", 50.0, "2025-01-01T10:00"),
            record("t1", "B1", 50.0, "2025-01-01T10:00"),
        ];
        let out = aggregate(&rows);
        assert_eq!(out[0].total_volume, 2);
        assert_eq!(out[0].total_value, 100.0);
    }

    #[test]
    fn test_conservation_over_cleaned_rows() {
        let raw: Vec<RawRecord> = [
            ("t1", "B1", "12.25", "2025-01-01T01:00"),
            ("t2", "B2", "0.1", "2025-01-01T02:00"),
            ("t3", "B1", "0.2", "2025-01-02T03:00"),
            ("t4", "B3", "-1", "2025-01-02T03:00"),
            ("t5", "B2", "x", "2025-01-02T03:00"),
            ("t6", "B2", "99.99", "2025-01-01 22:00:00"),
            ("t7", "B1", "5", "not a date"),
        ]
        .iter()
        .map(|(id, bank, amount, ts)| {
            RawRecord::new()
                .with("transaction_id", id)
                .with("bank_id", bank)
                .with("amount", amount)
                .with("timestamp", ts)
        })
        .collect();

        let cleaned = clean(&raw);
        let out = aggregate(&cleaned);

        let volume: u64 = out.iter().map(|a| a.total_volume).sum();
        assert_eq!(volume as usize, cleaned.len());

        let value: f64 = out.iter().map(|a| a.total_value).sum();
        let expected: f64 = cleaned.iter().map(|r| r.amount).sum();
        assert!((value - expected).abs() < 1e-9);

        let groups: BTreeSet<(NaiveDate, String)> =
            out.iter().map(|a| (a.txn_date, a.bank_id.clone())).collect();
        let distinct: BTreeSet<(NaiveDate, String)> = cleaned
            .iter()
            .map(|r| (r.timestamp.date(), r.bank_id.clone()))
            .collect();
        assert_eq!(groups, distinct);
        assert!(out.iter().all(|a| a.total_volume >= 1));
    }

    #[test]
    fn test_padded_bank_ids_form_their_own_groups() {
        let raw: Vec<RawRecord> = [("t1", "B1"), ("t2", " B1 "), ("t3", "  ")]
            .iter()
            .map(|(id, bank)| {
                RawRecord::new()
                    .with("transaction_id", id)
                    .with("bank_id", bank)
                    .with("amount", "10")
                    .with("timestamp", "2025-01-01T10:00")
            })
            .collect();

        let groups: Vec<(String, u64)> = aggregate(&clean(&raw))
            .into_iter()
            .map(|a| (a.bank_id, a.total_volume))
            .collect();

        assert_eq!(
            groups,
            vec![
                ("  ".to_string(), 1),
                (" B1 ".to_string(), 1),
                ("B1".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_naive_timestamp_date() {
        let r = record("t1", "B1", 1.0, "2025-06-30T23:59:59");
        assert!(matches!(r.timestamp, Timestamp::Naive(_)));
        assert_eq!(aggregate(&[r])[0].txn_date, date(2025, 6, 30));
    }
}
