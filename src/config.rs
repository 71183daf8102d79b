//! Run parameters, resolved from CLI flags, then environment, then defaults.
//!
//! | Variable                    | Default                          |
//! |-----------------------------|----------------------------------|
//! | `TRANSACTIONS_INPUT_CSV`    | `data/sample_transactions.csv`   |
//! | `TRANSACTIONS_TARGET_TABLE` | `bank_transactions_daily`        |
//! | `ROLLUP_DATABASE`           | `analytics.db`                   |
//! | `ROLLUP_STAGING_DIR`        | system temp dir                  |

use chrono::{NaiveDate, Utc};
use std::path::PathBuf;

pub const INPUT_VAR: &str = "TRANSACTIONS_INPUT_CSV";
pub const TABLE_VAR: &str = "TRANSACTIONS_TARGET_TABLE";
pub const DATABASE_VAR: &str = "ROLLUP_DATABASE";
pub const STAGING_DIR_VAR: &str = "ROLLUP_STAGING_DIR";

pub const DEFAULT_INPUT: &str = "data/sample_transactions.csv";
pub const DEFAULT_TABLE: &str = "bank_transactions_daily";
pub const DEFAULT_DATABASE: &str = "analytics.db";

/// Where staged aggregates get loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    pub database: PathBuf,
    pub table: String,
}

impl LoadConfig {
    pub fn from_env(database: Option<String>, table: Option<String>) -> Self {
        Self::resolve(database, table, env_lookup)
    }

    pub fn resolve<F>(database: Option<String>, table: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            database: pick(database, DATABASE_VAR, &lookup)
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
                .into(),
            table: pick(table, TABLE_VAR, &lookup).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        }
    }
}

/// Parameters for one scheduled transform-and-load run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input: String,
    pub staging_dir: PathBuf,
    pub run_date: NaiveDate,
    pub load: LoadConfig,
}

impl RunConfig {
    pub fn from_env(
        input: Option<String>,
        staging_dir: Option<String>,
        run_date: Option<NaiveDate>,
        load: LoadConfig,
    ) -> Self {
        Self::resolve(input, staging_dir, run_date, load, env_lookup)
    }

    pub fn resolve<F>(
        input: Option<String>,
        staging_dir: Option<String>,
        run_date: Option<NaiveDate>,
        load: LoadConfig,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            input: pick(input, INPUT_VAR, &lookup).unwrap_or_else(|| DEFAULT_INPUT.to_string()),
            staging_dir: pick(staging_dir, STAGING_DIR_VAR, &lookup)
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            run_date: run_date.unwrap_or_else(|| Utc::now().date_naive()),
            load,
        }
    }

    /// `<staging_dir>/daily_agg_<run_date>.csv`
    pub fn staging_file(&self) -> PathBuf {
        self.staging_dir
            .join(format!("daily_agg_{}.csv", self.run_date.format("%Y-%m-%d")))
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn pick<F>(flag: Option<String>, var: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    flag.or_else(|| lookup(var))
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let load = LoadConfig::resolve(None, None, env(&[]));
        assert_eq!(load.database, PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(load.table, DEFAULT_TABLE);
    }

    #[test]
    fn test_env_overrides_default() {
        let load = LoadConfig::resolve(None, None, env(&[(TABLE_VAR, "daily_rollup")]));
        assert_eq!(load.table, "daily_rollup");
    }

    #[test]
    fn test_flag_overrides_env() {
        let load = LoadConfig::resolve(
            Some("flag.db".into()),
            Some("from_flag".into()),
            env(&[(TABLE_VAR, "from_env"), (DATABASE_VAR, "env.db")]),
        );
        assert_eq!(load.database, PathBuf::from("flag.db"));
        assert_eq!(load.table, "from_flag");
    }

    #[test]
    fn test_blank_env_value_falls_back() {
        let load = LoadConfig::resolve(None, None, env(&[(TABLE_VAR, " ")]));
        assert_eq!(load.table, DEFAULT_TABLE);
    }

    #[test]
    fn test_run_config_staging_file() {
        let lookup = env(&[(STAGING_DIR_VAR, "/var/stage"), (INPUT_VAR, "in.csv")]);
        let load = LoadConfig::resolve(None, None, &lookup);
        let run = RunConfig::resolve(
            None,
            None,
            NaiveDate::from_ymd_opt(2025, 1, 1),
            load,
            &lookup,
        );

        assert_eq!(run.input, "in.csv");
        assert_eq!(
            run.staging_file(),
            PathBuf::from("/var/stage/daily_agg_2025-01-01.csv")
        );
    }

    #[test]
    fn test_run_config_defaults() {
        let load = LoadConfig::resolve(None, None, env(&[]));
        let run = RunConfig::resolve(None, None, None, load, env(&[]));
        assert_eq!(run.input, DEFAULT_INPUT);
        assert_eq!(run.staging_dir, std::env::temp_dir());
        assert_eq!(run.run_date, Utc::now().date_naive());
    }
}
