use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use tracing::info;

use super::AggregateSink;
use crate::schema::DailyAggregate;

/// Appends aggregate rows to a table in a SQLite database file.
///
/// The table is created on first use. Rows are only ever inserted; earlier
/// loads are never updated or deduplicated.
pub struct SqliteSink {
    path: PathBuf,
    table: String,
}

impl SqliteSink {
    /// Fails if `table` is not a plain SQL identifier.
    pub fn new(path: impl Into<PathBuf>, table: &str) -> Result<Self> {
        if !is_identifier(table) {
            bail!("invalid destination table name {:?}", table);
        }

        Ok(Self {
            path: path.into(),
            table: table.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl AggregateSink for SqliteSink {
    fn describe(&self) -> String {
        format!("sqlite:{}#{}", self.path.display(), self.table)
    }

    async fn append(&self, rows: &[DailyAggregate]) -> Result<usize> {
        let path = self.path.clone();
        let table = self.table.clone();
        let rows = rows.to_vec();

        tokio::task::spawn_blocking(move || insert_rows(&path, &table, &rows)).await?
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn insert_rows(path: &Path, table: &str, rows: &[DailyAggregate]) -> Result<usize> {
    let mut conn = Connection::open(path)?;

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            txn_date TEXT NOT NULL,
            bank_id TEXT NOT NULL,
            total_volume INTEGER NOT NULL,
            total_value REAL NOT NULL,
            avg_value REAL NOT NULL,
            median_value REAL NOT NULL
        );"
    ))?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {table} (
                txn_date, bank_id, total_volume, total_value, avg_value, median_value
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ))?;

        for row in rows {
            stmt.execute(params![
                row.txn_date.format("%Y-%m-%d").to_string(),
                &row.bank_id,
                row.total_volume as i64,
                row.total_value,
                row.avg_value,
                row.median_value,
            ])?;
        }
    }
    tx.commit()?;

    info!(path = %path.display(), table, rows = rows.len(), "Appended aggregates to SQLite");
    Ok(rows.len())
}
