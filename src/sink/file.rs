use anyhow::Result;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::debug;

use super::AggregateSink;
use crate::schema::DailyAggregate;

/// Appends aggregate rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl AggregateSink for CsvSink {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    async fn append(&self, rows: &[DailyAggregate]) -> Result<usize> {
        let file_exists = self.path.exists();
        debug!(path = %self.path.display(), file_exists, "Appending aggregate rows");

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);

        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        Ok(rows.len())
    }
}
