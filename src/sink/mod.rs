//! Append-only destinations for aggregate rows.
//!
//! [`AggregateSink`] is the async trait every destination implements.
//! [`CsvSink`] appends to a local CSV file, [`SqliteSink`] inserts into a
//! SQLite table and [`S3Sink`] uploads a CSV object. None of them retry;
//! a failed append surfaces to the caller.

mod file;
mod s3;
mod sqlite;

pub use file::CsvSink;
pub use s3::S3Sink;
pub use sqlite::SqliteSink;

use anyhow::Result;

use crate::schema::DailyAggregate;

#[async_trait::async_trait]
pub trait AggregateSink: Send + Sync {
    /// Short human-readable description of the destination, for logs.
    fn describe(&self) -> String;

    /// Appends `rows` and returns how many were written.
    async fn append(&self, rows: &[DailyAggregate]) -> Result<usize>;
}
