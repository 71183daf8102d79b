use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use tracing::info;

use super::AggregateSink;
use crate::output::aggregates_to_csv;
use crate::schema::DailyAggregate;

/// Uploads aggregate rows as a CSV object, optionally gzip-compressed.
///
/// Each append writes one object; with `gzip` the key gains a `.gz` suffix.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
    key: String,
    gzip: bool,
}

impl S3Sink {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, key: &str, gzip: bool) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            key: key.to_string(),
            gzip,
        }
    }

    /// Builds a client from the ambient AWS configuration (env vars,
    /// instance profile, etc.).
    pub async fn from_env(bucket: &str, key: &str, gzip: bool) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, key, gzip)
    }

    pub fn object_key(&self) -> String {
        object_key(&self.key, self.gzip)
    }
}

fn object_key(key: &str, gzip: bool) -> String {
    if gzip && !key.ends_with(".gz") {
        format!("{}.gz", key)
    } else {
        key.to_string()
    }
}

fn encode_body(csv: Vec<u8>, gzip: bool) -> Result<Vec<u8>> {
    if !gzip {
        return Ok(csv);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&csv)?;
    Ok(encoder.finish()?)
}

#[async_trait::async_trait]
impl AggregateSink for S3Sink {
    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.object_key())
    }

    async fn append(&self, rows: &[DailyAggregate]) -> Result<usize> {
        let body = encode_body(aggregates_to_csv(rows)?, self.gzip)?;
        let key = self.object_key();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("text/csv")
            .send()
            .await?;

        info!(bucket = %self.bucket, key = %key, rows = rows.len(), "Uploaded aggregates to S3");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_object_key_suffix() {
        assert_eq!(object_key("daily/2025-01-01.csv", false), "daily/2025-01-01.csv");
        assert_eq!(object_key("daily/2025-01-01.csv", true), "daily/2025-01-01.csv.gz");
        assert_eq!(object_key("daily/2025-01-01.csv.gz", true), "daily/2025-01-01.csv.gz");
    }

    #[test]
    fn test_encode_body_gzip() {
        let csv = aggregates_to_csv(&[]).unwrap();

        let plain = encode_body(csv.clone(), false).unwrap();
        assert_eq!(plain, csv);

        let compressed = encode_body(csv.clone(), true).unwrap();
        let mut decoded = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, csv);
    }
}
