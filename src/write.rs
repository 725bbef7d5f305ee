//! Buffered write facade over `POST /api/v2/write`.

use crate::client::Client;
use crate::config::default_tags;
use crate::error::Result;
use crate::point::{Point, TagMap};
use tracing::{debug, info};

/// Maximum lines per HTTP write request.
const DEFAULT_BATCH_SIZE: usize = 5000;

/// Buffered writer for one org/bucket pair.
///
/// Points accumulate locally until [`flush`](PointWriter::flush) or
/// [`close`](PointWriter::close) posts them; enqueueing never touches the
/// network. Close consumes the writer, so every enqueued point has been
/// delivered (or an error returned) by the time it resolves, and nothing
/// can be enqueued afterwards.
pub struct PointWriter {
    client: Client,
    org: String,
    bucket: String,
    default_tags: TagMap,
    batch_size: usize,
    buffer: Vec<String>,
}

impl PointWriter {
    pub(crate) fn new(client: Client, org: &str, bucket: &str) -> Self {
        Self {
            client,
            org: org.to_string(),
            bucket: bucket.to_string(),
            default_tags: default_tags(),
            batch_size: DEFAULT_BATCH_SIZE,
            buffer: Vec::new(),
        }
    }

    /// Override the lines-per-request limit.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Enqueue one point.
    ///
    /// Default tags the point does not carry are filled in; the point's own
    /// tags always win. Points without fields render to nothing in line
    /// protocol and are skipped.
    pub fn point(&mut self, mut point: Point) {
        if point.fields.is_empty() {
            debug!(measurement = %point.measurement, "skipping point without fields");
            return;
        }
        for (key, value) in &self.default_tags {
            if !point.tags.contains_key(key) {
                point.tags.insert(key.clone(), value.clone());
            }
        }
        self.buffer.push(point.to_line_protocol());
    }

    /// Enqueue a batch of points.
    pub fn points(&mut self, points: impl IntoIterator<Item = Point>) {
        for point in points {
            self.point(point);
        }
    }

    /// Number of points waiting to be sent.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Post everything buffered, in batch-sized requests.
    ///
    /// An empty buffer is a successful no-op with zero counts and no HTTP
    /// call. On error the unsent lines stay buffered; already-posted
    /// batches are not retracted.
    pub async fn flush(&mut self) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();

        while !self.buffer.is_empty() {
            let count = self.buffer.len().min(self.batch_size);
            let body = self.buffer[..count].join("\n");
            let bytes = body.len();

            self.client
                .write_lines(&self.org, &self.bucket, body)
                .await?;

            self.buffer.drain(..count);
            summary.points_written += count;
            summary.bytes_sent += bytes;
            debug!(points = count, bytes, "batch written");
        }

        Ok(summary)
    }

    /// Flush any remaining points and consume the writer.
    pub async fn close(mut self) -> Result<WriteSummary> {
        let summary = self.flush().await?;
        info!(
            org = %self.org,
            bucket = %self.bucket,
            points = summary.points_written,
            "writer closed"
        );
        Ok(summary)
    }
}

/// Result of a flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of points written
    pub points_written: usize,
    /// Bytes sent
    pub bytes_sent: usize,
}
