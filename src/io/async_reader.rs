//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over trip records from a CSV file.
//! Supports batch reading for efficient async processing.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio for async runtime and concurrency primitives
//! - Batch reading for efficient processing
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of TripRecords
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::TripRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Provides batch reading interface over trip records.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    /// Line of the last row handed out (the header is line 1)
    line: u64,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line: 1,
        }
    }

    /// Read a batch of trip records
    ///
    /// This method reads up to `batch_size` rows from the CSV file,
    /// converting them to TripRecords. Invalid rows are logged with their
    /// line number and skipped.
    ///
    /// # Returns
    ///
    /// A vector of successfully converted trip records.
    /// Returns an empty vector when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<TripRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => {
                    self.line += 1;
                    match convert_csv_record(csv_record) {
                        Ok(record) => batch.push(record),
                        Err(e) => warn!(line = self.line, "Skipping row: {}", e),
                    }
                }
                Some(Err(e)) => {
                    self.line += 1;
                    warn!(line = self.line, "Skipping row: CSV parse error: {}", e);
                }
                None => break,
            }
        }

        batch
    }
}
