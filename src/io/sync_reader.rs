//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over trip records from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read rows one at a time into a reusable
//! StringRecord, then deserializes and converts each row through the
//! csv_format module. The position of every row is kept so errors can name
//! the line they came from.
//!
//! ```no_run
//! use trip_settlement_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("trips.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Record for trip {}", record.trip_id()),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, unreadable header) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator
//! - Every row error carries its line number

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::io::open_input;
use crate::types::{TripError, TripRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over trip records.
/// Maintains streaming behavior with constant memory usage.
#[derive(Debug)]
pub struct SyncReader<R: Read = File> {
    reader: csv::Reader<R>,
    headers: StringRecord,
}

impl SyncReader<File> {
    /// Create a new SyncReader from a file path
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if the file opened and its header could be read
    /// * `Err(TripError)` otherwise
    pub fn new(path: &Path) -> Result<Self, TripError> {
        Self::from_reader(open_input(path)?)
    }
}

impl<R: Read> SyncReader<R> {
    /// Create a SyncReader over any byte source
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing optional columns may be left off)
    /// - Use an 8KB buffer for efficient I/O
    pub fn from_reader(source: R) -> Result<Self, TripError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(source);

        let headers = reader.headers()?.clone();

        Ok(Self { reader, headers })
    }

    fn decode(&self, row: &StringRecord) -> Result<TripRecord, TripError> {
        let line = row.position().map(|pos| pos.line());

        let csv_record: CsvRecord = row
            .deserialize(Some(&self.headers))
            .map_err(|e| TripError::parse_error(line, e.to_string()))?;

        convert_csv_record(csv_record).map_err(|e| TripError::parse_error(line, e))
    }
}

impl<R: Read> Iterator for SyncReader<R> {
    type Item = Result<TripRecord, TripError>;

    /// Get the next trip record from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(TripRecord))` - Successfully parsed record
    /// * `Some(Err(TripError))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut row = StringRecord::new();

        match self.reader.read_record(&mut row) {
            Ok(true) => Some(self.decode(&row)),
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}
