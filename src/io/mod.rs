//! I/O module
//!
//! Handles CSV and JSON parsing and report output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `json_format` - JSON trip documents and report output
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod json_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{convert_csv_record, parse_split, write_reports_csv, CsvRecord};
pub use json_format::{parse_trips_json, write_reports_json};
pub use sync_reader::SyncReader;

use crate::types::{TripError, TripReport};
use clap::ValueEnum;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Input file format, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One record per row (`.csv` and anything unrecognised)
    Csv,
    /// Whole trips as JSON documents (`.json`)
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Balance and settlement rows
    #[default]
    Csv,
    /// A `trips` document with balances, settlements and warnings
    Json,
}

/// Write reports in the requested format
pub fn write_reports(
    reports: &[TripReport],
    format: ReportFormat,
    output: &mut dyn Write,
) -> Result<(), TripError> {
    let result = match format {
        ReportFormat::Csv => write_reports_csv(reports, output),
        ReportFormat::Json => write_reports_json(reports, output),
    };

    result.map_err(|message| TripError::IoError { message })
}

/// Open an input file, mapping a missing file to `FileNotFound`
pub fn open_input(path: &Path) -> Result<File, TripError> {
    File::open(path).map_err(|e| input_error(path, e))
}

/// Map an error raised while opening or reading an input file
pub fn input_error(path: &Path, error: std::io::Error) -> TripError {
    match error.kind() {
        ErrorKind::NotFound => TripError::file_not_found(&path.display().to_string()),
        _ => error.into(),
    }
}
