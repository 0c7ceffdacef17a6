//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates settlement by coordinating between
//! the readers (for input), the InMemoryTripRepository (for trip assembly) and
//! the SettlementEngine (for the arithmetic).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface) and JSON parsing to
//!   `json_format::parse_trips_json`
//! - Trip assembly to a `TripRepository`
//! - Balances and settlements to `SettlementEngine`
//! - Output to `io::write_reports`

use crate::core::{EngineConfig, InMemoryTripRepository, SettlementEngine, TripRepository};
use crate::io::json_format::parse_trips_json;
use crate::io::sync_reader::SyncReader;
use crate::io::{open_input, write_reports, InputFormat, ReportFormat};
use crate::strategy::ProcessingStrategy;
use crate::types::{TripError, TripReport};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{error, info, warn};

/// Synchronous processing strategy
///
/// Reads the whole input into a repository, then settles trips one after the
/// other in ascending trip id order.
///
/// # Examples
///
/// ```no_run
/// use trip_settlement_engine::core::EngineConfig;
/// use trip_settlement_engine::io::ReportFormat;
/// use trip_settlement_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(EngineConfig::default(), ReportFormat::Csv);
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("trips.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    engine: SettlementEngine,
    format: ReportFormat,
}

impl SyncProcessingStrategy {
    pub fn new(config: EngineConfig, format: ReportFormat) -> Self {
        Self {
            engine: SettlementEngine::new(config),
            format,
        }
    }

    /// Stream CSV records into the repository one row at a time
    fn load_csv<R: TripRepository>(&self, input_path: &Path, repository: &mut R) -> Result<(), TripError> {
        let reader = SyncReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(record) => {
                    let trip_id = record.trip_id().to_string();
                    if let Err(e) = repository.update(&trip_id, |trip| trip.apply(record)) {
                        warn!("Record rejected: {}", e);
                    }
                }
                Err(e) => warn!("Skipping row: {}", e),
            }
        }

        Ok(())
    }

    /// Load whole trips from a JSON document
    fn load_json<R: TripRepository>(&self, input_path: &Path, repository: &mut R) -> Result<(), TripError> {
        let mut content = String::new();
        open_input(input_path)?.read_to_string(&mut content)?;

        for trip in parse_trips_json(&content)? {
            let trip_id = trip.id.clone();
            if repository.insert(trip).is_some() {
                warn!(trip = %trip_id, "Trip defined twice, keeping the later definition");
            }
        }

        Ok(())
    }

    /// Settle every trip in the repository, in ascending trip id order
    fn settle_all<R: TripRepository>(&self, repository: &R) -> Vec<TripReport> {
        repository
            .trip_ids()
            .iter()
            .filter_map(|trip_id| repository.find(trip_id))
            .filter_map(|trip| match self.engine.settle(&trip) {
                Ok(report) => Some(report),
                Err(e) => {
                    error!(trip = %trip.id, "Failed to settle trip: {}", e);
                    None
                }
            })
            .collect()
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Settle every trip in the input file and write the reports to output
    ///
    /// This method orchestrates the complete synchronous pipeline:
    /// 1. Picks the reader from the input file extension
    /// 2. Assembles trips in an InMemoryTripRepository
    /// 3. Settles each trip through the SettlementEngine
    /// 4. Writes the reports in the configured format
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), TripError> {
        let mut repository = InMemoryTripRepository::new();

        match InputFormat::from_path(input_path) {
            InputFormat::Csv => self.load_csv(input_path, &mut repository)?,
            InputFormat::Json => self.load_json(input_path, &mut repository)?,
        }

        info!(trips = repository.len(), "Input loaded");

        let reports = self.settle_all(&repository);

        write_reports(&reports, self.format, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "type,trip,id,name,from,to,amount,date,split\n";

    /// Helper function to create a temporary input file for testing
    fn create_temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(strategy: &SyncProcessingStrategy, file: &NamedTempFile) -> String {
        let mut output = Vec::new();
        strategy.process(file.path(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_sync_strategy_settles_equal_split() {
        let file = create_temp_file(
            ".csv",
            &format!(
                "{}participant,paris,1,Alice,,,,,\n\
                 participant,paris,2,Bob,,,,,\n\
                 participant,paris,3,Carol,,,,,\n\
                 expense,paris,1,Dinner,1,,90,,\n",
                HEADER
            ),
        );

        let output = run(&SyncProcessingStrategy::default(), &file);

        assert_eq!(
            output,
            "trip,type,participant,counterparty,amount\n\
             paris,balance,1,,60.00\n\
             paris,balance,2,,-30.00\n\
             paris,balance,3,,-30.00\n\
             paris,settlement,2,1,30.00\n\
             paris,settlement,3,1,30.00\n"
        );
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let strategy = SyncProcessingStrategy::default();
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);

        assert_eq!(result, Err(TripError::file_not_found("nonexistent.csv")));
        assert!(output.is_empty());
    }

    #[test]
    fn test_sync_strategy_continues_on_malformed_row() {
        let file = create_temp_file(
            ".csv",
            &format!(
                "{}participant,oslo,1,Alice,,,,,\n\
                 participant,oslo,2,Bob,,,,,\n\
                 expense,oslo,1,Taxi,1,,abc,,\n\
                 expense,oslo,2,Lunch,2,,10,,\n\
                 participant,oslo,2,Bobby,,,,,\n",
                HEADER
            ),
        );

        let output = run(&SyncProcessingStrategy::default(), &file);

        assert!(output.contains("oslo,balance,1,,-5.00"));
        assert!(output.contains("oslo,balance,2,,5.00"));
        assert!(output.contains("oslo,settlement,1,2,5.00"));
    }

    #[test]
    fn test_sync_strategy_skips_trip_with_negative_share() {
        let file = create_temp_file(
            ".json",
            r#"{"trips": [
                {"id": "bad", "participants": [{"id": 1, "name": "A"}],
                 "expenses": [{"id": 1, "payer_id": 1, "amount": 10,
                               "sharing": {"type": "explicit_shares", "shares": {"1": -10}}}]},
                {"id": "good", "participants": [{"id": 1, "name": "A"}]}
            ]}"#,
        );

        let output = run(&SyncProcessingStrategy::default(), &file);

        assert_eq!(
            output,
            "trip,type,participant,counterparty,amount\ngood,balance,1,,0.00\n"
        );
    }

    #[test]
    fn test_sync_strategy_reads_json_and_writes_json() {
        let file = create_temp_file(
            ".json",
            r#"{"id": "rome",
                "participants": [{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}],
                "expenses": [{"id": 1, "payer_id": 1, "amount": 100,
                              "sharing": {"type": "explicit_shares", "shares": {"1": 40, "2": 60}}}]}"#,
        );
        let strategy = SyncProcessingStrategy::new(EngineConfig::default(), ReportFormat::Json);

        let output: serde_json::Value = serde_json::from_str(&run(&strategy, &file)).unwrap();

        assert_eq!(output["trips"][0]["trip"], "rome");
        assert_eq!(output["trips"][0]["balances"]["2"], -60.0);
        assert_eq!(output["trips"][0]["settlements"][0]["amount"], 60.0);
    }

    #[test]
    fn test_sync_strategy_rejects_broken_json() {
        let file = create_temp_file(".json", "{\"id\": ");
        let mut output = Vec::new();

        let result = SyncProcessingStrategy::default().process(file.path(), &mut output);

        assert!(matches!(result, Err(TripError::ParseError { .. })));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
