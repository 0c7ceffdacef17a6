//! Processing strategy module for trip settlement
//!
//! This module defines the Strategy pattern for complete settlement pipelines,
//! encompassing input parsing, trip assembly, settlement and report output.
//! This allows different processing implementations (synchronous, asynchronous
//! batch) to be selected at runtime.

use crate::cli::StrategyType;
use crate::core::EngineConfig;
use crate::io::ReportFormat;
use crate::types::TripError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete settlement pipelines
///
/// Each strategy must be able to read trip records from a CSV or JSON file,
/// assemble the trips they describe, settle every trip and write the reports
/// to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Settle every trip in the input file and write the reports to output
    ///
    /// # Returns
    ///
    /// * `Ok(())` if all processing completed (possibly with recoverable errors)
    /// * `Err(TripError)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission denied)
    /// - The CSV header or the JSON document is unreadable
    /// - Output cannot be written
    ///
    /// Malformed rows, rejected records and trips the engine refuses are
    /// logged and skipped; they never make this method fail.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), TripError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `batch_config` - Optional configuration for async batch processing (ignored for sync)
/// * `engine_config` - Settlement engine configuration shared by every trip
/// * `format` - Report output format
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    batch_config: Option<BatchConfig>,
    engine_config: EngineConfig,
    format: ReportFormat,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(engine_config, format)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            batch_config.unwrap_or_default(),
            engine_config,
            format,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_create_strategy_variants_agree() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(
            b"type,trip,id,name,from,to,amount,date,split\n\
              participant,paris,1,Alice,,,,,\n\
              participant,paris,2,Bob,,,,,\n\
              expense,paris,1,Dinner,1,,50,,\n",
        )
        .unwrap();

        let mut outputs = Vec::new();
        for strategy_type in [StrategyType::Sync, StrategyType::Async] {
            let strategy = create_strategy(
                strategy_type,
                Some(BatchConfig::new(1, 2)),
                EngineConfig::default(),
                ReportFormat::Csv,
            );
            let mut output = Vec::new();
            strategy.process(file.path(), &mut output).unwrap();
            outputs.push(String::from_utf8(output).unwrap());
        }

        assert_eq!(outputs[0], outputs[1]);
        assert!(outputs[0].contains("paris,settlement,2,1,25.00"));
    }
}
