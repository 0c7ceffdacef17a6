//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. Records are loaded in batches with trip-based
//! partitioning, then every trip is settled on its own task.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── TripBatchProcessor (trip partitioning + concurrent settlement)
//!         ├── SettlementEngine (stateless, shared)
//!         └── SharedTripRepository (thread-safe trip storage)
//! ```
//!
//! # Ordering
//!
//! - Batches are loaded sequentially, so records of a trip that span several
//!   batches are still applied in file order
//! - Within a batch, different trips are loaded in parallel
//! - Settlement starts only after the last batch has been loaded
//! - Reports are sorted by trip id, so output matches the sync strategy

use crate::core::r#async::{SharedTripRepository, TripBatchProcessor};
use crate::core::{EngineConfig, SettlementEngine};
use crate::io::async_reader::AsyncReader;
use crate::io::json_format::parse_trips_json;
use crate::io::{input_error, write_reports, InputFormat, ReportFormat};
use crate::strategy::ProcessingStrategy;
use crate::types::TripError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for batch processing
///
/// Controls how records are batched while loading and how many trips are
/// settled at the same time.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of records per batch
    pub batch_size: usize,
    /// Maximum number of trips settling concurrently (also the worker thread count)
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                "Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches, default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// AsyncProcessingStrategy is Send + Sync; all shared state lives behind Arc
/// in the TripBatchProcessor it builds per run.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    engine: Arc<SettlementEngine>,
    format: ReportFormat,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    /// * `engine_config` - Settlement engine configuration
    /// * `format` - Report output format
    pub fn new(config: BatchConfig, engine_config: EngineConfig, format: ReportFormat) -> Self {
        Self {
            config,
            engine: Arc::new(SettlementEngine::new(engine_config)),
            format,
        }
    }

    async fn load_csv(
        &self,
        input_path: &Path,
        processor: &TripBatchProcessor,
    ) -> Result<(), TripError> {
        let file = tokio::fs::File::open(input_path)
            .await
            .map_err(|e| input_error(input_path, e))?;

        // Wrap tokio file in a compatibility layer for csv-async
        let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
        let mut reader = AsyncReader::new(compat_file);

        loop {
            let batch = reader.read_batch(self.config.batch_size).await;
            if batch.is_empty() {
                break;
            }

            // Wait for the batch before reading the next one so a trip's
            // records are applied in file order
            processor.load_batch(batch).await;
        }

        Ok(())
    }

    async fn load_json(
        &self,
        input_path: &Path,
        repository: &SharedTripRepository,
    ) -> Result<(), TripError> {
        let content = tokio::fs::read_to_string(input_path)
            .await
            .map_err(|e| input_error(input_path, e))?;

        for trip in parse_trips_json(&content)? {
            let trip_id = trip.id.clone();
            if repository.put(trip).is_some() {
                warn!(trip = %trip_id, "Trip defined twice, keeping the later definition");
            }
        }

        Ok(())
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Settle every trip in the input file and write the reports to output
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Loads the input into a SharedTripRepository (CSV in batches, JSON whole)
    /// 3. Settles all trips with at most `max_concurrent_batches` in flight
    /// 4. Writes the reports in the configured format
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), TripError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| TripError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let reports = runtime.block_on(async {
            let repository = Arc::new(SharedTripRepository::new());
            let processor =
                TripBatchProcessor::new(Arc::clone(&self.engine), Arc::clone(&repository));

            match InputFormat::from_path(input_path) {
                InputFormat::Csv => self.load_csv(input_path, &processor).await?,
                InputFormat::Json => self.load_json(input_path, &repository).await?,
            }

            info!(trips = repository.len(), "Input loaded");

            Ok::<_, TripError>(processor.settle_all(self.config.max_concurrent_batches).await)
        })?;

        write_reports(&reports, self.format, output)
    }
}
