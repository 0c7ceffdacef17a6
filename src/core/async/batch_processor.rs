//! Batch processing with trip-based partitioning
//!
//! This module provides the `TripBatchProcessor`, which assembles trips from
//! batches of input records and then settles many trips concurrently.
//!
//! # Design
//!
//! Loading partitions every batch by trip id: records for different trips are
//! applied from separate tokio tasks, records for the same trip are applied in
//! file order by a single task. Settlement starts only once every batch has
//! been loaded, so the engine never sees a partially assembled trip.
//!
//! # Architecture
//!
//! ```text
//! TripBatchProcessor
//!     ├── Arc<SettlementEngine>      (stateless, shared by all tasks)
//!     └── Arc<SharedTripRepository>  (DashMap-backed trip storage)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{error, warn};

use super::SharedTripRepository;
use crate::core::SettlementEngine;
use crate::types::{TripError, TripId, TripRecord, TripReport};

/// Result of applying a single record
#[derive(Debug, Clone)]
pub struct RecordResult {
    /// The record that was applied
    pub record: TripRecord,

    /// The result of applying it (success or error)
    pub result: Result<(), TripError>,
}

/// Batch processor with trip-based partitioning
#[derive(Debug, Clone)]
pub struct TripBatchProcessor {
    engine: Arc<SettlementEngine>,
    repository: Arc<SharedTripRepository>,
}

impl TripBatchProcessor {
    /// Create a new TripBatchProcessor
    ///
    /// # Arguments
    ///
    /// * `engine` - Shared settlement engine
    /// * `repository` - Shared repository trips are assembled into
    pub fn new(engine: Arc<SettlementEngine>, repository: Arc<SharedTripRepository>) -> Self {
        Self { engine, repository }
    }

    /// Partition a batch of records by trip id
    ///
    /// # Guarantees
    ///
    /// - Each record appears in exactly one partition
    /// - Records for each trip keep their original order
    pub fn partition_by_trip(&self, batch: Vec<TripRecord>) -> HashMap<TripId, Vec<TripRecord>> {
        let mut trip_batches: HashMap<TripId, Vec<TripRecord>> = HashMap::new();

        for record in batch {
            trip_batches
                .entry(record.trip_id().to_string())
                .or_default()
                .push(record);
        }

        trip_batches
    }

    /// Apply all records for a single trip in order
    ///
    /// Failing records (duplicate ids) are logged and do not stop the rest.
    pub async fn load_trip_records(
        &self,
        trip_id: TripId,
        records: Vec<TripRecord>,
    ) -> Vec<RecordResult> {
        let mut results = Vec::with_capacity(records.len());

        for record in records {
            let result = self
                .repository
                .modify(&trip_id, |trip| trip.apply(record.clone()));
            if let Err(e) = &result {
                warn!("Record rejected: {}", e);
            }
            results.push(RecordResult { record, result });
        }

        results
    }

    /// Load a batch of records with trip-based partitioning
    ///
    /// Spawns one task per trip in the batch and waits for all of them.
    /// Results may be in a different order than the input.
    pub async fn load_batch(&self, batch: Vec<TripRecord>) -> Vec<RecordResult> {
        let trip_batches = self.partition_by_trip(batch);

        let mut tasks = Vec::with_capacity(trip_batches.len());
        for (trip_id, records) in trip_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.load_trip_records(trip_id, records).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(trip_results) => results.extend(trip_results),
                Err(e) => error!("Load task panicked: {:?}", e),
            }
        }

        results
    }

    /// Settle every stored trip, at most `max_concurrent` at a time
    ///
    /// Trips the engine rejects are logged and left out of the result.
    ///
    /// # Returns
    ///
    /// Reports sorted by trip id.
    pub async fn settle_all(&self, max_concurrent: usize) -> Vec<TripReport> {
        let tasks = self.repository.ids().into_iter().map(|trip_id| {
            let engine = Arc::clone(&self.engine);
            let repository = Arc::clone(&self.repository);
            tokio::spawn(async move {
                let trip = repository.get(&trip_id)?;
                match engine.settle(&trip) {
                    Ok(report) => Some(report),
                    Err(e) => {
                        error!(trip = %trip_id, "Failed to settle trip: {}", e);
                        None
                    }
                }
            })
        });

        let outcomes: Vec<_> = stream::iter(tasks)
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await;

        let mut reports = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(Some(report)) => reports.push(report),
                Ok(None) => {}
                Err(e) => error!("Settlement task panicked: {:?}", e),
            }
        }

        reports.sort_by(|a, b| a.trip_id.cmp(&b.trip_id));
        reports
    }
}
