//! Concurrent implementations of core components
//!
//! This module provides the thread-safe pieces used by the async pipeline:
//!
//! - **SharedTripRepository**: Thread-safe trip storage using DashMap
//! - **TripBatchProcessor**: Loads record batches partitioned by trip and
//!   settles trips concurrently
//!
//! The settlement engine itself needs no async counterpart: it holds no
//! mutable state, so a single `Arc<SettlementEngine>` is shared by all tasks.

pub mod batch_processor;
pub mod repository;

pub use batch_processor::{RecordResult, TripBatchProcessor};
pub use repository::SharedTripRepository;
