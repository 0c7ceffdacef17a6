//! Core traits for trip storage
//!
//! This module defines the repository abstraction the processing pipelines
//! are written against. Trips are looked up, stored and removed through it
//! instead of living in shared module-level state, so both synchronous
//! (HashMap) and concurrent (DashMap) stores can be used interchangeably.

use crate::types::{TripData, TripError, TripId};

/// Trait for storing and retrieving trips
///
/// Implementations can be synchronous (using HashMap) or concurrent (using DashMap).
pub trait TripRepository {
    /// Find a trip by id, returning a snapshot of it
    fn find(&self, trip_id: &str) -> Option<TripData>;

    /// Insert or replace a trip, returning the previous value if any
    fn insert(&mut self, trip: TripData) -> Option<TripData>;

    /// Delete a trip, returning it if it existed
    fn delete(&mut self, trip_id: &str) -> Option<TripData>;

    /// Update a trip in place using a closure
    ///
    /// An empty trip is created first if none exists with this id. When the
    /// closure fails the error is returned and whatever it changed before
    /// failing is kept.
    fn update<F>(&mut self, trip_id: &str, f: F) -> Result<(), TripError>
    where
        F: FnOnce(&mut TripData) -> Result<(), TripError>;

    /// All stored trip ids in ascending order
    fn trip_ids(&self) -> Vec<TripId>;
}
