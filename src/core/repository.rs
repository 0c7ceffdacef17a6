//! In-memory trip repository
//!
//! This module provides the InMemoryTripRepository used by the synchronous
//! pipeline. Trips are kept in a HashMap keyed by trip id and assembled record
//! by record as the input file is read.

use crate::core::traits::TripRepository;
use crate::types::{TripData, TripError, TripId};
use std::collections::HashMap;

/// In-memory trip repository
///
/// Maintains a HashMap of trip id to trip data.
#[derive(Debug, Default)]
pub struct InMemoryTripRepository {
    trips: HashMap<TripId, TripData>,
}

impl InMemoryTripRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        InMemoryTripRepository {
            trips: HashMap::new(),
        }
    }

    /// Borrow a stored trip without cloning it
    pub fn get(&self, trip_id: &str) -> Option<&TripData> {
        self.trips.get(trip_id)
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

impl TripRepository for InMemoryTripRepository {
    fn find(&self, trip_id: &str) -> Option<TripData> {
        self.trips.get(trip_id).cloned()
    }

    fn insert(&mut self, trip: TripData) -> Option<TripData> {
        self.trips.insert(trip.id.clone(), trip)
    }

    fn delete(&mut self, trip_id: &str) -> Option<TripData> {
        self.trips.remove(trip_id)
    }

    fn update<F>(&mut self, trip_id: &str, f: F) -> Result<(), TripError>
    where
        F: FnOnce(&mut TripData) -> Result<(), TripError>,
    {
        let trip = self
            .trips
            .entry(trip_id.to_string())
            .or_insert_with(|| TripData::new(trip_id));
        f(trip)
    }

    fn trip_ids(&self) -> Vec<TripId> {
        let mut ids: Vec<TripId> = self.trips.keys().cloned().collect();
        ids.sort();
        ids
    }
}
