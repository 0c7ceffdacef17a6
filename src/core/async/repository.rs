//! Thread-safe trip repository for async batch processing
//!
//! This module provides the `SharedTripRepository` struct, which stores trips
//! using concurrent data structures to enable safe multi-threaded access.
//!
//! # Design
//!
//! The `SharedTripRepository` uses `DashMap` (a concurrent HashMap) with
//! fine-grained locking. Records for different trips can be applied from
//! different tasks at the same time, while updates to the same trip are
//! serialized by the map's shard lock.

use crate::core::traits::TripRepository;
use crate::types::{TripData, TripError, TripId};
use dashmap::DashMap;

/// Thread-safe trip repository
///
/// All inherent methods take `&self` so the repository can be shared behind
/// an `Arc` between tasks.
#[derive(Debug, Default)]
pub struct SharedTripRepository {
    /// DashMap provides fine-grained locking through internal sharding
    trips: DashMap<TripId, TripData>,
}

impl SharedTripRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            trips: DashMap::new(),
        }
    }

    /// Snapshot of a stored trip (thread-safe)
    ///
    /// The trip is cloned so no lock is held after the call returns.
    pub fn get(&self, trip_id: &str) -> Option<TripData> {
        self.trips.get(trip_id).map(|entry| entry.value().clone())
    }

    /// Insert or replace a trip (thread-safe)
    pub fn put(&self, trip: TripData) -> Option<TripData> {
        self.trips.insert(trip.id.clone(), trip)
    }

    /// Remove a trip (thread-safe)
    pub fn remove(&self, trip_id: &str) -> Option<TripData> {
        self.trips.remove(trip_id).map(|(_, trip)| trip)
    }

    /// Update a trip in place, creating it if needed (thread-safe)
    ///
    /// The entry stays locked for the duration of the closure, so concurrent
    /// updates to the same trip never interleave.
    pub fn modify<F>(&self, trip_id: &str, f: F) -> Result<(), TripError>
    where
        F: FnOnce(&mut TripData) -> Result<(), TripError>,
    {
        let mut entry = self
            .trips
            .entry(trip_id.to_string())
            .or_insert_with(|| TripData::new(trip_id));
        f(entry.value_mut())
    }

    /// All stored trip ids in ascending order
    pub fn ids(&self) -> Vec<TripId> {
        let mut ids: Vec<TripId> = self.trips.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

impl TripRepository for SharedTripRepository {
    fn find(&self, trip_id: &str) -> Option<TripData> {
        self.get(trip_id)
    }

    fn insert(&mut self, trip: TripData) -> Option<TripData> {
        self.put(trip)
    }

    fn delete(&mut self, trip_id: &str) -> Option<TripData> {
        self.remove(trip_id)
    }

    fn update<F>(&mut self, trip_id: &str, f: F) -> Result<(), TripError>
    where
        F: FnOnce(&mut TripData) -> Result<(), TripError>,
    {
        self.modify(trip_id, f)
    }

    fn trip_ids(&self) -> Vec<TripId> {
        self.ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Participant, TripRecord};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_put_get_remove() {
        let repository = SharedTripRepository::new();

        assert!(repository.put(TripData::new("paris")).is_none());
        assert_eq!(repository.get("paris"), Some(TripData::new("paris")));
        assert_eq!(repository.remove("paris"), Some(TripData::new("paris")));
        assert!(repository.is_empty());
    }

    #[test]
    fn test_repository_trait_delegates() {
        fn assemble<R: TripRepository>(repository: &mut R) {
            repository.insert(TripData::new("rome"));
            repository
                .update("rome", |trip| {
                    trip.name = Some("Rome".to_string());
                    Ok(())
                })
                .unwrap();
        }

        let mut repository = SharedTripRepository::new();
        assemble(&mut repository);

        assert_eq!(repository.find("rome").unwrap().name.as_deref(), Some("Rome"));
        assert_eq!(repository.trip_ids(), vec!["rome"]);
        assert!(repository.delete("rome").is_some());
    }

    #[test]
    fn test_concurrent_modify_different_trips() {
        let repository = Arc::new(SharedTripRepository::new());
        let mut handles = vec![];

        for t in 0..8u32 {
            let repository = Arc::clone(&repository);
            handles.push(thread::spawn(move || {
                let trip_id = format!("trip-{}", t);
                for p in 0..50u32 {
                    repository
                        .modify(&trip_id, |trip| {
                            trip.apply(TripRecord::Participant {
                                trip: trip_id.clone(),
                                participant: Participant::new(p, format!("p{}", p)),
                            })
                        })
                        .unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(repository.len(), 8);
        for id in repository.ids() {
            assert_eq!(repository.get(&id).unwrap().participants.len(), 50);
        }
    }

    #[test]
    fn test_concurrent_modify_same_trip_keeps_every_record() {
        let repository = Arc::new(SharedTripRepository::new());
        let mut handles = vec![];

        for t in 0..4u32 {
            let repository = Arc::clone(&repository);
            handles.push(thread::spawn(move || {
                for p in 0..25u32 {
                    let id = t * 100 + p;
                    repository
                        .modify("shared", |trip| {
                            trip.apply(TripRecord::Participant {
                                trip: "shared".to_string(),
                                participant: Participant::new(id, "x"),
                            })
                        })
                        .unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(repository.get("shared").unwrap().participants.len(), 100);
    }
}
