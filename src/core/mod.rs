//! Core business logic module
//!
//! This module contains the trip settlement components:
//! - `balance` - Net balance computation from expenses and transfers
//! - `settlement` - Greedy matching of debtors and creditors
//! - `engine` - Settlement orchestration for a whole trip
//! - `config` - Engine tolerance and policies
//! - `traits` - Repository abstraction for trip storage
//! - `repository` - In-memory trip repository
//! - `async` - Thread-safe repository and concurrent trip processing

pub mod r#async;
pub mod balance;
pub mod config;
pub mod engine;
pub mod repository;
pub mod settlement;
pub mod traits;

pub use balance::{compute_balances, BalanceSheet};
pub use config::{EmptySharesPolicy, EngineConfig, ShareCheck};
pub use engine::SettlementEngine;
pub use r#async::{SharedTripRepository, TripBatchProcessor};
pub use repository::InMemoryTripRepository;
pub use settlement::{apply_settlements, plan_settlements};
pub use traits::TripRepository;
