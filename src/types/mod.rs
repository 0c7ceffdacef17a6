//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `participant`: Participant identifiers and records
//! - `ledger`: Expenses, cost-sharing rules and transfers
//! - `trip`: The trip aggregate and the input records that build it
//! - `report`: Settlement instructions, ledger warnings and trip reports
//! - `error`: Error types for the settlement engine

pub mod error;
pub mod ledger;
pub mod participant;
pub mod report;
pub mod trip;

pub use error::TripError;
pub use ledger::{CostSharing, Expense, ExpenseId, RecordRef, Transfer, TransferId};
pub use participant::{Participant, ParticipantId};
pub use report::{round_currency, LedgerWarning, SettlementInstruction, TripReport};
pub use trip::{TripData, TripId, TripRecord};
