//! Trip Settlement Engine Library
//! # Overview
//!
//! This library computes, for a trip shared by several participants, how much
//! each person is owed or owes, and a short list of payments that settles
//! everyone. Input is read from CSV or JSON with a sync or an async strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (TripData, Expense, TripReport, etc.)
//! - [`cli`] - CLI arguments parsing and log setup
//! - [`core`] - Business logic components:
//!   - [`core::balance`] - Net balance per participant
//!   - [`core::settlement`] - Greedy matching of debtors to creditors
//!   - [`core::engine`] - Validation and orchestration per trip
//!   - [`core::repository`] - Trip assembly behind the `TripRepository` trait
//! - [`io`] - CSV and JSON readers and writers
//! - [`strategy`] - Complete pipelines, selectable at runtime
//!
//! # Balances
//!
//! A positive balance means the participant is owed money, a negative one
//! that they owe. Paying for an expense credits the payer with the full
//! amount and debits every sharer with their share. A transfer credits the
//! sender and debits the receiver. Balances of a trip always sum to zero.
//!
//! # Money
//!
//! Amounts are `rust_decimal::Decimal` and are never rounded while balances
//! accumulate. Settlement amounts and printed balances are rounded to two
//! decimal places, half away from zero.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use self::core::{
    compute_balances, plan_settlements, EngineConfig, SettlementEngine, TripRepository,
};
pub use io::{write_reports, ReportFormat};
pub use types::{
    CostSharing, Expense, LedgerWarning, Participant, ParticipantId, SettlementInstruction,
    Transfer, TripData, TripError, TripReport,
};
