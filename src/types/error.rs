//! Error types for the trip settlement engine
//!
//! This module defines all fatal error types that can occur while loading
//! trips and settling them. Recoverable data-integrity findings are not errors;
//! they are reported as [`LedgerWarning`](super::LedgerWarning)s instead.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **Parsing Errors**: Malformed CSV or JSON, invalid amounts, dates or splits
//! - **Trip Structure Errors**: Negative amounts, duplicate identifiers
//! - **Arithmetic Errors**: Balances too large for a `Decimal`
//! - **Configuration Errors**: Invalid engine settings

use super::ledger::RecordRef;
use super::participant::ParticipantId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the settlement engine
///
/// Each variant carries enough context to identify the offending record or
/// file so the message can be shown to a user as is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TripError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV or JSON parsing error
    ///
    /// Recoverable for CSV input (the row is skipped), fatal for JSON input.
    #[error("Parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// An expense, share or transfer carries a negative amount
    #[error("{record} has negative amount {amount}")]
    NegativeAmount {
        /// The offending record
        record: RecordRef,
        /// The rejected amount
        amount: Decimal,
    },

    /// The same participant identifier appears twice in a trip
    #[error("Duplicate participant {participant} in trip '{trip}'")]
    DuplicateParticipant {
        trip: String,
        participant: ParticipantId,
    },

    /// The same expense or transfer identifier appears twice in a trip
    #[error("Duplicate {record} in trip '{trip}'")]
    DuplicateRecord { trip: String, record: RecordRef },

    /// A balance or share sum would overflow
    ///
    /// Fails the trip; other trips in the same input are still settled.
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// The record or computation that overflowed
        operation: String,
    },

    /// Invalid engine configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl From<std::io::Error> for TripError {
    fn from(error: std::io::Error) -> Self {
        TripError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for TripError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        TripError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for TripError {
    fn from(error: serde_json::Error) -> Self {
        let line = if error.line() == 0 {
            None
        } else {
            Some(error.line() as u64)
        };

        TripError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl TripError {
    /// Create a FileNotFound error
    pub fn file_not_found(path: &str) -> Self {
        TripError::FileNotFound {
            path: path.to_string(),
        }
    }

    /// Create a ParseError error
    pub fn parse_error(line: Option<u64>, message: impl Into<String>) -> Self {
        TripError::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create a NegativeAmount error
    pub fn negative_amount(record: RecordRef, amount: Decimal) -> Self {
        TripError::NegativeAmount { record, amount }
    }

    /// Create a DuplicateParticipant error
    pub fn duplicate_participant(trip: &str, participant: ParticipantId) -> Self {
        TripError::DuplicateParticipant {
            trip: trip.to_string(),
            participant,
        }
    }

    /// Create a DuplicateRecord error
    pub fn duplicate_record(trip: &str, record: RecordRef) -> Self {
        TripError::DuplicateRecord {
            trip: trip.to_string(),
            record,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: impl Into<String>) -> Self {
        TripError::ArithmeticOverflow {
            operation: operation.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        TripError::InvalidConfig {
            message: message.into(),
        }
    }
}
