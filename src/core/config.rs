//! Engine configuration
//!
//! Settings that decide how the engine treats ambiguous ledger data. Both
//! policies default to the lenient choice and attach a warning to the report.

use crate::types::TripError;
use clap::ValueEnum;
use rust_decimal::Decimal;

/// What to do with a custom split that has no share entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EmptySharesPolicy {
    /// Split the expense equally across every participant
    #[default]
    #[value(name = "fallback")]
    FallbackToEqualSplit,

    /// Leave the expense out of the balances entirely
    Skip,
}

/// Whether explicit shares are checked against the expense amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ShareCheck {
    /// Warn when the shares do not add up to the amount
    #[default]
    Warn,

    /// Apply the shares without checking
    Trust,
}

/// Configuration for the settlement engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Tolerance below which a balance counts as settled
    pub epsilon: Decimal,

    pub empty_custom_split: EmptySharesPolicy,

    pub share_check: ShareCheck,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // 0.01 currency units
            epsilon: Decimal::new(1, 2),
            empty_custom_split: EmptySharesPolicy::default(),
            share_check: ShareCheck::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new EngineConfig with custom values
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `epsilon` is negative.
    pub fn new(
        epsilon: Decimal,
        empty_custom_split: EmptySharesPolicy,
        share_check: ShareCheck,
    ) -> Result<Self, TripError> {
        if epsilon < Decimal::ZERO {
            return Err(TripError::invalid_config(format!(
                "epsilon must not be negative, got {}",
                epsilon
            )));
        }

        Ok(Self {
            epsilon,
            empty_custom_split,
            share_check,
        })
    }
}
