//! Settlement output types
//!
//! The values produced by the engine for one trip: balances, the suggested
//! settling payments, and any data-integrity warnings found along the way.

use super::ledger::{ExpenseId, RecordRef};
use super::participant::ParticipantId;
use super::trip::TripId;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use thiserror::Error;

/// Number of decimal places currency amounts are presented with
pub const CURRENCY_DP: u32 = 2;

/// Round an amount for presentation
///
/// Rounds half away from zero to two decimal places and normalises negative
/// zero, so `-0.004` presents as `0.00` rather than `-0.00`.
pub fn round_currency(amount: Decimal) -> Decimal {
    let rounded = amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// A suggested payment that moves balances toward zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementInstruction {
    /// Participant who pays (a debtor)
    pub from: ParticipantId,

    /// Participant who receives (a creditor)
    pub to: ParticipantId,

    /// Amount rounded to two decimal places
    pub amount: Decimal,
}

/// Recoverable data-integrity finding
///
/// Warnings never stop a computation. They are attached to the report so the
/// caller can log them or surface them to a user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerWarning {
    /// An expense or transfer names a participant that is not in the trip
    ///
    /// The whole record is left out of the balances.
    #[error("{record} references unknown participant {participant}")]
    UnknownParticipant {
        record: RecordRef,
        participant: ParticipantId,
    },

    /// Equal split with nobody to split between
    ///
    /// The expense contributes nothing to any balance.
    #[error("expense {expense} has no participants to split between")]
    EmptyShareSet { expense: ExpenseId },

    /// Explicit split with no share entries
    #[error("expense {expense} is a custom split without any shares")]
    EmptyExplicitShares { expense: ExpenseId },

    /// Explicit shares that do not add up to the expense amount
    ///
    /// The shares are still applied exactly as given.
    #[error("expense {expense} shares add up to {actual}, expected {expected}")]
    ShareSumMismatch {
        expense: ExpenseId,
        expected: Decimal,
        actual: Decimal,
    },

    /// Balances do not sum to zero within tolerance
    #[error("balances sum to {total} instead of zero")]
    Imbalance { total: Decimal },
}

/// Result of settling one trip
#[derive(Debug, Clone, PartialEq)]
pub struct TripReport {
    pub trip_id: TripId,

    pub name: Option<String>,

    pub location: Option<String>,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    /// Net balance per participant, unrounded
    ///
    /// Positive means the participant is owed money, negative means they owe.
    pub balances: BTreeMap<ParticipantId, Decimal>,

    /// Suggested payments that settle the trip
    pub settlements: Vec<SettlementInstruction>,

    pub warnings: Vec<LedgerWarning>,
}

impl TripReport {
    /// Balance of one participant, if they are part of the trip
    pub fn balance_of(&self, participant: ParticipantId) -> Option<Decimal> {
        self.balances.get(&participant).copied()
    }

    /// Whether the engine found nothing to flag
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::exact(Decimal::new(3000, 2), "30.00")]
    #[case::thirds(Decimal::new(33_333_333, 6), "33.33")]
    #[case::midpoint_up(Decimal::new(1005, 3), "1.01")]
    #[case::midpoint_negative(Decimal::new(-1005, 3), "-1.01")]
    #[case::negative_zero(Decimal::new(-4, 3), "0.00")]
    #[case::zero(Decimal::ZERO, "0.00")]
    fn test_round_currency(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format!("{:.2}", round_currency(amount)), expected);
    }

    #[rstest]
    #[case::unknown_participant(
        LedgerWarning::UnknownParticipant { record: RecordRef::Expense(4), participant: 99 },
        "expense 4 references unknown participant 99"
    )]
    #[case::unknown_in_transfer(
        LedgerWarning::UnknownParticipant { record: RecordRef::Transfer(2), participant: 7 },
        "transfer 2 references unknown participant 7"
    )]
    #[case::empty_share_set(
        LedgerWarning::EmptyShareSet { expense: 5 },
        "expense 5 has no participants to split between"
    )]
    #[case::empty_explicit_shares(
        LedgerWarning::EmptyExplicitShares { expense: 6 },
        "expense 6 is a custom split without any shares"
    )]
    #[case::share_sum_mismatch(
        LedgerWarning::ShareSumMismatch { expense: 1, expected: Decimal::new(100, 0), actual: Decimal::new(90, 0) },
        "expense 1 shares add up to 90, expected 100"
    )]
    #[case::imbalance(
        LedgerWarning::Imbalance { total: Decimal::new(150, 2) },
        "balances sum to 1.50 instead of zero"
    )]
    fn test_warning_display(#[case] warning: LedgerWarning, #[case] expected: &str) {
        assert_eq!(warning.to_string(), expected);
    }

    #[test]
    fn test_report_balance_lookup() {
        let report = TripReport {
            trip_id: "paris".to_string(),
            name: None,
            location: None,
            start_date: None,
            end_date: None,
            balances: BTreeMap::from([(1, Decimal::new(60, 0)), (2, Decimal::new(-60, 0))]),
            settlements: vec![],
            warnings: vec![],
        };

        assert_eq!(report.balance_of(1), Some(Decimal::new(60, 0)));
        assert_eq!(report.balance_of(3), None);
        assert!(report.is_clean());
    }
}
