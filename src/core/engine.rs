//! Settlement engine
//!
//! This module provides the SettlementEngine that settles a whole trip by
//! running balance computation followed by settlement matching.
//!
//! The engine enforces the structural rules of a trip before computing:
//! - Amounts (expense, share and transfer) are never negative
//! - Participant, expense and transfer identifiers are unique
//!
//! Everything else (unknown participants, empty splits, shares that do not add
//! up) is recoverable and reported as a warning on the result.

use crate::core::balance::compute_balances;
use crate::core::config::EngineConfig;
use crate::core::settlement::plan_settlements;
use crate::types::{TripData, TripError, TripReport};
use tracing::{debug, warn};

/// Trip settlement engine
///
/// Stateless apart from its configuration, so one engine can settle any number
/// of trips, including from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    config: EngineConfig,
}

impl SettlementEngine {
    /// Create a new SettlementEngine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        SettlementEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Settle a single trip
    ///
    /// Validates the trip, computes every participant's balance and plans the
    /// payments that settle them. Warnings are logged and returned on the
    /// report.
    ///
    /// # Arguments
    ///
    /// * `trip` - The trip to settle
    ///
    /// # Returns
    ///
    /// * `Ok(TripReport)` with balances, settlements and warnings
    /// * `Err(TripError)` if the trip is structurally invalid
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any expense, explicit share or transfer amount is negative
    /// - A participant, expense or transfer id appears twice
    /// - An amount is too large for the trip's balances to be represented
    pub fn settle(&self, trip: &TripData) -> Result<TripReport, TripError> {
        trip.validate()?;

        let sheet = compute_balances(
            &trip.participants,
            &trip.expenses,
            &trip.transfers,
            &self.config,
        )?;

        for warning in &sheet.warnings {
            warn!(trip = %trip.id, "{}", warning);
        }

        let settlements = plan_settlements(&sheet.balances, self.config.epsilon);

        debug!(
            trip = %trip.id,
            participants = sheet.balances.len(),
            settlements = settlements.len(),
            "Trip settled"
        );

        Ok(TripReport {
            trip_id: trip.id.clone(),
            name: trip.name.clone(),
            location: trip.location.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            balances: sheet.balances,
            settlements,
            warnings: sheet.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settlement::apply_settlements;
    use crate::types::{
        CostSharing, Expense, LedgerWarning, Participant, RecordRef, SettlementInstruction,
        Transfer,
    };
    use rust_decimal::Decimal;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn alice_bob_carol(trip: &str) -> TripData {
        TripData::new(trip).with_participants([
            Participant::new(1, "Alice"),
            Participant::new(2, "Bob"),
            Participant::new(3, "Carol"),
        ])
    }

    #[test]
    fn test_settle_simple_equal_split() {
        let engine = SettlementEngine::default();
        let trip = alice_bob_carol("paris")
            .with_expenses([Expense::new(1, 1, dec(90), CostSharing::equal())]);

        let report = engine.settle(&trip).unwrap();

        assert_eq!(report.trip_id, "paris");
        assert_eq!(report.balance_of(1), Some(dec(60)));
        assert_eq!(report.balance_of(2), Some(dec(-30)));
        assert_eq!(report.balance_of(3), Some(dec(-30)));
        assert_eq!(
            report.settlements,
            vec![
                SettlementInstruction { from: 2, to: 1, amount: dec(30) },
                SettlementInstruction { from: 3, to: 1, amount: dec(30) },
            ]
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_settle_explicit_shares_then_transfer() {
        let engine = SettlementEngine::default();
        let trip = TripData::new("rome")
            .with_participants([Participant::new(1, "Alice"), Participant::new(2, "Bob")])
            .with_expenses([Expense::new(
                1,
                1,
                dec(100),
                CostSharing::explicit([(1, dec(40)), (2, dec(60))]),
            )]);

        let report = engine.settle(&trip).unwrap();
        assert_eq!(
            report.settlements,
            vec![SettlementInstruction { from: 2, to: 1, amount: dec(60) }]
        );

        let trip = trip.with_transfers([Transfer::new(1, 2, 1, dec(60))]);
        let report = engine.settle(&trip).unwrap();

        assert_eq!(report.balance_of(1), Some(Decimal::ZERO));
        assert_eq!(report.balance_of(2), Some(Decimal::ZERO));
        assert!(report.settlements.is_empty());
    }

    #[test]
    fn test_settle_reports_unknown_participant() {
        let engine = SettlementEngine::default();
        let trip = alice_bob_carol("oslo")
            .with_expenses([Expense::new(5, 77, dec(90), CostSharing::equal())]);

        let report = engine.settle(&trip).unwrap();

        assert_eq!(
            report.warnings,
            vec![LedgerWarning::UnknownParticipant {
                record: RecordRef::Expense(5),
                participant: 77
            }]
        );
        assert!(report.balances.values().all(|b| b.is_zero()));
        assert!(report.settlements.is_empty());
    }

    #[test]
    fn test_settle_rejects_negative_amount() {
        let engine = SettlementEngine::default();
        let trip = alice_bob_carol("oslo")
            .with_transfers([Transfer::new(3, 1, 2, dec(-5))]);

        let result = engine.settle(&trip);

        assert_eq!(
            result.unwrap_err(),
            TripError::negative_amount(RecordRef::Transfer(3), dec(-5))
        );
    }

    #[test]
    fn test_settle_seven_way_split_within_epsilon() {
        let engine = SettlementEngine::default();
        let trip = TripData::new("tallinn")
            .with_participants((1..=7).map(|id| Participant::new(id, format!("p{}", id))))
            .with_expenses([Expense::new(1, 1, dec(100), CostSharing::equal())]);

        let report = engine.settle(&trip).unwrap();
        let settled = apply_settlements(&report.balances, &report.settlements);

        assert_eq!(report.settlements.len(), 6);
        assert!(report.settlements.iter().all(|s| s.to == 1));
        for (participant, balance) in &settled {
            assert!(
                balance.abs() <= engine.config().epsilon,
                "participant {} left at {}",
                participant,
                balance
            );
        }
    }

    #[test]
    fn test_settle_overflow_fails_trip() {
        let engine = SettlementEngine::default();
        let trip = alice_bob_carol("zurich").with_expenses([
            Expense::new(1, 1, Decimal::MAX, CostSharing::equal_among([2])),
            Expense::new(2, 1, Decimal::MAX, CostSharing::equal_among([2])),
        ]);

        let result = engine.settle(&trip);

        assert_eq!(
            result.unwrap_err(),
            TripError::arithmetic_overflow("expense 2")
        );
    }

    #[test]
    fn test_settle_carries_trip_metadata() {
        let engine = SettlementEngine::default();
        let mut trip = alice_bob_carol("kyoto");
        trip.name = Some("Kyoto".to_string());
        trip.location = Some("Japan".to_string());
        trip.start_date = chrono::NaiveDate::from_ymd_opt(2024, 4, 1);
        trip.end_date = chrono::NaiveDate::from_ymd_opt(2024, 4, 9);

        let report = engine.settle(&trip).unwrap();

        assert_eq!(report.name.as_deref(), Some("Kyoto"));
        assert_eq!(report.location.as_deref(), Some("Japan"));
        assert_eq!(report.start_date, trip.start_date);
        assert_eq!(report.end_date, trip.end_date);
    }

    #[test]
    fn test_settle_empty_trip() {
        let engine = SettlementEngine::default();

        let report = engine.settle(&TripData::new("empty")).unwrap();

        assert!(report.balances.is_empty());
        assert!(report.settlements.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SettlementEngine>();
    }
}
