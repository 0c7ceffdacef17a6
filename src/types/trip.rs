//! Trip aggregate and the input records that build it
//!
//! A trip groups participants, expenses and transfers. Trips are assembled
//! record by record from the input file, then handed to the engine whole.

use super::error::TripError;
use super::ledger::{CostSharing, Expense, RecordRef, Transfer};
use super::participant::{Participant, ParticipantId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Trip identifier
pub type TripId = String;

/// Everything the engine needs to settle one trip
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripData {
    pub id: TripId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub participants: Vec<Participant>,

    #[serde(default)]
    pub expenses: Vec<Expense>,

    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// A single input record, tagged with the trip it belongs to
#[derive(Debug, Clone, PartialEq)]
pub enum TripRecord {
    /// Trip metadata
    Trip {
        trip: TripId,
        name: String,
        location: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    },
    Participant {
        trip: TripId,
        participant: Participant,
    },
    Expense { trip: TripId, expense: Expense },
    Transfer { trip: TripId, transfer: Transfer },
}

impl TripRecord {
    /// The trip this record belongs to
    pub fn trip_id(&self) -> &str {
        match self {
            TripRecord::Trip { trip, .. }
            | TripRecord::Participant { trip, .. }
            | TripRecord::Expense { trip, .. }
            | TripRecord::Transfer { trip, .. } => trip,
        }
    }
}

impl TripData {
    /// Create an empty trip
    pub fn new(id: impl Into<TripId>) -> Self {
        TripData {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_participants(mut self, participants: impl IntoIterator<Item = Participant>) -> Self {
        self.participants.extend(participants);
        self
    }

    pub fn with_expenses(mut self, expenses: impl IntoIterator<Item = Expense>) -> Self {
        self.expenses.extend(expenses);
        self
    }

    pub fn with_transfers(mut self, transfers: impl IntoIterator<Item = Transfer>) -> Self {
        self.transfers.extend(transfers);
        self
    }

    /// Whether a participant with this id belongs to the trip
    pub fn has_participant(&self, id: ParticipantId) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    /// Apply an input record to this trip
    ///
    /// Identifiers are unique per trip: a record reusing an existing
    /// participant, expense or transfer id is rejected and the trip is left
    /// unchanged (first occurrence wins). A trip record replaces all of the
    /// trip's metadata.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateParticipant` or `DuplicateRecord` on id reuse.
    pub fn apply(&mut self, record: TripRecord) -> Result<(), TripError> {
        match record {
            TripRecord::Trip {
                name,
                location,
                start_date,
                end_date,
                ..
            } => {
                self.name = Some(name);
                self.location = location;
                self.start_date = start_date;
                self.end_date = end_date;
            }
            TripRecord::Participant { participant, .. } => {
                if self.has_participant(participant.id) {
                    return Err(TripError::duplicate_participant(&self.id, participant.id));
                }
                self.participants.push(participant);
            }
            TripRecord::Expense { expense, .. } => {
                if self.expenses.iter().any(|e| e.id == expense.id) {
                    return Err(TripError::duplicate_record(
                        &self.id,
                        RecordRef::Expense(expense.id),
                    ));
                }
                self.expenses.push(expense);
            }
            TripRecord::Transfer { transfer, .. } => {
                if self.transfers.iter().any(|t| t.id == transfer.id) {
                    return Err(TripError::duplicate_record(
                        &self.id,
                        RecordRef::Transfer(transfer.id),
                    ));
                }
                self.transfers.push(transfer);
            }
        }

        Ok(())
    }

    /// Check the structural rules the engine relies on
    ///
    /// Participant, expense and transfer ids must be unique, and no amount
    /// (including explicit share amounts) may be negative. Trips built through
    /// [`TripData::apply`] already satisfy the uniqueness rules; trips loaded
    /// from JSON may not.
    pub fn validate(&self) -> Result<(), TripError> {
        let mut seen = HashSet::new();
        for participant in &self.participants {
            if !seen.insert(participant.id) {
                return Err(TripError::duplicate_participant(&self.id, participant.id));
            }
        }

        let mut seen = HashSet::new();
        for expense in &self.expenses {
            let record = RecordRef::Expense(expense.id);
            if !seen.insert(expense.id) {
                return Err(TripError::duplicate_record(&self.id, record));
            }
            if expense.amount < Decimal::ZERO {
                return Err(TripError::negative_amount(record, expense.amount));
            }
            if let CostSharing::ExplicitShares { shares } = &expense.sharing {
                if let Some(owed) = shares.values().find(|owed| **owed < Decimal::ZERO) {
                    return Err(TripError::negative_amount(record, *owed));
                }
            }
        }

        let mut seen = HashSet::new();
        for transfer in &self.transfers {
            let record = RecordRef::Transfer(transfer.id);
            if !seen.insert(transfer.id) {
                return Err(TripError::duplicate_record(&self.id, record));
            }
            if transfer.amount < Decimal::ZERO {
                return Err(TripError::negative_amount(record, transfer.amount));
            }
        }

        Ok(())
    }
}
