//! Ledger entry types for the trip settlement engine
//!
//! This module defines the expense and transfer records that drive balance
//! computation, together with the cost-sharing rule attached to each expense.

use super::participant::ParticipantId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Expense identifier
pub type ExpenseId = u32;

/// Transfer identifier
pub type TransferId = u32;

/// How the cost of an expense is shared between participants
///
/// Serialized with an explicit `type` tag so the two cases are never inferred
/// from the presence or absence of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostSharing {
    /// Divide the amount evenly
    ///
    /// `None` means every participant of the trip; `Some` restricts the split
    /// to the listed participants.
    EqualSplit {
        #[serde(default)]
        participants: Option<Vec<ParticipantId>>,
    },

    /// Each listed participant owes the given amount
    ///
    /// The owed amounts are expected to add up to the expense amount, but
    /// they are applied as given either way.
    ExplicitShares {
        shares: BTreeMap<ParticipantId, Decimal>,
    },
}

impl CostSharing {
    /// Equal split across every participant of the trip
    pub fn equal() -> Self {
        CostSharing::EqualSplit { participants: None }
    }

    /// Equal split across the listed participants only
    pub fn equal_among(participants: impl IntoIterator<Item = ParticipantId>) -> Self {
        CostSharing::EqualSplit {
            participants: Some(participants.into_iter().collect()),
        }
    }

    /// Explicit owed amount per participant
    pub fn explicit(shares: impl IntoIterator<Item = (ParticipantId, Decimal)>) -> Self {
        CostSharing::ExplicitShares {
            shares: shares.into_iter().collect(),
        }
    }
}

impl Default for CostSharing {
    fn default() -> Self {
        CostSharing::equal()
    }
}

/// A cost paid by one participant on behalf of a set of participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,

    /// Participant who paid
    #[serde(rename = "payer_id")]
    pub payer: ParticipantId,

    /// Amount paid, never negative
    pub amount: Decimal,

    #[serde(default)]
    pub description: Option<String>,

    /// Used for ordering only, never for balance math
    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub sharing: CostSharing,
}

impl Expense {
    /// Create an undated expense without a description
    pub fn new(id: ExpenseId, payer: ParticipantId, amount: Decimal, sharing: CostSharing) -> Self {
        Expense {
            id,
            payer,
            amount,
            description: None,
            date: None,
            sharing,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// A direct payment between two participants outside of an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,

    #[serde(rename = "from_id")]
    pub from: ParticipantId,

    #[serde(rename = "to_id")]
    pub to: ParticipantId,

    pub amount: Decimal,

    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Transfer {
    pub fn new(id: TransferId, from: ParticipantId, to: ParticipantId, amount: Decimal) -> Self {
        Transfer {
            id,
            from,
            to,
            amount,
            date: None,
        }
    }
}

/// Reference to the ledger entry a warning or error is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef {
    Expense(ExpenseId),
    Transfer(TransferId),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordRef::Expense(id) => write!(f, "expense {}", id),
            RecordRef::Transfer(id) => write!(f, "transfer {}", id),
        }
    }
}
