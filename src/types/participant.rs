//! Participant types
//!
//! A participant is a person tracked within one trip's ledger.

use serde::{Deserialize, Serialize};

/// Participant identifier
///
/// Unique within a trip, not across trips.
pub type ParticipantId = u32;

/// A person taking part in a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable identifier within the trip
    pub id: ParticipantId,

    /// Display name
    pub name: String,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Participant {
            id,
            name: name.into(),
        }
    }
}
