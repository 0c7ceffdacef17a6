//! JSON format handling for whole trips and report output
//!
//! Input is either a single trip object or a document with a `trips` array:
//!
//! ```text
//! {
//!   "id": "paris",
//!   "name": "Paris weekend",
//!   "location": "France",
//!   "start_date": "2024-05-01",
//!   "end_date": "2024-05-03",
//!   "participants": [{ "id": 1, "name": "Alice" }, { "id": 2, "name": "Bob" }],
//!   "expenses": [
//!     { "id": 1, "payer_id": 1, "amount": 90.0, "date": "2024-05-01",
//!       "sharing": { "type": "equal_split" } },
//!     { "id": 2, "payer_id": 2, "amount": 100.0,
//!       "sharing": { "type": "explicit_shares", "shares": { "1": 40, "2": 60 } } }
//!   ],
//!   "transfers": [{ "id": 1, "from_id": 2, "to_id": 1, "amount": 20.0 }]
//! }
//! ```
//!
//! Output is always a `trips` array with balances, settlements and warnings.
//! Trip metadata other than the name is only written when present.

use crate::types::{round_currency, ParticipantId, TripData, TripError, TripReport};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Deserialize)]
struct TripsDocument {
    trips: Vec<TripData>,
}

/// Parse trips from JSON text
///
/// # Errors
///
/// Returns a `ParseError` if the text is not valid JSON or does not describe
/// a trip (or a `trips` array of them).
pub fn parse_trips_json(content: &str) -> Result<Vec<TripData>, TripError> {
    let document: Value = serde_json::from_str(content)?;

    // Parse the text again rather than the Value so errors keep their line
    let trips = if document.get("trips").is_some() {
        serde_json::from_str::<TripsDocument>(content)?.trips
    } else {
        vec![serde_json::from_str::<TripData>(content)?]
    };

    Ok(trips)
}

/// Amount presented as a JSON number
#[derive(Serialize)]
struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Amount {
    fn rounded(amount: Decimal) -> Self {
        Amount(round_currency(amount))
    }
}

#[derive(Serialize)]
struct SettlementView {
    from_id: ParticipantId,
    to_id: ParticipantId,
    amount: Amount,
}

#[derive(Serialize)]
struct ReportView<'a> {
    trip: &'a str,
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
    balances: BTreeMap<ParticipantId, Amount>,
    settlements: Vec<SettlementView>,
    warnings: Vec<String>,
}

impl<'a> From<&'a TripReport> for ReportView<'a> {
    fn from(report: &'a TripReport) -> Self {
        ReportView {
            trip: &report.trip_id,
            name: report.name.as_deref(),
            location: report.location.as_deref(),
            start_date: report.start_date,
            end_date: report.end_date,
            balances: report
                .balances
                .iter()
                .map(|(id, balance)| (*id, Amount::rounded(*balance)))
                .collect(),
            settlements: report
                .settlements
                .iter()
                .map(|s| SettlementView {
                    from_id: s.from,
                    to_id: s.to,
                    amount: Amount::rounded(s.amount),
                })
                .collect(),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    trips: Vec<ReportView<'a>>,
}

/// Write trip reports as a pretty-printed JSON document
///
/// Trips are sorted by id and amounts are rounded to two decimal places.
pub fn write_reports_json(reports: &[TripReport], output: &mut dyn Write) -> Result<(), String> {
    let mut views: Vec<ReportView> = reports.iter().map(ReportView::from).collect();
    views.sort_by(|a, b| a.trip.cmp(b.trip));

    serde_json::to_writer_pretty(&mut *output, &ReportDocument { trips: views })
        .map_err(|e| format!("Failed to write JSON output: {}", e))?;
    writeln!(output).map_err(|e| format!("Failed to write JSON output: {}", e))?;
    output
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}
