//! CSV format handling for trip records and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain records
//! - The `split` column grammar
//! - Report output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input Format
//!
//! ```text
//! type,trip,id,name,from,to,amount,date,split,location,start_date,end_date
//! trip,paris,,Paris weekend,,,,,,France,2024-05-01,2024-05-03
//! participant,paris,1,Alice,,,,,
//! participant,paris,2,Bob,,,,,
//! expense,paris,1,Dinner,1,,90.00,2024-05-01,equal
//! expense,paris,2,Museum,2,,30.00,2024-05-02,equal:1;2
//! expense,paris,3,Hotel,1,,100.00,2024-05-02,custom:1=40;2=60
//! transfer,paris,1,,2,1,20.00,2024-05-03,
//! ```
//!
//! The last three columns only apply to `trip` rows and may be left out of
//! the header entirely.

use crate::types::{
    round_currency, CostSharing, Expense, Participant, ParticipantId, Transfer, TripRecord,
    TripReport,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

/// Date format accepted in the `date` column
const DATE_FORMAT: &str = "%Y-%m-%d";

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns:
/// type, trip, id, name, from, to, amount, date, split and the optional
/// location, start_date, end_date.
/// Which columns are required depends on the record type.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub trip: String,
    pub id: Option<u32>,
    pub name: Option<String>,
    pub from: Option<ParticipantId>,
    pub to: Option<ParticipantId>,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub split: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Convert a CsvRecord to a TripRecord
///
/// This function:
/// - Parses the record type (case-insensitive)
/// - Checks the columns the record type requires are present
/// - Parses amounts into non-negative Decimals
/// - Parses dates and the `split` column
///
/// # Returns
///
/// Result containing either:
/// - Ok(TripRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<TripRecord, String> {
    let trip = csv_record.trip.trim().to_string();
    if trip.is_empty() {
        return Err(format!("{} record without a trip id", csv_record.record_type));
    }

    let kind = csv_record.record_type.to_lowercase();
    let record = match kind.as_str() {
        "trip" => {
            let name = required_text(csv_record.name, "trip", "name")?;
            let start_date =
                parse_trip_date(csv_record.start_date.as_deref(), &trip, "start_date")?;
            let end_date = parse_trip_date(csv_record.end_date.as_deref(), &trip, "end_date")?;
            let location = csv_record
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty());
            TripRecord::Trip {
                name,
                location,
                start_date,
                end_date,
                trip,
            }
        }
        "participant" => {
            let id = required(csv_record.id, "participant", "id")?;
            let name = required_text(csv_record.name, "participant", "name")?;
            TripRecord::Participant {
                trip,
                participant: Participant::new(id, name),
            }
        }
        "expense" => {
            let id = required(csv_record.id, "expense", "id")?;
            let payer = required(csv_record.from, "expense", "from")?;
            let amount = parse_amount(csv_record.amount.as_deref(), "expense", id)?;
            let sharing = parse_split(csv_record.split.as_deref())
                .map_err(|e| format!("Invalid split for expense {}: {}", id, e))?;
            let mut expense = Expense::new(id, payer, amount, sharing);
            expense.description = csv_record.name.filter(|name| !name.trim().is_empty());
            expense.date = parse_date(csv_record.date.as_deref(), "expense", id)?;
            TripRecord::Expense { trip, expense }
        }
        "transfer" => {
            let id = required(csv_record.id, "transfer", "id")?;
            let from = required(csv_record.from, "transfer", "from")?;
            let to = required(csv_record.to, "transfer", "to")?;
            let amount = parse_amount(csv_record.amount.as_deref(), "transfer", id)?;
            let mut transfer = Transfer::new(id, from, to, amount);
            transfer.date = parse_date(csv_record.date.as_deref(), "transfer", id)?;
            TripRecord::Transfer { trip, transfer }
        }
        _ => {
            return Err(format!(
                "Invalid record type: '{}' for trip '{}'",
                csv_record.record_type, trip
            ))
        }
    };

    Ok(record)
}

fn required<T>(value: Option<T>, kind: &str, column: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{} record requires '{}'", kind, column))
}

fn required_text(value: Option<String>, kind: &str, column: &str) -> Result<String, String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(format!("{} record requires '{}'", kind, column)),
    }
}

fn parse_amount(amount: Option<&str>, kind: &str, id: u32) -> Result<Decimal, String> {
    let amount_str = match amount.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Err(format!("{} {} requires an amount", kind, id)),
    };

    let amount = Decimal::from_str(amount_str)
        .map_err(|_| format!("Invalid amount '{}' for {} {}", amount_str, kind, id))?;

    if amount < Decimal::ZERO {
        return Err(format!(
            "Invalid amount '{}' for {} {}: must not be negative",
            amount_str, kind, id
        ));
    }

    Ok(amount)
}

fn parse_date(date: Option<&str>, kind: &str, id: u32) -> Result<Option<NaiveDate>, String> {
    match date.map(str::trim) {
        Some(s) if !s.is_empty() => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| format!("Invalid date '{}' for {} {}", s, kind, id)),
        _ => Ok(None),
    }
}

fn parse_trip_date(
    date: Option<&str>,
    trip: &str,
    column: &str,
) -> Result<Option<NaiveDate>, String> {
    match date.map(str::trim) {
        Some(s) if !s.is_empty() => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| format!("Invalid {} '{}' for trip '{}'", column, s, trip)),
        _ => Ok(None),
    }
}

/// Parse the `split` column
///
/// - empty or `equal`: equal split across every participant
/// - `equal:1;2;3`: equal split across the listed participants
/// - `custom:1=40;2=60`: explicit owed amount per participant
/// - `custom` or `custom:`: custom split without shares
pub fn parse_split(split: Option<&str>) -> Result<CostSharing, String> {
    let split = split.map(str::trim).unwrap_or_default();
    if split.is_empty() {
        return Ok(CostSharing::equal());
    }

    let (kind, rest) = split.split_once(':').unwrap_or((split, ""));
    let entries = rest.split(';').map(str::trim).filter(|e| !e.is_empty());

    match kind.trim().to_lowercase().as_str() {
        "equal" if !split.contains(':') => Ok(CostSharing::equal()),
        "equal" => {
            let members = entries
                .map(|e| {
                    e.parse::<ParticipantId>()
                        .map_err(|_| format!("invalid participant id '{}'", e))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CostSharing::equal_among(members))
        }
        "custom" => {
            let mut shares = BTreeMap::new();
            for entry in entries {
                let (id, owed) = entry
                    .split_once('=')
                    .ok_or_else(|| format!("share '{}' is not of the form id=amount", entry))?;
                let id = id
                    .trim()
                    .parse::<ParticipantId>()
                    .map_err(|_| format!("invalid participant id '{}'", id.trim()))?;
                let owed = Decimal::from_str(owed.trim())
                    .map_err(|_| format!("invalid share amount '{}'", owed.trim()))?;
                if owed < Decimal::ZERO {
                    return Err(format!("share for participant {} is negative", id));
                }
                if shares.insert(id, owed).is_some() {
                    return Err(format!("participant {} listed twice", id));
                }
            }
            Ok(CostSharing::ExplicitShares { shares })
        }
        other => Err(format!("unknown split type '{}'", other)),
    }
}

/// Write trip reports to CSV format
///
/// Writes one `balance` row per participant followed by the trip's
/// `settlement` rows, with columns: trip, type, participant, counterparty,
/// amount. Trips are sorted by id for deterministic output and amounts are
/// rounded to two decimal places.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_reports_csv(reports: &[TripReport], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["trip", "type", "participant", "counterparty", "amount"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted: Vec<&TripReport> = reports.iter().collect();
    sorted.sort_by(|a, b| a.trip_id.cmp(&b.trip_id));

    for report in sorted {
        for (participant, balance) in &report.balances {
            writer
                .write_record(&[
                    report.trip_id.clone(),
                    "balance".to_string(),
                    participant.to_string(),
                    String::new(),
                    format!("{:.2}", round_currency(*balance)),
                ])
                .map_err(|e| format!("Failed to write balance record: {}", e))?;
        }

        for instruction in &report.settlements {
            writer
                .write_record(&[
                    report.trip_id.clone(),
                    "settlement".to_string(),
                    instruction.from.to_string(),
                    instruction.to.to_string(),
                    format!("{:.2}", instruction.amount),
                ])
                .map_err(|e| format!("Failed to write settlement record: {}", e))?;
        }
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
