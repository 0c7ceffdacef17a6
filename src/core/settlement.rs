//! Settlement matching
//!
//! Converts net balances into a short list of payments that, once made, bring
//! every balance to zero.
//!
//! # Algorithm
//!
//! Greedy largest-debtor / largest-creditor matching on whole cents:
//!
//! 1. Participants within `epsilon` of zero are already settled
//! 2. The rest are rounded to cents. Rounding can leave the cents a few short
//!    of (or over) the rounded trip total; the difference is made up one cent
//!    at a time on the balances rounding moved the furthest, ties by id
//! 3. Split into debtors and creditors and sort both by magnitude, largest
//!    first, ties by participant id
//! 4. Pair the current debtor with the current creditor and pay the smaller
//!    of the two, then move past whichever side is settled
//!
//! Every payment is an exact number of cents and every step settles at least
//! one party, so `n` participants never need more than `n - 1` payments and
//! no rounding error builds up on a party matched many times.

use crate::types::{round_currency, ParticipantId, SettlementInstruction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A participant with an outstanding amount, always stored as a magnitude
#[derive(Debug, Clone, Copy)]
struct Party {
    id: ParticipantId,
    remaining: Decimal,
}

/// Plan the payments that settle a set of balances
///
/// # Arguments
///
/// * `balances` - Net balance per participant (positive is owed money)
/// * `epsilon` - Magnitudes at or below this are treated as settled
///
/// # Returns
///
/// Instructions in the order they were matched, each a positive amount with
/// two decimal places. For balances that sum to zero, applying the plan
/// leaves every participant it pays or credits less than a cent from zero.
pub fn plan_settlements(
    balances: &BTreeMap<ParticipantId, Decimal>,
    epsilon: Decimal,
) -> Vec<SettlementInstruction> {
    let (mut debtors, mut creditors) = partition(&to_cents(balances, epsilon));

    let mut plan = Vec::with_capacity(debtors.len().max(creditors.len()));
    let mut d = 0;
    let mut c = 0;

    while d < debtors.len() && c < creditors.len() {
        let debtor = &mut debtors[d];
        let creditor = &mut creditors[c];

        let pay = debtor.remaining.min(creditor.remaining);
        plan.push(SettlementInstruction {
            from: debtor.id,
            to: creditor.id,
            amount: pay,
        });

        debtor.remaining -= pay;
        creditor.remaining -= pay;

        if debtor.remaining.is_zero() {
            d += 1;
        }
        if creditor.remaining.is_zero() {
            c += 1;
        }
    }

    plan
}

/// Round every unsettled balance to cents, keeping the rounded trip total
fn to_cents(
    balances: &BTreeMap<ParticipantId, Decimal>,
    epsilon: Decimal,
) -> Vec<(ParticipantId, Decimal)> {
    let cent = Decimal::new(1, 2);

    let total = balances
        .values()
        .fold(Decimal::ZERO, |sum, balance| sum.saturating_add(*balance));
    let target = round_currency(total);

    // (id, cents, error left by rounding)
    let mut rounded: Vec<(ParticipantId, Decimal, Decimal)> = balances
        .iter()
        .filter(|(_, balance)| balance.abs() > epsilon)
        .map(|(&id, &balance)| {
            let cents = round_currency(balance);
            (id, cents, balance.saturating_sub(cents))
        })
        .collect();

    let rounded_total = rounded
        .iter()
        .fold(Decimal::ZERO, |sum, (_, cents, _)| sum.saturating_add(*cents));
    let drift = target.saturating_sub(rounded_total);

    if !drift.is_zero() {
        let adding = drift > Decimal::ZERO;
        let step = if adding { cent } else { -cent };
        let steps = drift
            .abs()
            .checked_div(cent)
            .and_then(|steps| steps.to_usize())
            .unwrap_or(rounded.len());

        // Largest error first when adding cents, most negative first when removing
        let mut order: Vec<usize> = (0..rounded.len()).collect();
        order.sort_by(|&a, &b| {
            let by_error = if adding {
                rounded[b].2.cmp(&rounded[a].2)
            } else {
                rounded[a].2.cmp(&rounded[b].2)
            };
            by_error.then(rounded[a].0.cmp(&rounded[b].0))
        });

        for idx in order.into_iter().take(steps) {
            rounded[idx].1 = rounded[idx].1.saturating_add(step);
        }
    }

    rounded
        .into_iter()
        .map(|(id, cents, _)| (id, cents))
        .collect()
}

/// Split cent balances into debtors and creditors, largest magnitude first
fn partition(balances: &[(ParticipantId, Decimal)]) -> (Vec<Party>, Vec<Party>) {
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();

    for &(id, balance) in balances {
        match balance.cmp(&Decimal::ZERO) {
            Ordering::Less => debtors.push(Party {
                id,
                remaining: -balance,
            }),
            Ordering::Greater => creditors.push(Party {
                id,
                remaining: balance,
            }),
            Ordering::Equal => {}
        }
    }

    // Input is in id order, so a stable sort keeps ties by id
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    (debtors, creditors)
}

/// Apply a plan to a copy of the balances
///
/// The payer's balance rises and the receiver's falls by each instruction's
/// amount. Used to check that a plan actually settles a trip.
pub fn apply_settlements(
    balances: &BTreeMap<ParticipantId, Decimal>,
    plan: &[SettlementInstruction],
) -> BTreeMap<ParticipantId, Decimal> {
    let mut settled = balances.clone();
    for instruction in plan {
        if let Some(balance) = settled.get_mut(&instruction.from) {
            *balance += instruction.amount;
        }
        if let Some(balance) = settled.get_mut(&instruction.to) {
            *balance -= instruction.amount;
        }
    }
    settled
}
