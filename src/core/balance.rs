//! Balance computation
//!
//! Turns a trip's participants, expenses and transfers into a net balance per
//! participant. Positive balances are owed money, negative balances owe money.
//!
//! # Rules
//!
//! - The payer of an expense is credited the full amount
//! - Every participant in the expense's share set is debited their share
//! - A transfer credits the sender and debits the receiver
//! - Records naming an unknown participant are left out entirely
//!
//! Amounts are accumulated exactly; nothing is rounded here. Rounding is a
//! presentation concern handled by the report writers. All additions are
//! checked, so amounts too large for a `Decimal` fail the trip instead of
//! the process.

use crate::core::config::{EmptySharesPolicy, EngineConfig, ShareCheck};
use crate::types::{
    CostSharing, Expense, LedgerWarning, Participant, ParticipantId, RecordRef, Transfer,
    TripError,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Net balances plus the warnings raised while computing them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BalanceSheet {
    pub balances: BTreeMap<ParticipantId, Decimal>,
    pub warnings: Vec<LedgerWarning>,
}

impl BalanceSheet {
    /// Sum of all balances; zero for a consistent ledger
    ///
    /// Returns `None` if the sum does not fit in a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        checked_sum(self.balances.values().copied())
    }
}

/// Compute every participant's net balance
///
/// Expenses and transfers are applied ordered by `(date, id)`, undated
/// records first. The order never changes the sums, only the order in which
/// warnings are reported.
///
/// # Arguments
///
/// * `participants` - Everyone in the trip; each starts at a zero balance
/// * `expenses` - Expenses with their cost-sharing rules
/// * `transfers` - Direct payments between participants
/// * `config` - Tolerance and policies for ambiguous data
///
/// # Returns
///
/// A `BalanceSheet` with one entry per participant. Participants with no
/// activity keep a zero balance.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` naming the first record whose amount no
/// longer fits in a participant's balance.
pub fn compute_balances(
    participants: &[Participant],
    expenses: &[Expense],
    transfers: &[Transfer],
    config: &EngineConfig,
) -> Result<BalanceSheet, TripError> {
    let mut sheet = BalanceSheet {
        balances: participants.iter().map(|p| (p.id, Decimal::ZERO)).collect(),
        warnings: Vec::new(),
    };

    // Ascending id order, for "everyone" splits
    let everyone: Vec<ParticipantId> = sheet.balances.keys().copied().collect();

    let mut ordered_expenses: Vec<&Expense> = expenses.iter().collect();
    ordered_expenses.sort_by_key(|e| (e.date, e.id));

    for expense in ordered_expenses {
        apply_expense(&mut sheet, expense, &everyone, config)?;
    }

    let mut ordered_transfers: Vec<&Transfer> = transfers.iter().collect();
    ordered_transfers.sort_by_key(|t| (t.date, t.id));

    for transfer in ordered_transfers {
        apply_transfer(&mut sheet, transfer)?;
    }

    let total = sheet
        .total()
        .ok_or_else(|| TripError::arithmetic_overflow("balance total"))?;
    if total.abs() > config.epsilon {
        sheet.warnings.push(LedgerWarning::Imbalance { total });
    }

    Ok(sheet)
}

fn apply_expense(
    sheet: &mut BalanceSheet,
    expense: &Expense,
    everyone: &[ParticipantId],
    config: &EngineConfig,
) -> Result<(), TripError> {
    let record = RecordRef::Expense(expense.id);

    let mut referenced = vec![expense.payer];
    match &expense.sharing {
        CostSharing::EqualSplit {
            participants: Some(group),
        } => referenced.extend(group.iter().copied()),
        CostSharing::ExplicitShares { shares } => referenced.extend(shares.keys().copied()),
        CostSharing::EqualSplit { participants: None } => {}
    }
    if !check_references(sheet, record, referenced) {
        return Ok(());
    }

    let Some(shares) = resolve_shares(expense, everyone, config, &mut sheet.warnings)? else {
        return Ok(());
    };

    credit(sheet, record, expense.payer, expense.amount)?;
    for (participant, owed) in shares {
        credit(sheet, record, participant, -owed)?;
    }

    Ok(())
}

fn apply_transfer(sheet: &mut BalanceSheet, transfer: &Transfer) -> Result<(), TripError> {
    let record = RecordRef::Transfer(transfer.id);
    if !check_references(sheet, record, [transfer.from, transfer.to]) {
        return Ok(());
    }

    credit(sheet, record, transfer.from, transfer.amount)?;
    credit(sheet, record, transfer.to, -transfer.amount)?;

    Ok(())
}

/// Warn about every unknown participant a record names
///
/// Returns `true` when all references are known.
fn check_references(
    sheet: &mut BalanceSheet,
    record: RecordRef,
    referenced: impl IntoIterator<Item = ParticipantId>,
) -> bool {
    let mut unknown: Vec<ParticipantId> = Vec::new();
    for id in referenced {
        if !sheet.balances.contains_key(&id) && !unknown.contains(&id) {
            unknown.push(id);
        }
    }

    for participant in &unknown {
        sheet.warnings.push(LedgerWarning::UnknownParticipant {
            record,
            participant: *participant,
        });
    }

    unknown.is_empty()
}

fn credit(
    sheet: &mut BalanceSheet,
    record: RecordRef,
    participant: ParticipantId,
    amount: Decimal,
) -> Result<(), TripError> {
    if let Some(balance) = sheet.balances.get_mut(&participant) {
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TripError::arithmetic_overflow(record.to_string()))?;
    }
    Ok(())
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(value))
}

/// Work out how much each participant owes for an expense
///
/// Returns `None` when the expense should contribute nothing at all.
fn resolve_shares(
    expense: &Expense,
    everyone: &[ParticipantId],
    config: &EngineConfig,
    warnings: &mut Vec<LedgerWarning>,
) -> Result<Option<Vec<(ParticipantId, Decimal)>>, TripError> {
    let shares = match &expense.sharing {
        CostSharing::ExplicitShares { shares } if shares.is_empty() => {
            warnings.push(LedgerWarning::EmptyExplicitShares {
                expense: expense.id,
            });
            match config.empty_custom_split {
                EmptySharesPolicy::FallbackToEqualSplit => equal_shares(expense, everyone, warnings),
                EmptySharesPolicy::Skip => None,
            }
        }
        CostSharing::ExplicitShares { shares } => {
            if config.share_check == ShareCheck::Warn {
                let overflow = || {
                    TripError::arithmetic_overflow(RecordRef::Expense(expense.id).to_string())
                };
                let actual = checked_sum(shares.values().copied()).ok_or_else(overflow)?;
                let difference = actual.checked_sub(expense.amount).ok_or_else(overflow)?;
                if difference.abs() > config.epsilon {
                    warnings.push(LedgerWarning::ShareSumMismatch {
                        expense: expense.id,
                        expected: expense.amount,
                        actual,
                    });
                }
            }
            Some(shares.iter().map(|(id, owed)| (*id, *owed)).collect())
        }
        CostSharing::EqualSplit { participants: None } => equal_shares(expense, everyone, warnings),
        CostSharing::EqualSplit {
            participants: Some(group),
        } => {
            let mut members: Vec<ParticipantId> = Vec::with_capacity(group.len());
            for id in group {
                if !members.contains(id) {
                    members.push(*id);
                }
            }
            equal_shares(expense, &members, warnings)
        }
    };

    Ok(shares)
}

fn equal_shares(
    expense: &Expense,
    members: &[ParticipantId],
    warnings: &mut Vec<LedgerWarning>,
) -> Option<Vec<(ParticipantId, Decimal)>> {
    if members.is_empty() {
        warnings.push(LedgerWarning::EmptyShareSet {
            expense: expense.id,
        });
        return None;
    }

    let share = expense.amount / Decimal::from(members.len());
    Some(members.iter().map(|id| (*id, share)).collect())
}
