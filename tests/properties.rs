use proptest::prelude::*;
use rust_decimal::Decimal;
use trip_settlement_engine::core::apply_settlements;
use trip_settlement_engine::{
    compute_balances, plan_settlements, CostSharing, EngineConfig, Expense, Participant,
    SettlementEngine, Transfer, TripData,
};

/// (payer index, amount in cents, split kind, subset mask, share weights in cents)
type ExpenseSpec = (usize, i64, u8, u8, Vec<i64>);

/// (from index, to index, amount in cents)
type TransferSpec = (usize, usize, i64);

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn build_trip(member_count: usize, expenses: &[ExpenseSpec], transfers: &[TransferSpec]) -> TripData {
    let id = |idx: usize| (idx % member_count) as u32 + 1;

    let participants = (0..member_count).map(|idx| Participant::new(id(idx), format!("p{}", idx)));

    let expenses = expenses.iter().enumerate().map(|(n, (payer, amount, kind, mask, weights))| {
        let (amount, sharing) = match kind % 3 {
            0 => (cents(*amount), CostSharing::equal()),
            1 => (
                cents(*amount),
                CostSharing::equal_among(
                    (0..member_count).filter(|idx| mask & (1 << idx) != 0).map(id),
                ),
            ),
            _ => {
                // Shares add up to the amount exactly
                let shares: Vec<(u32, Decimal)> = weights
                    .iter()
                    .take(member_count)
                    .enumerate()
                    .map(|(idx, w)| (id(idx), cents(*w)))
                    .collect();
                let total = shares.iter().map(|(_, owed)| *owed).sum();
                (total, CostSharing::explicit(shares))
            }
        };
        Expense::new(n as u32 + 1, id(*payer), amount, sharing)
    });

    let transfers = transfers
        .iter()
        .enumerate()
        .map(|(n, (from, to, amount))| Transfer::new(n as u32 + 1, id(*from), id(*to), cents(*amount)));

    TripData::new("prop")
        .with_participants(participants)
        .with_expenses(expenses)
        .with_transfers(transfers)
}

fn expense_strategy() -> impl Strategy<Value = ExpenseSpec> {
    (
        0usize..=6,
        0i64..=100_000,
        any::<u8>(),
        any::<u8>(),
        prop::collection::vec(0i64..=50_000, 7),
    )
}

fn transfer_strategy() -> impl Strategy<Value = TransferSpec> {
    (0usize..=6, 0usize..=6, 0i64..=50_000)
}

proptest! {
    #[test]
    fn balances_sum_to_zero(
        member_count in 1usize..=7,
        expenses in prop::collection::vec(expense_strategy(), 0..=20),
        transfers in prop::collection::vec(transfer_strategy(), 0..=10),
    ) {
        let trip = build_trip(member_count, &expenses, &transfers);
        let sheet = compute_balances(
            &trip.participants,
            &trip.expenses,
            &trip.transfers,
            &EngineConfig::default(),
        )
        .expect("balances overflowed");

        // Division by the group size is exact to 28 digits
        let total = sheet.total().expect("total overflowed");
        prop_assert!(total.abs() < Decimal::new(1, 18));
        prop_assert_eq!(sheet.balances.len(), member_count);
    }
}

proptest! {
    #[test]
    fn settlements_bring_everyone_to_zero(
        member_count in 1usize..=7,
        expenses in prop::collection::vec(expense_strategy(), 0..=20),
        transfers in prop::collection::vec(transfer_strategy(), 0..=10),
    ) {
        let trip = build_trip(member_count, &expenses, &transfers);
        let engine = SettlementEngine::default();
        let report = engine.settle(&trip).expect("settle failed");

        let settled = apply_settlements(&report.balances, &report.settlements);

        let epsilon = engine.config().epsilon;
        for balance in settled.values() {
            prop_assert!(balance.abs() <= epsilon, "left over {} in {:?}", balance, settled);
        }
    }
}

#[test]
fn seven_way_split_settles_within_epsilon() {
    // 100.00 paid by the first of seven, split equally
    let expenses: Vec<ExpenseSpec> = vec![(0, 10_000, 0, 0, vec![0; 7])];
    let trip = build_trip(7, &expenses, &[]);
    let engine = SettlementEngine::default();

    let report = engine.settle(&trip).expect("settle failed");
    let settled = apply_settlements(&report.balances, &report.settlements);

    for balance in settled.values() {
        assert!(
            balance.abs() <= engine.config().epsilon,
            "left over {} in {:?}",
            balance,
            settled
        );
    }
}

proptest! {
    #[test]
    fn settlements_need_at_most_n_minus_one_payments(
        member_count in 1usize..=7,
        expenses in prop::collection::vec(expense_strategy(), 0..=20),
        transfers in prop::collection::vec(transfer_strategy(), 0..=10),
    ) {
        let trip = build_trip(member_count, &expenses, &transfers);
        let report = SettlementEngine::default().settle(&trip).expect("settle failed");

        prop_assert!(report.settlements.len() < member_count.max(1));
        for instruction in &report.settlements {
            prop_assert!(instruction.amount > Decimal::ZERO);
            prop_assert!(report.balances[&instruction.from] < Decimal::ZERO);
            prop_assert!(report.balances[&instruction.to] > Decimal::ZERO);
        }
    }
}

proptest! {
    #[test]
    fn settling_is_repeatable(
        member_count in 1usize..=7,
        expenses in prop::collection::vec(expense_strategy(), 0..=20),
        transfers in prop::collection::vec(transfer_strategy(), 0..=10),
    ) {
        let trip = build_trip(member_count, &expenses, &transfers);
        let engine = SettlementEngine::default();

        let first = engine.settle(&trip).expect("settle failed");
        let second = engine.settle(&trip).expect("settle failed");
        prop_assert_eq!(&first, &second);

        let replanned = plan_settlements(&first.balances, engine.config().epsilon);
        prop_assert_eq!(replanned, first.settlements);
    }
}

proptest! {
    #[test]
    fn record_order_does_not_change_balances(
        member_count in 1usize..=7,
        expenses in prop::collection::vec(expense_strategy(), 0..=20),
        transfers in prop::collection::vec(transfer_strategy(), 0..=10),
    ) {
        let trip = build_trip(member_count, &expenses, &transfers);
        let mut reversed = trip.clone();
        reversed.expenses.reverse();
        reversed.transfers.reverse();

        let engine = SettlementEngine::default();
        let forward = engine.settle(&trip).expect("settle failed");
        let backward = engine.settle(&reversed).expect("settle failed");

        prop_assert_eq!(forward.balances, backward.balances);
        prop_assert_eq!(forward.settlements, backward.settlements);
    }
}
