//! Property-based tests driving whole till-date runs against the in-memory
//! store: conservation, idempotence, and positive-entry invariants under
//! randomized run sequences.

use accrue_core::amortization::{
    AdjustmentTransaction, AllocationLedger, AmortizationProcessingService, BalanceKind,
    BalanceStore, DeferredBalance, Loan, LoanStatus,
};
use accrue_shared::config::AmortizationConfig;
use accrue_shared::context::ProcessingContext;
use accrue_shared::types::{AmortizationStrategy, Currency, LoanId, TransactionId};
use accrue_store::{InMemoryStore, RecordingNotifier};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + Days::new(offset)
}

fn loan_with(loan_id: LoanId) -> Loan {
    Loan {
        id: loan_id,
        status: LoanStatus::Active,
        currency: Currency::Usd,
        maturity_date: Some(day(360)),
        closed_on_date: None,
        overpaid_on_date: None,
        written_off_on_date: None,
        charged_off_on_date: None,
        strategy: Some(AmortizationStrategy::StraightLine),
    }
}

fn conserved(store: &InMemoryStore, base: TransactionId, loan_id: LoanId) -> bool {
    let balance = store.find_balance(base, loan_id).unwrap().unwrap();
    let recognized = store.recorded_amortized_amount(base, loan_id).unwrap();
    balance.unrecognized_amount + balance.charged_off_amount + recognized
        == balance.net_deferred()
}

proptest! {
    /// Any ascending sequence of till-date runs keeps every balance
    /// conserved, appends only positive entries, and is idempotent at each
    /// step.
    #[test]
    fn prop_till_date_sequences_conserve_balance(
        amount_cents in 100i64..=100_000_000,
        mut offsets in proptest::collection::vec(0u64..=400, 1..6),
    ) {
        offsets.sort_unstable();
        let amount = Decimal::new(amount_cents, 2);

        let store = InMemoryStore::new();
        let notifier = RecordingNotifier::new();
        let loan = loan_with(LoanId::new());
        let base = TransactionId::new();
        store
            .seed_balance(DeferredBalance::new(
                loan.id,
                base,
                BalanceKind::CapitalizedIncome,
                day(0),
                amount,
            ))
            .unwrap();
        let svc = AmortizationProcessingService::new(
            &store,
            &store,
            &store,
            &notifier,
            AmortizationConfig::default(),
        );
        let ctx = ProcessingContext::new(day(0));

        for offset in offsets {
            svc.process_till_date(&ctx, &loan, BalanceKind::CapitalizedIncome, day(offset), true)
                .unwrap();
            prop_assert!(conserved(&store, base, loan.id));

            // an immediate rerun is a zero-delta no-op
            let entries_before = store.entries().unwrap().len();
            let repeat = svc
                .process_till_date(&ctx, &loan, BalanceKind::CapitalizedIncome, day(offset), true)
                .unwrap();
            prop_assert!(repeat.is_none());
            prop_assert_eq!(store.entries().unwrap().len(), entries_before);
        }

        for entry in store.entries().unwrap() {
            prop_assert!(entry.amount > Decimal::ZERO);
        }
    }

    /// Amending the basis downward mid-life pulls recognition back without
    /// ever breaking conservation or producing non-positive entries.
    #[test]
    fn prop_adjustment_pull_back_conserves_balance(
        amount_cents in 10_000i64..=100_000_000,
        first_offset in 30u64..=180,
        adjust_pct in 1u32..=80,
        second_offset in 181u64..=400,
    ) {
        let amount = Decimal::new(amount_cents, 2);
        let adjustment = (amount * Decimal::from(adjust_pct) / Decimal::from(100u32))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

        let store = InMemoryStore::new();
        let notifier = RecordingNotifier::new();
        let loan = loan_with(LoanId::new());
        let base = TransactionId::new();
        store
            .seed_balance(DeferredBalance::new(
                loan.id,
                base,
                BalanceKind::CapitalizedIncome,
                day(0),
                amount,
            ))
            .unwrap();
        let svc = AmortizationProcessingService::new(
            &store,
            &store,
            &store,
            &notifier,
            AmortizationConfig::default(),
        );
        let ctx = ProcessingContext::new(day(0));

        svc.process_till_date(&ctx, &loan, BalanceKind::CapitalizedIncome, day(first_offset), true)
            .unwrap();
        store
            .seed_adjustment(
                base,
                AdjustmentTransaction {
                    id: TransactionId::new(),
                    date: day(first_offset),
                    amount: adjustment,
                },
            )
            .unwrap();
        svc.process_till_date(&ctx, &loan, BalanceKind::CapitalizedIncome, day(second_offset), true)
            .unwrap();

        prop_assert!(conserved(&store, base, loan.id));
        let recognized = (&store).recorded_amortized_amount(base, loan.id).unwrap();
        prop_assert!(recognized >= Decimal::ZERO);
        prop_assert!(recognized <= amount - adjustment);
        for entry in store.entries().unwrap() {
            prop_assert!(entry.amount > Decimal::ZERO);
        }
    }
}
