//! Property-based tests for the amortization calculator.

use accrue_shared::types::{AmortizationStrategy, Currency, LoanId, TransactionId};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::amortization_till_date;
use super::types::{BalanceKind, DeferredBalance};

fn grant_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn balance_of(amount: Decimal) -> DeferredBalance {
    DeferredBalance::new(
        LoanId::new(),
        TransactionId::new(),
        BalanceKind::CapitalizedIncome,
        grant_date(),
        amount,
    )
}

// amounts in cents up to 10M, terms up to ~10 years
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn term_strategy() -> impl Strategy<Value = u64> {
    1u64..=3650
}

proptest! {
    /// Recognized amount never escapes `[0, basis]`, wherever `as_of` lands.
    #[test]
    fn prop_result_clamped_to_basis(
        amount in amount_strategy(),
        term in term_strategy(),
        offset in 0u64..=7300,
    ) {
        let balance = balance_of(amount);
        let maturity = grant_date() + Days::new(term);
        let result = amortization_till_date(
            &balance,
            &[],
            maturity,
            AmortizationStrategy::StraightLine,
            grant_date() + Days::new(offset),
            Currency::Usd,
        );
        prop_assert!(result.amount >= Decimal::ZERO);
        prop_assert!(result.amount <= amount);
    }

    /// Moving `as_of` forward never decreases the recognized amount.
    #[test]
    fn prop_monotone_in_as_of_date(
        amount in amount_strategy(),
        term in term_strategy(),
        earlier in 0u64..=3650,
        step in 0u64..=365,
    ) {
        let balance = balance_of(amount);
        let maturity = grant_date() + Days::new(term);
        let at = |offset: u64| {
            amortization_till_date(
                &balance,
                &[],
                maturity,
                AmortizationStrategy::StraightLine,
                grant_date() + Days::new(offset),
                Currency::Usd,
            )
            .amount
        };
        prop_assert!(at(earlier) <= at(earlier + step));
    }

    /// At or past maturity the whole basis is recognized, exactly.
    #[test]
    fn prop_full_basis_at_maturity(
        amount in amount_strategy(),
        term in term_strategy(),
        overshoot in 0u64..=365,
    ) {
        let balance = balance_of(amount);
        let maturity = grant_date() + Days::new(term);
        let result = amortization_till_date(
            &balance,
            &[],
            maturity,
            AmortizationStrategy::StraightLine,
            maturity + Days::new(overshoot),
            Currency::Usd,
        );
        prop_assert_eq!(result.amount, amount);
    }

    /// On or before the grant date nothing is recognized.
    #[test]
    fn prop_zero_at_grant_date(
        amount in amount_strategy(),
        term in term_strategy(),
    ) {
        let balance = balance_of(amount);
        let maturity = grant_date() + Days::new(term);
        let result = amortization_till_date(
            &balance,
            &[],
            maturity,
            AmortizationStrategy::StraightLine,
            grant_date(),
            Currency::Usd,
        );
        prop_assert!(result.is_zero());
    }

    /// The result is already at the currency's scale: re-rounding is a no-op.
    #[test]
    fn prop_result_at_currency_scale(
        amount in amount_strategy(),
        term in term_strategy(),
        offset in 0u64..=3650,
    ) {
        let balance = balance_of(amount);
        let maturity = grant_date() + Days::new(term);
        let result = amortization_till_date(
            &balance,
            &[],
            maturity,
            AmortizationStrategy::StraightLine,
            grant_date() + Days::new(offset),
            Currency::Usd,
        );
        prop_assert_eq!(result.amount, Currency::Usd.round(result.amount));
    }
}
