//! The amortization calculator.
//!
//! A pure function of its inputs: no side effects, no hidden state. The
//! same function serves the till-date and on-closure flows, which differ
//! only in the `as_of_date`/`maturity_date` they pass.

use accrue_shared::types::{AmortizationStrategy, Currency, Money};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{AdjustmentTransaction, DeferredBalance};

/// Cumulative amount of a deferred balance that should be recognized by
/// `as_of_date`.
///
/// The recognizable basis is `amount - amount_adjustment` once any
/// adjustment transactions exist (the balance's history has been amended);
/// otherwise the original amount. The interval runs from the grant date to
/// `min(as_of_date, maturity_date)`, clamped to `[0, basis]`. Intermediate
/// day-count ratios carry full decimal precision; the result is rounded
/// half-even at the currency's decimal scale.
#[must_use]
pub fn amortization_till_date(
    balance: &DeferredBalance,
    adjustments: &[AdjustmentTransaction],
    maturity_date: NaiveDate,
    strategy: AmortizationStrategy,
    as_of_date: NaiveDate,
    currency: Currency,
) -> Money {
    let basis = if adjustments.is_empty() {
        balance.amount
    } else {
        balance.net_deferred()
    };

    let end = as_of_date.min(maturity_date);
    if end >= maturity_date {
        return Money::of(basis, currency);
    }
    if end <= balance.date {
        return Money::zero(currency);
    }

    let recognized = match strategy {
        AmortizationStrategy::StraightLine => {
            let total_days = Decimal::from((maturity_date - balance.date).num_days());
            let elapsed_days = Decimal::from((end - balance.date).num_days());
            basis * elapsed_days / total_days
        }
    };

    Money::of(recognized, currency)
}
