//! Read-side allocation breakdown.
//!
//! Answers "how was this deferred balance consumed": the balance itself,
//! every allocation entry in chronological order, and the net recognized
//! amount derived from those entries.

use accrue_shared::types::{LoanId, TransactionId};
use rust_decimal::Decimal;

use super::error::AmortizationError;
use super::ledger::{AllocationLedger, net_recognized_amount};
use super::ports::BalanceStore;
use super::types::{AllocationEntry, DeferredBalance};

/// The full recognition history of one deferred balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationBreakdown {
    /// The deferred balance the breakdown describes.
    pub balance: DeferredBalance,
    /// Allocation entries ordered by date, then entry id.
    pub entries: Vec<AllocationEntry>,
    /// `sum(AM) - sum(AM_ADJ)` over `entries`.
    pub net_recognized: Decimal,
}

/// Assembles the breakdown for the balance created by `base_transaction_id`.
///
/// # Errors
///
/// Returns [`AmortizationError::BalanceNotFound`] when no deferred balance
/// exists for the base transaction on this loan.
pub fn allocation_breakdown<S, A>(
    store: &S,
    allocations: &A,
    base_transaction_id: TransactionId,
    loan_id: LoanId,
) -> Result<AllocationBreakdown, AmortizationError>
where
    S: BalanceStore,
    A: AllocationLedger,
{
    let balance = store
        .find_balance(base_transaction_id, loan_id)?
        .ok_or(AmortizationError::BalanceNotFound {
            base_transaction_id,
            loan_id,
        })?;
    let entries = allocations.entries_for(base_transaction_id, loan_id)?;
    let net_recognized = net_recognized_amount(&entries);
    Ok(AllocationBreakdown {
        balance,
        entries,
        net_recognized,
    })
}
