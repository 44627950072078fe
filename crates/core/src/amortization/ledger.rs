//! The allocation ledger contract.
//!
//! The ledger is append-only. "Already recognized" is always an aggregation
//! over stored entries, never a cached counter, so a run interrupted after
//! writing balances but before writing entries stays recoverable: the next
//! run recomputes the correct delta from the entries that actually exist.

use accrue_shared::types::{LoanId, TransactionId};
use rust_decimal::Decimal;

use super::error::AmortizationError;
use super::types::{AllocationEntry, AllocationType};

/// Append-only store of allocation entries.
pub trait AllocationLedger {
    /// Net already-recognized amount for a base transaction:
    /// `sum(AM) - sum(AM_ADJ)`. Zero when no entries exist. Must be
    /// computed by aggregation over stored entries on every call.
    /// Entries tied to a reversed recognition transaction do not count:
    /// undoing a charge-off must return the recognized total to its
    /// pre-charge-off value.
    fn recorded_amortized_amount(
        &self,
        base_transaction_id: TransactionId,
        loan_id: LoanId,
    ) -> Result<Decimal, AmortizationError>;

    /// All allocation entries for a base transaction, ordered by date then
    /// entry id.
    fn entries_for(
        &self,
        base_transaction_id: TransactionId,
        loan_id: LoanId,
    ) -> Result<Vec<AllocationEntry>, AmortizationError>;

    /// Appends one batch of entries, all tied to the same recognition
    /// transaction. Callers must not append twice for the same
    /// recognition transaction id.
    fn append(&self, entries: Vec<AllocationEntry>) -> Result<(), AmortizationError>;
}

/// Folds entries into the net recognized amount: `sum(AM) - sum(AM_ADJ)`.
#[must_use]
pub fn net_recognized_amount(entries: &[AllocationEntry]) -> Decimal {
    entries.iter().fold(Decimal::ZERO, |acc, entry| {
        match entry.allocation_type {
            AllocationType::Am => acc + entry.amount,
            AllocationType::AmAdj => acc - entry.amount,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use accrue_shared::types::AllocationEntryId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(allocation_type: AllocationType, amount: Decimal) -> AllocationEntry {
        AllocationEntry {
            id: AllocationEntryId::new(),
            loan_id: LoanId::new(),
            base_transaction_id: TransactionId::new(),
            date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            recognition_transaction_id: TransactionId::new(),
            allocation_type,
            amount,
        }
    }

    #[test]
    fn test_net_recognized_empty_is_zero() {
        assert_eq!(net_recognized_amount(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_net_recognized_subtracts_adjustments() {
        let entries = vec![
            entry(AllocationType::Am, dec!(100.00)),
            entry(AllocationType::Am, dec!(50.00)),
            entry(AllocationType::AmAdj, dec!(30.00)),
        ];
        assert_eq!(net_recognized_amount(&entries), dec!(120.00));
    }

    #[test]
    fn test_net_recognized_can_go_negative_on_corrupt_data() {
        // The fold itself does not clamp; consumers surface the defect.
        let entries = vec![entry(AllocationType::AmAdj, dec!(10.00))];
        assert_eq!(net_recognized_amount(&entries), dec!(-10.00));
    }
}
