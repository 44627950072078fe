//! Amortization domain types.
//!
//! Defines the deferred balance, the append-only allocation entries that
//! audit every partial recognition, and the loan view the processing
//! service operates on.

use accrue_shared::types::{
    AllocationEntryId, AmortizationStrategy, Currency, LoanId, Money, TransactionId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AmortizationError;

/// Which kind of base transaction created a deferred balance.
///
/// Dispatched once at every service entry point; the engine itself is
/// identical for both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceKind {
    /// Income added to the loan balance and recognized into P&L over time.
    CapitalizedIncome,
    /// An origination fee deferred and recognized over the loan's life.
    BuyDownFee,
}

/// Direction of an allocation entry.
///
/// Amounts are always positive; the direction is carried only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationType {
    /// Forward recognition.
    #[serde(rename = "AM")]
    Am,
    /// Reversing adjustment of prior recognition.
    #[serde(rename = "AM_ADJ")]
    AmAdj,
}

/// One deferred balance per base transaction per loan.
///
/// Invariant: `amount - amount_adjustment == unrecognized_amount +
/// charged_off_amount + net_recognized_to_date`, where the last term is
/// always derived from the allocation ledger, never cached here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredBalance {
    /// The loan this balance belongs to.
    pub loan_id: LoanId,
    /// The originating (base) transaction.
    pub base_transaction_id: TransactionId,
    /// Which kind of base transaction created this balance.
    pub kind: BalanceKind,
    /// Grant/charge date of the base transaction.
    pub date: NaiveDate,
    /// Original deferred amount, fixed at creation.
    pub amount: Decimal,
    /// Cumulative manual adjustment subtracted from `amount`.
    pub amount_adjustment: Decimal,
    /// Amount not yet recognized into income/expense.
    pub unrecognized_amount: Decimal,
    /// Portion moved to charge-off accounting.
    pub charged_off_amount: Decimal,
    /// True once fully recognized or fully written off; terminal.
    pub closed: bool,
    /// True if the base transaction itself was reversed/deleted.
    pub deleted: bool,
}

impl DeferredBalance {
    /// Creates an open balance for a freshly booked base transaction.
    #[must_use]
    pub fn new(
        loan_id: LoanId,
        base_transaction_id: TransactionId,
        kind: BalanceKind,
        date: NaiveDate,
        amount: Decimal,
    ) -> Self {
        Self {
            loan_id,
            base_transaction_id,
            kind,
            date,
            amount,
            amount_adjustment: Decimal::ZERO,
            unrecognized_amount: amount,
            charged_off_amount: Decimal::ZERO,
            closed: false,
            deleted: false,
        }
    }

    /// The amount still subject to recognition after manual adjustments.
    #[must_use]
    pub fn net_deferred(&self) -> Decimal {
        self.amount - self.amount_adjustment
    }
}

/// Append-only allocation record linking a base transaction to the
/// recognition transaction that consumed part of it.
///
/// Entries are immutable once written: they are the audit trail and the
/// source of truth for "already recognized".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// Entry identity (time-ordered, used as ordering tiebreaker).
    pub id: AllocationEntryId,
    /// The loan this entry belongs to.
    pub loan_id: LoanId,
    /// The base transaction this entry consumed.
    pub base_transaction_id: TransactionId,
    /// Date of the recognition transaction.
    pub date: NaiveDate,
    /// The aggregate recognition transaction this entry is tied to.
    pub recognition_transaction_id: TransactionId,
    /// Direction of this entry.
    pub allocation_type: AllocationType,
    /// Strictly positive amount; direction is carried by the type.
    pub amount: Decimal,
}

/// A staged allocation whose recognition transaction does not exist yet.
///
/// The aggregate transaction id is only known after all per-balance deltas
/// are summed, so staging is a distinct type rather than a nullable field
/// on the persisted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAllocation {
    /// The base transaction the delta was computed for.
    pub base_transaction_id: TransactionId,
    /// Direction of the delta.
    pub allocation_type: AllocationType,
    /// Strictly positive delta amount.
    pub amount: Decimal,
}

impl PendingAllocation {
    /// Converts the staged allocation into a persistable entry once the
    /// aggregate recognition transaction is known.
    #[must_use]
    pub fn into_entry(
        self,
        loan_id: LoanId,
        recognition_transaction_id: TransactionId,
        date: NaiveDate,
    ) -> AllocationEntry {
        AllocationEntry {
            id: AllocationEntryId::new(),
            loan_id,
            base_transaction_id: self.base_transaction_id,
            date,
            recognition_transaction_id,
            allocation_type: self.allocation_type,
            amount: self.amount,
        }
    }
}

/// A reversal/adjustment event linked to a base transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentTransaction {
    /// The adjusting transaction.
    pub id: TransactionId,
    /// When the adjustment took effect.
    pub date: NaiveDate,
    /// Adjusted amount.
    pub amount: Decimal,
}

/// Loan status as far as the amortization engine is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Loan is open and accruing.
    Active,
    /// Closed with all obligations met.
    ClosedObligationsMet,
    /// Closed overpaid.
    Overpaid,
    /// Closed written off.
    ClosedWrittenOff,
}

/// The loan view the engine needs; the full loan aggregate lives outside
/// this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Loan identity.
    pub id: LoanId,
    /// Current status.
    pub status: LoanStatus,
    /// Loan currency; all balances and entries are at this currency's scale.
    pub currency: Currency,
    /// Contractual maturity date, if set.
    pub maturity_date: Option<NaiveDate>,
    /// Date the loan was closed with obligations met.
    pub closed_on_date: Option<NaiveDate>,
    /// Date the loan became overpaid.
    pub overpaid_on_date: Option<NaiveDate>,
    /// Date the loan was written off.
    pub written_off_on_date: Option<NaiveDate>,
    /// Date the loan was charged off, if it was.
    pub charged_off_on_date: Option<NaiveDate>,
    /// Product-level strategy override; the configured default applies
    /// when absent.
    pub strategy: Option<AmortizationStrategy>,
}

impl Loan {
    /// The final recognition date for a loan in a closing state.
    ///
    /// # Errors
    ///
    /// Returns [`AmortizationError::NotInClosingState`] when the loan is not
    /// in one of the three terminal statuses or the matching date is unset.
    /// Calling this on a non-closing loan is a programming-contract
    /// violation, not a retryable condition.
    pub fn closing_date(&self) -> Result<NaiveDate, AmortizationError> {
        let date = match self.status {
            LoanStatus::ClosedObligationsMet => self.closed_on_date,
            LoanStatus::Overpaid => self.overpaid_on_date,
            LoanStatus::ClosedWrittenOff => self.written_off_on_date,
            LoanStatus::Active => None,
        };
        date.ok_or(AmortizationError::NotInClosingState {
            loan_id: self.id,
            status: self.status,
        })
    }

    /// The strategy in force for this loan.
    #[must_use]
    pub fn effective_strategy(&self, default: AmortizationStrategy) -> AmortizationStrategy {
        self.strategy.unwrap_or(default)
    }
}

/// Kind of the aggregate recognition transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionKind {
    /// Net forward recognition.
    Amortization,
    /// Net reversal of prior recognition.
    AmortizationAdjustment,
}

/// Relation between a recognition transaction and a triggering transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Audit-traceability link (e.g., to a charge-off transaction).
    Related,
}

/// Minimal reference to a loan transaction (id + date), used when reversing
/// the recognitions tied to a charge-off being undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTransactionRef {
    /// Transaction identity.
    pub id: TransactionId,
    /// Transaction date.
    pub date: NaiveDate,
}

/// What a processing flow produced when the aggregate delta was non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOutcome {
    /// The recognition transaction that was created.
    pub transaction_id: TransactionId,
    /// Its date.
    pub date: NaiveDate,
    /// Its absolute amount.
    pub amount: Money,
    /// Forward recognition or reversal.
    pub kind: RecognitionKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd_loan(status: LoanStatus) -> Loan {
        Loan {
            id: LoanId::new(),
            status,
            currency: Currency::Usd,
            maturity_date: None,
            closed_on_date: None,
            overpaid_on_date: None,
            written_off_on_date: None,
            charged_off_on_date: None,
            strategy: None,
        }
    }

    #[test]
    fn test_new_balance_is_fully_unrecognized() {
        let balance = DeferredBalance::new(
            LoanId::new(),
            TransactionId::new(),
            BalanceKind::CapitalizedIncome,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            dec!(1200.00),
        );
        assert_eq!(balance.unrecognized_amount, dec!(1200.00));
        assert_eq!(balance.charged_off_amount, Decimal::ZERO);
        assert_eq!(balance.net_deferred(), dec!(1200.00));
        assert!(!balance.closed);
        assert!(!balance.deleted);
    }

    #[test]
    fn test_net_deferred_subtracts_adjustment() {
        let mut balance = DeferredBalance::new(
            LoanId::new(),
            TransactionId::new(),
            BalanceKind::BuyDownFee,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            dec!(500.00),
        );
        balance.amount_adjustment = dec!(120.00);
        assert_eq!(balance.net_deferred(), dec!(380.00));
    }

    #[test]
    fn test_pending_allocation_into_entry_stamps_transaction() {
        let loan_id = LoanId::new();
        let base = TransactionId::new();
        let recognition = TransactionId::new();
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let pending = PendingAllocation {
            base_transaction_id: base,
            allocation_type: AllocationType::Am,
            amount: dec!(100.00),
        };
        let entry = pending.into_entry(loan_id, recognition, date);

        assert_eq!(entry.loan_id, loan_id);
        assert_eq!(entry.base_transaction_id, base);
        assert_eq!(entry.recognition_transaction_id, recognition);
        assert_eq!(entry.date, date);
        assert_eq!(entry.allocation_type, AllocationType::Am);
        assert_eq!(entry.amount, dec!(100.00));
    }

    #[test]
    fn test_closing_date_per_status() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();

        let mut loan = usd_loan(LoanStatus::ClosedObligationsMet);
        loan.closed_on_date = Some(date);
        assert_eq!(loan.closing_date().unwrap(), date);

        let mut loan = usd_loan(LoanStatus::Overpaid);
        loan.overpaid_on_date = Some(date);
        assert_eq!(loan.closing_date().unwrap(), date);

        let mut loan = usd_loan(LoanStatus::ClosedWrittenOff);
        loan.written_off_on_date = Some(date);
        assert_eq!(loan.closing_date().unwrap(), date);
    }

    #[test]
    fn test_closing_date_rejects_active_loan() {
        let loan = usd_loan(LoanStatus::Active);
        assert!(matches!(
            loan.closing_date(),
            Err(AmortizationError::NotInClosingState { .. })
        ));
    }

    #[test]
    fn test_effective_strategy_falls_back_to_default() {
        let mut loan = usd_loan(LoanStatus::Active);
        assert_eq!(
            loan.effective_strategy(AmortizationStrategy::StraightLine),
            AmortizationStrategy::StraightLine
        );
        loan.strategy = Some(AmortizationStrategy::StraightLine);
        assert_eq!(
            loan.effective_strategy(AmortizationStrategy::StraightLine),
            AmortizationStrategy::StraightLine
        );
    }
}
