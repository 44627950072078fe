//! Collaborator ports.
//!
//! The engine consumes these boundary contracts; implementations live
//! outside the core. All reads and writes of one run must hit the same
//! transactional snapshot, and implementations must scope a whole flow in
//! one atomic storage transaction: either every balance mutation, every
//! appended allocation entry, and the one recognition-transaction post
//! succeed together, or none do.

use accrue_shared::types::{LoanId, Money, TransactionId};
use chrono::NaiveDate;

use super::error::AmortizationError;
use super::types::{
    AdjustmentTransaction, BalanceKind, DeferredBalance, RecognitionKind, RelationType,
};

/// Persistence/query collaborator for deferred balances.
pub trait BalanceStore {
    /// All balances of the given kind on the loan that are not closed.
    fn find_open_balances(
        &self,
        loan_id: LoanId,
        kind: BalanceKind,
    ) -> Result<Vec<DeferredBalance>, AmortizationError>;

    /// The balance created by a specific base transaction, if any.
    fn find_balance(
        &self,
        base_transaction_id: TransactionId,
        loan_id: LoanId,
    ) -> Result<Option<DeferredBalance>, AmortizationError>;

    /// Reversal/adjustment transactions linked to a base transaction.
    fn find_adjustment_transactions(
        &self,
        base_transaction_id: TransactionId,
    ) -> Result<Vec<AdjustmentTransaction>, AmortizationError>;

    /// Persists mutated balances.
    fn save_balances(&self, balances: &[DeferredBalance]) -> Result<(), AmortizationError>;
}

/// Ledger-posting collaborator for aggregate recognition transactions.
pub trait RecognitionLedger {
    /// Creates and persists one recognition transaction; the returned id is
    /// what staged allocations are stamped with.
    fn create_recognition(
        &self,
        loan_id: LoanId,
        date: NaiveDate,
        amount: Money,
        kind: RecognitionKind,
    ) -> Result<TransactionId, AmortizationError>;

    /// Links a recognition transaction to a triggering transaction for
    /// audit traceability.
    fn link_related(
        &self,
        transaction_id: TransactionId,
        related_transaction_id: TransactionId,
        relation: RelationType,
    ) -> Result<(), AmortizationError>;

    /// Posts the transaction's journal entries into the double-entry
    /// journal.
    fn post_journal_entries(&self, transaction_id: TransactionId)
    -> Result<(), AmortizationError>;

    /// Recognition transactions on the loan dated `date` and related to
    /// `related_transaction_id`, excluding already-reversed ones.
    fn find_amortizations_related_to(
        &self,
        loan_id: LoanId,
        date: NaiveDate,
        related_transaction_id: TransactionId,
    ) -> Result<Vec<TransactionId>, AmortizationError>;

    /// Flags a recognition transaction reversed. The transaction is never
    /// deleted.
    fn mark_reversed(&self, transaction_id: TransactionId) -> Result<(), AmortizationError>;
}

/// Domain event emitted after a flow's transactional writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// A forward amortization transaction was created.
    AmortizationCreated(TransactionId),
    /// An amortization adjustment transaction was created.
    AmortizationAdjustmentCreated(TransactionId),
    /// A recognition transaction was reversed.
    RecognitionReversed(TransactionId),
}

impl RecognitionEvent {
    /// The transaction the event refers to.
    #[must_use]
    pub const fn transaction_id(&self) -> TransactionId {
        match self {
            Self::AmortizationCreated(id)
            | Self::AmortizationAdjustmentCreated(id)
            | Self::RecognitionReversed(id) => *id,
        }
    }
}

/// Event-notification collaborator. Best effort: failures are logged by the
/// caller and never abort the transactional write.
pub trait EventNotifier {
    /// Emits one domain event.
    fn notify(&self, event: RecognitionEvent) -> Result<(), AmortizationError>;
}
