//! Amortization error types.
//!
//! The taxonomy separates programming-contract violations (fatal, never
//! retried) from data inconsistencies (defects that must surface) and
//! collaborator failures (which abort the whole run).

use accrue_shared::types::{LoanId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::LoanStatus;

/// Errors that can occur during amortization processing.
#[derive(Debug, Error)]
pub enum AmortizationError {
    // ========== Contract Violations ==========
    /// Closure processing requested on a loan that is not in a closing
    /// state (or whose closing date is unset).
    #[error("loan {loan_id} is not in a closing state: {status:?}")]
    NotInClosingState {
        /// The offending loan.
        loan_id: LoanId,
        /// Its current status.
        status: LoanStatus,
    },

    // ========== Data Inconsistencies ==========
    /// The per-balance delta computed to a negative value, which the
    /// ledger invariants rule out. Surfaced, never clamped or skipped.
    #[error("computed a negative recognition delta of {delta} for base transaction {base_transaction_id}")]
    NegativeDelta {
        /// The base transaction whose delta went negative.
        base_transaction_id: TransactionId,
        /// The offending delta.
        delta: Decimal,
    },

    /// No deferred balance exists for the requested base transaction.
    #[error("no deferred balance found for base transaction {base_transaction_id} on loan {loan_id}")]
    BalanceNotFound {
        /// The base transaction looked up.
        base_transaction_id: TransactionId,
        /// The loan it was looked up on.
        loan_id: LoanId,
    },

    // ========== Collaborator Failures ==========
    /// The balance store failed; the whole run aborts.
    #[error("store error: {0}")]
    Store(String),

    /// The recognition/allocation ledger failed; the whole run aborts.
    #[error("ledger error: {0}")]
    Ledger(String),
}

impl AmortizationError {
    /// Returns true if this error is a programming-contract violation that
    /// must not be retried.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::NotInClosingState { .. })
    }

    /// Returns true if this error indicates corrupt or inconsistent data.
    #[must_use]
    pub const fn is_data_inconsistency(&self) -> bool {
        matches!(self, Self::NegativeDelta { .. })
    }
}
