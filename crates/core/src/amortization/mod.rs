//! Deferred-income amortization.
//!
//! This module implements the recognition engine:
//! - Deferred-balance and allocation-entry domain types
//! - The pure amortization calculator
//! - The allocation ledger contract (append-only audit trail)
//! - Collaborator ports (balance store, recognition ledger, events)
//! - The processing service orchestrating the four recomputation flows
//! - The read-side allocation breakdown
//! - Error types for amortization operations

pub mod allocation;
pub mod calculator;
pub mod error;
pub mod ledger;
pub mod ports;
pub mod service;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use allocation::{AllocationBreakdown, allocation_breakdown};
pub use calculator::amortization_till_date;
pub use error::AmortizationError;
pub use ledger::{AllocationLedger, net_recognized_amount};
pub use ports::{BalanceStore, EventNotifier, RecognitionEvent, RecognitionLedger};
pub use service::AmortizationProcessingService;
pub use types::{
    AdjustmentTransaction, AllocationEntry, AllocationType, BalanceKind, DeferredBalance, Loan,
    LoanStatus, LoanTransactionRef, PendingAllocation, RecognitionKind, RecognitionOutcome,
    RelationType,
};
