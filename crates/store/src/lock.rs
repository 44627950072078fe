//! Per-loan run serialization.
//!
//! The engine derives "already recognized" by aggregating the allocation
//! ledger, so two concurrent runs for the same loan would each compute a
//! valid delta and both append entries, double-recognizing income. The
//! boundary that invokes the engine must hold a loan's guard for the whole
//! run. Runs on different loans proceed in parallel.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, PoisonError};

use accrue_shared::types::LoanId;

/// Registry handing out mutually exclusive per-loan run guards.
#[derive(Debug, Default)]
pub struct LoanRunRegistry {
    active: Mutex<HashSet<LoanId>>,
    released: Condvar,
}

impl LoanRunRegistry {
    /// Creates a registry with no active runs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until no other run holds the loan, then claims it.
    pub fn acquire(&self, loan_id: LoanId) -> LoanRunGuard<'_> {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while active.contains(&loan_id) {
            active = self
                .released
                .wait(active)
                .unwrap_or_else(PoisonError::into_inner);
        }
        active.insert(loan_id);
        LoanRunGuard {
            registry: self,
            loan_id,
        }
    }

    /// Claims the loan only if no run currently holds it.
    pub fn try_acquire(&self, loan_id: LoanId) -> Option<LoanRunGuard<'_>> {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if active.contains(&loan_id) {
            return None;
        }
        active.insert(loan_id);
        Some(LoanRunGuard {
            registry: self,
            loan_id,
        })
    }
}

/// Exclusive claim on one loan's amortization runs. Released on drop.
#[derive(Debug)]
pub struct LoanRunGuard<'a> {
    registry: &'a LoanRunRegistry,
    loan_id: LoanId,
}

impl LoanRunGuard<'_> {
    /// The loan this guard serializes.
    #[must_use]
    pub const fn loan_id(&self) -> LoanId {
        self.loan_id
    }
}

impl Drop for LoanRunGuard<'_> {
    fn drop(&mut self) {
        let mut active = self
            .registry
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        active.remove(&self.loan_id);
        self.registry.released.notify_all();
    }
}
