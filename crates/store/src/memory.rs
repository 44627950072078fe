//! In-memory implementation of the engine's collaborator ports.
//!
//! One `Mutex` guards all state, so every port call observes one
//! consistent snapshot. Flows driven through a single store reference are
//! atomic with respect to readers because the caller serializes runs per
//! loan (see [`crate::lock::LoanRunRegistry`]).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use accrue_core::amortization::{
    AdjustmentTransaction, AllocationEntry, AllocationLedger, AmortizationError, BalanceKind,
    BalanceStore, DeferredBalance, RecognitionKind, RecognitionLedger, RelationType,
    net_recognized_amount,
};
use accrue_shared::types::{LoanId, Money, TransactionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A persisted aggregate recognition transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionTransaction {
    /// Transaction identity.
    pub id: TransactionId,
    /// The loan it recognizes income for.
    pub loan_id: LoanId,
    /// Transaction date.
    pub date: NaiveDate,
    /// Absolute amount; direction is carried by `kind`.
    pub amount: Money,
    /// Forward recognition or reversal.
    pub kind: RecognitionKind,
    /// Set by undo flows; reversed transactions are never deleted.
    pub reversed: bool,
}

#[derive(Debug, Default)]
struct State {
    balances: Vec<DeferredBalance>,
    adjustments: HashMap<TransactionId, Vec<AdjustmentTransaction>>,
    entries: Vec<AllocationEntry>,
    transactions: Vec<RecognitionTransaction>,
    relations: Vec<(TransactionId, TransactionId, RelationType)>,
    journal_postings: Vec<TransactionId>,
}

/// In-memory balance store, allocation ledger, and recognition ledger.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, AmortizationError> {
        self.state
            .lock()
            .map_err(|_| AmortizationError::Store("state lock poisoned".to_string()))
    }

    /// Books a deferred balance, as the surrounding disbursement/charge
    /// workflow would.
    pub fn seed_balance(&self, balance: DeferredBalance) -> Result<(), AmortizationError> {
        self.state()?.balances.push(balance);
        Ok(())
    }

    /// Records an adjustment transaction against a base transaction and
    /// bumps the balance's cumulative adjustment, as the adjustment
    /// workflow would.
    pub fn seed_adjustment(
        &self,
        base_transaction_id: TransactionId,
        adjustment: AdjustmentTransaction,
    ) -> Result<(), AmortizationError> {
        let mut state = self.state()?;
        if let Some(balance) = state
            .balances
            .iter_mut()
            .find(|b| b.base_transaction_id == base_transaction_id)
        {
            balance.amount_adjustment += adjustment.amount;
            balance.unrecognized_amount -= adjustment.amount;
        }
        state
            .adjustments
            .entry(base_transaction_id)
            .or_default()
            .push(adjustment);
        Ok(())
    }

    /// Flags the balance's base transaction deleted, as the reversal
    /// workflow would.
    pub fn mark_balance_deleted(
        &self,
        base_transaction_id: TransactionId,
    ) -> Result<(), AmortizationError> {
        let mut state = self.state()?;
        if let Some(balance) = state
            .balances
            .iter_mut()
            .find(|b| b.base_transaction_id == base_transaction_id)
        {
            balance.deleted = true;
        }
        Ok(())
    }

    /// Snapshot of all persisted balances.
    pub fn balances(&self) -> Result<Vec<DeferredBalance>, AmortizationError> {
        Ok(self.state()?.balances.clone())
    }

    /// Snapshot of all allocation entries, in append order.
    pub fn entries(&self) -> Result<Vec<AllocationEntry>, AmortizationError> {
        Ok(self.state()?.entries.clone())
    }

    /// Snapshot of all recognition transactions, in creation order.
    pub fn transactions(&self) -> Result<Vec<RecognitionTransaction>, AmortizationError> {
        Ok(self.state()?.transactions.clone())
    }

    /// How many times a transaction's journal entries were posted. Forward
    /// posts and reversal re-posts both count.
    pub fn journal_posting_count(
        &self,
        transaction_id: TransactionId,
    ) -> Result<usize, AmortizationError> {
        Ok(self
            .state()?
            .journal_postings
            .iter()
            .filter(|id| **id == transaction_id)
            .count())
    }
}

impl BalanceStore for &InMemoryStore {
    fn find_open_balances(
        &self,
        loan_id: LoanId,
        kind: BalanceKind,
    ) -> Result<Vec<DeferredBalance>, AmortizationError> {
        Ok(self
            .state()?
            .balances
            .iter()
            .filter(|b| b.loan_id == loan_id && b.kind == kind && !b.closed)
            .cloned()
            .collect())
    }

    fn find_balance(
        &self,
        base_transaction_id: TransactionId,
        loan_id: LoanId,
    ) -> Result<Option<DeferredBalance>, AmortizationError> {
        Ok(self
            .state()?
            .balances
            .iter()
            .find(|b| b.base_transaction_id == base_transaction_id && b.loan_id == loan_id)
            .cloned())
    }

    fn find_adjustment_transactions(
        &self,
        base_transaction_id: TransactionId,
    ) -> Result<Vec<AdjustmentTransaction>, AmortizationError> {
        Ok(self
            .state()?
            .adjustments
            .get(&base_transaction_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save_balances(&self, balances: &[DeferredBalance]) -> Result<(), AmortizationError> {
        let mut state = self.state()?;
        for updated in balances {
            let position = state.balances.iter().position(|b| {
                b.base_transaction_id == updated.base_transaction_id
                    && b.loan_id == updated.loan_id
            });
            match position {
                Some(index) => state.balances[index] = updated.clone(),
                None => state.balances.push(updated.clone()),
            }
        }
        Ok(())
    }
}

impl AllocationLedger for &InMemoryStore {
    fn recorded_amortized_amount(
        &self,
        base_transaction_id: TransactionId,
        loan_id: LoanId,
    ) -> Result<Decimal, AmortizationError> {
        // Aggregated on every call; never cached. Entries whose recognition
        // transaction was reversed no longer count.
        let state = self.state()?;
        let entries: Vec<AllocationEntry> = state
            .entries
            .iter()
            .filter(|e| {
                e.base_transaction_id == base_transaction_id
                    && e.loan_id == loan_id
                    && !state
                        .transactions
                        .iter()
                        .any(|txn| txn.id == e.recognition_transaction_id && txn.reversed)
            })
            .cloned()
            .collect();
        Ok(net_recognized_amount(&entries))
    }

    fn entries_for(
        &self,
        base_transaction_id: TransactionId,
        loan_id: LoanId,
    ) -> Result<Vec<AllocationEntry>, AmortizationError> {
        let state = self.state()?;
        let mut entries: Vec<AllocationEntry> = state
            .entries
            .iter()
            .filter(|e| e.base_transaction_id == base_transaction_id && e.loan_id == loan_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.date, e.id));
        Ok(entries)
    }

    fn append(&self, entries: Vec<AllocationEntry>) -> Result<(), AmortizationError> {
        self.state()?.entries.extend(entries);
        Ok(())
    }
}

impl RecognitionLedger for &InMemoryStore {
    fn create_recognition(
        &self,
        loan_id: LoanId,
        date: NaiveDate,
        amount: Money,
        kind: RecognitionKind,
    ) -> Result<TransactionId, AmortizationError> {
        let id = TransactionId::new();
        self.state()?.transactions.push(RecognitionTransaction {
            id,
            loan_id,
            date,
            amount,
            kind,
            reversed: false,
        });
        Ok(id)
    }

    fn link_related(
        &self,
        transaction_id: TransactionId,
        related_transaction_id: TransactionId,
        relation: RelationType,
    ) -> Result<(), AmortizationError> {
        self.state()?
            .relations
            .push((transaction_id, related_transaction_id, relation));
        Ok(())
    }

    fn post_journal_entries(&self, transaction_id: TransactionId) -> Result<(), AmortizationError> {
        self.state()?.journal_postings.push(transaction_id);
        Ok(())
    }

    fn find_amortizations_related_to(
        &self,
        loan_id: LoanId,
        date: NaiveDate,
        related_transaction_id: TransactionId,
    ) -> Result<Vec<TransactionId>, AmortizationError> {
        let state = self.state()?;
        Ok(state
            .transactions
            .iter()
            .filter(|txn| {
                txn.loan_id == loan_id
                    && txn.date == date
                    && !txn.reversed
                    && state.relations.iter().any(|(from, to, relation)| {
                        *from == txn.id
                            && *to == related_transaction_id
                            && *relation == RelationType::Related
                    })
            })
            .map(|txn| txn.id)
            .collect())
    }

    fn mark_reversed(&self, transaction_id: TransactionId) -> Result<(), AmortizationError> {
        let mut state = self.state()?;
        let transaction = state
            .transactions
            .iter_mut()
            .find(|txn| txn.id == transaction_id)
            .ok_or_else(|| {
                AmortizationError::Ledger(format!("unknown transaction {transaction_id}"))
            })?;
        transaction.reversed = true;
        Ok(())
    }
}
