//! The amortization processing service.
//!
//! Orchestrates the four recomputation flows (loan closure, charge-off,
//! undo-charge-off, till-date), computes per-balance deltas against the
//! allocation ledger, aggregates them into one signed total, and performs
//! the two-phase allocation write.
//!
//! Concurrency contract: at most one run per loan at a time. "Already
//! recognized" is recomputed from the ledger, so two concurrent runs for
//! the same loan would each compute a valid delta and double-recognize.
//! The invoking boundary must serialize runs per loan (see the store
//! crate's `LoanRunGuard`).

use accrue_shared::config::AmortizationConfig;
use accrue_shared::context::ProcessingContext;
use accrue_shared::types::Money;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use super::calculator::amortization_till_date;
use super::error::AmortizationError;
use super::ledger::AllocationLedger;
use super::ports::{BalanceStore, EventNotifier, RecognitionEvent, RecognitionLedger};
use super::types::{
    AllocationEntry, AllocationType, BalanceKind, DeferredBalance, Loan, LoanTransactionRef,
    PendingAllocation, RecognitionKind, RecognitionOutcome, RelationType,
};

/// Which flow is running; controls per-balance mutation and audit linking.
enum FlowMode {
    Closure,
    ChargeOff(LoanTransactionRef),
    TillDate,
}

/// Orchestrates deferred-balance recognition for one loan at a time.
pub struct AmortizationProcessingService<S, A, L, N> {
    store: S,
    allocations: A,
    ledger: L,
    notifier: N,
    config: AmortizationConfig,
}

impl<S, A, L, N> AmortizationProcessingService<S, A, L, N>
where
    S: BalanceStore,
    A: AllocationLedger,
    L: RecognitionLedger,
    N: EventNotifier,
{
    /// Creates a processing service over the given collaborators.
    pub const fn new(store: S, allocations: A, ledger: L, notifier: N, config: AmortizationConfig) -> Self {
        Self {
            store,
            allocations,
            ledger,
            notifier,
            config,
        }
    }

    /// Final recognition when a loan reaches a terminal status.
    ///
    /// `as_of` and the maturity clamp are both the status-selected closing
    /// date. A zero aggregate delta is an explicit no-op: no empty-amount
    /// transaction is ever posted.
    ///
    /// # Errors
    ///
    /// Returns [`AmortizationError::NotInClosingState`] when the loan is not
    /// in a closing state; this is a contract violation, not a retryable
    /// condition.
    pub fn process_on_loan_closure(
        &self,
        ctx: &ProcessingContext,
        loan: &Loan,
        kind: BalanceKind,
        post_journal: bool,
    ) -> Result<Option<RecognitionOutcome>, AmortizationError> {
        let date = loan.closing_date()?;
        tracing::debug!(
            loan_id = %loan.id,
            business_date = %ctx.business_date,
            closing_date = %date,
            "processing amortization on loan closure"
        );
        self.run_recognition(loan, kind, date, date, date, &FlowMode::Closure, post_journal)
    }

    /// Recognition at charge-off: the unrecognized remainder of every open
    /// balance becomes a charge-off instead of future recognition.
    ///
    /// Uses the loan's charged-off date, falling back to the current
    /// business date when unset. The recognition transaction is linked to
    /// the charge-off transaction and posted to the journal immediately.
    pub fn process_on_loan_charge_off(
        &self,
        ctx: &ProcessingContext,
        loan: &Loan,
        kind: BalanceKind,
        charge_off_transaction: LoanTransactionRef,
    ) -> Result<Option<RecognitionOutcome>, AmortizationError> {
        let date = loan.charged_off_on_date.unwrap_or(ctx.business_date);
        tracing::debug!(
            loan_id = %loan.id,
            charge_off_transaction = %charge_off_transaction.id,
            %date,
            "processing amortization on loan charge-off"
        );
        self.run_recognition(
            loan,
            kind,
            date,
            date,
            date,
            &FlowMode::ChargeOff(charge_off_transaction),
            true,
        )
    }

    /// Reverses exactly the recognition transactions created by the
    /// charge-off being undone and restores the charged-off amounts back
    /// into unrecognized.
    ///
    /// An empty reversal set is a logged no-op: the balance restore still
    /// runs, since a charge-off can legitimately have produced a zero
    /// recognition delta.
    pub fn process_on_loan_undo_charge_off(
        &self,
        ctx: &ProcessingContext,
        loan: &Loan,
        kind: BalanceKind,
        charge_off_transaction: LoanTransactionRef,
    ) -> Result<(), AmortizationError> {
        tracing::debug!(
            loan_id = %loan.id,
            business_date = %ctx.business_date,
            charge_off_transaction = %charge_off_transaction.id,
            "processing amortization on undo charge-off"
        );

        let reversed = self.ledger.find_amortizations_related_to(
            loan.id,
            charge_off_transaction.date,
            charge_off_transaction.id,
        )?;
        if reversed.is_empty() {
            tracing::warn!(
                loan_id = %loan.id,
                charge_off_transaction = %charge_off_transaction.id,
                "undo charge-off found no recognition transactions to reverse"
            );
        }
        for transaction_id in reversed {
            self.ledger.mark_reversed(transaction_id)?;
            self.ledger.post_journal_entries(transaction_id)?;
            self.emit(RecognitionEvent::RecognitionReversed(transaction_id));
        }

        let mut balances = self.store.find_open_balances(loan.id, kind)?;
        balances.retain(|balance| !balance.deleted);
        for balance in &mut balances {
            balance.unrecognized_amount = balance.charged_off_amount;
            balance.charged_off_amount = Decimal::ZERO;
        }
        if !balances.is_empty() {
            self.store.save_balances(&balances)?;
        }
        Ok(())
    }

    /// Periodic catch-up recognition up to and including `till_date`.
    ///
    /// The as-of date is `till_date + 1 day`, clamped to maturity. Balance
    /// mutations are persisted even on a zero-delta run so unrecognized
    /// amounts stay current. `post_journal` lets batch callers defer
    /// journal posting.
    pub fn process_till_date(
        &self,
        ctx: &ProcessingContext,
        loan: &Loan,
        kind: BalanceKind,
        till_date: NaiveDate,
        post_journal: bool,
    ) -> Result<Option<RecognitionOutcome>, AmortizationError> {
        let maturity_date = match loan.maturity_date {
            Some(date) => date,
            None => loan.closing_date()?,
        };
        let as_of_date = till_date
            .checked_add_days(Days::new(1))
            .unwrap_or(till_date)
            .min(maturity_date);
        tracing::debug!(
            loan_id = %loan.id,
            business_date = %ctx.business_date,
            %till_date,
            %as_of_date,
            "processing amortization till date"
        );
        self.run_recognition(
            loan,
            kind,
            maturity_date,
            as_of_date,
            till_date,
            &FlowMode::TillDate,
            post_journal,
        )
    }

    /// Shared recognition run: per-balance deltas, signed aggregation, and
    /// the two-phase allocation write.
    #[allow(clippy::too_many_arguments)]
    fn run_recognition(
        &self,
        loan: &Loan,
        kind: BalanceKind,
        maturity_date: NaiveDate,
        as_of_date: NaiveDate,
        transaction_date: NaiveDate,
        mode: &FlowMode,
        post_journal: bool,
    ) -> Result<Option<RecognitionOutcome>, AmortizationError> {
        let mut balances = self.store.find_open_balances(loan.id, kind)?;
        let strategy = loan.effective_strategy(self.config.default_strategy);

        let mut staged: Vec<PendingAllocation> = Vec::new();
        let mut total = Decimal::ZERO;

        for balance in &mut balances {
            if balance.closed {
                continue;
            }

            let (delta, allocation_type) = if balance.deleted {
                // A deleted base transaction: whatever was already
                // recognized becomes the final adjustment so the net
                // effect is zero going forward.
                let delta = balance.amount - balance.unrecognized_amount;
                balance.closed = true;
                (delta, AllocationType::AmAdj)
            } else {
                let adjustments = self
                    .store
                    .find_adjustment_transactions(balance.base_transaction_id)?;
                let till = amortization_till_date(
                    balance,
                    &adjustments,
                    maturity_date,
                    strategy,
                    as_of_date,
                    loan.currency,
                )
                .amount;
                let already = self
                    .allocations
                    .recorded_amortized_amount(balance.base_transaction_id, loan.id)?;

                let (delta, allocation_type) = if !adjustments.is_empty() && already > till {
                    // Prior adjustments caused over-recognition; pull back.
                    (already - till, AllocationType::AmAdj)
                } else {
                    (till - already, AllocationType::Am)
                };

                match mode {
                    FlowMode::TillDate => {
                        balance.unrecognized_amount = balance.net_deferred() - till;
                    }
                    FlowMode::Closure => {
                        balance.unrecognized_amount = Decimal::ZERO;
                    }
                    FlowMode::ChargeOff(_) => {
                        balance.charged_off_amount = balance.unrecognized_amount;
                        balance.unrecognized_amount = Decimal::ZERO;
                    }
                }
                (delta, allocation_type)
            };

            if delta < Decimal::ZERO {
                return Err(AmortizationError::NegativeDelta {
                    base_transaction_id: balance.base_transaction_id,
                    delta,
                });
            }
            match allocation_type {
                AllocationType::Am => total += delta,
                AllocationType::AmAdj => total -= delta,
            }
            if delta > Decimal::ZERO {
                staged.push(PendingAllocation {
                    base_transaction_id: balance.base_transaction_id,
                    allocation_type,
                    amount: delta,
                });
            }
        }

        if !balances.is_empty() {
            self.store.save_balances(&balances)?;
        }

        if total.is_zero() {
            tracing::debug!(loan_id = %loan.id, "zero aggregate delta, no recognition transaction");
            return Ok(None);
        }

        let recognition_kind = if total > Decimal::ZERO {
            RecognitionKind::Amortization
        } else {
            RecognitionKind::AmortizationAdjustment
        };
        let amount = Money::of(total.abs(), loan.currency);

        let transaction_id =
            self.ledger
                .create_recognition(loan.id, transaction_date, amount, recognition_kind)?;
        if let FlowMode::ChargeOff(charge_off) = mode {
            self.ledger
                .link_related(transaction_id, charge_off.id, RelationType::Related)?;
        }

        // Two-phase write: the staged allocations only now learn which
        // transaction they belong to.
        let entries: Vec<AllocationEntry> = staged
            .into_iter()
            .map(|pending| pending.into_entry(loan.id, transaction_id, transaction_date))
            .collect();
        if !entries.is_empty() {
            self.allocations.append(entries)?;
        }

        if post_journal {
            self.ledger.post_journal_entries(transaction_id)?;
        }

        let event = match recognition_kind {
            RecognitionKind::Amortization => RecognitionEvent::AmortizationCreated(transaction_id),
            RecognitionKind::AmortizationAdjustment => {
                RecognitionEvent::AmortizationAdjustmentCreated(transaction_id)
            }
        };
        self.emit(event);

        tracing::info!(
            loan_id = %loan.id,
            transaction_id = %transaction_id,
            amount = %amount,
            kind = ?recognition_kind,
            "recognition transaction created"
        );

        Ok(Some(RecognitionOutcome {
            transaction_id,
            date: transaction_date,
            amount,
            kind: recognition_kind,
        }))
    }

    /// Best-effort event emission: failures are logged, never propagated.
    fn emit(&self, event: RecognitionEvent) {
        if let Err(error) = self.notifier.notify(event) {
            tracing::warn!(%error, ?event, "event notification failed");
        }
    }
}
