//! Event notifier implementations.

use std::sync::{Mutex, PoisonError};

use accrue_core::amortization::{AmortizationError, EventNotifier, RecognitionEvent};

/// Notifier that logs each event through `tracing`. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl EventNotifier for TracingNotifier {
    fn notify(&self, event: RecognitionEvent) -> Result<(), AmortizationError> {
        tracing::info!(?event, transaction_id = %event.transaction_id(), "recognition event");
        Ok(())
    }
}

impl EventNotifier for &TracingNotifier {
    fn notify(&self, event: RecognitionEvent) -> Result<(), AmortizationError> {
        TracingNotifier.notify(event)
    }
}

/// Notifier that records every event, for assertions in tests and audits.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<RecognitionEvent>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<RecognitionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventNotifier for &RecordingNotifier {
    fn notify(&self, event: RecognitionEvent) -> Result<(), AmortizationError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}
