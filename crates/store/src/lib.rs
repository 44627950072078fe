//! In-memory persistence layer for the amortization engine.
//!
//! Provides reference implementations of the core's collaborator ports,
//! the per-loan run serialization required by the engine's
//! recompute-from-ledger design, and event notifiers.

pub mod lock;
pub mod memory;
pub mod notify;

pub use lock::{LoanRunGuard, LoanRunRegistry};
pub use memory::{InMemoryStore, RecognitionTransaction};
pub use notify::{RecordingNotifier, TracingNotifier};
