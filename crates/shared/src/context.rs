//! Explicit processing context.
//!
//! The engine never reads ambient/global state: the current business date
//! is handed to every entry point through this context object.

use chrono::NaiveDate;

/// Per-run context passed into every processing entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingContext {
    /// The current business date for this run.
    pub business_date: NaiveDate,
}

impl ProcessingContext {
    /// Creates a context for the given business date.
    #[must_use]
    pub const fn new(business_date: NaiveDate) -> Self {
        Self { business_date }
    }
}
