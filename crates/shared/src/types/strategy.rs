//! Amortization strategy tags.
//!
//! The strategy is an enumerable policy, not hard-coded behavior: the
//! calculator dispatches on it in a single `match`, so new strategies can
//! be added without touching callers.

use serde::{Deserialize, Serialize};

/// How a deferred balance is recognized into income over time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationStrategy {
    /// Straight-line by elapsed days over total days to maturity.
    #[default]
    StraightLine,
}

impl std::fmt::Display for AmortizationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StraightLine => write!(f, "straight_line"),
        }
    }
}
