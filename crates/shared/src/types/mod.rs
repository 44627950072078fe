//! Common types used across the workspace.

pub mod id;
pub mod money;
pub mod strategy;

pub use id::*;
pub use money::{Currency, Money};
pub use strategy::AmortizationStrategy;
