//! Shared types, context, and configuration for Accrue.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Amortization strategy tags
//! - The explicit processing context (business date)
//! - Configuration management

pub mod config;
pub mod context;
pub mod types;

pub use config::{AmortizationConfig, EngineConfig};
pub use context::ProcessingContext;
