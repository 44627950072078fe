//! Core amortization engine for Accrue.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. It recognizes capitalized-income and buy-down-fee balances
//! into loan income over time, tracks every partial recognition as an
//! auditable allocation entry, and reconciles that running recognition
//! against adjustments, reversals, charge-off, and undo-charge-off events.
//!
//! # Modules
//!
//! - `amortization` - Deferred-balance recognition and reconciliation

pub mod amortization;
