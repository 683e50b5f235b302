//! Reconciliation engine: cleaning, aggregation, and matching

pub mod aggregate;
pub mod cleaner;
pub mod core;
pub mod matcher;

pub use core::ReconciliationEngine;
