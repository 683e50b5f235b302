//! # Reconciliation Core
//!
//! An account-level reconciliation engine that matches a manually
//! maintained accounting journal against an external accounting system's
//! export, aggregates amounts per chart-of-accounts code, and classifies
//! every account by variance magnitude.
//!
//! ## Features
//!
//! - **Data cleaning**: column mapping, numeric and date coercion, and
//!   skip-and-count handling of unusable rows
//! - **Aggregation**: per-account debit/credit/net sums and transaction counts
//! - **Outer-join matching**: every account from either source, classified as
//!   matched, within tolerance, variance, or unmatched per side
//! - **Audit log**: append-only record of each engine action with a
//!   tamper-evident checksum
//! - **Plain results**: every output is serde-serializable so dashboards and
//!   exporters can render it without re-running any logic
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{
//!     CellValue, RawTable, ReconciliationConfig, ReconciliationEngine,
//!     ReconciliationStatus,
//! };
//!
//! let mut manual = RawTable::new(["Date", "Account Code", "Account", "Debit", "Credit"]);
//! manual.push_values([
//!     CellValue::from("2024-01-05"),
//!     CellValue::from(1001),
//!     CellValue::from("Cash"),
//!     CellValue::from(500.0),
//!     CellValue::from(0.0),
//! ]);
//!
//! let mut external = RawTable::new(["Date", "Account Code", "Account", "Debit", "Credit"]);
//! external.push_values([
//!     CellValue::from("2024-01-05"),
//!     CellValue::from(1001),
//!     CellValue::from("Cash"),
//!     CellValue::from(500.0),
//!     CellValue::from(0.0),
//! ]);
//!
//! let engine = ReconciliationEngine::new(ReconciliationConfig::default()).unwrap();
//! let result = engine.run(&manual, &external).unwrap();
//!
//! assert_eq!(result.rows[0].status, ReconciliationStatus::Matched);
//! assert_eq!(result.summary.matched_count, 1);
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use audit::{AuditLog, AuditLogEntry};
pub use config::{ColumnMapping, ReconciliationConfig, SourceKind};
pub use engine::ReconciliationEngine;
pub use types::*;
