//! Caller-supplied configuration: column mappings and tolerance policy

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ConfigError;

/// Which uploaded table a row or mapping belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// The manually maintained accounting journal
    Manual,
    /// The export from the external accounting system
    External,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Manual => f.write_str("MANUAL"),
            SourceKind::External => f.write_str("EXTERNAL"),
        }
    }
}

impl std::error::Error for SourceKind {}

/// Column names for one source, mapping its headers to canonical fields
///
/// `date`, `account_code`, `debit`, and `credit` must exist in the input
/// table. `net` is optional; when configured its column is also required
/// and its sum replaces debit-minus-credit as the net amount. The
/// remaining columns are read best-effort and never cause an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: String,
    pub account_code: String,
    pub debit: String,
    pub credit: String,
    pub net: Option<String>,
    pub account_name: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl ColumnMapping {
    /// Columns that must be present in the input table
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.date.as_str(),
            self.account_code.as_str(),
            self.debit.as_str(),
            self.credit.as_str(),
        ];
        if let Some(net) = &self.net {
            columns.push(net.as_str());
        }
        columns
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            account_code: "Account Code".to_string(),
            debit: "Debit".to_string(),
            credit: "Credit".to_string(),
            net: None,
            account_name: Some("Account".to_string()),
            description: Some("Description".to_string()),
            reference: None,
        }
    }
}

/// Configuration for one reconciliation run
///
/// Owned by the caller; the engine never mutates or re-derives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Column mapping for the manual journal
    pub manual: ColumnMapping,
    /// Column mapping for the external export
    pub external: ColumnMapping,
    /// Absolute net-variance threshold below which a nonzero variance is
    /// still acceptable; must be non-negative
    pub tolerance_amount: BigDecimal,
}

impl ReconciliationConfig {
    /// Default tolerance: one currency unit
    pub fn default_tolerance() -> BigDecimal {
        BigDecimal::from(1)
    }

    /// The mapping for the given source
    pub fn mapping(&self, source: SourceKind) -> &ColumnMapping {
        match source {
            SourceKind::Manual => &self.manual,
            SourceKind::External => &self.external,
        }
    }

    /// Check run-level constraints before any data is touched
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_amount < BigDecimal::from(0) {
            return Err(ConfigError::NegativeTolerance(
                self.tolerance_amount.clone(),
            ));
        }
        Ok(())
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            manual: ColumnMapping::default(),
            external: ColumnMapping::default(),
            tolerance_amount: Self::default_tolerance(),
        }
    }
}
