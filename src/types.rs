//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

use crate::audit::AuditLogEntry;
use crate::config::SourceKind;

/// A single untyped cell as supplied by the upstream spreadsheet parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric value (amounts, account codes)
    Number(BigDecimal),
    /// Calendar date
    Date(NaiveDate),
    /// Free text
    Text(String),
    /// Missing / blank cell
    Empty,
}

impl CellValue {
    /// True if the cell holds no usable value
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        // NaN and infinities carry no usable amount, treat them as blanks
        BigDecimal::try_from(value)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Empty)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(BigDecimal::from(value))
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// One row of an uploaded table, keyed by original column name
pub type RawRow = HashMap<String, CellValue>;

/// An uploaded table: named columns plus untyped rows
///
/// Parsing the upload format (XLSX, CSV, ...) is an upstream concern;
/// the engine only sees the in-memory table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawTable {
    /// Create an empty table with the given column names
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row given as a column-name to value mapping
    pub fn push_row(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    /// Append a row given positionally, zipped against the column list
    pub fn push_values<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let row = self
            .columns
            .iter()
            .cloned()
            .zip(values.into_iter().map(Into::into))
            .collect();
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// A normalized row after cleaning
///
/// Every clean row has a valid account code and date; raw rows that fail
/// either coercion are skipped and counted, never errored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRow {
    /// 1-based position within its cleaned table
    pub row_id: u64,
    /// Transaction date
    pub date: NaiveDate,
    /// Chart-of-accounts code used as the join key
    pub account_code: i64,
    /// Account name, if a name column is configured and populated
    pub account_name: Option<String>,
    /// Free-text description, if configured
    pub description: Option<String>,
    /// Reference number (invoice number, voucher number, ...), if configured
    pub reference: Option<String>,
    /// Debit amount; missing or non-numeric cells become zero
    pub debit: BigDecimal,
    /// Credit amount; missing or non-numeric cells become zero
    pub credit: BigDecimal,
    /// Explicit net amount, present iff a net column is configured
    pub net: Option<BigDecimal>,
}

impl CleanRow {
    /// Net movement for this row: the explicit net column when configured,
    /// otherwise debit minus credit
    pub fn effective_net(&self) -> BigDecimal {
        match &self.net {
            Some(net) => net.clone(),
            None => &self.debit - &self.credit,
        }
    }
}

/// A cleaned table for one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanTable {
    /// Which source the rows came from
    pub source: SourceKind,
    /// Normalized rows, in input order
    pub rows: Vec<CleanRow>,
    /// Raw rows excluded for an unparsable account code or date
    pub skipped_rows: usize,
}

impl CleanTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Summed amounts and transaction count for one account on one side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountTotals {
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    pub net: BigDecimal,
    pub txn_count: u64,
}

impl AccountTotals {
    pub fn zero() -> Self {
        Self {
            debit: BigDecimal::from(0),
            credit: BigDecimal::from(0),
            net: BigDecimal::from(0),
            txn_count: 0,
        }
    }
}

impl Default for AccountTotals {
    fn default() -> Self {
        Self::zero()
    }
}

/// One aggregated group: a distinct account code within one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub account_code: i64,
    /// First non-empty account name observed in the group
    pub account_name: Option<String>,
    pub totals: AccountTotals,
}

/// Per-account aggregates for one source, keyed by account code
///
/// The `BTreeMap` keeps codes in ascending order, which makes the
/// downstream outer join and its output deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTable {
    pub source: SourceKind,
    pub accounts: BTreeMap<i64, AggregateRow>,
}

impl AggregateTable {
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, account_code: i64) -> Option<&AggregateRow> {
        self.accounts.get(&account_code)
    }
}

/// Classification of one reconciled account
///
/// The variants are mutually exclusive and exhaustive; assignment is a
/// priority-ordered decision, see the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconciliationStatus {
    /// Net variance is exactly zero
    Matched,
    /// Nonzero net variance within the configured tolerance
    WithinTolerance,
    /// Net variance beyond the configured tolerance
    Variance,
    /// Account present only in the manual journal
    UnmatchedManual,
    /// Account present only in the external export
    UnmatchedExternal,
}

impl ReconciliationStatus {
    /// Human-readable label for dashboards and exports
    pub fn label(&self) -> &'static str {
        match self {
            ReconciliationStatus::Matched => "Matched",
            ReconciliationStatus::WithinTolerance => "Within Tolerance",
            ReconciliationStatus::Variance => "Variance",
            ReconciliationStatus::UnmatchedManual => "Only in Manual",
            ReconciliationStatus::UnmatchedExternal => "Only in External",
        }
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outer-join result for one account code
///
/// At least one side is always present. Variances are `Some` exactly when
/// both sides are present; for one-sided rows they are left undefined
/// rather than defaulted to the present side's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub account_code: i64,
    /// Manual-side name, falling back to the external-side name
    pub account_name: Option<String>,
    /// Aggregated manual journal side, if the account appears there
    pub manual: Option<AccountTotals>,
    /// Aggregated external export side, if the account appears there
    pub external: Option<AccountTotals>,
    /// Manual debit minus external debit
    pub debit_variance: Option<BigDecimal>,
    /// Manual credit minus external credit
    pub credit_variance: Option<BigDecimal>,
    /// Manual net minus external net, the primary comparison value
    pub net_variance: Option<BigDecimal>,
    /// Absolute value of the net variance
    pub abs_net_variance: Option<BigDecimal>,
    pub status: ReconciliationStatus,
}

/// Summary statistics over one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Distinct account codes across both sources
    pub total_accounts: usize,
    pub matched_count: usize,
    pub tolerance_count: usize,
    pub variance_count: usize,
    pub unmatched_manual_count: usize,
    pub unmatched_external_count: usize,
    pub total_manual_debit: BigDecimal,
    pub total_manual_credit: BigDecimal,
    pub total_external_debit: BigDecimal,
    pub total_external_credit: BigDecimal,
    /// Total manual debit minus total external debit
    pub total_debit_variance: BigDecimal,
    /// Total manual credit minus total external credit
    pub total_credit_variance: BigDecimal,
    /// Sum of net variances over accounts present on both sides
    pub total_net_variance: BigDecimal,
    /// Sum of absolute net variances over accounts present on both sides
    pub total_abs_variance: BigDecimal,
    /// Account with the largest absolute net variance, if any pair differs
    pub largest_variance_account: Option<i64>,
    pub largest_variance_amount: BigDecimal,
}

impl ReconciliationSummary {
    /// Count of rows carrying the given status
    pub fn count_for(&self, status: ReconciliationStatus) -> usize {
        match status {
            ReconciliationStatus::Matched => self.matched_count,
            ReconciliationStatus::WithinTolerance => self.tolerance_count,
            ReconciliationStatus::Variance => self.variance_count,
            ReconciliationStatus::UnmatchedManual => self.unmatched_manual_count,
            ReconciliationStatus::UnmatchedExternal => self.unmatched_external_count,
        }
    }
}

/// One cleaned transaction tagged with its source, for drill-down views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetailRow {
    pub source: SourceKind,
    pub row_id: u64,
    pub date: NaiveDate,
    pub account_code: i64,
    pub account_name: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    pub net: BigDecimal,
}

/// Immutable bundle of outputs from one reconciliation run
///
/// Everything downstream consumers (dashboard, exporter, commentary) need
/// is here in plain serializable form; nothing requires re-running the
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Unique identifier for this run
    pub run_id: Uuid,
    /// When the run completed (UTC)
    pub completed_at: NaiveDateTime,
    pub summary: ReconciliationSummary,
    /// Reconciled accounts, sorted ascending by account code
    pub rows: Vec<ReconciledRow>,
    /// Append-only record of every engine action during the run
    pub audit_log: Vec<AuditLogEntry>,
}

/// Errors in caller-supplied configuration; fatal to the whole run
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required column '{column}' missing from {source} input")]
    MissingColumn { source: SourceKind, column: String },
    #[error("tolerance amount must be non-negative, got {0}")]
    NegativeTolerance(BigDecimal),
}

/// Errors while recording an audit entry; fatal only to that entry
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to serialize audit details: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that can occur in the reconciliation engine
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
