//! Main engine orchestrating cleaning, aggregation, and matching

use serde_json::json;
use uuid::Uuid;

use crate::audit::{AuditLog, AuditLogEntry};
use crate::config::{ReconciliationConfig, SourceKind};
use crate::engine::{aggregate, cleaner, matcher};
use crate::types::{
    AggregateTable, CleanTable, RawTable, ReconcileResult, ReconciledRow, ReconciliationResult,
    ReconciliationSummary, TransactionDetailRow,
};

/// Actor recorded on audit entries the engine writes itself
const ENGINE_ACTOR: &str = "system";

/// One reconciliation run over a pair of uploaded tables
///
/// The engine is stateless apart from its own audit log: it never mutates
/// caller-supplied tables and holds no state shared between runs. Create
/// one instance per run; [`ReconciliationEngine::run`] consumes it and
/// freezes the audit log into the result.
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
    audit: AuditLog,
}

impl ReconciliationEngine {
    /// Create an engine for one run, validating the configuration up front
    pub fn new(config: ReconciliationConfig) -> ReconcileResult<Self> {
        config.validate()?;
        let mut audit = AuditLog::new(ENGINE_ACTOR);
        let _ = audit.record(
            "ENGINE_INIT",
            json!({ "tolerance_amount": config.tolerance_amount.to_string() }),
        );
        Ok(Self { config, audit })
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Audit entries recorded so far
    pub fn audit_log(&self) -> &[AuditLogEntry] {
        self.audit.entries()
    }

    /// Normalize one uploaded table using the source's column mapping
    ///
    /// A missing required column aborts the run; rows with unusable account
    /// codes or dates are skipped and counted, never errored.
    pub fn clean(&mut self, table: &RawTable, source: SourceKind) -> ReconcileResult<CleanTable> {
        let mapping = self.config.mapping(source);
        let clean = cleaner::clean_table(table, mapping, source)?;
        let _ = self.audit.record(
            format!("CLEAN_{source}").as_str(),
            json!({
                "input_rows": table.len(),
                "output_rows": clean.len(),
                "skipped_rows": clean.skipped_rows,
            }),
        );
        Ok(clean)
    }

    /// Group a cleaned table by account code
    pub fn aggregate(&self, table: &CleanTable) -> AggregateTable {
        aggregate::aggregate_table(table)
    }

    /// Outer-join the two aggregate tables and classify every account
    pub fn reconcile(
        &mut self,
        manual: &AggregateTable,
        external: &AggregateTable,
    ) -> ReconcileResult<(Vec<ReconciledRow>, ReconciliationSummary)> {
        let (rows, summary) =
            matcher::reconcile_accounts(manual, external, &self.config.tolerance_amount)?;
        let _ = self.audit.record(
            "RECONCILE",
            json!({
                "manual_accounts": manual.len(),
                "external_accounts": external.len(),
                "total_accounts": summary.total_accounts,
                "matched": summary.matched_count,
                "within_tolerance": summary.tolerance_count,
                "variance": summary.variance_count,
                "unmatched_manual": summary.unmatched_manual_count,
                "unmatched_external": summary.unmatched_external_count,
                "total_abs_variance": summary.total_abs_variance.to_string(),
            }),
        );
        Ok((rows, summary))
    }

    /// Combined transaction listing across both cleaned tables, optionally
    /// filtered to one account code
    pub fn transaction_detail(
        &mut self,
        manual: &CleanTable,
        external: &CleanTable,
        account_filter: Option<i64>,
    ) -> Vec<TransactionDetailRow> {
        let rows = matcher::transaction_detail(manual, external, account_filter);
        let _ = self.audit.record(
            "TXN_DETAIL",
            json!({
                "account_filter": account_filter,
                "total_transactions": rows.len(),
            }),
        );
        rows
    }

    /// Run the full pipeline: clean both sources, aggregate, reconcile
    ///
    /// Consumes the engine; the returned result owns the audit log and no
    /// further entries can be appended to it.
    pub fn run(
        mut self,
        manual_raw: &RawTable,
        external_raw: &RawTable,
    ) -> ReconcileResult<ReconciliationResult> {
        let manual_clean = self.clean(manual_raw, SourceKind::Manual)?;
        let external_clean = self.clean(external_raw, SourceKind::External)?;

        let manual_agg = self.aggregate(&manual_clean);
        let external_agg = self.aggregate(&external_clean);

        let (rows, summary) = self.reconcile(&manual_agg, &external_agg)?;

        Ok(ReconciliationResult {
            run_id: Uuid::new_v4(),
            completed_at: chrono::Utc::now().naive_utc(),
            summary,
            rows,
            audit_log: self.audit.into_entries(),
        })
    }
}
