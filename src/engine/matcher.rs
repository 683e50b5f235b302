//! Outer-join matching, variance computation, and status classification

use bigdecimal::BigDecimal;
use std::collections::BTreeSet;

use crate::types::{
    AggregateTable, CleanTable, ConfigError, ReconciledRow, ReconciliationStatus,
    ReconciliationSummary, TransactionDetailRow,
};

/// Full outer join of the two aggregate tables on account code
///
/// Every code present in either table yields exactly one [`ReconciledRow`];
/// output is sorted ascending by code. Status assignment is an ordered
/// decision, first matching rule wins:
///
/// 1. side absent -> `UnmatchedManual` / `UnmatchedExternal`
/// 2. net variance == 0 -> `Matched`
/// 3. |net variance| <= tolerance -> `WithinTolerance`
/// 4. otherwise -> `Variance`
pub fn reconcile_accounts(
    manual: &AggregateTable,
    external: &AggregateTable,
    tolerance_amount: &BigDecimal,
) -> Result<(Vec<ReconciledRow>, ReconciliationSummary), ConfigError> {
    if *tolerance_amount < BigDecimal::from(0) {
        return Err(ConfigError::NegativeTolerance(tolerance_amount.clone()));
    }

    let codes: BTreeSet<i64> = manual
        .accounts
        .keys()
        .chain(external.accounts.keys())
        .copied()
        .collect();

    let zero = BigDecimal::from(0);
    let mut rows = Vec::with_capacity(codes.len());
    let mut summary = empty_summary();

    for code in codes {
        let manual_side = manual.accounts.get(&code);
        let external_side = external.accounts.get(&code);

        let account_name = manual_side
            .and_then(|r| r.account_name.clone())
            .or_else(|| external_side.and_then(|r| r.account_name.clone()));

        if let Some(m) = manual_side {
            summary.total_manual_debit += &m.totals.debit;
            summary.total_manual_credit += &m.totals.credit;
        }
        if let Some(e) = external_side {
            summary.total_external_debit += &e.totals.debit;
            summary.total_external_credit += &e.totals.credit;
        }

        let row = match (manual_side, external_side) {
            (Some(m), Some(e)) => {
                let net_variance = &m.totals.net - &e.totals.net;
                let abs_net_variance = net_variance.abs();

                let status = if net_variance == zero {
                    ReconciliationStatus::Matched
                } else if abs_net_variance <= *tolerance_amount {
                    ReconciliationStatus::WithinTolerance
                } else {
                    ReconciliationStatus::Variance
                };

                summary.total_net_variance += &net_variance;
                summary.total_abs_variance += &abs_net_variance;
                if abs_net_variance > summary.largest_variance_amount {
                    summary.largest_variance_amount = abs_net_variance.clone();
                    summary.largest_variance_account = Some(code);
                }

                ReconciledRow {
                    account_code: code,
                    account_name,
                    manual: Some(m.totals.clone()),
                    external: Some(e.totals.clone()),
                    debit_variance: Some(&m.totals.debit - &e.totals.debit),
                    credit_variance: Some(&m.totals.credit - &e.totals.credit),
                    net_variance: Some(net_variance),
                    abs_net_variance: Some(abs_net_variance),
                    status,
                }
            }
            (Some(m), None) => ReconciledRow {
                account_code: code,
                account_name,
                manual: Some(m.totals.clone()),
                external: None,
                debit_variance: None,
                credit_variance: None,
                net_variance: None,
                abs_net_variance: None,
                status: ReconciliationStatus::UnmatchedManual,
            },
            (None, Some(e)) => ReconciledRow {
                account_code: code,
                account_name,
                manual: None,
                external: Some(e.totals.clone()),
                debit_variance: None,
                credit_variance: None,
                net_variance: None,
                abs_net_variance: None,
                status: ReconciliationStatus::UnmatchedExternal,
            },
            // codes came from the union of both key sets
            (None, None) => continue,
        };

        match row.status {
            ReconciliationStatus::Matched => summary.matched_count += 1,
            ReconciliationStatus::WithinTolerance => summary.tolerance_count += 1,
            ReconciliationStatus::Variance => summary.variance_count += 1,
            ReconciliationStatus::UnmatchedManual => summary.unmatched_manual_count += 1,
            ReconciliationStatus::UnmatchedExternal => summary.unmatched_external_count += 1,
        }
        rows.push(row);
    }

    summary.total_accounts = rows.len();
    summary.total_debit_variance =
        &summary.total_manual_debit - &summary.total_external_debit;
    summary.total_credit_variance =
        &summary.total_manual_credit - &summary.total_external_credit;

    Ok((rows, summary))
}

fn empty_summary() -> ReconciliationSummary {
    let zero = BigDecimal::from(0);
    ReconciliationSummary {
        total_accounts: 0,
        matched_count: 0,
        tolerance_count: 0,
        variance_count: 0,
        unmatched_manual_count: 0,
        unmatched_external_count: 0,
        total_manual_debit: zero.clone(),
        total_manual_credit: zero.clone(),
        total_external_debit: zero.clone(),
        total_external_credit: zero.clone(),
        total_debit_variance: zero.clone(),
        total_credit_variance: zero.clone(),
        total_net_variance: zero.clone(),
        total_abs_variance: zero.clone(),
        largest_variance_account: None,
        largest_variance_amount: zero,
    }
}

/// Combined transaction listing for drill-down views
///
/// Merges both cleaned tables, optionally filtered to one account, sorted
/// by account code, date, then net movement.
pub fn transaction_detail(
    manual: &CleanTable,
    external: &CleanTable,
    account_filter: Option<i64>,
) -> Vec<TransactionDetailRow> {
    let mut rows: Vec<TransactionDetailRow> = manual
        .rows
        .iter()
        .map(|r| (manual.source, r))
        .chain(external.rows.iter().map(|r| (external.source, r)))
        .filter(|(_, r)| account_filter.is_none_or(|code| r.account_code == code))
        .map(|(source, r)| TransactionDetailRow {
            source,
            row_id: r.row_id,
            date: r.date,
            account_code: r.account_code,
            account_name: r.account_name.clone(),
            description: r.description.clone(),
            reference: r.reference.clone(),
            debit: r.debit.clone(),
            credit: r.credit.clone(),
            net: r.effective_net(),
        })
        .collect();

    rows.sort_by(|a, b| {
        (a.account_code, a.date, &a.net).cmp(&(b.account_code, b.date, &b.net))
    });
    rows
}
