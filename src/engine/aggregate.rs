//! Per-account aggregation of cleaned rows

use std::collections::BTreeMap;

use crate::types::{AccountTotals, AggregateRow, AggregateTable, CleanTable};

/// Group a cleaned table by account code, summing amounts per group
///
/// Net is the sum of the explicit net column when one is configured,
/// otherwise summed debit minus summed credit. The first non-empty account
/// name seen in a group is kept for display.
pub fn aggregate_table(table: &CleanTable) -> AggregateTable {
    let mut accounts: BTreeMap<i64, AggregateRow> = BTreeMap::new();

    for row in &table.rows {
        let group = accounts.entry(row.account_code).or_insert_with(|| AggregateRow {
            account_code: row.account_code,
            account_name: None,
            totals: AccountTotals::zero(),
        });

        if group.account_name.is_none() {
            group.account_name = row.account_name.clone();
        }
        group.totals.debit += &row.debit;
        group.totals.credit += &row.credit;
        group.totals.net += row.effective_net();
        group.totals.txn_count += 1;
    }

    AggregateTable {
        source: table.source,
        accounts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;
    use crate::types::CleanRow;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn row(account_code: i64, debit: i64, credit: i64, net: Option<i64>) -> CleanRow {
        CleanRow {
            row_id: 0,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            account_code,
            account_name: None,
            description: None,
            reference: None,
            debit: BigDecimal::from(debit),
            credit: BigDecimal::from(credit),
            net: net.map(BigDecimal::from),
        }
    }

    fn clean(rows: Vec<CleanRow>) -> CleanTable {
        CleanTable {
            source: SourceKind::Manual,
            rows,
            skipped_rows: 0,
        }
    }

    #[test]
    fn sums_and_counts_per_account() {
        let table = clean(vec![
            row(1001, 1000, 0, None),
            row(1001, 500, 0, None),
            row(1001, 200, 0, None),
            row(2001, 0, 3000, None),
        ]);

        let agg = aggregate_table(&table);
        assert_eq!(agg.len(), 2);

        let a = agg.get(1001).unwrap();
        assert_eq!(a.totals.debit, BigDecimal::from(1700));
        assert_eq!(a.totals.credit, BigDecimal::from(0));
        assert_eq!(a.totals.net, BigDecimal::from(1700));
        assert_eq!(a.totals.txn_count, 3);

        let b = agg.get(2001).unwrap();
        assert_eq!(b.totals.net, BigDecimal::from(-3000));
        assert_eq!(b.totals.txn_count, 1);
    }

    #[test]
    fn explicit_net_column_overrides_debit_minus_credit() {
        let table = clean(vec![row(1001, 300, 100, Some(250)), row(1001, 0, 0, Some(50))]);

        let agg = aggregate_table(&table);
        assert_eq!(agg.get(1001).unwrap().totals.net, BigDecimal::from(300));
    }

    #[test]
    fn keeps_first_observed_account_name() {
        let mut first = row(1001, 0, 0, None);
        first.account_name = Some("Cash".into());
        let mut second = row(1001, 0, 0, None);
        second.account_name = Some("Cash (renamed)".into());

        let agg = aggregate_table(&clean(vec![first, second]));
        assert_eq!(
            agg.get(1001).unwrap().account_name.as_deref(),
            Some("Cash")
        );
    }

    #[test]
    fn name_from_later_row_fills_gap() {
        let first = row(1001, 0, 0, None);
        let mut second = row(1001, 0, 0, None);
        second.account_name = Some("Receivable".into());

        let agg = aggregate_table(&clean(vec![first, second]));
        assert_eq!(
            agg.get(1001).unwrap().account_name.as_deref(),
            Some("Receivable")
        );
    }

    #[test]
    fn empty_table_aggregates_to_empty() {
        let agg = aggregate_table(&clean(Vec::new()));
        assert!(agg.is_empty());
    }

    #[test]
    fn keys_iterate_in_ascending_order() {
        let table = clean(vec![row(3001, 0, 0, None), row(1001, 0, 0, None), row(2001, 0, 0, None)]);
        let agg = aggregate_table(&table);
        let codes: Vec<_> = agg.accounts.keys().copied().collect();
        assert_eq!(codes, [1001, 2001, 3001]);
    }
}
