//! Data cleaning: raw uploaded tables into canonical clean tables

use bigdecimal::BigDecimal;

use crate::config::{ColumnMapping, SourceKind};
use crate::types::{CellValue, CleanRow, CleanTable, ConfigError, RawRow, RawTable};
use crate::utils::parse;

/// Normalize a raw table into a [`CleanTable`] using the source's mapping
///
/// Fails with [`ConfigError::MissingColumn`] when a required mapped column
/// is absent from the table. Per-row problems never fail the call: rows
/// whose account code or date cannot be coerced are dropped and counted in
/// [`CleanTable::skipped_rows`]; non-numeric amount cells become zero.
pub fn clean_table(
    table: &RawTable,
    mapping: &ColumnMapping,
    source: SourceKind,
) -> Result<CleanTable, ConfigError> {
    for column in mapping.required_columns() {
        if !table.has_column(column) {
            return Err(ConfigError::MissingColumn {
                source,
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::with_capacity(table.len());
    let mut skipped_rows = 0;

    for raw in table.rows() {
        let Some(account_code) = cell(raw, &mapping.account_code)
            .and_then(parse::coerce_account_code)
        else {
            skipped_rows += 1;
            continue;
        };
        let Some(date) = cell(raw, &mapping.date).and_then(parse::coerce_date) else {
            skipped_rows += 1;
            continue;
        };

        let debit = amount(raw, &mapping.debit);
        let credit = amount(raw, &mapping.credit);
        let net = mapping.net.as_ref().map(|column| amount(raw, column));

        rows.push(CleanRow {
            row_id: rows.len() as u64 + 1,
            date,
            account_code,
            account_name: optional_text(raw, mapping.account_name.as_deref()),
            description: optional_text(raw, mapping.description.as_deref()),
            reference: optional_text(raw, mapping.reference.as_deref()),
            debit,
            credit,
            net,
        });
    }

    Ok(CleanTable {
        source,
        rows,
        skipped_rows,
    })
}

fn cell<'a>(row: &'a RawRow, column: &str) -> Option<&'a CellValue> {
    row.get(column)
}

fn amount(row: &RawRow, column: &str) -> BigDecimal {
    cell(row, column)
        .and_then(parse::coerce_number)
        .unwrap_or_else(|| BigDecimal::from(0))
}

fn optional_text(row: &RawRow, column: Option<&str>) -> Option<String> {
    column.and_then(|c| cell(row, c)).and_then(parse::coerce_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use chrono::NaiveDate;

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            date: "Date".into(),
            account_code: "Account Code".into(),
            debit: "Debit".into(),
            credit: "Credit".into(),
            net: None,
            account_name: Some("Account".into()),
            description: None,
            reference: None,
        }
    }

    fn table() -> RawTable {
        RawTable::new(["Date", "Account Code", "Account", "Debit", "Credit"])
    }

    #[test]
    fn valid_rows_are_normalized() {
        let mut raw = table();
        raw.push_values([
            CellValue::from("2024-01-05"),
            CellValue::from(1001.0),
            CellValue::from("Cash"),
            CellValue::from("500.00"),
            CellValue::Empty,
        ]);

        let clean = clean_table(&raw, &mapping(), SourceKind::Manual).unwrap();
        assert_eq!(clean.len(), 1);
        assert_eq!(clean.skipped_rows, 0);

        let row = &clean.rows[0];
        assert_eq!(row.account_code, 1001);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(row.account_name.as_deref(), Some("Cash"));
        assert_eq!(row.debit, BigDecimal::from(500));
        assert_eq!(row.credit, BigDecimal::from(0));
        assert_eq!(row.net, None);
    }

    #[test]
    fn unparsable_code_or_date_skips_the_row() {
        let mut raw = table();
        raw.push_values([
            CellValue::from("2024-01-05"),
            CellValue::from("not a code"),
            CellValue::Empty,
            CellValue::from(100.0),
            CellValue::Empty,
        ]);
        raw.push_values([
            CellValue::from("someday"),
            CellValue::from(1001),
            CellValue::Empty,
            CellValue::from(100.0),
            CellValue::Empty,
        ]);
        raw.push_values([
            CellValue::from("2024-01-06"),
            CellValue::from(1001),
            CellValue::Empty,
            CellValue::from(100.0),
            CellValue::Empty,
        ]);

        let clean = clean_table(&raw, &mapping(), SourceKind::Manual).unwrap();
        assert_eq!(clean.len(), 1);
        assert_eq!(clean.skipped_rows, 2);
        // clean + skipped covers every raw input row
        assert_eq!(clean.len() + clean.skipped_rows, raw.len());
    }

    #[test]
    fn row_ids_number_only_kept_rows() {
        let mut raw = table();
        raw.push_values([
            CellValue::from("bad date"),
            CellValue::from(1001),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
        ]);
        raw.push_values([
            CellValue::from("2024-01-06"),
            CellValue::from(1001),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
        ]);
        raw.push_values([
            CellValue::from("2024-01-07"),
            CellValue::from(2001),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
        ]);

        let clean = clean_table(&raw, &mapping(), SourceKind::External).unwrap();
        let ids: Vec<_> = clean.rows.iter().map(|r| r.row_id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn missing_required_column_is_a_config_error() {
        let raw = RawTable::new(["Date", "Debit", "Credit"]);
        let err = clean_table(&raw, &mapping(), SourceKind::External).unwrap_err();
        match err {
            ConfigError::MissingColumn { source, column } => {
                assert_eq!(source, SourceKind::External);
                assert_eq!(column, "Account Code");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn configured_net_column_is_required_and_captured() {
        let with_net = ColumnMapping {
            net: Some("Net".into()),
            ..mapping()
        };

        let missing = table();
        assert!(clean_table(&missing, &with_net, SourceKind::Manual).is_err());

        let mut raw = RawTable::new(["Date", "Account Code", "Account", "Debit", "Credit", "Net"]);
        raw.push_values([
            CellValue::from("2024-01-05"),
            CellValue::from(1001),
            CellValue::Empty,
            CellValue::from(300.0),
            CellValue::from(100.0),
            CellValue::from(250.0),
        ]);
        let clean = clean_table(&raw, &with_net, SourceKind::Manual).unwrap();
        assert_eq!(clean.rows[0].net, Some(BigDecimal::from(250)));
    }

    #[test]
    fn missing_amount_cells_become_zero() {
        let mut raw = table();
        let mut row = RawRow::new();
        row.insert("Date".into(), CellValue::from("2024-01-05"));
        row.insert("Account Code".into(), CellValue::from(1001));
        // Debit and Credit cells entirely absent from the row
        raw.push_row(row);

        let clean = clean_table(&raw, &mapping(), SourceKind::Manual).unwrap();
        assert_eq!(clean.rows[0].debit, BigDecimal::from(0));
        assert_eq!(clean.rows[0].credit, BigDecimal::from(0));
    }
}
