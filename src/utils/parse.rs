//! Cell coercion helpers used by the data cleaner
//!
//! All helpers are lenient: a value that cannot be coerced yields `None`
//! and the caller decides whether that means "skip the row" (account
//! codes, dates) or "treat as zero" (amounts).

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{NaiveDate, NaiveDateTime};
use std::str::FromStr;

use crate::types::CellValue;

/// Date formats accepted for textual date cells, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Datetime formats accepted for textual date cells carrying a time part
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Coerce a cell to a numeric amount
pub fn coerce_number(value: &CellValue) -> Option<BigDecimal> {
    match value {
        CellValue::Number(n) => Some(n.clone()),
        CellValue::Text(s) => BigDecimal::from_str(s.trim()).ok(),
        CellValue::Date(_) | CellValue::Empty => None,
    }
}

/// Coerce a cell to an account code
///
/// Accepts integer numbers, numbers with a zero fractional part (spreadsheet
/// exports often deliver codes as `1001.0`), and numeric text.
pub fn coerce_account_code(value: &CellValue) -> Option<i64> {
    let number = coerce_number(value)?;
    if number.is_integer() {
        number.to_i64()
    } else {
        None
    }
}

/// Coerce a cell to a calendar date
pub fn coerce_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Number(_) | CellValue::Empty => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// Coerce a cell to non-empty text
pub fn coerce_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Date(d) => Some(d.to_string()),
        CellValue::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_coerces_to_number() {
        assert_eq!(
            coerce_number(&CellValue::from(" 200.00 ")),
            Some(BigDecimal::from(200))
        );
        assert_eq!(coerce_number(&CellValue::from("abc")), None);
        assert_eq!(coerce_number(&CellValue::Empty), None);
    }

    #[test]
    fn account_code_accepts_integral_floats() {
        assert_eq!(coerce_account_code(&CellValue::from(1001.0)), Some(1001));
        assert_eq!(coerce_account_code(&CellValue::from("1001")), Some(1001));
        assert_eq!(coerce_account_code(&CellValue::from("1001.0")), Some(1001));
    }

    #[test]
    fn account_code_rejects_fractional_and_text() {
        assert_eq!(coerce_account_code(&CellValue::from(1001.5)), None);
        assert_eq!(coerce_account_code(&CellValue::from("cash")), None);
        assert_eq!(coerce_account_code(&CellValue::Empty), None);
    }

    #[test]
    fn date_formats_are_recognized() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(coerce_date(&CellValue::from("2024-03-15")), Some(expected));
        assert_eq!(coerce_date(&CellValue::from("2024/03/15")), Some(expected));
        assert_eq!(coerce_date(&CellValue::from("15/03/2024")), Some(expected));
        assert_eq!(
            coerce_date(&CellValue::from("2024-03-15 10:30:00")),
            Some(expected)
        );
        assert_eq!(coerce_date(&CellValue::from(expected)), Some(expected));
    }

    #[test]
    fn unparsable_dates_yield_none() {
        assert_eq!(coerce_date(&CellValue::from("not a date")), None);
        assert_eq!(coerce_date(&CellValue::from("")), None);
        assert_eq!(coerce_date(&CellValue::Empty), None);
    }

    #[test]
    fn text_coercion_trims_and_drops_blanks() {
        assert_eq!(
            coerce_text(&CellValue::from("  Cash  ")),
            Some("Cash".to_string())
        );
        assert_eq!(coerce_text(&CellValue::from("   ")), None);
        assert_eq!(coerce_text(&CellValue::Empty), None);
    }
}
