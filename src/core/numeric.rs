//! Numeric cell extraction.
//!
//! Rate columns come through as real numbers, as text with `%` or currency
//! decoration, or with thousands separators. Column names also drift between
//! report vintages, so callers pass an ordered list of accepted names.

use crate::models::{Cell, Row};

/// A value pulled out of a row, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extracted<'a> {
    pub value: f64,
    pub field: &'a str,
    /// Set when no candidate matched and the whole-row scan supplied the value.
    /// Such values may come from an unrelated column and must be reported.
    pub via_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no numeric value found in row")]
pub struct NotFound;

/// Strip everything but digits, `.` and a leading `-`, then read the longest
/// numeric prefix (`"1.2.3"` reads as `1.2`).
pub fn clean_number(raw: &str) -> Option<f64> {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() || c == '.' {
            cleaned.push(c);
        } else if c == '-' && cleaned.is_empty() {
            cleaned.push(c);
        }
    }
    parse_float_prefix(&cleaned)
}

/// Numeric reading of a single cell.
pub fn cell_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => clean_number(s),
        _ => None,
    }
}

/// Try the candidate columns in order, without the whole-row fallback.
pub fn extract_candidates<'a, S: AsRef<str>>(row: &'a Row, candidates: &[S]) -> Option<Extracted<'a>> {
    candidates.iter().find_map(|name| {
        let name = name.as_ref();
        row.fields()
            .find(|(k, v)| *k == name && !v.is_blank())
            .and_then(|(field, cell)| {
                cell_number(cell).map(|value| Extracted {
                    value,
                    field,
                    via_fallback: false,
                })
            })
    })
}

/// Candidate columns first; if none yields a number, scan every field in row
/// order and take the first that cleans to a number.
pub fn extract_number<'a, S: AsRef<str>>(row: &'a Row, candidates: &[S]) -> Result<Extracted<'a>, NotFound> {
    if let Some(found) = extract_candidates(row, candidates) {
        return Ok(found);
    }
    scan_row(row, &[] as &[&str]).ok_or(NotFound)
}

/// The whole-row scan on its own, passing over the `exclude`d field names.
pub fn scan_row<'a, S: AsRef<str>>(row: &'a Row, exclude: &[S]) -> Option<Extracted<'a>> {
    row.fields()
        .filter(|(field, _)| !exclude.iter().any(|e| e.as_ref() == *field))
        .find_map(|(field, cell)| {
            cell_number(cell).map(|value| Extracted {
                value,
                field,
                via_fallback: true,
            })
        })
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        let mut frac_digits = 0;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            frac_digits += 1;
        }
        if frac_digits > 0 || digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }
    if digits == 0 {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_number_strips_decoration() {
        assert_eq!(clean_number("7.25%"), Some(7.25));
        assert_eq!(clean_number("KES 1,234.50"), Some(1234.5));
        assert_eq!(clean_number("-0.75"), Some(-0.75));
        assert_eq!(clean_number(" -1,000 "), Some(-1000.0));
        assert_eq!(clean_number(".5"), Some(0.5));
        assert_eq!(clean_number("12."), Some(12.0));
        assert_eq!(clean_number("1.2.3"), Some(1.2));
    }

    #[test]
    fn test_clean_number_rejects_non_numeric() {
        assert_eq!(clean_number(""), None);
        assert_eq!(clean_number("n/a"), None);
        assert_eq!(clean_number("-"), None);
        assert_eq!(clean_number("."), None);
    }

    #[test]
    fn test_minus_only_kept_when_leading() {
        assert_eq!(clean_number("12-3"), Some(123.0));
    }

    #[test]
    fn test_candidates_tried_in_order() {
        let row = Row::new()
            .with("Weighted Avg Rate", "9.1")
            .with("Weighted Average Rate", "8.9");
        let got = extract_number(&row, &["Weighted Average Rate", "Weighted Avg Rate"]).unwrap();
        assert_eq!(got.value, 8.9);
        assert_eq!(got.field, "Weighted Average Rate");
        assert!(!got.via_fallback);
    }

    #[test]
    fn test_unparseable_candidate_moves_to_next() {
        let row = Row::new().with("Rate", "n/a").with("CBR", 7.0);
        let got = extract_number(&row, &["Rate", "CBR"]).unwrap();
        assert_eq!(got.value, 7.0);
        assert_eq!(got.field, "CBR");
    }

    #[test]
    fn test_fallback_scans_row_in_order() {
        let row = Row::new()
            .with("Date", Cell::Date(chrono::NaiveDate::from_ymd_opt(2021, 1, 4).unwrap()))
            .with("Note", "none")
            .with("Value", "6.5%")
            .with("Other", 1.0);
        let got = extract_number(&row, &["Rate"]).unwrap();
        assert_eq!(got.value, 6.5);
        assert_eq!(got.field, "Value");
        assert!(got.via_fallback);
    }

    #[test]
    fn test_scan_row_skips_excluded_fields() {
        let row = Row::new().with("Date", "2021-03-15").with("Rate %", "7.00%");
        let got = scan_row(&row, &["Date"]).unwrap();
        assert_eq!(got.field, "Rate %");
        assert_eq!(got.value, 7.0);
        assert!(scan_row(&row, &["Date", "Rate %"]).is_none());
    }

    #[test]
    fn test_not_found_when_nothing_numeric() {
        let row = Row::new().with("Date", "").with("Note", "closed");
        assert_eq!(extract_number(&row, &["Rate"]), Err(NotFound));
        assert_eq!(extract_candidates(&row, &["Rate"]), None);
    }

    #[test]
    fn test_non_finite_numbers_ignored() {
        let row = Row::new().with("Rate", f64::NAN);
        assert_eq!(extract_candidates(&row, &["Rate"]), None);
    }
}
