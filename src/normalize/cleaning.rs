//! Numeric column cleaning
//!
//! Spreadsheet cells carry unit suffixes ("1234 Mbps"), thousands
//! separators ("12,345") and stray annotations ("N/A", "pending"). Cleaning
//! strips the configured patterns and coerces what is left; anything that
//! still isn't a number becomes [`CellValue::Missing`].

use crate::error::{Diagnostic, DiagnosticKind};
use crate::schema::StripPattern;
use crate::types::{CellValue, Table};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("number pattern is valid")
});

/// How many failing values are quoted in a coercion diagnostic.
const MAX_QUOTED_FAILURES: usize = 3;

/// Texts that mean "empty" rather than "bad value".
fn is_blank(text: &str) -> bool {
    text.is_empty() || text.eq_ignore_ascii_case("nan") || text.eq_ignore_ascii_case("none")
}

/// Coerce one cell. `Err` carries the offending text.
pub fn coerce_cell(cell: &CellValue, strip: &[StripPattern]) -> Result<CellValue, String> {
    let text = match cell {
        CellValue::Number(n) if n.is_nan() => return Ok(CellValue::Missing),
        CellValue::Number(n) => return Ok(CellValue::Number(*n)),
        CellValue::Missing => return Ok(CellValue::Missing),
        CellValue::Bool(b) => return Err(b.to_string()),
        CellValue::Text(s) => s,
    };

    let mut current = text.clone();
    for pattern in strip {
        current = pattern.strip(&current).into_owned();
    }
    let current = current.trim();

    if is_blank(current) {
        return Ok(CellValue::Missing);
    }
    if !NUMBER_RE.is_match(current) {
        return Err(text.clone());
    }
    current
        .parse::<f64>()
        .map(CellValue::Number)
        .map_err(|_| text.clone())
}

/// Clean the named column in place.
///
/// Absent column: no-op plus a `ColumnMissing` diagnostic. Cells that fail
/// coercion become missing and are summarized in a single
/// `ValueCoercionFailure` diagnostic. Running this twice gives the same
/// column as running it once.
pub fn clean_numeric_column(
    table: &mut Table,
    header: &str,
    strip: &[StripPattern],
) -> Vec<Diagnostic> {
    let Some(column) = table.column_mut(header) else {
        return vec![Diagnostic::column_missing(header)];
    };

    let mut failures: Vec<String> = Vec::new();
    for cell in &mut column.values {
        *cell = match coerce_cell(cell, strip) {
            Ok(value) => value,
            Err(original) => {
                failures.push(original);
                CellValue::Missing
            }
        };
    }

    if failures.is_empty() {
        return Vec::new();
    }

    let quoted = failures
        .iter()
        .take(MAX_QUOTED_FAILURES)
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ");
    let more = if failures.len() > MAX_QUOTED_FAILURES {
        ", ..."
    } else {
        ""
    };
    vec![Diagnostic::new(
        DiagnosticKind::ValueCoercionFailure,
        format!(
            "Column '{}': {} value(s) could not be converted to numbers and were marked missing ({}{})",
            header,
            failures.len(),
            quoted,
            more
        ),
    )
    .with_column(header)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use pretty_assertions::assert_eq;

    fn mbps() -> Vec<StripPattern> {
        vec![StripPattern::literal(" Mbps")]
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn single_column(values: Vec<CellValue>) -> Table {
        Table::from_columns(vec![Column::new("BW", values)])
    }

    #[test]
    fn test_unit_suffix_stripped() {
        assert_eq!(coerce_cell(&text("1234 Mbps"), &mbps()), Ok(CellValue::Number(1234.0)));
        assert_eq!(coerce_cell(&text(" 2.5 Mbps "), &mbps()), Ok(CellValue::Number(2.5)));
    }

    #[test]
    fn test_thousands_separator_stripped() {
        let strip = vec![StripPattern::literal(",")];
        assert_eq!(coerce_cell(&text("12,345"), &strip), Ok(CellValue::Number(12345.0)));
        assert_eq!(
            coerce_cell(&text("1,234,567.50"), &strip),
            Ok(CellValue::Number(1234567.5))
        );
    }

    #[test]
    fn test_annotation_becomes_error_not_zero() {
        assert_eq!(coerce_cell(&text("N/A"), &mbps()), Err("N/A".to_string()));
        assert_eq!(coerce_cell(&text("inf"), &mbps()), Err("inf".to_string()));
        assert_eq!(coerce_cell(&CellValue::Bool(true), &mbps()), Err("true".to_string()));
    }

    #[test]
    fn test_blank_text_is_missing_without_failure() {
        assert_eq!(coerce_cell(&text(""), &mbps()), Ok(CellValue::Missing));
        assert_eq!(coerce_cell(&text("  "), &mbps()), Ok(CellValue::Missing));
        assert_eq!(coerce_cell(&text("nan"), &mbps()), Ok(CellValue::Missing));
        assert_eq!(coerce_cell(&CellValue::Number(f64::NAN), &mbps()), Ok(CellValue::Missing));
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(coerce_cell(&CellValue::Number(7.0), &mbps()), Ok(CellValue::Number(7.0)));
        assert_eq!(coerce_cell(&text("-3e2"), &[]), Ok(CellValue::Number(-300.0)));
        assert_eq!(coerce_cell(&text(".5"), &[]), Ok(CellValue::Number(0.5)));
    }

    #[test]
    fn test_clean_column_marks_failures_missing() {
        let mut table = single_column(vec![
            text("1234 Mbps"),
            text("N/A"),
            CellValue::Number(40.0),
            CellValue::Missing,
        ]);
        let diags = clean_numeric_column(&mut table, "BW", &mbps());

        assert_eq!(
            table.column("BW").unwrap().values,
            vec![
                CellValue::Number(1234.0),
                CellValue::Missing,
                CellValue::Number(40.0),
                CellValue::Missing,
            ]
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ValueCoercionFailure);
        assert!(diags[0].message.contains("1 value(s)"));
        assert!(diags[0].message.contains("'N/A'"));
    }

    #[test]
    fn test_clean_column_is_idempotent() {
        let mut table = single_column(vec![
            text("10 Mbps"),
            text("bogus"),
            text("12,5"),
            CellValue::Number(3.25),
            text(""),
        ]);
        let strip = vec![StripPattern::literal(" Mbps"), StripPattern::literal(",")];
        clean_numeric_column(&mut table, "BW", &strip);
        let once = table.clone();
        let diags = clean_numeric_column(&mut table, "BW", &strip);
        assert_eq!(table, once);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_absent_column_is_noop_with_warning() {
        let mut table = single_column(vec![text("1")]);
        let before = table.clone();
        let diags = clean_numeric_column(&mut table, "Site Value Rs", &[]);
        assert_eq!(table, before);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ColumnMissing);
        assert_eq!(diags[0].column.as_deref(), Some("Site Value Rs"));
    }

    #[test]
    fn test_failure_summary_is_truncated() {
        let mut table = single_column((0..5).map(|i| text(&format!("x{}", i))).collect());
        let diags = clean_numeric_column(&mut table, "BW", &[]);
        assert!(diags[0].message.contains("5 value(s)"));
        assert!(diags[0].message.ends_with(", ...)"));
    }
}
