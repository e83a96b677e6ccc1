use serde::Serialize;
use std::collections::BTreeSet;

//==============================================================================
// Cells
//==============================================================================

/// Label used for missing values in filter option sets.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Label used for missing values in table previews.
pub const NOT_AVAILABLE_LABEL: &str = "N/A";

/// A single spreadsheet cell.
///
/// `Missing` is the explicit "no value" marker: empty cells and values that
/// failed numeric coercion end up here, never as `0.0` or `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    /// Display string, or `None` for a missing cell.
    pub fn display(&self) -> Option<String> {
        match self {
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Missing => None,
        }
    }

    /// Display string with `missing_label` standing in for missing cells.
    pub fn display_or(&self, missing_label: &str) -> String {
        self.display().unwrap_or_else(|| missing_label.to_string())
    }
}

/// Format a number for display, removing unnecessary decimal places
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    let rounded = (n * 1e6).round() / 1e6;
    let text = format!("{:.6}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

//==============================================================================
// Columns and tables
//==============================================================================

/// A column: header text plus its cells in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every non-missing cell is a number.
    pub fn is_numeric(&self) -> bool {
        self.values
            .iter()
            .all(|v| matches!(v, CellValue::Number(_) | CellValue::Missing))
    }

    /// Numeric view of the column; non-numeric cells read as `None`.
    pub fn numbers(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().map(CellValue::as_number)
    }
}

/// An ordered table of columns.
///
/// Header order is the spreadsheet's column order. Duplicate headers are
/// allowed; lookups by name return the first match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

/// Table as parsed from the source file.
pub type RawTable = Table;

/// Table after numeric cleaning and header normalization.
pub type CleanedTable = Table;

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Get the number of rows (length of the longest column)
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn cell(&self, column: &str, row: usize) -> &CellValue {
        self.column(column)
            .and_then(|c| c.values.get(row))
            .unwrap_or(&CellValue::Missing)
    }

    /// Keep only rows whose mask entry is true.
    pub fn filter_rows(&self, mask: &[bool]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let values = col
                    .values
                    .iter()
                    .zip(mask.iter())
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| v.clone())
                    .collect();
                Column::new(col.name.clone(), values)
            })
            .collect();
        Table { columns }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|col| Column::new(col.name.clone(), col.values.iter().take(n).cloned().collect()))
            .collect();
        Table { columns }
    }

    /// Sorted distinct display values of a column, with missing cells shown
    /// as [`UNKNOWN_LABEL`]. Empty if the column does not exist.
    pub fn distinct_display_values(&self, name: &str) -> Vec<String> {
        let Some(col) = self.column(name) else {
            return Vec::new();
        };
        col.values
            .iter()
            .map(|v| v.display_or(UNKNOWN_LABEL))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::new(
                "Site Name",
                vec![
                    CellValue::Text("Kandy".into()),
                    CellValue::Text("Galle".into()),
                    CellValue::Missing,
                ],
            ),
            Column::new(
                "BW Allocated",
                vec![
                    CellValue::Number(100.0),
                    CellValue::Missing,
                    CellValue::Number(20.5),
                ],
            ),
        ])
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234.0), "1234");
        assert_eq!(format_number(20.5), "20.5");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_missing_is_not_zero() {
        assert_eq!(CellValue::Missing.as_number(), None);
        assert_eq!(CellValue::Number(0.0).as_number(), Some(0.0));
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
        assert_eq!(CellValue::Missing.display(), None);
    }

    #[test]
    fn test_lookup_and_row_count() {
        let table = sample();
        assert_eq!(table.headers(), vec!["Site Name", "BW Allocated"]);
        assert_eq!(table.row_count(), 3);
        assert!(table.has_column("BW Allocated"));
        assert!(!table.has_column("BW Group"));
        assert_eq!(table.cell("BW Allocated", 2), &CellValue::Number(20.5));
        assert_eq!(table.cell("BW Group", 0), &CellValue::Missing);
    }

    #[test]
    fn test_distinct_display_values_maps_missing_to_unknown() {
        let table = sample();
        assert_eq!(
            table.distinct_display_values("Site Name"),
            vec!["Galle", "Kandy", "Unknown"]
        );
        assert!(table.distinct_display_values("Nope").is_empty());
    }

    #[test]
    fn test_filter_rows_and_head() {
        let table = sample();
        let filtered = table.filter_rows(&[true, false, true]);
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.cell("Site Name", 1), &CellValue::Missing);

        let head = table.head(1);
        assert_eq!(head.row_count(), 1);
        assert_eq!(head.cell("BW Allocated", 0), &CellValue::Number(100.0));
    }

    #[test]
    fn test_column_is_numeric() {
        let table = sample();
        assert!(table.column("BW Allocated").unwrap().is_numeric());
        assert!(!table.column("Site Name").unwrap().is_numeric());
    }
}
