//! Tabular preview of the filtered data

use crate::types::{Table, NOT_AVAILABLE_LABEL};
use serde::Serialize;

pub const DEFAULT_PREVIEW_ROWS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Row count of the table before truncation.
    pub total_rows: usize,
}

impl Preview {
    pub fn caption(&self) -> String {
        format!(
            "Showing first {} of {} rows (filtered).",
            self.rows.len(),
            self.total_rows
        )
    }

    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }
}

/// First `limit` rows rendered as display strings, missing cells as "N/A".
pub fn preview(table: &Table, limit: usize) -> Preview {
    let head = table.head(limit);
    let headers: Vec<String> = head.headers().into_iter().map(String::from).collect();
    let rows = (0..head.row_count())
        .map(|row| {
            headers
                .iter()
                .map(|h| head.cell(h, row).display_or(NOT_AVAILABLE_LABEL))
                .collect()
        })
        .collect();

    Preview {
        headers,
        rows,
        total_rows: table.row_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellValue, Column};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preview_truncates_and_fills_missing() {
        let table = Table::from_columns(vec![
            Column::new(
                "Site Name",
                vec![
                    CellValue::Text("Kandy".into()),
                    CellValue::Missing,
                    CellValue::Text("Galle".into()),
                ],
            ),
            Column::new(
                "BW Allocated",
                vec![
                    CellValue::Number(10.5),
                    CellValue::Number(2.0),
                    CellValue::Missing,
                ],
            ),
        ]);

        let p = preview(&table, 2);
        assert_eq!(p.headers, vec!["Site Name", "BW Allocated"]);
        assert_eq!(
            p.rows,
            vec![
                vec!["Kandy".to_string(), "10.5".to_string()],
                vec!["N/A".to_string(), "2".to_string()],
            ]
        );
        assert_eq!(p.total_rows, 3);
        assert!(p.is_truncated());
        assert_eq!(p.caption(), "Showing first 2 of 3 rows (filtered).");
    }

    #[test]
    fn test_preview_of_empty_table() {
        let p = preview(&Table::new(), DEFAULT_PREVIEW_ROWS);
        assert!(p.headers.is_empty());
        assert!(p.rows.is_empty());
        assert!(!p.is_truncated());
    }
}
