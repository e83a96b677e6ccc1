//! Spreadsheet importer - Excel/ODS workbook → RawTable

use crate::error::{SiteBwError, SiteBwResult};
use crate::types::{format_number, CellValue, Column, RawTable};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};

/// Reads the first worksheet of a workbook. Row 0 holds the headers.
pub struct SpreadsheetImporter {
    path: PathBuf,
}

impl SpreadsheetImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import the first worksheet as a RawTable
    pub fn import(&self) -> SiteBwResult<RawTable> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            SiteBwError::Parse(format!(
                "Failed to open spreadsheet '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                SiteBwError::Parse(format!("'{}' contains no worksheets", self.path.display()))
            })?
            .map_err(|e| {
                SiteBwError::Parse(format!(
                    "Failed to read first worksheet of '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        Ok(range_to_table(&range))
    }
}

/// Convert a worksheet range to a table. Fully empty rows are skipped.
fn range_to_table(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return RawTable::new();
    };

    let mut columns: Vec<Column> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| Column::new(header_text(cell, idx), Vec::new()))
        .collect();

    for row in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        for (idx, column) in columns.iter_mut().enumerate() {
            let value = row.get(idx).map(convert_cell).unwrap_or(CellValue::Missing);
            column.values.push(value);
        }
    }

    RawTable::from_columns(columns)
}

/// Header text for a cell; blank headers become `Unnamed: <idx>`.
fn header_text(cell: &Data, idx: usize) -> String {
    match cell {
        Data::String(s) if !s.trim().is_empty() => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => format!("Unnamed: {}", idx),
    }
}

/// Convert a calamine cell to a CellValue.
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) if f.is_nan() => CellValue::Missing,
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Missing,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::Text(ndt.to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // Excel error cells (#N/A, #DIV/0!) carry no value
        Data::Error(_) | Data::Empty => CellValue::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    #[test]
    fn test_convert_cell_variants() {
        assert_eq!(convert_cell(&Data::Int(5)), CellValue::Number(5.0));
        assert_eq!(convert_cell(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(
            convert_cell(&Data::String("1234 Mbps".into())),
            CellValue::Text("1234 Mbps".into())
        );
        assert_eq!(convert_cell(&Data::String("   ".into())), CellValue::Missing);
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(convert_cell(&Data::Empty), CellValue::Missing);
    }

    #[test]
    fn test_header_text_fallbacks() {
        assert_eq!(header_text(&Data::String("Site Name".into()), 0), "Site Name");
        assert_eq!(header_text(&Data::Empty, 3), "Unnamed: 3");
        assert_eq!(header_text(&Data::String(" ".into()), 1), "Unnamed: 1");
        assert_eq!(header_text(&Data::Float(2024.0), 2), "2024");
    }

    #[test]
    fn test_range_to_table_keeps_column_order() {
        let r = range(vec![
            vec![
                Data::String("Site Name".into()),
                Data::String("BW Allocated".into()),
            ],
            vec![Data::String("Kandy".into()), Data::String("100 Mbps".into())],
            vec![Data::Empty, Data::Empty],
            vec![Data::String("Galle".into()), Data::Float(50.0)],
        ]);
        let table = range_to_table(&r);

        assert_eq!(table.headers(), vec!["Site Name", "BW Allocated"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.cell("BW Allocated", 0),
            &CellValue::Text("100 Mbps".into())
        );
        assert_eq!(table.cell("BW Allocated", 1), &CellValue::Number(50.0));
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let importer = SpreadsheetImporter::new("definitely-not-here.xlsx");
        assert!(matches!(importer.import(), Err(SiteBwError::Parse(_))));
    }
}
