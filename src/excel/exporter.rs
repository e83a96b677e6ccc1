//! Excel exporter - CleanedTable → .xlsx

use crate::error::{SiteBwError, SiteBwResult};
use crate::types::{CellValue, Table};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

/// Default worksheet name for exported tables
pub const DEFAULT_SHEET_NAME: &str = "Sites";

/// Writes a table to a single worksheet: header row, then one row per record.
/// Missing cells are left blank.
pub struct TableExporter<'a> {
    table: &'a Table,
    sheet_name: String,
}

impl<'a> TableExporter<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Export the table to an Excel .xlsx file
    pub fn export(&self, output_path: &Path) -> SiteBwResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|e| SiteBwError::Export(format!("Failed to set worksheet name: {}", e)))?;

        self.write_table(worksheet)?;

        workbook
            .save(output_path)
            .map_err(|e| SiteBwError::Export(format!("Failed to save Excel file: {}", e)))?;

        tracing::info!(
            path = %output_path.display(),
            rows = self.table.row_count(),
            "exported table"
        );
        Ok(())
    }

    fn write_table(&self, worksheet: &mut Worksheet) -> SiteBwResult<()> {
        let header_format = Format::new().set_bold();

        for (col_idx, column) in self.table.columns.iter().enumerate() {
            let col = u16::try_from(col_idx).map_err(|_| {
                SiteBwError::Export(format!("Too many columns to export: {}", col_idx + 1))
            })?;

            worksheet
                .write_string_with_format(0, col, &column.name, &header_format)
                .map_err(|e| SiteBwError::Export(format!("Failed to write header: {}", e)))?;

            for (row_idx, cell) in column.values.iter().enumerate() {
                let row = u32::try_from(row_idx + 1).map_err(|_| {
                    SiteBwError::Export(format!("Too many rows to export: {}", row_idx + 1))
                })?;
                let result = match cell {
                    CellValue::Number(n) => worksheet.write_number(row, col, *n).map(|_| ()),
                    CellValue::Text(s) => worksheet.write_string(row, col, s).map(|_| ()),
                    CellValue::Bool(b) => worksheet.write_boolean(row, col, *b).map(|_| ()),
                    CellValue::Missing => Ok(()),
                };
                result.map_err(|e| {
                    SiteBwError::Export(format!(
                        "Failed to write cell ({}, {}): {}",
                        row, column.name, e
                    ))
                })?;
            }
        }
        Ok(())
    }
}
