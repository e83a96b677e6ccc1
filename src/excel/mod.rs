//! Excel import/export
//!
//! - Import: first worksheet of .xlsx/.xlsm/.xls/.ods → RawTable
//! - Export: CleanedTable → .xlsx

mod exporter;
mod importer;

pub use exporter::{TableExporter, DEFAULT_SHEET_NAME};
pub use importer::SpreadsheetImporter;
