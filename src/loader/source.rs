//! Source location and parsing

use crate::error::{SiteBwError, SiteBwResult};
use crate::excel::SpreadsheetImporter;
use crate::types::{CellValue, Column, RawTable};
use std::path::{Path, PathBuf};

/// First candidate path that exists, tried in order.
///
/// Only fatal outcome of the whole loader besides a parse failure.
pub fn resolve_path<P: AsRef<Path>>(candidates: &[P]) -> SiteBwResult<PathBuf> {
    for candidate in candidates {
        let path = candidate.as_ref();
        if path.is_file() {
            tracing::debug!(path = %path.display(), "resolved source path");
            return Ok(path.to_path_buf());
        }
        tracing::debug!(path = %path.display(), "source candidate not found");
    }
    Err(SiteBwError::FileNotFound(
        candidates.iter().map(|p| p.as_ref().to_path_buf()).collect(),
    ))
}

/// Parse a source file into a RawTable, choosing the reader by extension.
pub fn load(path: &Path) -> SiteBwResult<RawTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => load_csv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => SpreadsheetImporter::new(path).import(),
        other => Err(SiteBwError::Parse(format!(
            "Unsupported file type '{}' for '{}'",
            other,
            path.display()
        ))),
    }
}

/// Read a CSV file. The first record is the header row.
fn load_csv(path: &Path) -> SiteBwResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| SiteBwError::Parse(format!("Failed to open CSV '{}': {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| SiteBwError::Parse(format!("Invalid CSV header in '{}': {}", path.display(), e)))?
        .clone();

    let mut columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            let name = if h.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                h.to_string()
            };
            Column::new(name, Vec::new())
        })
        .collect();

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            SiteBwError::Parse(format!(
                "Invalid CSV record {} in '{}': {}",
                line + 1,
                path.display(),
                e
            ))
        })?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        for (idx, column) in columns.iter_mut().enumerate() {
            column
                .values
                .push(record.get(idx).map(infer_cell).unwrap_or(CellValue::Missing));
        }
    }

    Ok(RawTable::from_columns(columns))
}

/// Type a raw CSV field: blank → missing, plain numbers and booleans typed,
/// everything else kept as text for the cleaning stage.
fn infer_cell(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Missing;
    }
    match trimmed {
        "true" | "True" | "TRUE" => return CellValue::Bool(true),
        "false" | "False" | "FALSE" => return CellValue::Bool(false),
        _ => {}
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}
