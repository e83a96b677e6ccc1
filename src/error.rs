use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type SiteBwResult<T> = Result<T, SiteBwError>;

#[derive(Error, Debug)]
pub enum SiteBwError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found. Tried: {}", format_candidates(.0))]
    FileNotFound(Vec<PathBuf>),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Watch error: {0}")]
    Watch(String),

    /// A load finished with a fatal diagnostic.
    #[error("Load failed: {0}")]
    Load(String),
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    if candidates.is_empty() {
        return "(no candidate paths)".to_string();
    }
    candidates
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

//==============================================================================
// Load diagnostics
//==============================================================================

/// What went wrong while loading. Only the first two abort a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    FileNotFound,
    ParseError,
    ColumnMissing,
    ValueCoercionFailure,
    ColumnRenameAmbiguous,
}

impl DiagnosticKind {
    pub fn is_fatal(self) -> bool {
        matches!(self, DiagnosticKind::FileNotFound | DiagnosticKind::ParseError)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A recorded problem. Diagnostics are returned alongside the table,
/// never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        let severity = if kind.is_fatal() {
            Severity::Error
        } else {
            Severity::Warning
        };
        Self {
            kind,
            severity,
            column: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn column_missing(column: &str) -> Self {
        Self::new(
            DiagnosticKind::ColumnMissing,
            format!("Expected column '{}' not found. Skipping.", column),
        )
        .with_column(column)
    }

    /// Build the diagnostic for a fatal load error.
    pub fn from_error(err: &SiteBwError) -> Self {
        let kind = match err {
            SiteBwError::FileNotFound(_) => DiagnosticKind::FileNotFound,
            _ => DiagnosticKind::ParseError,
        };
        Self::new(kind, err.to_string())
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Emit the diagnostic as a tracing event.
    pub fn trace(&self) {
        match self.severity {
            Severity::Error => tracing::error!(kind = ?self.kind, column = ?self.column, "{}", self.message),
            Severity::Warning => tracing::warn!(kind = ?self.kind, column = ?self.column, "{}", self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {}", level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(DiagnosticKind::FileNotFound.is_fatal());
        assert!(DiagnosticKind::ParseError.is_fatal());
        assert!(!DiagnosticKind::ColumnMissing.is_fatal());
        assert!(!DiagnosticKind::ValueCoercionFailure.is_fatal());
        assert!(!DiagnosticKind::ColumnRenameAmbiguous.is_fatal());
    }

    #[test]
    fn test_severity_follows_kind() {
        let d = Diagnostic::new(DiagnosticKind::ParseError, "bad");
        assert_eq!(d.severity, Severity::Error);
        let d = Diagnostic::column_missing("BW Group");
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.column.as_deref(), Some("BW Group"));
    }

    #[test]
    fn test_file_not_found_message_lists_candidates() {
        let err = SiteBwError::FileNotFound(vec![
            PathBuf::from("data.xlsx"),
            PathBuf::from("/srv/data.xlsx"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("'data.xlsx'"));
        assert!(msg.contains("'/srv/data.xlsx'"));

        let diag = Diagnostic::from_error(&err);
        assert_eq!(diag.kind, DiagnosticKind::FileNotFound);
    }

    #[test]
    fn test_parse_error_maps_to_parse_diagnostic() {
        let err = SiteBwError::Parse("corrupt zip".to_string());
        let diag = Diagnostic::from_error(&err);
        assert_eq!(diag.kind, DiagnosticKind::ParseError);
        assert!(diag.to_string().starts_with("[error]"));
    }
}
