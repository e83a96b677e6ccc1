//! Full load pipeline
//!
//! resolve path → parse → clean numeric specs → normalize all headers →
//! resolve every spec against the normalized headers.

use super::source::{load, resolve_path};
use crate::error::{Diagnostic, DiagnosticKind, SiteBwError};
use crate::normalize::{
    canonical_header, clean_numeric_column, normalize_headers, resolve_alias, resolve_alias_loose,
};
use crate::schema::{ColumnSpec, HeaderRename};
use crate::types::CleanedTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Canonical name → header that represents it in the cleaned table
/// (`None` when the field could not be resolved).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedColumns(BTreeMap<String, Option<String>>);

impl ResolvedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, canonical: impl Into<String>, header: Option<String>) {
        self.0.insert(canonical.into(), header);
    }

    /// Header for a canonical name, if resolved.
    pub fn get(&self, canonical: &str) -> Option<&str> {
        self.0.get(canonical).and_then(|h| h.as_deref())
    }

    /// Canonical names among `wanted` that are unresolved.
    pub fn missing(&self, wanted: &[&str]) -> Vec<String> {
        wanted
            .iter()
            .filter(|name| self.get(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of a full load. Fatal problems leave `table` empty and put a
/// single fatal diagnostic first in `diagnostics`.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: CleanedTable,
    pub source: Option<PathBuf>,
    pub resolved: ResolvedColumns,
    pub diagnostics: Vec<Diagnostic>,
    pub loaded_at: DateTime<Utc>,
}

impl LoadOutcome {
    fn failed(source: Option<PathBuf>, err: &SiteBwError) -> Self {
        let diagnostic = Diagnostic::from_error(err);
        diagnostic.trace();
        Self {
            table: CleanedTable::new(),
            source,
            resolved: ResolvedColumns::new(),
            diagnostics: vec![diagnostic],
            loaded_at: Utc::now(),
        }
    }

    /// The fatal diagnostic, if the load failed.
    pub fn fatal(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.is_fatal())
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal().is_some()
    }

    /// True when there is nothing to show: failed load or no data rows.
    pub fn is_empty(&self) -> bool {
        self.is_fatal() || self.table.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_fatal())
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.kind == kind).collect()
    }

    pub fn header(&self, canonical: &str) -> Option<&str> {
        self.resolved.get(canonical)
    }
}

/// Run the whole pipeline. Never panics and never returns an error: fatal
/// conditions come back as an empty outcome with a fatal diagnostic.
pub fn full_load<P: AsRef<Path>>(
    candidates: &[P],
    specs: &[ColumnSpec],
    renames: &[HeaderRename],
) -> LoadOutcome {
    let path = match resolve_path(candidates) {
        Ok(path) => path,
        Err(err) => return LoadOutcome::failed(None, &err),
    };

    let mut table = match load(&path) {
        Ok(table) => table,
        Err(err) => return LoadOutcome::failed(Some(path), &err),
    };

    tracing::info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.columns.len(),
        "loaded source"
    );

    let mut diagnostics = Vec::new();
    let mut resolved = ResolvedColumns::new();

    // 1. Clean numeric columns, located against raw headers. Remember the
    //    column position; normalization renames but never reorders.
    let mut numeric_positions: BTreeMap<&str, usize> = BTreeMap::new();
    for spec in specs.iter().filter(|s| s.is_numeric()) {
        let Some(header) =
            resolve_alias_loose(&table, &spec.canonical, &spec.candidates(), renames)
        else {
            continue;
        };
        diagnostics.extend(clean_numeric_column(&mut table, &header, spec.strip_patterns()));
        if let Some(idx) = table.columns.iter().position(|c| c.name == header) {
            numeric_positions.insert(spec.canonical.as_str(), idx);
        }
    }

    // 2. Normalize every header.
    diagnostics.extend(normalize_headers(&mut table, renames));

    // 3. Resolve every spec against the normalized headers.
    for spec in specs {
        let header = match numeric_positions.get(spec.canonical.as_str()) {
            Some(&idx) => Some(table.columns[idx].name.clone()),
            None => {
                let aliases = normalized_aliases(spec, renames);
                resolve_alias(&table, &spec.canonical, &aliases)
            }
        };

        if header.is_none() {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::ColumnMissing,
                    format!(
                        "Expected column '{}' not found (tried: {}). Features using it are disabled.",
                        spec.canonical,
                        spec.candidates().join(", ")
                    ),
                )
                .with_column(spec.canonical.clone()),
            );
        }
        resolved.insert(spec.canonical.clone(), header);
    }

    for diagnostic in &diagnostics {
        diagnostic.trace();
    }

    LoadOutcome {
        table,
        source: Some(path),
        resolved,
        diagnostics,
        loaded_at: Utc::now(),
    }
}

/// Spec aliases in their post-normalization form, deduplicated in order.
fn normalized_aliases(spec: &ColumnSpec, renames: &[HeaderRename]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for alias in spec.candidates() {
        let normalized = canonical_header(alias, renames);
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}
