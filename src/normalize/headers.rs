//! Header normalization

use crate::error::{Diagnostic, DiagnosticKind};
use crate::schema::HeaderRename;
use crate::types::Table;
use std::collections::HashSet;

/// Characters removed from every header.
const NOISE_CHARS: [char; 4] = ['*', '(', ')', '\\'];

/// Normalize a single header.
///
/// 1. drop `*`, `(`, `)` and `\`
/// 2. drop one trailing `.` (trailing whitespace before it is ignored)
/// 3. collapse whitespace runs to a single space and trim
pub fn normalize_header(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !NOISE_CHARS.contains(c)).collect();
    let trimmed = stripped.trim_end();
    let without_dot = trimmed.strip_suffix('.').unwrap_or(trimmed);
    without_dot.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a header and apply the rename table (exact match only).
pub fn canonical_header(raw: &str, renames: &[HeaderRename]) -> String {
    let normalized = normalize_header(raw);
    renames
        .iter()
        .find(|r| r.from == normalized)
        .map(|r| r.to.clone())
        .unwrap_or(normalized)
}

/// `base`, or `base.1`, `base.2`, ... when `base` is already taken.
fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}.{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Normalize every header in the table, claimed by a spec or not.
///
/// A header whose canonical form is empty or already taken by an earlier
/// column keeps its original text and yields a `ColumnRenameAmbiguous`
/// diagnostic. If the original text is taken too, it gets a numeric suffix
/// (`May Avg Mbps.1`), so column names stay unique.
pub fn normalize_headers(table: &mut Table, renames: &[HeaderRename]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut taken: HashSet<String> = HashSet::new();

    for column in &mut table.columns {
        let target = canonical_header(&column.name, renames);

        if !target.is_empty() && !taken.contains(&target) {
            if column.name != target {
                tracing::debug!(from = %column.name, to = %target, "normalized header");
            }
            taken.insert(target.clone());
            column.name = target;
            continue;
        }

        let kept = unique_name(&column.name, &taken);
        let reason = if target.is_empty() {
            "is empty after normalization".to_string()
        } else {
            format!("normalizes to '{}', which another column already uses", target)
        };
        let message = if kept == column.name {
            format!("Header '{}' {}. Keeping original.", column.name, reason)
        } else {
            format!("Header '{}' {}. Renamed to '{}'.", column.name, reason, kept)
        };
        diagnostics.push(
            Diagnostic::new(DiagnosticKind::ColumnRenameAmbiguous, message)
                .with_column(column.name.clone()),
        );
        taken.insert(kept.clone());
        column.name = kept;
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::site_bandwidth_renames;
    use crate::types::Column;
    use pretty_assertions::assert_eq;

    fn table_with_headers(headers: &[&str]) -> Table {
        Table::from_columns(
            headers
                .iter()
                .map(|h| Column::new(*h, Vec::new()))
                .collect(),
        )
    }

    #[test]
    fn test_site_value_header() {
        assert_eq!(normalize_header("Site Value (Rs.)****"), "Site Value Rs");
    }

    #[test]
    fn test_unit_parentheses_removed() {
        assert_eq!(normalize_header("May Avg (Mbps)"), "May Avg Mbps");
        assert_eq!(normalize_header("Criteria 1 (Max-C)*"), "Criteria 1 Max-C");
        assert_eq!(
            normalize_header("Criteria 3 (BW Upgrade)***"),
            "Criteria 3 BW Upgrade"
        );
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(normalize_header("  BW \t  Group  "), "BW Group");
        assert_eq!(normalize_header("Site\u{a0}Name"), "Site Name");
    }

    #[test]
    fn test_trailing_dot_with_whitespace() {
        assert_eq!(normalize_header("Site Value Rs ."), "Site Value Rs");
        assert_eq!(normalize_header("No."), "No");
        // Only one trailing dot, inner dots stay
        assert_eq!(normalize_header("v1.2"), "v1.2");
    }

    #[test]
    fn test_backslash_removed() {
        assert_eq!(normalize_header(r"BW\Group"), "BWGroup");
    }

    #[test]
    fn test_normalize_header_is_idempotent() {
        for raw in ["Site Value (Rs.)****", "  a  (b) ", "*", "BW Group"] {
            let once = normalize_header(raw);
            assert_eq!(normalize_header(&once), once);
        }
    }

    #[test]
    fn test_rename_applies_on_exact_match_only() {
        let renames = site_bandwidth_renames();
        assert_eq!(canonical_header("Site Value", &renames), "Site Value Rs");
        assert_eq!(canonical_header("(Site Value)", &renames), "Site Value Rs");
        assert_eq!(
            canonical_header("Site Value Total", &renames),
            "Site Value Total"
        );
    }

    #[test]
    fn test_normalize_headers_applies_to_all_columns() {
        let mut table = table_with_headers(&[
            "Site Name ",
            "May Avg (Mbps)",
            "Unclaimed  (col)*",
            "Site Value (Rs.)****",
        ]);
        let diags = normalize_headers(&mut table, &site_bandwidth_renames());
        assert!(diags.is_empty());
        assert_eq!(
            table.headers(),
            vec!["Site Name", "May Avg Mbps", "Unclaimed col", "Site Value Rs"]
        );
    }

    #[test]
    fn test_collision_keeps_original_and_reports() {
        let mut table = table_with_headers(&["Site Value Rs", "Site Value"]);
        let diags = normalize_headers(&mut table, &site_bandwidth_renames());
        assert_eq!(table.headers(), vec!["Site Value Rs", "Site Value"]);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ColumnRenameAmbiguous);
        assert_eq!(diags[0].column.as_deref(), Some("Site Value"));
    }

    #[test]
    fn test_empty_after_normalization_keeps_original() {
        let mut table = table_with_headers(&["***", "BW Group"]);
        let diags = normalize_headers(&mut table, &[]);
        assert_eq!(table.headers(), vec!["***", "BW Group"]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_collision_with_identical_text_gets_suffix() {
        let mut table = table_with_headers(&["Site Name", "May Avg (Mbps)", "May Avg Mbps"]);
        let diags = normalize_headers(&mut table, &[]);
        assert_eq!(
            table.headers(),
            vec!["Site Name", "May Avg Mbps", "May Avg Mbps.1"]
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].column.as_deref(), Some("May Avg Mbps"));
        assert!(diags[0].message.contains("Renamed to 'May Avg Mbps.1'"));
    }

    #[test]
    fn test_suffix_skips_names_already_taken() {
        let mut table = table_with_headers(&["A", "A (x)", "A x.1", "A x"]);
        normalize_headers(&mut table, &[]);
        assert_eq!(table.headers(), vec!["A", "A x", "A x.1", "A x.2"]);
    }
}
