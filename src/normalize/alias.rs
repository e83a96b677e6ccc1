//! Alias resolution

use super::headers::canonical_header;
use crate::schema::HeaderRename;
use crate::types::Table;

/// First alias, in priority order, present among the table's headers.
///
/// `None` means the field is unavailable; callers degrade the features that
/// need it and carry on.
pub fn resolve_alias<S: AsRef<str>>(table: &Table, canonical: &str, aliases: &[S]) -> Option<String> {
    let found = aliases
        .iter()
        .map(AsRef::as_ref)
        .find(|alias| table.has_column(alias))
        .map(str::to_string);

    match &found {
        Some(header) => tracing::debug!(canonical, header = %header, "resolved alias"),
        None => tracing::debug!(canonical, "no alias present"),
    }
    found
}

/// Like [`resolve_alias`], but when no alias matches exactly, retries by
/// comparing the canonical forms (normalized, then renamed) of aliases and
/// headers. Returns the table's actual header text.
pub fn resolve_alias_loose<S: AsRef<str>>(
    table: &Table,
    canonical: &str,
    aliases: &[S],
    renames: &[HeaderRename],
) -> Option<String> {
    if let Some(exact) = resolve_alias(table, canonical, aliases) {
        return Some(exact);
    }

    let normalized: Vec<(String, &str)> = table
        .headers()
        .into_iter()
        .map(|h| (canonical_header(h, renames), h))
        .collect();

    aliases.iter().find_map(|alias| {
        let wanted = canonical_header(alias.as_ref(), renames);
        normalized
            .iter()
            .find(|(norm, _)| *norm == wanted)
            .map(|(_, header)| header.to_string())
    })
}
