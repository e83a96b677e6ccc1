//! Sidebar filters

use crate::loader::ResolvedColumns;
use crate::schema::columns;
use crate::types::{Table, UNKNOWN_LABEL};
use serde::{Deserialize, Serialize};

/// Selected filter values. An empty list means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub bw_groups: Vec<String>,
    #[serde(default)]
    pub sites: Vec<String>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.bw_groups.is_empty() && self.sites.is_empty()
    }
}

/// Option sets for the selectors. `None` when the column is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub bw_groups: Option<Vec<String>>,
    pub sites: Option<Vec<String>>,
}

pub fn filter_options(table: &Table, resolved: &ResolvedColumns) -> FilterOptions {
    let options_for = |canonical: &str| {
        resolved
            .get(canonical)
            .map(|header| table.distinct_display_values(header))
    };
    FilterOptions {
        bw_groups: options_for(columns::BW_GROUP),
        sites: options_for(columns::SITE_NAME),
    }
}

/// Rows matching every non-empty selection. Missing cells match
/// [`UNKNOWN_LABEL`].
pub fn apply_filters(table: &Table, resolved: &ResolvedColumns, selection: &FilterSelection) -> Table {
    let mut mask = vec![true; table.row_count()];

    for (canonical, selected) in [
        (columns::BW_GROUP, &selection.bw_groups),
        (columns::SITE_NAME, &selection.sites),
    ] {
        if selected.is_empty() {
            continue;
        }
        let Some(column) = resolved.get(canonical).and_then(|h| table.column(h)) else {
            continue;
        };
        for (keep, cell) in mask.iter_mut().zip(column.values.iter()) {
            if *keep && !selected.contains(&cell.display_or(UNKNOWN_LABEL)) {
                *keep = false;
            }
        }
    }

    table.filter_rows(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellValue, Column};
    use pretty_assertions::assert_eq;

    fn fixture() -> (Table, ResolvedColumns) {
        let table = Table::from_columns(vec![
            Column::new(
                "Site Name",
                vec![
                    CellValue::Text("Kandy".into()),
                    CellValue::Text("Galle".into()),
                    CellValue::Text("Jaffna".into()),
                ],
            ),
            Column::new(
                "BW Group",
                vec![
                    CellValue::Text("A".into()),
                    CellValue::Text("B".into()),
                    CellValue::Missing,
                ],
            ),
        ]);
        let mut resolved = ResolvedColumns::new();
        resolved.insert(columns::SITE_NAME, Some("Site Name".into()));
        resolved.insert(columns::BW_GROUP, Some("BW Group".into()));
        (table, resolved)
    }

    #[test]
    fn test_options_include_unknown() {
        let (table, resolved) = fixture();
        let options = filter_options(&table, &resolved);
        assert_eq!(
            options.bw_groups,
            Some(vec!["A".to_string(), "B".to_string(), "Unknown".to_string()])
        );
        assert_eq!(
            options.sites,
            Some(vec![
                "Galle".to_string(),
                "Jaffna".to_string(),
                "Kandy".to_string()
            ])
        );
    }

    #[test]
    fn test_options_none_when_unresolved() {
        let (table, mut resolved) = fixture();
        resolved.insert(columns::BW_GROUP, None);
        assert_eq!(filter_options(&table, &resolved).bw_groups, None);
    }

    #[test]
    fn test_empty_selection_keeps_everything() {
        let (table, resolved) = fixture();
        let filtered = apply_filters(&table, &resolved, &FilterSelection::default());
        assert_eq!(filtered, table);
    }

    #[test]
    fn test_selection_intersects() {
        let (table, resolved) = fixture();
        let selection = FilterSelection {
            bw_groups: vec!["A".into(), "Unknown".into()],
            sites: vec!["Jaffna".into(), "Galle".into()],
        };
        let filtered = apply_filters(&table, &resolved, &selection);
        assert_eq!(filtered.row_count(), 1);
        assert_eq!(filtered.cell("Site Name", 0), &CellValue::Text("Jaffna".into()));
    }

    #[test]
    fn test_unresolved_column_does_not_filter() {
        let (table, mut resolved) = fixture();
        resolved.insert(columns::BW_GROUP, None);
        let selection = FilterSelection {
            bw_groups: vec!["A".into()],
            sites: Vec::new(),
        };
        assert_eq!(apply_filters(&table, &resolved, &selection).row_count(), 3);
    }
}
