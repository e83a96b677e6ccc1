//! Key metrics

use crate::loader::ResolvedColumns;
use crate::schema::columns;
use crate::types::{Table, NOT_AVAILABLE_LABEL};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    /// Distinct non-missing site names.
    pub total_sites: Option<usize>,
    pub avg_may_usage: Option<f64>,
    pub avg_allocated: Option<f64>,
}

impl Kpis {
    /// "12.34 Mbps" or "N/A".
    pub fn format_mbps(value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{:.2} Mbps", v),
            None => NOT_AVAILABLE_LABEL.to_string(),
        }
    }

    pub fn format_count(value: Option<usize>) -> String {
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE_LABEL.to_string())
    }
}

/// Mean of the present values; `None` if there are none.
pub fn mean<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Mean of a numeric column, `None` if unresolved or not numeric.
fn column_mean(table: &Table, resolved: &ResolvedColumns, canonical: &str) -> Option<f64> {
    let column = table.column(resolved.get(canonical)?)?;
    if !column.is_numeric() {
        return None;
    }
    mean(column.numbers())
}

pub fn compute_kpis(table: &Table, resolved: &ResolvedColumns) -> Kpis {
    let total_sites = resolved
        .get(columns::SITE_NAME)
        .and_then(|h| table.column(h))
        .map(|col| {
            col.values
                .iter()
                .filter_map(|v| v.display())
                .collect::<HashSet<_>>()
                .len()
        });

    Kpis {
        total_sites,
        avg_may_usage: column_mean(table, resolved, columns::MAY_AVG),
        avg_allocated: column_mean(table, resolved, columns::BW_ALLOCATED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellValue, Column};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mean_skips_missing() {
        assert_eq!(mean(vec![Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean(vec![None, None]), None);
        assert_eq!(mean(Vec::<Option<f64>>::new()), None);
    }

    #[test]
    fn test_compute_kpis() {
        let table = Table::from_columns(vec![
            Column::new(
                "Site Name",
                vec![
                    CellValue::Text("Kandy".into()),
                    CellValue::Text("Kandy".into()),
                    CellValue::Text("Galle".into()),
                    CellValue::Missing,
                ],
            ),
            Column::new(
                "May Avg Mbps",
                vec![
                    CellValue::Number(10.0),
                    CellValue::Number(20.0),
                    CellValue::Missing,
                    CellValue::Number(30.0),
                ],
            ),
        ]);
        let mut resolved = ResolvedColumns::new();
        resolved.insert(columns::SITE_NAME, Some("Site Name".into()));
        resolved.insert(columns::MAY_AVG, Some("May Avg Mbps".into()));
        resolved.insert(columns::BW_ALLOCATED, None);

        let kpis = compute_kpis(&table, &resolved);
        assert_eq!(
            kpis,
            Kpis {
                total_sites: Some(2),
                avg_may_usage: Some(20.0),
                avg_allocated: None,
            }
        );
        assert_eq!(Kpis::format_mbps(kpis.avg_may_usage), "20.00 Mbps");
        assert_eq!(Kpis::format_mbps(kpis.avg_allocated), "N/A");
        assert_eq!(Kpis::format_count(kpis.total_sites), "2");
    }

    #[test]
    fn test_text_column_has_no_mean() {
        let table = Table::from_columns(vec![Column::new(
            "May Avg Mbps",
            vec![CellValue::Text("high".into())],
        )]);
        let mut resolved = ResolvedColumns::new();
        resolved.insert(columns::MAY_AVG, Some("May Avg Mbps".into()));
        assert_eq!(compute_kpis(&table, &resolved).avg_may_usage, None);
        assert_eq!(compute_kpis(&table, &resolved).total_sites, None);
    }
}
