//! Dashboard data views
//!
//! Stateless consumers of a loaded table. Every builder degrades to "not
//! available" when the columns it needs are unresolved; none of them fail.

pub mod charts;
pub mod filters;
pub mod kpi;
pub mod preview;

pub use charts::{
    allocation_share, build_charts, criteria_points, monthly_usage, site_value_by_group,
    AllocationShare, BoxStats, ChartData, CriteriaChart, CriteriaPoint, DashboardCharts,
    MonthlyUsage,
};
pub use filters::{apply_filters, filter_options, FilterOptions, FilterSelection};
pub use kpi::{compute_kpis, mean, Kpis};
pub use preview::{preview, Preview, DEFAULT_PREVIEW_ROWS};

use crate::loader::LoadOutcome;
use crate::types::Table;
use serde::Serialize;

/// Everything a dashboard page shows for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub options: FilterOptions,
    pub selection: FilterSelection,
    pub kpis: Kpis,
    pub charts: DashboardCharts,
    pub preview: Preview,
}

/// The loaded table narrowed by `selection`.
pub fn filtered_table(outcome: &LoadOutcome, selection: &FilterSelection) -> Table {
    apply_filters(&outcome.table, &outcome.resolved, selection)
}

pub fn build_view(outcome: &LoadOutcome, selection: &FilterSelection, limit: usize) -> DashboardView {
    let filtered = filtered_table(outcome, selection);
    DashboardView {
        options: filter_options(&outcome.table, &outcome.resolved),
        selection: selection.clone(),
        kpis: compute_kpis(&filtered, &outcome.resolved),
        charts: build_charts(&filtered, &outcome.resolved),
        preview: preview(&filtered, limit),
    }
}
