//! Chart datasets
//!
//! Each builder returns the data a chart needs, or says why the chart can't
//! be drawn. Drawing is left to the rendering layer.

use crate::loader::ResolvedColumns;
use crate::schema::columns;
use crate::types::{Table, UNKNOWN_LABEL};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of a chart builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ChartData<T> {
    Ready(T),
    /// Columns resolved, but no rows survive cleaning/filtering.
    Empty,
    /// Canonical names of the unresolved columns the chart needs.
    Missing(Vec<String>),
}

impl<T> ChartData<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartData::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// Human-readable reason a chart was skipped.
    pub fn skip_reason(&self) -> Option<String> {
        match self {
            ChartData::Ready(_) => None,
            ChartData::Empty => Some("No data available after cleaning.".to_string()),
            ChartData::Missing(cols) => Some(format!(
                "Chart not generated, column(s) missing: {}",
                cols.join(", ")
            )),
        }
    }
}

/// Resolve every required canonical name to a header, or list the missing ones.
fn require<'a>(
    table: &Table,
    resolved: &'a ResolvedColumns,
    wanted: &[&str],
) -> Result<Vec<&'a str>, Vec<String>> {
    let missing: Vec<String> = wanted
        .iter()
        .filter(|name| {
            resolved
                .get(name)
                .map(|h| !table.has_column(h))
                .unwrap_or(true)
        })
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }
    Ok(wanted.iter().filter_map(|name| resolved.get(name)).collect())
}

//==============================================================================
// Monthly average usage (long format)
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyUsage {
    pub site: String,
    pub month: String,
    pub avg_mbps: f64,
}

/// Site × month average bandwidth, melted to one row per (site, month).
pub fn monthly_usage(table: &Table, resolved: &ResolvedColumns) -> ChartData<Vec<MonthlyUsage>> {
    let mut wanted = vec![columns::SITE_NAME];
    wanted.extend(columns::MONTHLY_AVG.iter().map(|(_, c)| *c));

    let headers = match require(table, resolved, &wanted) {
        Ok(h) => h,
        Err(missing) => return ChartData::Missing(missing),
    };
    let site_header = headers[0];
    let month_headers: Vec<(&str, &str)> = columns::MONTHLY_AVG
        .iter()
        .map(|(month, _)| *month)
        .zip(headers[1..].iter().copied())
        .collect();

    let mut rows = Vec::new();
    for row in 0..table.row_count() {
        let Some(site) = table.cell(site_header, row).display() else {
            continue;
        };
        for (month, header) in &month_headers {
            if let Some(avg_mbps) = table.cell(header, row).as_number() {
                rows.push(MonthlyUsage {
                    site: site.clone(),
                    month: month.to_string(),
                    avg_mbps,
                });
            }
        }
    }

    if rows.is_empty() {
        ChartData::Empty
    } else {
        ChartData::Ready(rows)
    }
}

//==============================================================================
// Criteria scatter
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriteriaPoint {
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub site: String,
    pub bw_allocated: Option<f64>,
}

/// Scatter of criteria 1 vs 2 colored by criteria 3. Axis labels are the
/// concrete headers found in the sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriteriaChart {
    pub x_label: String,
    pub y_label: String,
    pub color_label: String,
    pub points: Vec<CriteriaPoint>,
}

pub fn criteria_points(table: &Table, resolved: &ResolvedColumns) -> ChartData<CriteriaChart> {
    let wanted = [
        columns::CRITERIA_1,
        columns::CRITERIA_2,
        columns::CRITERIA_3,
        columns::SITE_NAME,
        columns::BW_ALLOCATED,
    ];
    let headers = match require(table, resolved, &wanted) {
        Ok(h) => h,
        Err(missing) => return ChartData::Missing(missing),
    };
    let (x_h, y_h, color_h) = (headers[0], headers[1], headers[2]);
    let (site_h, bw_h) = (headers[3], headers[4]);

    let points: Vec<CriteriaPoint> = (0..table.row_count())
        .filter_map(|row| {
            let x = table.cell(x_h, row).as_number()?;
            let y = table.cell(y_h, row).as_number()?;
            let color = table.cell(color_h, row).display()?;
            Some(CriteriaPoint {
                x,
                y,
                color,
                site: table.cell(site_h, row).display_or(UNKNOWN_LABEL),
                bw_allocated: table.cell(bw_h, row).as_number(),
            })
        })
        .collect();

    if points.is_empty() {
        return ChartData::Empty;
    }
    ChartData::Ready(CriteriaChart {
        x_label: x_h.to_string(),
        y_label: y_h.to_string(),
        color_label: color_h.to_string(),
        points,
    })
}

//==============================================================================
// Site value distribution per BW group
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub group: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl BoxStats {
    fn from_values(group: String, mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(Self {
            group,
            count: values.len(),
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
        })
    }
}

pub fn site_value_by_group(table: &Table, resolved: &ResolvedColumns) -> ChartData<Vec<BoxStats>> {
    let headers = match require(table, resolved, &[columns::BW_GROUP, columns::SITE_VALUE]) {
        Ok(h) => h,
        Err(missing) => return ChartData::Missing(missing),
    };
    let (group_h, value_h) = (headers[0], headers[1]);

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in 0..table.row_count() {
        let (Some(group), Some(value)) = (
            table.cell(group_h, row).display(),
            table.cell(value_h, row).as_number(),
        ) else {
            continue;
        };
        groups.entry(group).or_default().push(value);
    }

    let stats: Vec<BoxStats> = groups
        .into_iter()
        .filter_map(|(group, values)| BoxStats::from_values(group, values))
        .collect();
    if stats.is_empty() {
        ChartData::Empty
    } else {
        ChartData::Ready(stats)
    }
}

//==============================================================================
// Allocation share per BW group
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationShare {
    pub group: String,
    pub total_mbps: f64,
    pub share_pct: f64,
}

/// Allocated bandwidth summed per group (missing counts as 0). Groups whose
/// total isn't positive are left out.
pub fn allocation_share(table: &Table, resolved: &ResolvedColumns) -> ChartData<Vec<AllocationShare>> {
    let headers = match require(table, resolved, &[columns::BW_GROUP, columns::BW_ALLOCATED]) {
        Ok(h) => h,
        Err(missing) => return ChartData::Missing(missing),
    };
    let (group_h, bw_h) = (headers[0], headers[1]);

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in 0..table.row_count() {
        let group = table.cell(group_h, row).display_or(UNKNOWN_LABEL);
        let bw = table.cell(bw_h, row).as_number().unwrap_or(0.0);
        *totals.entry(group).or_insert(0.0) += bw;
    }
    totals.retain(|_, total| *total > 0.0);

    let grand_total: f64 = totals.values().sum();
    if totals.is_empty() {
        return ChartData::Empty;
    }
    ChartData::Ready(
        totals
            .into_iter()
            .map(|(group, total_mbps)| AllocationShare {
                group,
                total_mbps,
                share_pct: total_mbps / grand_total * 100.0,
            })
            .collect(),
    )
}

//==============================================================================
// All charts
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub monthly_usage: ChartData<Vec<MonthlyUsage>>,
    pub criteria: ChartData<CriteriaChart>,
    pub site_value: ChartData<Vec<BoxStats>>,
    pub allocation_share: ChartData<Vec<AllocationShare>>,
}

pub fn build_charts(table: &Table, resolved: &ResolvedColumns) -> DashboardCharts {
    DashboardCharts {
        monthly_usage: monthly_usage(table, resolved),
        criteria: criteria_points(table, resolved),
        site_value: site_value_by_group(table, resolved),
        allocation_share: allocation_share(table, resolved),
    }
}
