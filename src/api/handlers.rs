//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::server::AppState;
use crate::dashboard::{
    build_charts, compute_kpis, filter_options, filtered_table, preview as build_preview,
    DashboardCharts, FilterOptions, FilterSelection, Kpis, Preview, DEFAULT_PREVIEW_ROWS,
};
use crate::error::Diagnostic;
use crate::loader::{LoadOutcome, ResolvedColumns};

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error response: status code plus an `ApiResponse` with `error` set.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ApiResponse<()> = ApiResponse::err(self.message);
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Cached load result, computed off the async runtime on a miss.
async fn fetch(state: &Arc<AppState>) -> Result<Arc<LoadOutcome>, ApiError> {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || state.cache.fetch(&state.config))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Load task failed: {}", e),
            )
        })
}

/// Cached load result, or 503 when the load was fatal.
async fn fetch_loaded(state: &Arc<AppState>) -> Result<Arc<LoadOutcome>, ApiError> {
    let outcome = fetch(state).await?;
    match outcome.fatal() {
        Some(fatal) => Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            fatal.message.clone(),
        )),
        None => Ok(outcome),
    }
}

/// Filter query. Multiple values are comma-separated:
/// `?bw_group=A,B&site=Kandy`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub bw_group: Option<String>,
    pub site: Option<String>,
}

fn split_values(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl FilterQuery {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            bw_groups: split_values(&self.bw_group),
            sites: split_values(&self.site),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(method: &str, path: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(RootResponse {
        name: "Site Bandwidth API".to_string(),
        version: state.version.clone(),
        description: "Cleaned site bandwidth data and dashboard views".to_string(),
        endpoints: vec![
            endpoint("GET", "/health", "Health check endpoint"),
            endpoint("GET", "/version", "Get server version"),
            endpoint("GET", "/api/v1/columns", "Load summary, headers and resolved columns"),
            endpoint("GET", "/api/v1/options", "Filter option values"),
            endpoint("GET", "/api/v1/kpis", "Key metrics for the filtered data"),
            endpoint("GET", "/api/v1/charts", "Chart datasets for the filtered data"),
            endpoint("GET", "/api/v1/preview", "First rows of the filtered data"),
            endpoint("POST", "/api/v1/reload", "Invalidate the cache and reload"),
        ],
    }))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: ["columns", "options", "kpis", "charts", "preview", "reload"]
            .iter()
            .map(|f| f.to_string())
            .collect(),
    }))
}

#[derive(Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub numeric: bool,
}

/// Load summary
#[derive(Serialize)]
pub struct ColumnsResponse {
    pub source: Option<PathBuf>,
    pub loaded_at: DateTime<Utc>,
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    pub resolved: ResolvedColumns,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<&LoadOutcome> for ColumnsResponse {
    fn from(outcome: &LoadOutcome) -> Self {
        Self {
            source: outcome.source.clone(),
            loaded_at: outcome.loaded_at,
            rows: outcome.table.row_count(),
            columns: outcome
                .table
                .columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.clone(),
                    numeric: c.is_numeric(),
                })
                .collect(),
            resolved: outcome.resolved.clone(),
            diagnostics: outcome.diagnostics.clone(),
        }
    }
}

/// GET /api/v1/columns - Load summary
pub async fn columns(State(state): State<Arc<AppState>>) -> ApiResult<ColumnsResponse> {
    let outcome = fetch_loaded(&state).await?;
    Ok(Json(ApiResponse::ok(ColumnsResponse::from(outcome.as_ref()))))
}

/// GET /api/v1/options - Filter option values
pub async fn options(State(state): State<Arc<AppState>>) -> ApiResult<FilterOptions> {
    let outcome = fetch_loaded(&state).await?;
    Ok(Json(ApiResponse::ok(filter_options(
        &outcome.table,
        &outcome.resolved,
    ))))
}

/// GET /api/v1/kpis - Key metrics
pub async fn kpis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Kpis> {
    let outcome = fetch_loaded(&state).await?;
    let filtered = filtered_table(&outcome, &query.selection());
    Ok(Json(ApiResponse::ok(compute_kpis(
        &filtered,
        &outcome.resolved,
    ))))
}

/// GET /api/v1/charts - Chart datasets
pub async fn charts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<DashboardCharts> {
    let outcome = fetch_loaded(&state).await?;
    let filtered = filtered_table(&outcome, &query.selection());
    Ok(Json(ApiResponse::ok(build_charts(
        &filtered,
        &outcome.resolved,
    ))))
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub limit: Option<usize>,
    pub bw_group: Option<String>,
    pub site: Option<String>,
}

impl PreviewQuery {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            bw_groups: split_values(&self.bw_group),
            sites: split_values(&self.site),
        }
    }
}

/// GET /api/v1/preview - First rows of the filtered table
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Preview> {
    let outcome = fetch_loaded(&state).await?;
    let filtered = filtered_table(&outcome, &query.selection());
    let limit = query.limit.unwrap_or(DEFAULT_PREVIEW_ROWS);
    Ok(Json(ApiResponse::ok(build_preview(&filtered, limit))))
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub invalidated: bool,
    pub success: bool,
    pub summary: ColumnsResponse,
}

/// POST /api/v1/reload - Invalidate the cached load and reload
pub async fn reload(State(state): State<Arc<AppState>>) -> ApiResult<ReloadResponse> {
    let invalidated = state.cache.invalidate(&state.config.sources);
    let outcome = fetch(&state).await?;
    Ok(Json(ApiResponse::ok(ReloadResponse {
        invalidated,
        success: !outcome.is_fatal(),
        summary: ColumnsResponse::from(outcome.as_ref()),
    })))
}
