//! REST API handlers for the warehouse dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::{DashboardService, ReportRequest, ServiceError};
use crate::charts::ChartSpec;
use crate::dashboard::{self, DashboardReport, DataOrigin};
use crate::derive::EnrichedRow;
use crate::insights::Advisory;
use crate::metrics::{BottleneckCount, Kpis, MonthlyPoint, TimeSeriesPoint, WarehouseSummary, WeekdayPoint};
use crate::scoring::slowest_warehouses;
use crate::source::SourceError;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct KpiResponse {
    pub origin: Option<DataOrigin>,
    pub preset: String,
    #[serde(flatten)]
    pub kpis: Kpis,
}

#[derive(Serialize)]
pub struct TrendsResponse {
    pub daily: Vec<TimeSeriesPoint>,
    pub monthly: Vec<MonthlyPoint>,
    pub weekdays: Vec<WeekdayPoint>,
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub origin: Option<DataOrigin>,
    pub preset: String,
    pub advisories: Vec<Advisory>,
    pub recommendations: Vec<String>,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub preset: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;
type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<(HeaderMap, Json<T>), ApiError>;

pub const ORIGIN_HEADER: &str = "x-data-origin";
pub const FALLBACK_HEADER: &str = "x-data-fallback";

/// Every report response says where its rows came from, array bodies included
fn origin_headers(report: &DashboardReport) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(origin) = &report.origin {
        if let Ok(value) = HeaderValue::from_str(&origin.source) {
            headers.insert(ORIGIN_HEADER, value);
        }
        headers.insert(
            FALLBACK_HEADER,
            HeaderValue::from_static(if origin.fell_back { "true" } else { "false" }),
        );
    }
    headers
}

fn respond<T>(report: &DashboardReport, body: T) -> ApiResult<T> {
    Ok((origin_headers(report), Json(body)))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

impl From<ServiceError> for (StatusCode, Json<ErrorResponse>) {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::BadDate(_) | ServiceError::Source(SourceError::InvalidRange(_)) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Source(source) if source.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, e.to_string())
    }
}

async fn load(
    service: &DashboardService,
    params: &ReportQuery,
) -> Result<(Vec<EnrichedRow>, DashboardReport), ApiError> {
    let request = ReportRequest::parse(
        params.preset.as_deref(),
        params.start.as_deref(),
        params.end.as_deref(),
    )?;
    Ok(service.report(&request).await?)
}

/// GET /api/v1/health
pub async fn health(State(service): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "source": service.source_label()}))
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<DashboardReport> {
    let (_, report) = load(&service, &params).await?;
    let headers = origin_headers(&report);
    Ok((headers, Json(report)))
}

/// GET /api/v1/kpis
pub async fn get_kpis(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<KpiResponse> {
    let (_, report) = load(&service, &params).await?;
    let body = KpiResponse {
        origin: report.origin.clone(),
        preset: report.preset.name().to_string(),
        kpis: report.kpis,
    };
    respond(&report, body)
}

/// GET /api/v1/warehouses
pub async fn get_warehouses(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<Vec<WarehouseSummary>> {
    let (_, report) = load(&service, &params).await?;
    respond(&report, report.warehouses.clone())
}

/// GET /api/v1/warehouses/slowest?limit=N
pub async fn get_slowest(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<Vec<WarehouseSummary>> {
    let limit = params.limit.unwrap_or(service.config().top_slowest);
    let (_, report) = load(&service, &params).await?;
    respond(&report, slowest_warehouses(&report.warehouses, limit))
}

/// GET /api/v1/trends
pub async fn get_trends(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<TrendsResponse> {
    let (_, report) = load(&service, &params).await?;
    let body = TrendsResponse {
        daily: report.time_series.clone(),
        monthly: report.monthly.clone(),
        weekdays: report.weekdays.clone(),
    };
    respond(&report, body)
}

/// GET /api/v1/bottlenecks
pub async fn get_bottlenecks(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<Vec<BottleneckCount>> {
    let (_, report) = load(&service, &params).await?;
    respond(&report, report.bottlenecks.clone())
}

/// GET /api/v1/recommendations
pub async fn get_recommendations(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<RecommendationsResponse> {
    let (_, report) = load(&service, &params).await?;
    let body = RecommendationsResponse {
        origin: report.origin.clone(),
        preset: report.preset.name().to_string(),
        advisories: report.advisories.clone(),
        recommendations: report.recommendations.clone(),
    };
    respond(&report, body)
}

/// GET /api/v1/charts/:name
pub async fn get_chart(
    State(service): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ReportQuery>,
) -> ApiResult<ChartSpec> {
    if !dashboard::CHART_NAMES.contains(&name.as_str()) {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Unknown chart '{}'", name),
        ));
    }

    let (rows, report) = load(&service, &params).await?;
    match dashboard::chart(&name, &rows, &report) {
        Some(spec) => respond(&report, spec),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Unknown chart '{}'", name),
        )),
    }
}
