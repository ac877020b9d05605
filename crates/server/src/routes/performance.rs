//! Performance reporting endpoints.

use agentops_reporting::{
    capacity::{DEFAULT_GROWTH_RATE, DEFAULT_HORIZON_DAYS},
    AnomalyScan, CapacityProjection, HealthScore, PerformanceReport, Sensitivity,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::tenant::Tenant;

const DEFAULT_TIMEFRAME: &str = "24h";

/// Query of the report endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    /// Window such as `24h`, `7d` or `2w`
    pub timeframe: Option<String>,
}

/// Query of the anomaly endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnomalyQuery {
    /// Window such as `24h`
    pub timeframe: Option<String>,
    /// `low`, `medium` or `high`; anything else means `medium`
    pub sensitivity: Option<String>,
}

/// Query of the capacity endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapacityQuery {
    /// Growth per 30 days
    pub growth_rate: Option<f64>,
    /// Projection horizon
    pub days: Option<u32>,
}

/// `GET /api/v1/performance/report`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn report(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<PerformanceReport>> {
    let timeframe = query.timeframe.as_deref().unwrap_or(DEFAULT_TIMEFRAME);
    Ok(Json(state.monitor.report(tenant.as_str(), timeframe).await?))
}

/// `GET /api/v1/performance/anomalies`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn anomalies(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<AnomalyQuery>,
) -> ApiResult<Json<AnomalyScan>> {
    let timeframe = query.timeframe.as_deref().unwrap_or(DEFAULT_TIMEFRAME);
    let sensitivity = query
        .sensitivity
        .as_deref()
        .map(Sensitivity::parse_or_default)
        .unwrap_or_default();
    Ok(Json(state.monitor.anomalies(tenant.as_str(), timeframe, sensitivity).await?))
}

/// `GET /api/v1/performance/health`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn health(State(state): State<AppState>, tenant: Tenant) -> ApiResult<Json<HealthScore>> {
    Ok(Json(state.monitor.health(tenant.as_str()).await?))
}

/// `GET /api/v1/performance/capacity`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn capacity(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<CapacityQuery>,
) -> ApiResult<Json<CapacityProjection>> {
    let growth_rate = query.growth_rate.unwrap_or(DEFAULT_GROWTH_RATE);
    let days = query.days.unwrap_or(DEFAULT_HORIZON_DAYS);
    Ok(Json(state.monitor.capacity(tenant.as_str(), growth_rate, days).await?))
}
