//! Performance monitoring service.
//!
//! Fetches a tenant's records from the store and hands them to the pure
//! reporting functions.

use std::sync::Arc;

use agentops_core::{RecordFilter, Time, Timeframe, RESPONSE_TIME};
use agentops_storage::{DataStore, StorageError};
use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::anomaly::{scan, AnomalyScan, Sensitivity};
use crate::capacity::{daily_throughput, project_capacity, CapacityInputs, CapacityProjection, THROUGHPUT_WINDOW_DAYS};
use crate::health::{health_score, HealthScore};
use crate::report::{compose_report, PerformanceReport, ReportInputs};
use crate::stats;

/// Hours of history the health score looks at.
pub const HEALTH_WINDOW_HOURS: i64 = 24;

/// Errors raised while building reports.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The store failed to answer a fetch
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Builds performance views for a tenant from a shared store.
#[derive(Clone)]
pub struct PerformanceMonitor {
    store: Arc<dyn DataStore>,
}

impl PerformanceMonitor {
    /// Create a monitor over `store`.
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Full performance report for the window named by `timeframe`.
    ///
    /// Unparseable timeframes fall back to the last 24 hours.
    pub async fn report(&self, tenant_id: &str, timeframe: &str) -> Result<PerformanceReport> {
        let timeframe = Timeframe::parse(timeframe);
        let (start, end) = timeframe.window(Utc::now());
        let all = RecordFilter::tenant(tenant_id);
        let window = all.clone().between(start, end);

        let (agents, tasks, samples, errors) = tokio::try_join!(
            self.store.fetch_agents(&all),
            self.store.fetch_tasks(&window),
            self.store.fetch_samples(&window),
            self.store.fetch_error_logs(&window),
        )?;
        debug!(
            tenant_id,
            agents = agents.len(),
            tasks = tasks.len(),
            samples = samples.len(),
            errors = errors.len(),
            "Fetched report inputs"
        );

        let report = compose_report(ReportInputs {
            timeframe,
            start,
            end,
            agents: &agents,
            tasks: &tasks,
            samples: &samples,
            errors: &errors,
        });
        info!(tenant_id, timeframe = %timeframe, "Composed performance report");
        Ok(report)
    }

    /// Anomaly scan over the window named by `timeframe`.
    pub async fn anomalies(
        &self,
        tenant_id: &str,
        timeframe: &str,
        sensitivity: Sensitivity,
    ) -> Result<AnomalyScan> {
        let (start, end) = Timeframe::parse(timeframe).window(Utc::now());
        let samples = self
            .store
            .fetch_samples(&RecordFilter::tenant(tenant_id).between(start, end))
            .await?;

        let result = scan(&samples, sensitivity);
        if result.total > 0 {
            info!(
                tenant_id,
                total = result.total,
                high_severity = result.high_severity,
                "Anomalies detected"
            );
        }
        Ok(result)
    }

    /// Health score from all agents and the last 24 hours of activity.
    pub async fn health(&self, tenant_id: &str) -> Result<HealthScore> {
        let now = Utc::now();
        let all = RecordFilter::tenant(tenant_id);
        let recent = all.clone().between(now - Duration::hours(HEALTH_WINDOW_HOURS), now);
        let recent_times = recent.clone().with_metric_type(RESPONSE_TIME);

        let (agents, tasks, response_times) = tokio::try_join!(
            self.store.fetch_agents(&all),
            self.store.fetch_tasks(&recent),
            self.store.fetch_samples(&recent_times),
        )?;

        let values: Vec<f64> = response_times.iter().map(|s| s.value).collect();
        let health = health_score(&agents, &tasks, &values);
        debug!(tenant_id, score = health.score, "Computed health score");
        Ok(health)
    }

    /// Capacity projection from the trailing week of activity.
    pub async fn capacity(
        &self,
        tenant_id: &str,
        growth_rate: f64,
        horizon_days: u32,
    ) -> Result<CapacityProjection> {
        let now: Time = Utc::now();
        let week = RecordFilter::tenant(tenant_id).between(now - Duration::days(THROUGHPUT_WINDOW_DAYS), now);
        let week_times = week.clone().with_metric_type(RESPONSE_TIME);

        let (tasks, response_times) = tokio::try_join!(
            self.store.fetch_tasks(&week),
            self.store.fetch_samples(&week_times),
        )?;

        let values: Vec<f64> = response_times.iter().map(|s| s.value).collect();
        Ok(project_capacity(CapacityInputs {
            current_throughput: daily_throughput(&tasks, now),
            avg_response_time_ms: stats::mean(&values),
            growth_rate,
            horizon_days,
        }))
    }
}
