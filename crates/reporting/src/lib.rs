//! AgentOps performance reporting.
//!
//! Pure computations over fetched records (aggregation, anomaly detection,
//! health scoring, capacity projection, report composition) plus the
//! [`PerformanceMonitor`] service that feeds them from a [`DataStore`].
//!
//! [`DataStore`]: agentops_storage::DataStore

#![warn(missing_docs)]

pub mod stats;
pub mod aggregator;
pub mod anomaly;
pub mod health;
pub mod capacity;
pub mod recommendation;
pub mod report;
pub mod monitor;

pub use aggregator::{aggregate, MetricSummary};
pub use anomaly::{detect_anomalies, AnomalyReport, AnomalyScan, AnomalySeverity, Sensitivity};
pub use capacity::{project_capacity, CapacityInputs, CapacityProjection, ScalingAction, ScalingMilestone};
pub use health::{health_score, HealthScore, HealthStatus};
pub use monitor::{MonitorError, PerformanceMonitor};
pub use recommendation::{Priority, Recommendation};
pub use report::{compose_report, PerformanceReport, ReportInputs};
pub use stats::Summary;
