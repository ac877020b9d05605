//! AgentOps core data models.
//!
//! This crate defines the records shared by the storage, reporting and
//! server layers: agents, tasks, metric samples and error logs, together
//! with the query filter and timeframe types used to select them.

#![warn(missing_docs)]

// Core identities
mod id;

// Records
mod agent;
mod task;
mod metric;

// Queries
mod filter;
mod timeframe;

// Re-exports
pub use id::{AgentId, ErrorLogId, MetricId, TaskId};

pub use agent::{AgentRecord, AgentStatus};
pub use task::{TaskRecord, TaskStatus};
pub use metric::{ErrorLog, MetricSample, RESPONSE_TIME};

pub use filter::RecordFilter;
pub use timeframe::{TimeUnit, Timeframe};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

/// Errors raised by record invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A status change the lifecycle does not allow
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        /// Record kind ("agent" or "task")
        entity: &'static str,
        /// Current status
        from: &'static str,
        /// Requested status
        to: &'static str,
    },

    /// A status string that names no known status
    #[error("unknown status: {0}")]
    UnknownStatus(String),
}
