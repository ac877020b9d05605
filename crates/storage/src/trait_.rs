//! Data store trait abstraction.

use agentops_core::{
    AgentId, AgentRecord, AgentStatus, ErrorLog, MetricSample, RecordFilter, TaskId, TaskRecord,
};
use async_trait::async_trait;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Record store for agents, tasks, metric samples and error logs.
///
/// The store is authoritative; the reporting layer only reads snapshots from
/// it. Implementations are shared across request handlers behind an `Arc`,
/// so every method takes `&self`. Fetches return records ordered by time
/// (agents by creation time).
#[async_trait]
pub trait DataStore: Send + Sync {
    // === Agent operations ===

    /// Save an agent (create or update).
    async fn save_agent(&self, agent: &AgentRecord) -> Result<()>;

    /// Save an agent only if the stored copy still has status `expected`.
    ///
    /// The check and the write happen as one step. Returns `false` (and
    /// writes nothing) when the agent is missing or its status has moved on.
    async fn save_agent_if(&self, agent: &AgentRecord, expected: AgentStatus) -> Result<bool>;

    /// Load an agent by ID.
    async fn load_agent(&self, id: AgentId) -> Result<Option<AgentRecord>>;

    /// Delete an agent. Returns whether it existed.
    async fn delete_agent(&self, id: AgentId) -> Result<bool>;

    /// List agents matching the filter.
    async fn fetch_agents(&self, filter: &RecordFilter) -> Result<Vec<AgentRecord>>;

    // === Task operations ===

    /// Save a task (create or update).
    async fn save_task(&self, task: &TaskRecord) -> Result<()>;

    /// Load a task by ID.
    async fn load_task(&self, id: TaskId) -> Result<Option<TaskRecord>>;

    /// List tasks matching the filter.
    async fn fetch_tasks(&self, filter: &RecordFilter) -> Result<Vec<TaskRecord>>;

    // === Metric operations ===

    /// Record a metric sample.
    async fn record_sample(&self, sample: &MetricSample) -> Result<()>;

    /// List samples matching the filter.
    async fn fetch_samples(&self, filter: &RecordFilter) -> Result<Vec<MetricSample>>;

    // === Error log operations ===

    /// Record an error log entry.
    async fn record_error(&self, log: &ErrorLog) -> Result<()>;

    /// List error logs matching the filter.
    async fn fetch_error_logs(&self, filter: &RecordFilter) -> Result<Vec<ErrorLog>>;
}
