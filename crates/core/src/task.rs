//! Task record - one unit of work executed by an agent.

use serde::{Deserialize, Serialize};

use crate::id::{AgentId, TaskId};
use crate::{CoreError, Time};

/// A task executed by an agent.
///
/// Status moves `Pending -> Running -> {Completed | Failed}` exactly once.
/// Duration is derived from the timestamps and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique identifier
    pub id: TaskId,

    /// Executing agent
    pub agent_id: AgentId,

    /// Owning tenant
    pub tenant_id: String,

    /// Current status
    pub status: TaskStatus,

    /// Kind of work, e.g. "analyze"
    pub task_type: String,

    /// Creation timestamp
    pub created_at: Time,

    /// When the task started running
    pub started_at: Option<Time>,

    /// When the task reached a terminal status
    pub completed_at: Option<Time>,

    /// Failure message, set only for failed tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskRecord {
    /// Create a pending task.
    pub fn new(agent_id: AgentId, tenant_id: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            agent_id,
            tenant_id: tenant_id.into(),
            status: TaskStatus::Pending,
            task_type: task_type.into(),
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    /// Pending -> Running.
    pub fn start(&mut self, at: Time) -> Result<(), CoreError> {
        self.advance(TaskStatus::Running)?;
        self.started_at = Some(at);
        Ok(())
    }

    /// Running -> Completed.
    pub fn complete(&mut self, at: Time) -> Result<(), CoreError> {
        self.advance(TaskStatus::Completed)?;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Running -> Failed.
    pub fn fail(&mut self, at: Time, error: impl Into<String>) -> Result<(), CoreError> {
        self.advance(TaskStatus::Failed)?;
        self.completed_at = Some(at);
        self.error = Some(error.into());
        Ok(())
    }

    /// Milliseconds between start and completion, if both are known.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }

    fn advance(&mut self, next: TaskStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity: "task",
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Task execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Queued, not yet started
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    /// Whether `next` is the single allowed successor of `self`.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => next == TaskStatus::Running,
            TaskStatus::Running => matches!(next, TaskStatus::Completed | TaskStatus::Failed),
            TaskStatus::Completed | TaskStatus::Failed => false,
        }
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
