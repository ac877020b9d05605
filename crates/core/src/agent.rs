//! Agent model and its deployment lifecycle.

use serde::{Deserialize, Serialize};

use crate::id::AgentId;
use crate::{CoreError, Time};

/// A managed agent, owned by a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Unique identifier
    pub id: AgentId,

    /// Owning tenant
    pub tenant_id: String,

    /// Display name
    pub name: String,

    /// Agent kind, e.g. "sentiment-analysis"
    #[serde(rename = "type")]
    pub agent_type: String,

    /// Current lifecycle status
    pub status: AgentStatus,

    /// Free-form agent configuration
    #[serde(default)]
    pub config: serde_json::Value,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

impl AgentRecord {
    /// Create a new agent in the `Deploying` state.
    pub fn new(
        tenant_id: impl Into<String>,
        name: impl Into<String>,
        agent_type: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: AgentId::new(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            agent_type: agent_type.into(),
            status: AgentStatus::Deploying,
            config: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the agent to `next`, rejecting transitions the lifecycle forbids.
    pub fn transition_to(&mut self, next: AgentStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity: "agent",
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        self.status = next;
        self.updated_at = chrono::Utc::now();
        Ok(())
    }
}

/// Agent lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Created, deployment in progress
    Deploying,
    /// Deployed and serving requests
    Active,
    /// Deployment or runtime failure
    Error,
    /// Switched off by the tenant
    Inactive,
}

impl AgentStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: AgentStatus) -> bool {
        use AgentStatus::*;
        match self {
            Deploying => matches!(next, Active | Error),
            Active => matches!(next, Inactive | Error),
            Inactive => matches!(next, Active),
            Error => matches!(next, Deploying),
        }
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Deploying => "deploying",
            AgentStatus::Active => "active",
            AgentStatus::Error => "error",
            AgentStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deploying" => Ok(AgentStatus::Deploying),
            "active" => Ok(AgentStatus::Active),
            "error" => Ok(AgentStatus::Error),
            "inactive" => Ok(AgentStatus::Inactive),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}
