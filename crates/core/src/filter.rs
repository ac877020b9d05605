//! Query filters passed to the data store.

use serde::{Deserialize, Serialize};

use crate::id::AgentId;
use crate::{AgentRecord, ErrorLog, MetricSample, TaskRecord, Time};

/// Filter shared by every record query.
///
/// Time bounds are half-open: `since <= t < until`. For tasks the creation
/// timestamp is compared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Restrict to one tenant
    pub tenant_id: Option<String>,

    /// Restrict to one agent
    pub agent_id: Option<AgentId>,

    /// Restrict samples to one metric type
    pub metric_type: Option<String>,

    /// Inclusive lower bound
    pub since: Option<Time>,

    /// Exclusive upper bound
    pub until: Option<Time>,
}

impl RecordFilter {
    /// Filter for one tenant.
    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            ..Default::default()
        }
    }

    /// Restrict to one agent.
    pub fn with_agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    /// Restrict samples to one metric type.
    pub fn with_metric_type(mut self, metric_type: impl Into<String>) -> Self {
        self.metric_type = Some(metric_type.into());
        self
    }

    /// Restrict to `[since, until)`.
    pub fn between(mut self, since: Time, until: Time) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    /// Restrict to records at or after `since`.
    pub fn since(mut self, since: Time) -> Self {
        self.since = Some(since);
        self
    }

    fn matches_tenant(&self, tenant_id: &str) -> bool {
        self.tenant_id.as_deref().map_or(true, |t| t == tenant_id)
    }

    fn matches_agent(&self, agent_id: AgentId) -> bool {
        self.agent_id.map_or(true, |a| a == agent_id)
    }

    fn matches_time(&self, at: Time) -> bool {
        self.since.map_or(true, |s| at >= s) && self.until.map_or(true, |u| at < u)
    }

    /// Whether a sample passes the filter.
    pub fn matches_sample(&self, sample: &MetricSample) -> bool {
        self.matches_tenant(&sample.tenant_id)
            && self.matches_agent(sample.agent_id)
            && self.metric_type.as_deref().map_or(true, |m| m == sample.metric_type)
            && self.matches_time(sample.timestamp)
    }

    /// Whether a task passes the filter.
    pub fn matches_task(&self, task: &TaskRecord) -> bool {
        self.matches_tenant(&task.tenant_id)
            && self.matches_agent(task.agent_id)
            && self.matches_time(task.created_at)
    }

    /// Whether an agent passes the filter. Time bounds do not apply.
    pub fn matches_agent_record(&self, agent: &AgentRecord) -> bool {
        self.matches_tenant(&agent.tenant_id) && self.matches_agent(agent.id)
    }

    /// Whether an error log passes the filter.
    pub fn matches_error(&self, log: &ErrorLog) -> bool {
        self.matches_tenant(&log.tenant_id)
            && self.matches_agent(log.agent_id)
            && self.matches_time(log.timestamp)
    }
}
