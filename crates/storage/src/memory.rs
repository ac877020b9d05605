//! In-memory store, used by the server when no data directory is configured
//! and by tests.

use std::collections::HashMap;

use agentops_core::{
    AgentId, AgentRecord, AgentStatus, ErrorLog, MetricSample, RecordFilter, TaskId, TaskRecord,
};
use tokio::sync::RwLock;

use super::{DataStore, Result};

#[derive(Default)]
struct Tables {
    agents: HashMap<AgentId, AgentRecord>,
    tasks: HashMap<TaskId, TaskRecord>,
    samples: Vec<MetricSample>,
    errors: Vec<ErrorLog>,
}

/// Process-local data store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DataStore for MemoryStore {
    async fn save_agent(&self, agent: &AgentRecord) -> Result<()> {
        self.tables.write().await.agents.insert(agent.id, agent.clone());
        Ok(())
    }

    async fn save_agent_if(&self, agent: &AgentRecord, expected: AgentStatus) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.agents.get_mut(&agent.id) {
            Some(stored) if stored.status == expected => {
                *stored = agent.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn load_agent(&self, id: AgentId) -> Result<Option<AgentRecord>> {
        Ok(self.tables.read().await.agents.get(&id).cloned())
    }

    async fn delete_agent(&self, id: AgentId) -> Result<bool> {
        Ok(self.tables.write().await.agents.remove(&id).is_some())
    }

    async fn fetch_agents(&self, filter: &RecordFilter) -> Result<Vec<AgentRecord>> {
        let tables = self.tables.read().await;
        let mut agents: Vec<_> = tables
            .agents
            .values()
            .filter(|a| filter.matches_agent_record(a))
            .cloned()
            .collect();
        agents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(agents)
    }

    async fn save_task(&self, task: &TaskRecord) -> Result<()> {
        self.tables.write().await.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<TaskRecord>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn fetch_tasks(&self, filter: &RecordFilter) -> Result<Vec<TaskRecord>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<_> = tables
            .tasks
            .values()
            .filter(|t| filter.matches_task(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn record_sample(&self, sample: &MetricSample) -> Result<()> {
        self.tables.write().await.samples.push(sample.clone());
        Ok(())
    }

    async fn fetch_samples(&self, filter: &RecordFilter) -> Result<Vec<MetricSample>> {
        let tables = self.tables.read().await;
        let mut samples: Vec<_> = tables
            .samples
            .iter()
            .filter(|s| filter.matches_sample(s))
            .cloned()
            .collect();
        samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(samples)
    }

    async fn record_error(&self, log: &ErrorLog) -> Result<()> {
        self.tables.write().await.errors.push(log.clone());
        Ok(())
    }

    async fn fetch_error_logs(&self, filter: &RecordFilter) -> Result<Vec<ErrorLog>> {
        let tables = self.tables.read().await;
        let mut logs: Vec<_> = tables
            .errors
            .iter()
            .filter(|l| filter.matches_error(l))
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(logs)
    }
}
