//! JSON file storage implementation.
//!
//! Stores each record as a JSON file under a data directory, one directory
//! per record kind. Agents and tasks are rewritten in place; samples and
//! error logs are append-only.

use std::path::{Path, PathBuf};

use agentops_core::{
    AgentId, AgentRecord, AgentStatus, ErrorLog, MetricSample, RecordFilter, TaskId, TaskRecord,
};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::{DataStore, Result};

/// File-based JSON storage backend.
pub struct JsonStore {
    root: PathBuf,
    // serializes agent writes so `save_agent_if` can read-check-write
    agent_writes: Mutex<()>,
}

impl JsonStore {
    /// Open storage rooted at `root`, creating the record directories if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("agents")).await?;
        fs::create_dir_all(root.join("tasks")).await?;
        fs::create_dir_all(root.join("samples")).await?;
        fs::create_dir_all(root.join("errors")).await?;

        Ok(Self {
            root,
            agent_writes: Mutex::new(()),
        })
    }

    fn agent_path(&self, id: AgentId) -> PathBuf {
        self.root.join("agents").join(format!("{}.json", id))
    }
    fn task_path(&self, id: TaskId) -> PathBuf {
        self.root.join("tasks").join(format!("{}.json", id))
    }
    fn sample_path(&self, sample: &MetricSample) -> PathBuf {
        self.root.join("samples").join(format!("{}.json", sample.id))
    }
    fn error_path(&self, log: &ErrorLog) -> PathBuf {
        self.root.join("errors").join(format!("{}.json", log.id))
    }
}

#[async_trait::async_trait]
impl DataStore for JsonStore {
    async fn save_agent(&self, agent: &AgentRecord) -> Result<()> {
        let _guard = self.agent_writes.lock().await;
        write_json(&self.agent_path(agent.id), agent).await?;
        debug!(agent_id = %agent.id, status = %agent.status, "Saved agent");
        Ok(())
    }

    async fn save_agent_if(&self, agent: &AgentRecord, expected: AgentStatus) -> Result<bool> {
        let _guard = self.agent_writes.lock().await;
        let path = self.agent_path(agent.id);
        match read_json::<AgentRecord>(&path).await? {
            Some(stored) if stored.status == expected => {
                write_json(&path, agent).await?;
                debug!(agent_id = %agent.id, status = %agent.status, "Saved agent");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn load_agent(&self, id: AgentId) -> Result<Option<AgentRecord>> {
        read_json(&self.agent_path(id)).await
    }

    async fn delete_agent(&self, id: AgentId) -> Result<bool> {
        let _guard = self.agent_writes.lock().await;
        remove_if_exists(&self.agent_path(id)).await
    }

    async fn fetch_agents(&self, filter: &RecordFilter) -> Result<Vec<AgentRecord>> {
        let all: Vec<AgentRecord> = list_dir(&self.root.join("agents")).await?;
        let mut agents: Vec<_> = all
            .into_iter()
            .filter(|a| filter.matches_agent_record(a))
            .collect();
        agents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(agents)
    }

    async fn save_task(&self, task: &TaskRecord) -> Result<()> {
        write_json(&self.task_path(task.id), task).await
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<TaskRecord>> {
        read_json(&self.task_path(id)).await
    }

    async fn fetch_tasks(&self, filter: &RecordFilter) -> Result<Vec<TaskRecord>> {
        let all: Vec<TaskRecord> = list_dir(&self.root.join("tasks")).await?;
        let mut tasks: Vec<_> = all.into_iter().filter(|t| filter.matches_task(t)).collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn record_sample(&self, sample: &MetricSample) -> Result<()> {
        write_json(&self.sample_path(sample), sample).await
    }

    async fn fetch_samples(&self, filter: &RecordFilter) -> Result<Vec<MetricSample>> {
        let all: Vec<MetricSample> = list_dir(&self.root.join("samples")).await?;
        let mut samples: Vec<_> = all.into_iter().filter(|s| filter.matches_sample(s)).collect();
        samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(samples)
    }

    async fn record_error(&self, log: &ErrorLog) -> Result<()> {
        write_json(&self.error_path(log), log).await
    }

    async fn fetch_error_logs(&self, filter: &RecordFilter) -> Result<Vec<ErrorLog>> {
        let all: Vec<ErrorLog> = list_dir(&self.root.join("errors")).await?;
        let mut logs: Vec<_> = all.into_iter().filter(|l| filter.matches_error(l)).collect();
        logs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(logs)
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json.as_bytes()).await?;
    Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => debug!(path = %entry.path().display(), error = %e, "Skipping unreadable record"),
        }
    }
    Ok(items)
}
