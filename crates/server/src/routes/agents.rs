//! Agent CRUD, deployment probe and the analyze proxy.

use std::sync::Arc;
use std::time::Instant;

use agentops_core::{
    AgentId, AgentRecord, AgentStatus, ErrorLog, MetricSample, RecordFilter, TaskId, TaskRecord,
};
use agentops_inference::{Prediction, TextAnalyzer};
use agentops_storage::DataStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::tenant::Tenant;

/// Body of `POST /api/v1/agents`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgentRequest {
    /// Display name
    pub name: String,
    /// Agent kind
    #[serde(rename = "type")]
    pub agent_type: String,
    /// Free-form configuration
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Body of `PATCH /api/v1/agents/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAgentRequest {
    /// New display name
    pub name: Option<String>,
    /// Replacement configuration
    pub config: Option<serde_json::Value>,
    /// Requested lifecycle status
    pub status: Option<AgentStatus>,
}

/// Body of `POST /api/v1/agents/:id/analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    /// Text to classify
    pub text: String,
}

/// Result of a successful analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    /// Task recorded for the call
    pub task_id: TaskId,
    /// Agent that served it
    pub agent_id: AgentId,
    /// Model output
    pub predictions: Vec<Prediction>,
    /// Wall-clock latency of the inference call
    pub response_time_ms: f64,
}

fn parse_id(raw: &str) -> ApiResult<AgentId> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid agent id: {raw}")))
}

/// Load an agent visible to `tenant`.
async fn load_owned(store: &dyn DataStore, tenant: &Tenant, id: AgentId) -> ApiResult<AgentRecord> {
    match store.load_agent(id).await? {
        Some(agent) if agent.tenant_id == tenant.as_str() => Ok(agent),
        _ => Err(ApiError::NotFound(format!("agent {id}"))),
    }
}

/// Check the inference backend and settle a deploying agent as active or error.
pub async fn probe_deployment(store: Arc<dyn DataStore>, analyzer: Arc<dyn TextAnalyzer>, id: AgentId) {
    let next = match analyzer.health_check().await {
        Ok(()) => AgentStatus::Active,
        Err(e) => {
            warn!(agent_id = %id, error = %e, "Deployment probe failed");
            AgentStatus::Error
        }
    };

    let mut agent = match store.load_agent(id).await {
        Ok(Some(agent)) => agent,
        Ok(None) => return,
        Err(e) => {
            warn!(agent_id = %id, error = %e, "Failed to load agent after probe");
            return;
        }
    };
    let loaded = agent.status;
    if let Err(e) = agent.transition_to(next) {
        warn!(agent_id = %id, error = %e, "Skipping probe result");
        return;
    }
    // an update that landed since the load wins over the probe
    match store.save_agent_if(&agent, loaded).await {
        Ok(true) => info!(agent_id = %id, status = %next, "Deployment settled"),
        Ok(false) => info!(agent_id = %id, "Agent changed during probe, result dropped"),
        Err(e) => warn!(agent_id = %id, error = %e, "Failed to save probe result"),
    }
}

/// `GET /api/v1/agents`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn list_agents(State(state): State<AppState>, tenant: Tenant) -> ApiResult<Json<Vec<AgentRecord>>> {
    let agents = state.store.fetch_agents(&RecordFilter::tenant(tenant.as_str())).await?;
    Ok(Json(agents))
}

/// `POST /api/v1/agents`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn create_agent(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(request): Json<CreateAgentRequest>,
) -> ApiResult<(StatusCode, Json<AgentRecord>)> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("agent name must not be empty".to_string()));
    }

    let mut agent = AgentRecord::new(tenant.0, request.name.trim(), request.agent_type);
    agent.config = request.config;
    state.store.save_agent(&agent).await?;
    info!(agent_id = %agent.id, "Agent created, deploying");

    tokio::spawn(probe_deployment(state.store.clone(), state.analyzer.clone(), agent.id));

    Ok((StatusCode::CREATED, Json(agent)))
}

/// `GET /api/v1/agents/:id`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn get_agent(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<String>,
) -> ApiResult<Json<AgentRecord>> {
    let agent = load_owned(state.store.as_ref(), &tenant, parse_id(&id)?).await?;
    Ok(Json(agent))
}

/// `PATCH /api/v1/agents/:id`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn update_agent(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<String>,
    Json(request): Json<UpdateAgentRequest>,
) -> ApiResult<Json<AgentRecord>> {
    let mut agent = load_owned(state.store.as_ref(), &tenant, parse_id(&id)?).await?;
    let loaded = agent.status;

    if let Some(status) = request.status {
        agent.transition_to(status)?;
    }
    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("agent name must not be empty".to_string()));
        }
        agent.name = name.trim().to_string();
    }
    if let Some(config) = request.config {
        agent.config = config;
    }
    agent.updated_at = Utc::now();

    if !state.store.save_agent_if(&agent, loaded).await? {
        return Err(ApiError::Conflict(format!(
            "agent {} changed status while updating, retry",
            agent.id
        )));
    }
    info!(agent_id = %agent.id, status = %agent.status, "Agent updated");
    Ok(Json(agent))
}

/// `DELETE /api/v1/agents/:id`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn delete_agent(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let agent = load_owned(state.store.as_ref(), &tenant, parse_id(&id)?).await?;
    state.store.delete_agent(agent.id).await?;
    info!(agent_id = %agent.id, "Agent deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/agents/:id/analyze`
#[instrument(skip_all, fields(tenant = %tenant.0))]
pub async fn analyze(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<String>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let agent = load_owned(state.store.as_ref(), &tenant, parse_id(&id)?).await?;
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    if agent.status != AgentStatus::Active {
        return Err(ApiError::Conflict(format!(
            "agent {} is {}, not active",
            agent.id, agent.status
        )));
    }

    let mut task = TaskRecord::new(agent.id, tenant.as_str(), "analyze");
    task.start(Utc::now())?;
    state.store.save_task(&task).await?;

    let started = Instant::now();
    let outcome = state.analyzer.analyze(&request.text).await;
    let response_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(predictions) => {
            task.complete(Utc::now())?;
            state.store.save_task(&task).await?;
            // the task is already stored as completed
            if let Err(e) = state
                .store
                .record_sample(&MetricSample::response_time(agent.id, tenant.as_str(), response_time_ms))
                .await
            {
                warn!(agent_id = %agent.id, task_id = %task.id, error = %e, "Failed to record response time");
            }
            info!(agent_id = %agent.id, task_id = %task.id, response_time_ms, "Analysis completed");
            Ok(Json(AnalyzeResponse {
                task_id: task.id,
                agent_id: agent.id,
                predictions,
                response_time_ms,
            }))
        }
        Err(e) => {
            let message = e.to_string();
            task.fail(Utc::now(), message.clone())?;
            state.store.save_task(&task).await?;
            state
                .store
                .record_error(&ErrorLog::new(agent.id, tenant.as_str(), message.clone()))
                .await?;
            warn!(agent_id = %agent.id, task_id = %task.id, error = %message, "Analysis failed");
            Err(ApiError::BadGateway(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentops_core::TaskStatus;
    use agentops_inference::InferenceError;
    use agentops_storage::{MemoryStore, StorageError};
    use async_trait::async_trait;
    use axum::response::IntoResponse;

    struct StubAnalyzer {
        healthy: bool,
    }

    #[async_trait]
    impl TextAnalyzer for StubAnalyzer {
        async fn analyze(&self, text: &str) -> agentops_inference::Result<Vec<Prediction>> {
            if !self.healthy {
                return Err(InferenceError::Api {
                    status: 503,
                    body: "model loading".to_string(),
                });
            }
            let label = if text.contains("great") { "POSITIVE" } else { "NEGATIVE" };
            Ok(vec![Prediction {
                label: label.to_string(),
                score: 0.9,
            }])
        }

        async fn health_check(&self) -> agentops_inference::Result<()> {
            if self.healthy {
                Ok(())
            } else {
                Err(InferenceError::InvalidResponse("down".to_string()))
            }
        }
    }

    /// Store that can fail sample writes or change an agent right after it is loaded.
    #[derive(Default)]
    struct ScriptedStore {
        inner: MemoryStore,
        fail_samples: bool,
        status_after_load: Option<AgentStatus>,
    }

    #[async_trait]
    impl DataStore for ScriptedStore {
        async fn save_agent(&self, agent: &AgentRecord) -> agentops_storage::Result<()> {
            self.inner.save_agent(agent).await
        }
        async fn save_agent_if(&self, agent: &AgentRecord, expected: AgentStatus) -> agentops_storage::Result<bool> {
            self.inner.save_agent_if(agent, expected).await
        }
        async fn load_agent(&self, id: AgentId) -> agentops_storage::Result<Option<AgentRecord>> {
            let loaded = self.inner.load_agent(id).await?;
            if let (Some(agent), Some(status)) = (&loaded, self.status_after_load) {
                let mut changed = agent.clone();
                changed.status = status;
                self.inner.save_agent(&changed).await?;
            }
            Ok(loaded)
        }
        async fn delete_agent(&self, id: AgentId) -> agentops_storage::Result<bool> {
            self.inner.delete_agent(id).await
        }
        async fn fetch_agents(&self, filter: &RecordFilter) -> agentops_storage::Result<Vec<AgentRecord>> {
            self.inner.fetch_agents(filter).await
        }
        async fn save_task(&self, task: &TaskRecord) -> agentops_storage::Result<()> {
            self.inner.save_task(task).await
        }
        async fn load_task(&self, id: TaskId) -> agentops_storage::Result<Option<TaskRecord>> {
            self.inner.load_task(id).await
        }
        async fn fetch_tasks(&self, filter: &RecordFilter) -> agentops_storage::Result<Vec<TaskRecord>> {
            self.inner.fetch_tasks(filter).await
        }
        async fn record_sample(&self, sample: &MetricSample) -> agentops_storage::Result<()> {
            if self.fail_samples {
                return Err(StorageError::Other("disk full".to_string()));
            }
            self.inner.record_sample(sample).await
        }
        async fn fetch_samples(&self, filter: &RecordFilter) -> agentops_storage::Result<Vec<MetricSample>> {
            self.inner.fetch_samples(filter).await
        }
        async fn record_error(&self, log: &ErrorLog) -> agentops_storage::Result<()> {
            self.inner.record_error(log).await
        }
        async fn fetch_error_logs(&self, filter: &RecordFilter) -> agentops_storage::Result<Vec<ErrorLog>> {
            self.inner.fetch_error_logs(filter).await
        }
    }

    fn state(healthy: bool) -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), Arc::new(StubAnalyzer { healthy }))
    }

    fn acme() -> Tenant {
        Tenant("acme".to_string())
    }

    async fn active_agent(state: &AppState) -> AgentRecord {
        let mut agent = AgentRecord::new("acme", "Sentiment", "sentiment-analysis");
        agent.transition_to(AgentStatus::Active).unwrap();
        state.store.save_agent(&agent).await.unwrap();
        agent
    }

    fn create_request(name: &str) -> Json<CreateAgentRequest> {
        Json(CreateAgentRequest {
            name: name.to_string(),
            agent_type: "sentiment-analysis".to_string(),
            config: serde_json::json!({"threshold": 0.5}),
        })
    }

    #[tokio::test]
    async fn test_create_then_probe_activates() {
        let state = state(true);
        let (status, Json(agent)) = create_agent(State(state.clone()), acme(), create_request("Sentiment"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(agent.status, AgentStatus::Deploying);
        assert_eq!(agent.config["threshold"], 0.5);

        probe_deployment(state.store.clone(), state.analyzer.clone(), agent.id).await;
        let stored = state.store.load_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AgentStatus::Active);
    }

    #[tokio::test]
    async fn test_failed_probe_marks_error() {
        let state = state(false);
        let agent = AgentRecord::new("acme", "Sentiment", "x");
        state.store.save_agent(&agent).await.unwrap();

        probe_deployment(state.store.clone(), state.analyzer.clone(), agent.id).await;
        let stored = state.store.load_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AgentStatus::Error);
    }

    #[tokio::test]
    async fn test_probe_does_not_overwrite_concurrent_update() {
        let store = Arc::new(ScriptedStore {
            status_after_load: Some(AgentStatus::Error),
            ..Default::default()
        });
        let agent = AgentRecord::new("acme", "Sentiment", "x");
        store.inner.save_agent(&agent).await.unwrap();

        probe_deployment(store.clone(), Arc::new(StubAnalyzer { healthy: true }), agent.id).await;
        let stored = store.inner.load_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AgentStatus::Error);
    }

    #[tokio::test]
    async fn test_patch_conflicts_with_concurrent_status_change() {
        let store = Arc::new(ScriptedStore {
            status_after_load: Some(AgentStatus::Error),
            ..Default::default()
        });
        let mut agent = AgentRecord::new("acme", "Sentiment", "x");
        agent.transition_to(AgentStatus::Active).unwrap();
        store.inner.save_agent(&agent).await.unwrap();
        let state = AppState::new(store.clone(), Arc::new(StubAnalyzer { healthy: true }));

        let err = update_agent(
            State(state),
            acme(),
            Path(agent.id.to_string()),
            Json(UpdateAgentRequest {
                name: Some("Renamed".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        let stored = store.inner.load_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Sentiment");
        assert_eq!(stored.status, AgentStatus::Error);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let err = create_agent(State(state(true)), acme(), create_request("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_other_tenant_sees_not_found() {
        let state = state(true);
        let agent = active_agent(&state).await;

        let err = get_agent(State(state.clone()), Tenant("globex".to_string()), Path(agent.id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let Json(listed) = list_agents(State(state.clone()), Tenant("globex".to_string())).await.unwrap();
        assert!(listed.is_empty());
        let Json(listed) = list_agents(State(state), acme()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_id_is_bad_request() {
        let err = get_agent(State(state(true)), acme(), Path("not-a-ulid".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_validates_transition() {
        let state = state(true);
        let agent = active_agent(&state).await;

        let Json(updated) = update_agent(
            State(state.clone()),
            acme(),
            Path(agent.id.to_string()),
            Json(UpdateAgentRequest {
                name: Some("Renamed".to_string()),
                status: Some(AgentStatus::Inactive),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, AgentStatus::Inactive);

        // inactive -> error is not allowed
        let err = update_agent(
            State(state),
            acme(),
            Path(agent.id.to_string()),
            Json(UpdateAgentRequest {
                status: Some(AgentStatus::Error),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_agent() {
        let state = state(true);
        let agent = active_agent(&state).await;

        let status = delete_agent(State(state.clone()), acme(), Path(agent.id.to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.store.load_agent(agent.id).await.unwrap().is_none());

        let err = delete_agent(State(state), acme(), Path(agent.id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_analyze_records_task_and_latency() {
        let state = state(true);
        let agent = active_agent(&state).await;

        let Json(response) = analyze(
            State(state.clone()),
            acme(),
            Path(agent.id.to_string()),
            Json(AnalyzeRequest {
                text: "a great product".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.predictions[0].label, "POSITIVE");

        let task = state.store.load_task(response.task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        let samples = state.store.fetch_samples(&RecordFilter::tenant("acme")).await.unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].metric_type, agentops_core::RESPONSE_TIME);
    }

    #[tokio::test]
    async fn test_analyze_succeeds_when_sample_write_fails() {
        let store = Arc::new(ScriptedStore {
            fail_samples: true,
            ..Default::default()
        });
        let mut agent = AgentRecord::new("acme", "Sentiment", "sentiment-analysis");
        agent.transition_to(AgentStatus::Active).unwrap();
        store.inner.save_agent(&agent).await.unwrap();
        let state = AppState::new(store.clone(), Arc::new(StubAnalyzer { healthy: true }));

        let Json(response) = analyze(
            State(state),
            acme(),
            Path(agent.id.to_string()),
            Json(AnalyzeRequest {
                text: "a great product".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.predictions[0].label, "POSITIVE");

        let task = store.inner.load_task(response.task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(store.inner.fetch_samples(&RecordFilter::tenant("acme")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_failure_logs_error() {
        let state = state(false);
        let agent = active_agent(&state).await;

        let err = analyze(
            State(state.clone()),
            acme(),
            Path(agent.id.to_string()),
            Json(AnalyzeRequest {
                text: "hello".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let tasks = state.store.fetch_tasks(&RecordFilter::tenant("acme")).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Failed);
        let errors = state.store.fetch_error_logs(&RecordFilter::tenant("acme")).await.unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("inference API error"));
    }

    #[tokio::test]
    async fn test_analyze_requires_active_agent_and_text() {
        let state = state(true);
        let deploying = AgentRecord::new("acme", "New", "x");
        state.store.save_agent(&deploying).await.unwrap();

        let err = analyze(
            State(state.clone()),
            acme(),
            Path(deploying.id.to_string()),
            Json(AnalyzeRequest { text: "hi".to_string() }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let active = active_agent(&state).await;
        let err = analyze(
            State(state),
            acme(),
            Path(active.id.to_string()),
            Json(AnalyzeRequest { text: "   ".to_string() }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
