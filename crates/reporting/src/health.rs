//! Weighted system health score.

use agentops_core::{AgentRecord, AgentStatus, TaskRecord, TaskStatus};
use serde::{Deserialize, Serialize};

use crate::stats;

const AVAILABILITY_WEIGHT: f64 = 40.0;
const SUCCESS_WEIGHT: f64 = 40.0;
const RESPONSE_WEIGHT: f64 = 20.0;

/// Every 10 ms of average response time costs one point of the response
/// factor; the factor reaches zero at 1000 ms. Fixed calibration.
const RESPONSE_MS_PER_POINT: f64 = 10.0;

/// Health bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// score >= 80
    Excellent,
    /// score >= 60
    Good,
    /// score >= 40
    Fair,
    /// score < 40
    Poor,
}

impl HealthStatus {
    /// Bucket for a 0-100 score.
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => HealthStatus::Excellent,
            60..=79 => HealthStatus::Good,
            40..=59 => HealthStatus::Fair,
            _ => HealthStatus::Poor,
        }
    }
}

/// Health score together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Rounded 0-100 score
    pub score: u32,
    /// Bucket
    pub status: HealthStatus,
    /// `active / max(total, 1)`
    pub agent_availability: f64,
    /// `completed / max(total, 1)`
    pub task_success_rate: f64,
    /// `max(0, 100 - avg_ms / 10) / 100`
    pub response_time_factor: f64,
    /// Mean of the response-time samples
    pub avg_response_time_ms: f64,
    /// Number of agents considered
    pub total_agents: usize,
    /// Number of active agents
    pub active_agents: usize,
    /// Number of tasks considered
    pub total_tasks: usize,
    /// Number of completed tasks
    pub completed_tasks: usize,
}

/// Response-time factor in `[0, 1]`.
pub fn response_time_factor(avg_response_time_ms: f64) -> f64 {
    (100.0 - avg_response_time_ms / RESPONSE_MS_PER_POINT).max(0.0) / 100.0
}

/// Unrounded score from the three ratios.
pub fn weighted_score(agent_availability: f64, task_success_rate: f64, avg_response_time_ms: f64) -> f64 {
    AVAILABILITY_WEIGHT * agent_availability
        + SUCCESS_WEIGHT * task_success_rate
        + RESPONSE_WEIGHT * response_time_factor(avg_response_time_ms)
}

/// Score agents, recent tasks and recent response times.
pub fn health_score(agents: &[AgentRecord], tasks: &[TaskRecord], response_times: &[f64]) -> HealthScore {
    let total_agents = agents.len();
    let active_agents = agents.iter().filter(|a| a.status == AgentStatus::Active).count();
    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();

    let agent_availability = active_agents as f64 / total_agents.max(1) as f64;
    let task_success_rate = completed_tasks as f64 / total_tasks.max(1) as f64;
    let avg_response_time_ms = stats::mean(response_times);

    let score = weighted_score(agent_availability, task_success_rate, avg_response_time_ms)
        .round()
        .clamp(0.0, 100.0) as u32;

    HealthScore {
        score,
        status: HealthStatus::from_score(score),
        agent_availability,
        task_success_rate,
        response_time_factor: response_time_factor(avg_response_time_ms),
        avg_response_time_ms,
        total_agents,
        active_agents,
        total_tasks,
        completed_tasks,
    }
}
