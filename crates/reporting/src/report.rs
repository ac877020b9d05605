//! Performance report composition.
//!
//! [`compose_report`] is a read-only view over collections the caller has
//! already fetched for one time window.

use std::collections::{BTreeMap, HashMap};

use agentops_core::{
    AgentId, AgentRecord, AgentStatus, ErrorLog, MetricSample, TaskRecord, TaskStatus, Time,
    Timeframe, RESPONSE_TIME,
};
use serde::{Deserialize, Serialize};

use crate::aggregator::{aggregate, values_of, MetricSummary};
use crate::recommendation::{Priority, Recommendation};
use crate::stats;

/// Number of equal-width trend buckets the window is split into.
pub const TREND_BUCKETS: usize = 10;

/// How many error classes the error analysis lists.
pub const TOP_ERRORS: usize = 5;

const SLOW_RESPONSE_MS: f64 = 1000.0;
const MAX_ERROR_RATE_PERCENT: f64 = 5.0;

/// Records of one window, as fetched from the store.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    /// Requested timeframe
    pub timeframe: Timeframe,
    /// Window start (inclusive)
    pub start: Time,
    /// Window end (exclusive)
    pub end: Time,
    /// Agents of the tenant
    pub agents: &'a [AgentRecord],
    /// Tasks created in the window
    pub tasks: &'a [TaskRecord],
    /// Samples taken in the window
    pub samples: &'a [MetricSample],
    /// Errors logged in the window
    pub errors: &'a [ErrorLog],
}

/// Reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Inclusive start
    pub start: Time,
    /// Exclusive end
    pub end: Time,
}

/// Headline counts across all records of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Agents of the tenant
    pub total_agents: usize,
    /// Agents in `active`
    pub active_agents: usize,
    /// Agents in `inactive`
    pub inactive_agents: usize,
    /// Tasks in the window
    pub total_tasks: usize,
    /// Completed tasks
    pub completed_tasks: usize,
    /// Failed tasks
    pub failed_tasks: usize,
    /// Completed tasks as a percentage of all tasks
    pub success_rate: f64,
    /// Failed tasks as a percentage of all tasks
    pub error_rate: f64,
    /// Samples in the window
    pub total_metrics: usize,
    /// Error logs in the window
    pub total_errors: usize,
    /// Mean of the response-time samples
    pub avg_response_time_ms: f64,
}

/// Per-agent breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPerformance {
    /// Agent
    pub agent_id: AgentId,
    /// Agent name
    pub name: String,
    /// Agent type
    #[serde(rename = "type")]
    pub agent_type: String,
    /// Agent status
    pub status: AgentStatus,
    /// Tasks in the window
    pub total_tasks: usize,
    /// Completed tasks
    pub completed_tasks: usize,
    /// Failed tasks
    pub failed_tasks: usize,
    /// Completed tasks as a percentage of all tasks
    pub success_rate: f64,
    /// Mean duration of finished tasks
    pub avg_task_duration_ms: Option<f64>,
    /// Error logs in the window
    pub error_count: usize,
    /// Per-type metric summaries
    pub metrics: BTreeMap<String, MetricSummary>,
}

/// One slice of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    /// Bucket start
    pub start: Time,
    /// Bucket end
    pub end: Time,
    /// Samples in the bucket
    pub metric_count: usize,
    /// Tasks created in the bucket
    pub task_count: usize,
    /// Completed tasks created in the bucket
    pub completed_tasks: usize,
    /// Mean response time of the bucket's samples
    pub avg_response_time_ms: f64,
}

/// Frequency of one error class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrequency {
    /// Text before the first `:` of the message
    pub message: String,
    /// Occurrences
    pub count: usize,
}

/// Error log breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    /// Error logs in the window
    pub total_errors: usize,
    /// Counts per agent
    pub by_agent: BTreeMap<AgentId, usize>,
    /// Most frequent error classes, most frequent first
    pub top_errors: Vec<ErrorFrequency>,
}

/// Complete performance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Requested timeframe, e.g. "24h"
    pub timeframe: String,
    /// Window covered
    pub period: Period,
    /// Headline counts
    pub summary: ReportSummary,
    /// Per-agent breakdown
    pub agent_performance: Vec<AgentPerformance>,
    /// Window split into equal buckets
    pub trends: Vec<TrendBucket>,
    /// Error breakdown
    pub error_analysis: ErrorAnalysis,
    /// Rule-generated advice
    pub recommendations: Vec<Recommendation>,
}

/// Assemble the report for one window.
pub fn compose_report(inputs: ReportInputs<'_>) -> PerformanceReport {
    let summary = summarize(&inputs);
    let recommendations = recommend(&summary);

    PerformanceReport {
        timeframe: inputs.timeframe.to_string(),
        period: Period {
            start: inputs.start,
            end: inputs.end,
        },
        agent_performance: agent_performance(&inputs),
        trends: trends(&inputs),
        error_analysis: error_analysis(inputs.errors),
        summary,
        recommendations,
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn count_status(tasks: &[&TaskRecord], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

fn summarize(inputs: &ReportInputs<'_>) -> ReportSummary {
    let tasks: Vec<&TaskRecord> = inputs.tasks.iter().collect();
    let completed_tasks = count_status(&tasks, TaskStatus::Completed);
    let failed_tasks = count_status(&tasks, TaskStatus::Failed);

    ReportSummary {
        total_agents: inputs.agents.len(),
        active_agents: inputs.agents.iter().filter(|a| a.status == AgentStatus::Active).count(),
        inactive_agents: inputs.agents.iter().filter(|a| a.status == AgentStatus::Inactive).count(),
        total_tasks: tasks.len(),
        completed_tasks,
        failed_tasks,
        success_rate: percent(completed_tasks, tasks.len()),
        error_rate: percent(failed_tasks, tasks.len()),
        total_metrics: inputs.samples.len(),
        total_errors: inputs.errors.len(),
        avg_response_time_ms: stats::mean(&values_of(inputs.samples, RESPONSE_TIME)),
    }
}

fn agent_performance(inputs: &ReportInputs<'_>) -> Vec<AgentPerformance> {
    let mut tasks_by_agent: HashMap<AgentId, Vec<&TaskRecord>> = HashMap::new();
    for task in inputs.tasks {
        tasks_by_agent.entry(task.agent_id).or_default().push(task);
    }
    let mut samples_by_agent: HashMap<AgentId, Vec<MetricSample>> = HashMap::new();
    for sample in inputs.samples {
        samples_by_agent.entry(sample.agent_id).or_default().push(sample.clone());
    }
    let mut errors_by_agent: HashMap<AgentId, usize> = HashMap::new();
    for log in inputs.errors {
        *errors_by_agent.entry(log.agent_id).or_default() += 1;
    }

    inputs
        .agents
        .iter()
        .map(|agent| {
            let tasks = tasks_by_agent.remove(&agent.id).unwrap_or_default();
            let samples = samples_by_agent.remove(&agent.id).unwrap_or_default();
            let completed_tasks = count_status(&tasks, TaskStatus::Completed);
            let durations: Vec<f64> = tasks
                .iter()
                .filter_map(|t| t.duration_ms())
                .map(|ms| ms as f64)
                .collect();

            AgentPerformance {
                agent_id: agent.id,
                name: agent.name.clone(),
                agent_type: agent.agent_type.clone(),
                status: agent.status,
                total_tasks: tasks.len(),
                completed_tasks,
                failed_tasks: count_status(&tasks, TaskStatus::Failed),
                success_rate: percent(completed_tasks, tasks.len()),
                avg_task_duration_ms: (!durations.is_empty()).then(|| stats::mean(&durations)),
                error_count: errors_by_agent.get(&agent.id).copied().unwrap_or(0),
                metrics: aggregate(&samples),
            }
        })
        .collect()
}

fn trends(inputs: &ReportInputs<'_>) -> Vec<TrendBucket> {
    let span_ms = (inputs.end - inputs.start).num_milliseconds().max(0);
    let bucket_ms = span_ms / TREND_BUCKETS as i64;

    let bucket_of = |at: Time| -> Option<usize> {
        if at < inputs.start || at >= inputs.end || span_ms == 0 {
            return None;
        }
        let offset = (at - inputs.start).num_milliseconds();
        let index = (offset as i128 * TREND_BUCKETS as i128 / span_ms as i128) as usize;
        Some(index.min(TREND_BUCKETS - 1))
    };

    let mut metric_counts = [0usize; TREND_BUCKETS];
    let mut response_times: Vec<Vec<f64>> = vec![Vec::new(); TREND_BUCKETS];
    for sample in inputs.samples {
        if let Some(i) = bucket_of(sample.timestamp) {
            metric_counts[i] += 1;
            if sample.metric_type == RESPONSE_TIME {
                response_times[i].push(sample.value);
            }
        }
    }

    let mut task_counts = [0usize; TREND_BUCKETS];
    let mut completed = [0usize; TREND_BUCKETS];
    for task in inputs.tasks {
        if let Some(i) = bucket_of(task.created_at) {
            task_counts[i] += 1;
            if task.status == TaskStatus::Completed {
                completed[i] += 1;
            }
        }
    }

    (0..TREND_BUCKETS)
        .map(|i| {
            let start = inputs.start + chrono::Duration::milliseconds(bucket_ms * i as i64);
            let end = if i == TREND_BUCKETS - 1 {
                inputs.end
            } else {
                start + chrono::Duration::milliseconds(bucket_ms)
            };
            TrendBucket {
                start,
                end,
                metric_count: metric_counts[i],
                task_count: task_counts[i],
                completed_tasks: completed[i],
                avg_response_time_ms: stats::mean(&response_times[i]),
            }
        })
        .collect()
}

fn error_analysis(errors: &[ErrorLog]) -> ErrorAnalysis {
    let mut by_agent: BTreeMap<AgentId, usize> = BTreeMap::new();
    let mut by_class: HashMap<&str, usize> = HashMap::new();
    for log in errors {
        *by_agent.entry(log.agent_id).or_default() += 1;
        *by_class.entry(log.message_class()).or_default() += 1;
    }

    let mut top_errors: Vec<ErrorFrequency> = by_class
        .into_iter()
        .map(|(message, count)| ErrorFrequency {
            message: message.to_string(),
            count,
        })
        .collect();
    top_errors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));
    top_errors.truncate(TOP_ERRORS);

    ErrorAnalysis {
        total_errors: errors.len(),
        by_agent,
        top_errors,
    }
}

fn recommend(summary: &ReportSummary) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if summary.avg_response_time_ms > SLOW_RESPONSE_MS {
        recommendations.push(Recommendation::new(
            Priority::High,
            "performance",
            format!(
                "Average response time is {:.0}ms; investigate slow agents or scale inference capacity",
                summary.avg_response_time_ms
            ),
        ));
    }
    if summary.error_rate > MAX_ERROR_RATE_PERCENT {
        recommendations.push(Recommendation::new(
            Priority::High,
            "reliability",
            format!(
                "Task error rate is {:.1}%; review error logs and add retries for transient failures",
                summary.error_rate
            ),
        ));
    }
    if summary.inactive_agents > 0 {
        recommendations.push(Recommendation::new(
            Priority::Medium,
            "availability",
            format!(
                "{} agent(s) are inactive; reactivate or remove them",
                summary.inactive_agents
            ),
        ));
    }

    recommendations
}
