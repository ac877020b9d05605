//! Compound-growth capacity projection.

use agentops_core::{TaskRecord, Time};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::recommendation::{Priority, Recommendation};

/// Monthly growth assumed when the caller gives none.
pub const DEFAULT_GROWTH_RATE: f64 = 0.10;

/// Horizon used when the caller gives none.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Days of task history used to measure current throughput.
pub const THROUGHPUT_WINDOW_DAYS: i64 = 7;

/// Days at which the scaling timeline reports a milestone.
pub const CHECKPOINT_DAYS: [u32; 5] = [7, 14, 30, 60, 90];

/// Growth compounds once per this many days.
const GROWTH_PERIOD_DAYS: f64 = 30.0;

/// Inputs to [`project_capacity`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityInputs {
    /// Tasks per day over the trailing window
    pub current_throughput: f64,
    /// Current mean response time
    pub avg_response_time_ms: f64,
    /// Expected growth per 30 days, e.g. 0.1 for 10%
    pub growth_rate: f64,
    /// How far ahead to project
    pub horizon_days: u32,
}

/// Suggested action at a timeline milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingAction {
    /// growth factor > 1.5
    #[serde(rename = "Scale up")]
    ScaleUp,
    /// growth factor > 1.2
    #[serde(rename = "Monitor closely")]
    MonitorClosely,
    /// otherwise
    #[serde(rename = "Normal operation")]
    NormalOperation,
}

impl ScalingAction {
    fn for_growth(growth_factor: f64) -> Self {
        if growth_factor > 1.5 {
            ScalingAction::ScaleUp
        } else if growth_factor > 1.2 {
            ScalingAction::MonitorClosely
        } else {
            ScalingAction::NormalOperation
        }
    }
}

/// Projected state at one checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingMilestone {
    /// Days from now
    pub day: u32,
    /// `(1 + growth_rate)^(day / 30)`
    pub growth_factor: f64,
    /// Throughput at that day
    pub projected_throughput: f64,
    /// Suggested action
    pub action: ScalingAction,
}

/// Capacity projection with recommendations and timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityProjection {
    /// Tasks per day now
    pub current_throughput: f64,
    /// Tasks per day at the horizon
    pub projected_throughput: f64,
    /// Growth rate used
    pub growth_rate: f64,
    /// Horizon in days
    pub horizon_days: u32,
    /// Mean response time now
    pub avg_response_time_ms: f64,
    /// Response time scaled by the throughput ratio
    pub estimated_response_time_ms: f64,
    /// Threshold-triggered advice
    pub recommendations: Vec<Recommendation>,
    /// Milestones up to the horizon
    pub timeline: Vec<ScalingMilestone>,
}

/// Tasks per day created in `[now - 7d, now)`.
pub fn daily_throughput(tasks: &[TaskRecord], now: Time) -> f64 {
    let since = now - Duration::days(THROUGHPUT_WINDOW_DAYS);
    let recent = tasks
        .iter()
        .filter(|t| t.created_at >= since && t.created_at < now)
        .count();
    recent as f64 / THROUGHPUT_WINDOW_DAYS as f64
}

/// `(1 + growth_rate)^(days / 30)`.
///
/// Growth below -100% is treated as -100% and non-finite rates as zero growth.
pub fn growth_factor(growth_rate: f64, days: u32) -> f64 {
    let rate = if growth_rate.is_finite() { growth_rate.max(-1.0) } else { 0.0 };
    (1.0 + rate).powf(f64::from(days) / GROWTH_PERIOD_DAYS)
}

/// Project throughput and response time to the horizon.
pub fn project_capacity(inputs: CapacityInputs) -> CapacityProjection {
    let current = inputs.current_throughput;
    let projected = current * growth_factor(inputs.growth_rate, inputs.horizon_days);
    let ratio = if current == 0.0 { 1.0 } else { projected / current };
    let estimated_response_time_ms = inputs.avg_response_time_ms * ratio;

    let mut recommendations = Vec::new();
    if projected > current * 2.0 {
        recommendations.push(Recommendation::new(
            Priority::High,
            "scaling",
            format!(
                "Scale infrastructure: throughput is projected to grow from {:.1} to {:.1} tasks/day within {} days",
                current, projected, inputs.horizon_days
            ),
        ));
    } else if projected > current * 1.5 {
        recommendations.push(Recommendation::new(
            Priority::Medium,
            "capacity",
            format!(
                "Plan capacity increase: throughput is projected to reach {:.1} tasks/day within {} days",
                projected, inputs.horizon_days
            ),
        ));
    }
    if inputs.avg_response_time_ms > 500.0 {
        recommendations.push(Recommendation::new(
            Priority::Medium,
            "performance",
            format!(
                "Optimize performance: average response time is {:.0}ms",
                inputs.avg_response_time_ms
            ),
        ));
    }

    let timeline = CHECKPOINT_DAYS
        .iter()
        .copied()
        .filter(|day| *day <= inputs.horizon_days)
        .map(|day| {
            let factor = growth_factor(inputs.growth_rate, day);
            ScalingMilestone {
                day,
                growth_factor: factor,
                projected_throughput: current * factor,
                action: ScalingAction::for_growth(factor),
            }
        })
        .collect();

    CapacityProjection {
        current_throughput: current,
        projected_throughput: projected,
        growth_rate: inputs.growth_rate,
        horizon_days: inputs.horizon_days,
        avg_response_time_ms: inputs.avg_response_time_ms,
        estimated_response_time_ms,
        recommendations,
        timeline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentops_core::AgentId;
    use chrono::Utc;

    fn inputs(current: f64, growth_rate: f64, horizon_days: u32) -> CapacityInputs {
        CapacityInputs {
            current_throughput: current,
            avg_response_time_ms: 200.0,
            growth_rate,
            horizon_days,
        }
    }

    #[test]
    fn test_one_period_of_growth() {
        let projection = project_capacity(inputs(10.0, 0.1, 30));
        assert!((projection.projected_throughput - 11.0).abs() < 1e-9);
        assert!((projection.estimated_response_time_ms - 220.0).abs() < 1e-9);
        assert!(projection.recommendations.is_empty());
    }

    #[test]
    fn test_zero_growth_is_identity() {
        for horizon in [0, 1, 7, 45, 365] {
            let projection = project_capacity(inputs(37.5, 0.0, horizon));
            assert_eq!(projection.projected_throughput, 37.5);
            assert_eq!(projection.estimated_response_time_ms, 200.0);
        }
    }

    #[test]
    fn test_zero_throughput_keeps_response_time() {
        let projection = project_capacity(inputs(0.0, 0.5, 90));
        assert_eq!(projection.projected_throughput, 0.0);
        assert_eq!(projection.estimated_response_time_ms, 200.0);
        assert!(projection.recommendations.is_empty());
    }

    #[test]
    fn test_fractional_exponent() {
        // 15 days at 21% monthly growth: 1.21^0.5 = 1.1
        assert!((growth_factor(0.21, 15) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_doubling_triggers_scale_recommendation() {
        let projection = project_capacity(inputs(10.0, 1.0, 60));
        assert_eq!(projection.recommendations.len(), 1);
        assert_eq!(projection.recommendations[0].priority, Priority::High);
        assert_eq!(projection.recommendations[0].category, "scaling");
    }

    #[test]
    fn test_moderate_growth_triggers_plan() {
        // 1.25^2 = 1.5625
        let projection = project_capacity(inputs(10.0, 0.25, 60));
        assert_eq!(projection.recommendations.len(), 1);
        assert_eq!(projection.recommendations[0].category, "capacity");
    }

    #[test]
    fn test_slow_responses_trigger_optimize() {
        let mut slow = inputs(10.0, 0.0, 30);
        slow.avg_response_time_ms = 750.0;
        let projection = project_capacity(slow);
        assert_eq!(projection.recommendations.len(), 1);
        assert_eq!(projection.recommendations[0].category, "performance");
    }

    #[test]
    fn test_timeline_checkpoints_within_horizon() {
        let projection = project_capacity(inputs(10.0, 0.5, 60));
        let days: Vec<u32> = projection.timeline.iter().map(|m| m.day).collect();
        assert_eq!(days, vec![7, 14, 30, 60]);

        let at_30 = &projection.timeline[2];
        assert!((at_30.growth_factor - 1.5).abs() < 1e-9);
        assert!((at_30.projected_throughput - 15.0).abs() < 1e-9);
        // 1.5 is not > 1.5
        assert_eq!(at_30.action, ScalingAction::MonitorClosely);
        assert_eq!(projection.timeline[3].action, ScalingAction::ScaleUp);
        assert_eq!(projection.timeline[0].action, ScalingAction::NormalOperation);
    }

    #[test]
    fn test_short_horizon_has_empty_timeline() {
        assert!(project_capacity(inputs(10.0, 0.1, 6)).timeline.is_empty());
    }

    #[test]
    fn test_daily_throughput_window() {
        let now = Utc::now();
        let agent = AgentId::new();
        let mut tasks: Vec<TaskRecord> = (0..14).map(|_| TaskRecord::new(agent, "t", "analyze")).collect();
        for task in &mut tasks {
            task.created_at = now - Duration::hours(1);
        }
        let mut old = TaskRecord::new(agent, "t", "analyze");
        old.created_at = now - Duration::days(8);
        tasks.push(old);

        assert_eq!(daily_throughput(&tasks, now), 2.0);
        assert_eq!(daily_throughput(&[], now), 0.0);
    }

    #[test]
    fn test_action_serialized_as_label() {
        let json = serde_json::to_string(&ScalingAction::MonitorClosely).unwrap();
        assert_eq!(json, "\"Monitor closely\"");
    }
}
