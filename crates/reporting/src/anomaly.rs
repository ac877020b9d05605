//! Z-score anomaly detection over metric samples.

use agentops_core::{AgentId, MetricId, MetricSample, Time};
use serde::{Deserialize, Serialize};

use crate::aggregator::group_by_type;
use crate::stats;

/// Anomaly threshold tier. Higher sensitivity means a lower z-score cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// z > 3.0
    Low,
    /// z > 2.5
    #[default]
    Medium,
    /// z > 2.0
    High,
}

impl Sensitivity {
    /// Z-score cutoff for this tier.
    pub fn threshold(self) -> f64 {
        match self {
            Sensitivity::Low => 3.0,
            Sensitivity::Medium => 2.5,
            Sensitivity::High => 2.0,
        }
    }

    /// Parse a tier name, falling back to `Medium`.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

/// Error returned when a sensitivity name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensitivity: {0} (expected low, medium or high)")]
pub struct UnknownSensitivity(pub String);

impl std::str::FromStr for Sensitivity {
    type Err = UnknownSensitivity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(UnknownSensitivity(other.to_string())),
        }
    }
}

/// Severity of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    /// Above the threshold
    Medium,
    /// Above 1.5x the threshold
    High,
}

/// A sample whose z-score exceeded the sensitivity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Offending sample
    pub metric_id: MetricId,
    /// Agent that produced it
    pub agent_id: AgentId,
    /// Metric type of the group
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Sample value
    pub observed_value: f64,
    /// `[mean - threshold * std_dev, mean + threshold * std_dev]`
    pub expected_range: [f64; 2],
    /// `|value - mean| / std_dev`
    pub z_score: f64,
    /// Severity tier
    pub severity: AnomalySeverity,
    /// When the sample was taken
    pub timestamp: Time,
}

/// Detect anomalies group by group (groups sorted by type, then sample order).
///
/// Non-finite values are left out of the statistics and never reported. A
/// group with zero (or non-finite) spread cannot contain anomalies.
pub fn detect_anomalies(samples: &[MetricSample], sensitivity: Sensitivity) -> Vec<AnomalyReport> {
    let threshold = sensitivity.threshold();
    let mut anomalies = Vec::new();

    for (metric_type, group) in group_by_type(samples) {
        let group: Vec<&MetricSample> = group.into_iter().filter(|s| s.value.is_finite()).collect();
        let values: Vec<f64> = group.iter().map(|s| s.value).collect();
        let mean = stats::mean(&values);
        let std_dev = stats::population_std_dev(&values);
        if !std_dev.is_finite() || std_dev == 0.0 {
            continue;
        }

        let expected_range = [mean - threshold * std_dev, mean + threshold * std_dev];
        for sample in group {
            let z_score = (sample.value - mean).abs() / std_dev;
            if !(z_score > threshold) {
                continue;
            }
            let severity = if z_score > threshold * 1.5 {
                AnomalySeverity::High
            } else {
                AnomalySeverity::Medium
            };
            anomalies.push(AnomalyReport {
                metric_id: sample.id,
                agent_id: sample.agent_id,
                metric_type: metric_type.to_string(),
                observed_value: sample.value,
                expected_range,
                z_score,
                severity,
                timestamp: sample.timestamp,
            });
        }
    }

    anomalies
}

/// Result of an anomaly scan with per-severity counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScan {
    /// Tier used
    pub sensitivity: Sensitivity,
    /// Z-score cutoff used
    pub threshold: f64,
    /// Number of samples examined
    pub samples_analyzed: usize,
    /// Number of anomalies found
    pub total: usize,
    /// Number of high-severity anomalies
    pub high_severity: usize,
    /// The anomalies
    pub anomalies: Vec<AnomalyReport>,
}

/// Run [`detect_anomalies`] and count the results.
pub fn scan(samples: &[MetricSample], sensitivity: Sensitivity) -> AnomalyScan {
    let anomalies = detect_anomalies(samples, sensitivity);
    AnomalyScan {
        sensitivity,
        threshold: sensitivity.threshold(),
        samples_analyzed: samples.len(),
        total: anomalies.len(),
        high_severity: anomalies
            .iter()
            .filter(|a| a.severity == AnomalySeverity::High)
            .count(),
        anomalies,
    }
}
