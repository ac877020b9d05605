//! Metric samples and error logs recorded by agent handlers.

use serde::{Deserialize, Serialize};

use crate::id::{AgentId, ErrorLogId, MetricId};
use crate::Time;

/// Metric type recorded for every served request, in milliseconds.
pub const RESPONSE_TIME: &str = "response_time";

/// A single timestamped numeric measurement. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Unique identifier
    pub id: MetricId,

    /// Agent that produced the sample
    pub agent_id: AgentId,

    /// Owning tenant
    pub tenant_id: String,

    /// Metric type, e.g. "response_time"
    #[serde(rename = "type")]
    pub metric_type: String,

    /// Measured value
    pub value: f64,

    /// Unit of `value`, e.g. "ms"
    pub unit: String,

    /// When the measurement was taken
    pub timestamp: Time,
}

impl MetricSample {
    /// Create a sample stamped with the current time.
    pub fn new(
        agent_id: AgentId,
        tenant_id: impl Into<String>,
        metric_type: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: MetricId::new(),
            agent_id,
            tenant_id: tenant_id.into(),
            metric_type: metric_type.into(),
            value,
            unit: unit.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// A response-time sample in milliseconds.
    pub fn response_time(agent_id: AgentId, tenant_id: impl Into<String>, millis: f64) -> Self {
        Self::new(agent_id, tenant_id, RESPONSE_TIME, millis, "ms")
    }

    /// Override the timestamp.
    pub fn at(mut self, timestamp: Time) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// An error raised while an agent served a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLog {
    /// Unique identifier
    pub id: ErrorLogId,

    /// Agent that raised the error
    pub agent_id: AgentId,

    /// Owning tenant
    pub tenant_id: String,

    /// Error message
    pub message: String,

    /// When the error happened
    pub timestamp: Time,
}

impl ErrorLog {
    /// Create an error log stamped with the current time.
    pub fn new(agent_id: AgentId, tenant_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: ErrorLogId::new(),
            agent_id,
            tenant_id: tenant_id.into(),
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Override the timestamp.
    pub fn at(mut self, timestamp: Time) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Message class used for grouping: the text before the first `:`.
    pub fn message_class(&self) -> &str {
        let class = self.message.split(':').next().unwrap_or_default().trim();
        if class.is_empty() {
            "unknown"
        } else {
            class
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_class_takes_prefix() {
        let log = ErrorLog::new(AgentId::new(), "t", "TimeoutError: upstream took 30s");
        assert_eq!(log.message_class(), "TimeoutError");
    }

    #[test]
    fn test_message_class_without_colon() {
        let log = ErrorLog::new(AgentId::new(), "t", "  connection refused ");
        assert_eq!(log.message_class(), "connection refused");
    }

    #[test]
    fn test_message_class_empty() {
        let log = ErrorLog::new(AgentId::new(), "t", ": nothing before");
        assert_eq!(log.message_class(), "unknown");
    }

    #[test]
    fn test_sample_type_field_name() {
        let sample = MetricSample::response_time(AgentId::new(), "t", 120.0);
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["type"], RESPONSE_TIME);
        assert_eq!(json["unit"], "ms");
    }
}
