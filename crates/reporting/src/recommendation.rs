//! Rule-generated recommendations.

use serde::{Deserialize, Serialize};

/// Recommendation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Act now
    High,
    /// Plan for it
    Medium,
    /// Nice to have
    Low,
}

/// One actionable recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Priority
    pub priority: Priority,
    /// Area, e.g. "performance" or "reliability"
    pub category: String,
    /// Human-readable advice
    pub message: String,
}

impl Recommendation {
    /// Create a recommendation.
    pub fn new(priority: Priority, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            priority,
            category: category.into(),
            message: message.into(),
        }
    }
}
