//! Text-analysis inference client.
//!
//! The server proxies `analyze` requests through a [`TextAnalyzer`]; the
//! production implementation is [`InferenceClient`], which talks to a hosted
//! classification model over HTTP.

#![warn(missing_docs)]

pub mod client;

pub use client::{InferenceClient, InferenceConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for inference calls.
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Errors raised by the inference layer.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Transport failure (connect, timeout, body read)
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("inference API error (status {status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Provider answered with a body we cannot read
    #[error("unexpected inference response: {0}")]
    InvalidResponse(String),
}

/// One label predicted for a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class label, e.g. "POSITIVE"
    pub label: String,
    /// Confidence in `[0, 1]`
    pub score: f64,
}

/// Text classification backend.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Classify `text`.
    async fn analyze(&self, text: &str) -> Result<Vec<Prediction>>;

    /// Check that the backend is reachable and serving the model.
    async fn health_check(&self) -> Result<()>;
}
