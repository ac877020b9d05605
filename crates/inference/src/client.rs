//! HTTP client for hosted classification models.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{InferenceError, Prediction, Result, TextAnalyzer};

/// Connection settings for [`InferenceClient`].
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Provider base URL, without trailing slash
    pub base_url: String,
    /// Model path appended after `/models/`
    pub model: String,
    /// Bearer token, if the provider needs one
    pub api_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co".to_string(),
            model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            api_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Inference API client.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    config: InferenceConfig,
}

impl InferenceClient {
    /// Create a client from `config`.
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(config.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Endpoint of the configured model.
    pub fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl TextAnalyzer for InferenceClient {
    async fn analyze(&self, text: &str) -> Result<Vec<Prediction>> {
        debug!(model = %self.config.model, chars = text.len(), "Calling inference API");

        let response = self
            .authorized(self.client.post(self.model_url()))
            .json(&json!({ "inputs": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Inference API returned an error");
            return Err(InferenceError::Api { status, body });
        }

        let body: serde_json::Value = response.json().await?;
        parse_predictions(body)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .authorized(self.client.get(self.model_url()))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api { status, body });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionShape {
    Flat(Vec<Prediction>),
    Nested(Vec<Vec<Prediction>>),
}

/// Read a classification response.
///
/// Providers answer single inputs with either `[{label, score}, ...]` or
/// `[[{label, score}, ...]]`; both yield the same predictions. Nested lists
/// are flattened in order.
pub fn parse_predictions(body: serde_json::Value) -> Result<Vec<Prediction>> {
    match serde_json::from_value::<PredictionShape>(body.clone()) {
        Ok(PredictionShape::Flat(predictions)) => Ok(predictions),
        Ok(PredictionShape::Nested(groups)) => Ok(groups.into_iter().flatten().collect()),
        Err(_) => Err(InferenceError::InvalidResponse(body.to_string())),
    }
}
