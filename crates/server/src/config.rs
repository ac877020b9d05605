//! Server configuration from flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use agentops_inference::InferenceConfig;
use clap::Parser;

/// AgentOps HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "agentops-server")]
#[command(about = "AgentOps API - agent management and performance reporting", long_about = None)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "AGENTOPS_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory for the JSON store; records are kept in memory when unset
    #[arg(long, env = "AGENTOPS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Inference provider base URL
    #[arg(long, env = "AGENTOPS_INFERENCE_URL", default_value = "https://api-inference.huggingface.co")]
    pub inference_url: String,

    /// Model served by the provider
    #[arg(
        long,
        env = "AGENTOPS_INFERENCE_MODEL",
        default_value = "distilbert-base-uncased-finetuned-sst-2-english"
    )]
    pub inference_model: String,

    /// Bearer token for the provider
    #[arg(long, env = "AGENTOPS_INFERENCE_TOKEN", hide_env_values = true)]
    pub inference_token: Option<String>,

    /// Inference request timeout in seconds
    #[arg(long, env = "AGENTOPS_INFERENCE_TIMEOUT_SECS", default_value_t = 30)]
    pub inference_timeout_secs: u64,
}

impl ServerConfig {
    /// Settings for the inference client.
    pub fn inference(&self) -> InferenceConfig {
        InferenceConfig {
            base_url: self.inference_url.clone(),
            model: self.inference_model.clone(),
            api_token: self.inference_token.clone(),
            timeout: Duration::from_secs(self.inference_timeout_secs),
        }
    }
}
