//! AgentOps API server.

use std::net::SocketAddr;
use std::sync::Arc;

use agentops_inference::InferenceClient;
use agentops_server::{router, AppState, ServerConfig};
use agentops_storage::{DataStore, JsonStore, MemoryStore};
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ServerConfig::parse();

    let store: Arc<dyn DataStore> = match &config.data_dir {
        Some(dir) => {
            info!(data_dir = %dir.display(), "Using JSON store");
            Arc::new(JsonStore::new(dir).await?)
        }
        None => {
            warn!("No data directory configured, records are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };
    let analyzer = Arc::new(InferenceClient::new(config.inference()));
    info!(
        inference_url = %config.inference_url,
        model = %config.inference_model,
        "Inference client configured"
    );

    let app = router(AppState::new(store, analyzer));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(address = %addr, version = env!("CARGO_PKG_VERSION"), "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
