//! HTTP routes.

pub mod agents;
pub mod performance;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Liveness probe.
async fn health_check() -> &'static str {
    "OK"
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/agents", get(agents::list_agents).post(agents::create_agent))
        .route(
            "/api/v1/agents/:id",
            get(agents::get_agent)
                .patch(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route("/api/v1/agents/:id/analyze", post(agents::analyze))
        .route("/api/v1/performance/report", get(performance::report))
        .route("/api/v1/performance/anomalies", get(performance::anomalies))
        .route("/api/v1/performance/health", get(performance::health))
        .route("/api/v1/performance/capacity", get(performance::capacity))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
