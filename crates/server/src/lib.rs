//! AgentOps HTTP API.
//!
//! Agent management, the text-analysis proxy and the performance reporting
//! endpoints, served with axum over a shared [`AppState`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod tenant;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
pub use tenant::Tenant;
