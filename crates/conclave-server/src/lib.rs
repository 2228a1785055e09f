// ABOUTME: HTTP server for conclave: card and puzzle intake, polling, push relay, and SSE.
// ABOUTME: Uses Axum with one shared session guarded by a mutex; debates run on background tasks.

pub mod api;
pub mod app_state;
pub mod config;
pub mod providers;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_env;

pub use app_state::{AppState, SharedState};
pub use config::{ConclaveConfig, ConfigError};
pub use providers::ProviderStatus;
pub use routes::create_router;
