// ABOUTME: Route definitions for the conclave HTTP API and static UI.
// ABOUTME: Assembles API routes, SSE, and a static-file fallback into one Axum Router with tracing and CORS.

use std::path::Path;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;
use crate::providers::ProviderStatus;

/// Build the complete Axum router. Any path not matched by the API is served
/// from `static_dir`, falling back to its `index.html` for client-side routes.
pub fn create_router(state: SharedState, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();
    let static_files =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(health))
        .route("/api/providers", get(providers))
        .route(
            "/api/deck",
            get(api::deck::list_cards).post(api::deck::submit_cards),
        )
        .route("/api/puzzle", post(api::puzzle::submit_puzzle))
        .route("/api/poll", get(api::poll::poll_message))
        .route("/api/message", post(api::message::receive_message))
        .route("/api/debate", get(api::debate::debate_status))
        .route("/api/debate/cancel", post(api::debate::cancel_debate))
        .route("/api/events/stream", get(api::stream::event_stream))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Which providers are configured. Key values are never included.
async fn providers(State(state): State<SharedState>) -> Json<ProviderStatus> {
    Json(state.provider_status.clone())
}
