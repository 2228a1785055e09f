// ABOUTME: Debate status and cancellation handlers.
// ABOUTME: Status reports the debating flag, puzzle, roster size, and the last finished outcome.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::app_state::SharedState;

/// GET /api/debate
pub async fn debate_status(State(state): State<SharedState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(serde_json::json!({
        "debating": session.is_debating(),
        "debate_id": session.active_debate().map(|id| id.to_string()),
        "puzzle": session.puzzle(),
        "card_count": session.cards().len(),
        "last_outcome": session.last_outcome(),
    }))
}

/// POST /api/debate/cancel - Stop the running debate at its next turn boundary.
pub async fn cancel_debate(State(state): State<SharedState>) -> impl IntoResponse {
    match state.cancel_debate().await {
        Some(debate_id) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "status": "cancelling",
                "debate_id": debate_id.to_string(),
            })),
        ),
        None => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "status": "error",
                "message": "no debate is running",
            })),
        ),
    }
}
