// ABOUTME: Puzzle intake handler: admits a puzzle and launches a debate in the background.
// ABOUTME: Busy sessions answer 409; puzzles the roster cannot support answer 422.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::api::session_error;
use crate::app_state::SharedState;

#[derive(Debug, Deserialize)]
pub struct PuzzleSubmission {
    #[serde(default)]
    pub puzzle: String,
}

/// POST /api/puzzle - Start a debate on the current roster.
pub async fn submit_puzzle(
    State(state): State<SharedState>,
    Json(req): Json<PuzzleSubmission>,
) -> impl IntoResponse {
    match state.start_debate(&req.puzzle).await {
        Ok(debate_id) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "status": "started",
                "debate_id": debate_id.to_string(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "puzzle rejected");
            session_error(&e)
        }
    }
}
