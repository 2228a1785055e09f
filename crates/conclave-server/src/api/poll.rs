// ABOUTME: Poll handler: hands the browser the oldest pending display message, one per call.
// ABOUTME: An empty queue yields empty text and colour rather than an error.

use axum::Json;
use axum::extract::State;
use conclave_core::PollPayload;

use crate::app_state::SharedState;

/// GET /api/poll
pub async fn poll_message(State(state): State<SharedState>) -> Json<PollPayload> {
    Json(state.queue.poll().await)
}
