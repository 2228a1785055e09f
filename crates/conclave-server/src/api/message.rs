// ABOUTME: Push receiver: accepts `{role, message, colour?}` from a remote debate runner.
// ABOUTME: Received messages join the polling queue exactly like locally produced ones.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use conclave_core::DisplayMessage;
use serde::Deserialize;

use crate::app_state::SharedState;

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub role: String,
    /// Already formatted for display, model prefix included.
    pub message: String,
    #[serde(default)]
    pub colour: Option<String>,
}

impl IncomingMessage {
    fn into_display(self) -> DisplayMessage {
        let mut display = DisplayMessage::new(self.role, "", self.message);
        if let Some(colour) = self.colour.filter(|c| !c.is_empty()) {
            display.colour = colour;
        }
        display
    }
}

/// POST /api/message
pub async fn receive_message(
    State(state): State<SharedState>,
    Json(incoming): Json<IncomingMessage>,
) -> impl IntoResponse {
    let relayed = incoming.into_display();
    tracing::debug!(role = %relayed.role, "relayed message received");
    state.queue.push(relayed).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}
