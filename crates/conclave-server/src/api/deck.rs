// ABOUTME: Card deck handlers: validate and append submitted cards, list the current roster.
// ABOUTME: A single malformed card rejects the whole batch before anything is appended.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use conclave_core::{CardDraft, validate_batch};
use serde::Deserialize;

use crate::api::validation_error;
use crate::app_state::SharedState;

/// Cards arrive either as a bare JSON list or wrapped as `{"cards": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DeckSubmission {
    Bare(Vec<CardDraft>),
    Wrapped { cards: Vec<CardDraft> },
}

impl DeckSubmission {
    pub fn into_drafts(self) -> Vec<CardDraft> {
        match self {
            DeckSubmission::Bare(cards) | DeckSubmission::Wrapped { cards } => cards,
        }
    }
}

/// POST /api/deck - Append a batch of cards to the session roster.
pub async fn submit_cards(
    State(state): State<SharedState>,
    Json(submission): Json<DeckSubmission>,
) -> impl IntoResponse {
    let cards = match validate_batch(submission.into_drafts()) {
        Ok(cards) => cards,
        Err(e) => {
            tracing::warn!(error = %e, "rejected card batch");
            return validation_error(&e);
        }
    };

    let added = cards.len();
    let total = state.session.lock().await.add_cards(cards);
    tracing::info!(added, total, "cards added to roster");

    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "added": added, "total": total })),
    )
        .into_response()
}

/// GET /api/deck - The roster in submission order.
pub async fn list_cards(State(state): State<SharedState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(serde_json::json!({
        "cards": session.cards(),
        "count": session.cards().len(),
    }))
}
