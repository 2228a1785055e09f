// ABOUTME: API module containing all HTTP handler functions for the conclave REST API.
// ABOUTME: Sub-modules cover the card deck, puzzle intake, polling, push relay, debate control, and SSE.

pub mod debate;
pub mod deck;
pub mod message;
pub mod poll;
pub mod puzzle;
pub mod stream;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use conclave_core::{SessionError, ValidationError};

/// 422 with the validation message, plus the offending card index and field
/// when there is one.
pub(crate) fn validation_error(err: &ValidationError) -> Response {
    let mut body = serde_json::json!({ "status": "error", "message": err.to_string() });
    if let ValidationError::MissingField { index, field } = err {
        body["index"] = serde_json::json!(index);
        body["field"] = serde_json::json!(field);
    }
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

pub(crate) fn session_error(err: &SessionError) -> Response {
    match err {
        SessionError::Busy => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "status": "error", "message": err.to_string() })),
        )
            .into_response(),
        SessionError::Validation(e) => validation_error(e),
    }
}
