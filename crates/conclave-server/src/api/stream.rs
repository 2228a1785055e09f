// ABOUTME: SSE handler streaming display messages to the browser as they are enqueued.
// ABOUTME: Subscribes to the queue's broadcast side, so streaming never drains the polling queue.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use conclave_core::DisplayMessage;
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::app_state::SharedState;

/// Convert a broadcast receiver into an SSE-compatible stream. The event name
/// is the message role; lagged receivers silently skip what they missed.
fn event_stream_from_receiver(
    rx: tokio::sync::broadcast::Receiver<DisplayMessage>,
) -> impl Stream<Item = Result<SseEvent, axum::Error>> {
    BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(message) => {
                let data = serde_json::to_string(&message).ok()?;
                Some(Ok(SseEvent::default().event(message.role.clone()).data(data)))
            }
            Err(e) => {
                tracing::debug!(error = %e, "sse subscriber lagged");
                None
            }
        }
    })
}

/// GET /api/events/stream
pub async fn event_stream(State(state): State<SharedState>) -> impl IntoResponse {
    let stream = event_stream_from_receiver(state.queue.subscribe());
    Sse::new(stream).keep_alive(KeepAlive::default())
}
