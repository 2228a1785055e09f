// ABOUTME: Message sinks that receive every display message the debate engine emits.
// ABOUTME: Polling queue, in-process callback, HTTP push, tracing log, and a fan-out combinator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use conclave_core::{DisplayMessage, MessageQueue};

/// Upper bound on one push delivery.
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("push to {url} failed: {reason}")]
    Push { url: String, reason: String },

    #[error("callback failed: {0}")]
    Callback(String),
}

/// Consumer of debate output. Delivery is best-effort: a sink swallows and
/// logs its own failures and never fails the debate.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, message: &DisplayMessage);
}

/// Enqueues onto the polling queue.
#[derive(Debug, Clone)]
pub struct QueueSink {
    queue: MessageQueue,
}

impl QueueSink {
    pub fn new(queue: MessageQueue) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl MessageSink for QueueSink {
    async fn deliver(&self, message: &DisplayMessage) {
        self.queue.push(message.clone()).await;
    }
}

/// Calls a closure synchronously, once per message.
pub struct CallbackSink<F> {
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: Fn(&DisplayMessage) -> Result<(), DeliveryError> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> MessageSink for CallbackSink<F>
where
    F: Fn(&DisplayMessage) -> Result<(), DeliveryError> + Send + Sync,
{
    async fn deliver(&self, message: &DisplayMessage) {
        if let Err(e) = (self.callback)(message) {
            tracing::warn!(role = %message.role, error = %e, "message callback failed");
        }
    }
}

#[derive(Debug, Serialize)]
struct PushBody<'a> {
    role: &'a str,
    message: String,
    colour: &'a str,
}

/// Fire-and-forget POST of `{role, message, colour}` to a remote
/// `/api/message` endpoint. Failures, including timeouts, are dropped after
/// a warning.
pub struct HttpPushSink {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpPushSink {
    /// `base_url` is the server root; the message path is appended.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, PUSH_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default HTTP client for push");
                reqwest::Client::new()
            });
        Self {
            client,
            endpoint: format!("{}/api/message", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Attempt one delivery and report the failure instead of swallowing it.
    pub async fn try_deliver(&self, message: &DisplayMessage) -> Result<(), DeliveryError> {
        let body = PushBody {
            role: &message.role,
            message: message.display_text(),
            colour: &message.colour,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Push {
                url: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DeliveryError::Push {
                url: self.endpoint.clone(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSink for HttpPushSink {
    async fn deliver(&self, message: &DisplayMessage) {
        if let Err(e) = self.try_deliver(message).await {
            tracing::warn!(error = %e, "dropping undeliverable debate message");
        }
    }
}

/// Writes each message to the log. Used by the one-shot CLI.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

#[async_trait]
impl MessageSink for TracingSink {
    async fn deliver(&self, message: &DisplayMessage) {
        tracing::info!(role = %message.role, "{}", message.display_text());
    }
}

/// Delivers to several sinks in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn MessageSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl MessageSink for FanoutSink {
    async fn deliver(&self, message: &DisplayMessage) {
        for sink in &self.sinks {
            sink.deliver(message).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::routing::post;

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn record(State(received): State<Received>, Json(body): Json<serde_json::Value>) {
        received.lock().unwrap().push(body);
    }

    /// Spin up a local receiver and return its base URL.
    async fn spawn_receiver(received: Received) -> String {
        let app = Router::new()
            .route("/api/message", post(record))
            .with_state(received);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn queue_sink_enqueues() {
        let queue = MessageQueue::new();
        let sink = QueueSink::new(queue.clone());

        sink.deliver(&DisplayMessage::system("hello")).await;

        assert_eq!(queue.poll().await.text, "hello");
    }

    #[tokio::test]
    async fn callback_failure_is_swallowed() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let sink = CallbackSink::new(move |_msg: &DisplayMessage| {
            *counter.lock().unwrap() += 1;
            Err(DeliveryError::Callback("socket closed".to_string()))
        });

        sink.deliver(&DisplayMessage::system("one")).await;
        sink.deliver(&DisplayMessage::system("two")).await;

        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn push_sink_posts_role_message_colour() {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let base_url = spawn_receiver(Arc::clone(&received)).await;
        let sink = HttpPushSink::new(&base_url);

        sink.try_deliver(&DisplayMessage::new("critic", "gemini", "No way."))
            .await
            .unwrap();

        let bodies = received.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["role"], "critic");
        assert_eq!(bodies[0]["message"], "[gemini] No way.");
        assert_eq!(bodies[0]["colour"], "#00FF00");
    }

    #[tokio::test]
    async fn push_sink_to_dead_endpoint_reports_but_deliver_does_not_fail() {
        // Grab a free port, then close it so nothing is listening there.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = HttpPushSink::with_timeout(&format!("http://{}", addr), Duration::from_millis(500));
        let msg = DisplayMessage::system("anyone there?");

        assert!(sink.try_deliver(&msg).await.is_err());
        sink.deliver(&msg).await;
    }

    #[tokio::test]
    async fn push_sink_gives_up_on_a_stalled_receiver() {
        let app = Router::new().route(
            "/api/message",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let sink = HttpPushSink::with_timeout(&format!("http://{}", addr), Duration::from_millis(200));
        let started = std::time::Instant::now();
        let err = sink
            .try_deliver(&DisplayMessage::system("slow"))
            .await
            .unwrap_err();

        assert!(matches!(err, DeliveryError::Push { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn fanout_delivers_to_every_sink() {
        let first = MessageQueue::new();
        let second = MessageQueue::new();
        let sink = FanoutSink::new()
            .with(Arc::new(QueueSink::new(first.clone())))
            .with(Arc::new(QueueSink::new(second.clone())));
        assert_eq!(sink.len(), 2);

        sink.deliver(&DisplayMessage::system("both")).await;

        assert_eq!(first.len().await, 1);
        assert_eq!(second.len().await, 1);
    }

    #[test]
    fn push_endpoint_appends_message_path() {
        let sink = HttpPushSink::new("http://127.0.0.1:5000/");
        assert_eq!(sink.endpoint(), "http://127.0.0.1:5000/api/message");
    }
}
