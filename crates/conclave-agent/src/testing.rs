// ABOUTME: Deterministic stand-ins for the model client and message sink.
// ABOUTME: Used by engine, server, and end-to-end tests so no test touches a real vendor API.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use conclave_core::DisplayMessage;

use crate::prompt::ChatMessage;
use crate::runtime::{AdapterError, ModelClient};
use crate::sink::MessageSink;

/// One call the scripted client received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model_id: String,
    pub messages: Vec<ChatMessage>,
    pub at: Instant,
    pub finished_at: Instant,
}

struct CancelTrigger {
    after_calls: usize,
    token: CancellationToken,
}

/// Replies from per-model queues, falling back to a fixed reply once a
/// model's queue is empty.
pub struct ScriptedModelClient {
    scripts: Mutex<HashMap<String, VecDeque<Result<String, AdapterError>>>>,
    fallback: Result<String, AdapterError>,
    calls: Mutex<Vec<RecordedCall>>,
    trigger: Mutex<Option<CancelTrigger>>,
    latency: Duration,
}

impl ScriptedModelClient {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback: Ok(fallback.into()),
            calls: Mutex::new(Vec::new()),
            trigger: Mutex::new(None),
            latency: Duration::ZERO,
        }
    }

    /// A client whose every unscripted call fails.
    pub fn failing(error: AdapterError) -> Self {
        Self {
            fallback: Err(error),
            ..Self::new("")
        }
    }

    pub fn with_reply(self, model_id: &str, reply: impl Into<String>) -> Self {
        self.enqueue(model_id, Ok(reply.into()));
        self
    }

    pub fn with_error(self, model_id: &str, error: AdapterError) -> Self {
        self.enqueue(model_id, Err(error));
        self
    }

    /// Make every call take this long before it answers.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Cancel `token` as soon as the given number of calls has completed.
    pub fn cancel_after(&self, after_calls: usize, token: CancellationToken) {
        *lock(&self.trigger) = Some(CancelTrigger { after_calls, token });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    fn enqueue(&self, model_id: &str, reply: Result<String, AdapterError>) {
        lock(&self.scripts)
            .entry(model_id.to_string())
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn complete(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<String, AdapterError> {
        let reply = lock(&self.scripts)
            .get_mut(model_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| self.fallback.clone());

        let at = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let count = {
            let mut calls = lock(&self.calls);
            calls.push(RecordedCall {
                model_id: model_id.to_string(),
                messages: messages.to_vec(),
                at,
                finished_at: Instant::now(),
            });
            calls.len()
        };

        if let Some(trigger) = lock(&self.trigger).as_ref()
            && count >= trigger.after_calls
        {
            trigger.token.cancel();
        }

        reply
    }
}

/// Collects every delivered message in order.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<DisplayMessage>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<DisplayMessage> {
        lock(&self.messages).clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(&self, message: &DisplayMessage) {
        lock(&self.messages).push(message.clone());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
