// ABOUTME: FIFO outbound queue shared between the debate task (producer) and the poll endpoint (consumer).
// ABOUTME: Every enqueued message is also broadcast so live SSE subscribers see it without consuming it.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};

use crate::display::{DisplayMessage, PollPayload};

const BROADCAST_CAPACITY: usize = 256;

/// Undrained messages kept for pollers. The oldest is dropped past this.
pub const MAX_PENDING: usize = 1024;

/// Cloneable handle to the process-wide display queue.
#[derive(Debug, Clone)]
pub struct MessageQueue {
    pending: Arc<Mutex<VecDeque<DisplayMessage>>>,
    live_tx: broadcast::Sender<DisplayMessage>,
    capacity: usize,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::with_capacity(MAX_PENDING)
    }

    /// A queue holding at most `capacity` undrained messages (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let (live_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            pending: Arc::new(Mutex::new(VecDeque::new())),
            live_tx,
            capacity: capacity.max(1),
        }
    }

    pub async fn push(&self, message: DisplayMessage) {
        // No live subscribers is the common case for a polling client.
        let _ = self.live_tx.send(message.clone());
        let mut pending = self.pending.lock().await;
        if pending.len() >= self.capacity
            && let Some(dropped) = pending.pop_front()
        {
            tracing::warn!(
                capacity = self.capacity,
                role = %dropped.role,
                "poll queue full, dropping oldest message"
            );
        }
        pending.push_back(message);
    }

    /// Remove and return the oldest pending message, if any.
    pub async fn pop(&self) -> Option<DisplayMessage> {
        self.pending.lock().await.pop_front()
    }

    /// Dequeue at most one message as a poll payload; empty when idle.
    pub async fn poll(&self) -> PollPayload {
        self.pop()
            .await
            .map(|msg| PollPayload::from(&msg))
            .unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DisplayMessage> {
        self.live_tx.subscribe()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn poll_on_empty_queue_returns_empty_payload() {
        let queue = MessageQueue::new();
        let payload = queue.poll().await;
        assert_eq!(payload, PollPayload::default());
        assert!(payload.text.is_empty());
        assert!(payload.colour.is_empty());
    }

    #[tokio::test]
    async fn poll_returns_one_item_in_fifo_order() {
        let queue = MessageQueue::new();
        queue.push(DisplayMessage::system("first")).await;
        queue.push(DisplayMessage::system("second")).await;

        assert_eq!(queue.poll().await.text, "first");
        assert_eq!(queue.len().await, 1);
        assert_eq!(queue.poll().await.text, "second");
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn subscribers_see_messages_without_consuming_them() {
        let queue = MessageQueue::new();
        let mut rx = queue.subscribe();

        queue.push(DisplayMessage::system("hello")).await;

        let live = rx.recv().await.unwrap();
        assert_eq!(live.message, "hello");
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn full_queue_drops_oldest() {
        let queue = MessageQueue::with_capacity(2);
        queue.push(DisplayMessage::system("one")).await;
        queue.push(DisplayMessage::system("two")).await;
        queue.push(DisplayMessage::system("three")).await;

        assert_eq!(queue.len().await, 2);
        assert_eq!(queue.poll().await.text, "two");
        assert_eq!(queue.poll().await.text, "three");
    }

    #[tokio::test]
    async fn clones_share_the_same_queue() {
        let queue = MessageQueue::new();
        let producer = queue.clone();
        producer.push(DisplayMessage::system("shared")).await;
        assert_eq!(queue.pop().await.unwrap().message, "shared");
    }
}
