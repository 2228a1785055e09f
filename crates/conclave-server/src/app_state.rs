// ABOUTME: Shared application state for the conclave HTTP server.
// ABOUTME: Holds the single debate session, the outbound queue, the model client, and the running debate's cancel handle.

use std::sync::Arc;

use conclave_agent::{
    DebateConfig, DebateEngine, FanoutSink, HttpPushSink, MessageSink, ModelClient, QueueSink,
};
use conclave_core::{DebateSession, MessageQueue, SessionError};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use ulid::Ulid;

use crate::providers::ProviderStatus;

/// The debate currently running on a background task.
pub struct ActiveDebate {
    pub debate_id: Ulid,
    pub cancel: CancellationToken,
}

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    /// Roster, puzzle, and the debating flag. Every state transition happens
    /// under this lock.
    pub session: Mutex<DebateSession>,
    pub queue: MessageQueue,
    pub client: Arc<dyn ModelClient>,
    pub debate_config: DebateConfig,
    pub push_url: Option<String>,
    pub active: Mutex<Option<ActiveDebate>>,
    pub provider_status: ProviderStatus,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        client: Arc<dyn ModelClient>,
        debate_config: DebateConfig,
        provider_status: ProviderStatus,
    ) -> Self {
        Self {
            session: Mutex::new(DebateSession::new()),
            queue: MessageQueue::new(),
            client,
            debate_config,
            push_url: None,
            active: Mutex::new(None),
            provider_status,
        }
    }

    /// Also push every debate message to a remote `/api/message` receiver.
    pub fn with_push_url(mut self, push_url: Option<String>) -> Self {
        self.push_url = push_url;
        self
    }

    fn sink(&self) -> Arc<dyn MessageSink> {
        let queue_sink: Arc<dyn MessageSink> = Arc::new(QueueSink::new(self.queue.clone()));
        match &self.push_url {
            Some(url) => Arc::new(
                FanoutSink::new()
                    .with(queue_sink)
                    .with(Arc::new(HttpPushSink::new(url))),
            ),
            None => queue_sink,
        }
    }

    /// Admit the puzzle and launch a debate on a background task. Returns as
    /// soon as the session has moved to running; the task records the
    /// outcome and returns the session to idle when the debate ends.
    pub async fn start_debate(self: &Arc<Self>, puzzle: &str) -> Result<Ulid, SessionError> {
        let mut session = self.session.lock().await;
        let ticket = session.begin(puzzle)?;
        let debate_id = ticket.debate_id;

        let cancel = CancellationToken::new();
        *self.active.lock().await = Some(ActiveDebate {
            debate_id,
            cancel: cancel.clone(),
        });

        let engine = DebateEngine::new(
            Arc::clone(&self.client),
            self.sink(),
            self.debate_config.clone(),
        )
        .with_cancellation(cancel);

        let runner = tokio::spawn(async move { engine.run_ticket(&ticket).await });

        let state = Arc::clone(self);
        tokio::spawn(async move {
            let result = runner.await;
            {
                let mut session = state.session.lock().await;
                match result {
                    Ok(Ok(outcome)) => {
                        session.finish(outcome);
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(%debate_id, error = %e, "debate rejected by engine");
                        session.abandon(debate_id);
                    }
                    Err(e) => {
                        tracing::error!(%debate_id, error = %e, "debate task failed");
                        session.abandon(debate_id);
                    }
                }
            }
            let mut active = state.active.lock().await;
            if active.as_ref().is_some_and(|a| a.debate_id == debate_id) {
                *active = None;
            }
        });

        drop(session);
        tracing::info!(%debate_id, "debate launched");
        Ok(debate_id)
    }

    /// Ask the running debate to stop at its next turn boundary. Returns the
    /// debate id, or None when nothing is running.
    pub async fn cancel_debate(&self) -> Option<Ulid> {
        let active = self.active.lock().await;
        let debate = active.as_ref()?;
        debate.cancel.cancel();
        tracing::warn!(debate_id = %debate.debate_id, "debate cancellation requested");
        Some(debate.debate_id)
    }

    pub async fn is_debating(&self) -> bool {
        self.session.lock().await.is_debating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_agent::testing::ScriptedModelClient;
    use conclave_core::{DebateState, ParticipantCard, Role, ValidationError};
    use std::time::Duration;

    fn state(client: ScriptedModelClient, rounds: u32) -> SharedState {
        Arc::new(AppState::new(
            Arc::new(client),
            DebateConfig::default()
                .with_max_rounds(rounds)
                .with_shuffle_seed(1),
            ProviderStatus::from_credentials(&conclave_agent::ProviderCredentials::empty()),
        ))
    }

    async fn seed_cards(state: &SharedState) {
        state.session.lock().await.add_cards(vec![
            ParticipantCard::new("openai", "maths", "calm", Role::Facilitator),
            ParticipantCard::new("gemini", "logic", "blunt", Role::Critic),
        ]);
    }

    async fn wait_until_idle(state: &SharedState) {
        for _ in 0..200 {
            if !state.is_debating().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("debate did not finish");
    }

    #[tokio::test(start_paused = true)]
    async fn debate_runs_to_outcome_and_returns_to_idle() {
        let client = ScriptedModelClient::new("We need more discussion")
            .with_reply("openai", "4. That is the answer.");
        let state = state(client, 3);
        seed_cards(&state).await;

        let debate_id = state.start_debate("2+2?").await.unwrap();
        wait_until_idle(&state).await;

        let session = state.session.lock().await;
        let outcome = session.last_outcome().unwrap();
        assert_eq!(outcome.debate_id, debate_id);
        assert_eq!(outcome.state, DebateState::Concluded);
        assert_eq!(outcome.rounds_completed, 1);
        drop(session);

        assert!(state.active.lock().await.is_none());
        // start, round 1, critic, facilitator, concluded
        assert_eq!(state.queue.len().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn second_submission_while_running_is_busy() {
        let state = state(ScriptedModelClient::new("We need more discussion"), 4);
        seed_cards(&state).await;

        state.start_debate("first").await.unwrap();
        let err = state.start_debate("second").await.unwrap_err();

        assert_eq!(err, SessionError::Busy);
        assert_eq!(state.session.lock().await.puzzle(), Some("first"));
        wait_until_idle(&state).await;
    }

    #[tokio::test]
    async fn invalid_roster_leaves_session_idle() {
        let state = state(ScriptedModelClient::new("x"), 1);

        let err = state.start_debate("2+2?").await.unwrap_err();

        assert_eq!(
            err,
            SessionError::Validation(ValidationError::TooFewCards { found: 0 })
        );
        assert!(!state.is_debating().await);
        assert!(state.active.lock().await.is_none());
        assert!(state.queue.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_a_running_debate() {
        let state = state(ScriptedModelClient::new("We need more discussion"), 4);
        seed_cards(&state).await;

        assert!(state.cancel_debate().await.is_none());

        let debate_id = state.start_debate("2+2?").await.unwrap();
        assert_eq!(state.cancel_debate().await, Some(debate_id));
        wait_until_idle(&state).await;

        let session = state.session.lock().await;
        let outcome = session.last_outcome().unwrap();
        assert_eq!(outcome.state, DebateState::Aborted);
        assert!(outcome.rounds_completed < 4);
    }
}
