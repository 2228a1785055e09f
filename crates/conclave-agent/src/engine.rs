// ABOUTME: DebateEngine drives the round/turn loop: shuffle speakers, call models, grow the transcript.
// ABOUTME: Stops when the facilitator says the termination phrase, rounds run out, or it is cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use ulid::Ulid;

use conclave_core::{
    DebateOutcome, DebateState, DebateStatus, DebateTicket, DisplayMessage, ParticipantCard,
    Roster, Transcript, TurnOutcome, TurnRecord, ValidationError,
};

use crate::prompt::{build_system_prompt, build_turn_messages, is_termination};
use crate::runtime::ModelClient;
use crate::sink::MessageSink;

pub const DEFAULT_MAX_ROUNDS: u32 = 4;

/// Minimum spacing between consecutive model calls.
pub const MIN_TURN_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct DebateConfig {
    pub max_rounds: u32,
    turn_delay: Duration,
    /// Fixed seed for the per-round speaker shuffle; entropy when unset.
    pub shuffle_seed: Option<u64>,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            turn_delay: MIN_TURN_DELAY,
            shuffle_seed: None,
        }
    }
}

impl DebateConfig {
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the pause between model calls. Never goes below `MIN_TURN_DELAY`.
    pub fn with_turn_delay(mut self, delay: Duration) -> Self {
        self.turn_delay = delay.max(MIN_TURN_DELAY);
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn turn_delay(&self) -> Duration {
        self.turn_delay
    }
}

/// Runs one debate at a time over a model client, reporting every turn to a
/// sink. Turns are strictly sequential since each prompt includes every
/// earlier turn.
pub struct DebateEngine {
    client: Arc<dyn ModelClient>,
    sink: Arc<dyn MessageSink>,
    config: DebateConfig,
    cancel: CancellationToken,
}

impl DebateEngine {
    pub fn new(
        client: Arc<dyn ModelClient>,
        sink: Arc<dyn MessageSink>,
        config: DebateConfig,
    ) -> Self {
        Self {
            client,
            sink,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token to abort the debate between turns.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Validate the puzzle and cards, then run a debate to completion.
    /// Precondition failures are returned before any model call is made.
    pub async fn run(
        &self,
        puzzle: &str,
        cards: &[ParticipantCard],
    ) -> Result<DebateOutcome, ValidationError> {
        let puzzle = puzzle.trim();
        if puzzle.is_empty() {
            return Err(ValidationError::EmptyPuzzle);
        }
        self.check_rounds()?;
        let roster = Roster::from_cards(cards)?;
        Ok(self.run_roster(Ulid::new(), puzzle, &roster).await)
    }

    /// Run a debate the session has already admitted.
    pub async fn run_ticket(&self, ticket: &DebateTicket) -> Result<DebateOutcome, ValidationError> {
        self.check_rounds()?;
        Ok(self
            .run_roster(ticket.debate_id, &ticket.puzzle, &ticket.roster)
            .await)
    }

    fn check_rounds(&self) -> Result<(), ValidationError> {
        if self.config.max_rounds == 0 {
            return Err(ValidationError::ZeroRounds);
        }
        Ok(())
    }

    async fn run_roster(&self, debate_id: Ulid, puzzle: &str, roster: &Roster) -> DebateOutcome {
        let started_at = Utc::now();
        let max_rounds = self.config.max_rounds;

        tracing::info!(
            %debate_id,
            participants = roster.participants.len(),
            max_rounds,
            "debate started"
        );
        self.announce(format!("Starting debate on: {}", puzzle)).await;

        let mut rng = match self.config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut speakers = roster.participants.clone();
        let mut transcript = Transcript::new();
        let mut last_call: Option<Instant> = None;
        let mut rounds_completed = 0;
        let mut final_answer = None;
        let mut state = DebateState::Exhausted;

        'rounds: for round in 0..max_rounds {
            if self.cancel.is_cancelled() {
                state = DebateState::Aborted;
                break;
            }
            self.announce(format!("Round {} of {}", round + 1, max_rounds))
                .await;

            speakers.shuffle(&mut rng);

            for card in &speakers {
                if !self.pace(last_call).await {
                    state = DebateState::Aborted;
                    break 'rounds;
                }
                self.take_turn(debate_id, card, puzzle, round, &mut transcript)
                    .await;
                last_call = Some(Instant::now());
            }

            if !self.pace(last_call).await {
                state = DebateState::Aborted;
                break;
            }
            let verdict = self
                .take_turn(debate_id, &roster.facilitator, puzzle, round, &mut transcript)
                .await;
            last_call = Some(Instant::now());
            rounds_completed = round + 1;

            if let Some(message) = verdict
                && is_termination(&message)
            {
                final_answer = Some(message);
                state = DebateState::Concluded;
                break;
            }
        }

        let (status, message) = match state {
            DebateState::Concluded => {
                self.announce("Debate concluded! Final answer reached.").await;
                (DebateStatus::Completed, None)
            }
            DebateState::Aborted => {
                let text = format!("Debate cancelled after {} completed rounds.", rounds_completed);
                self.announce(text.clone()).await;
                (DebateStatus::Error, Some(text))
            }
            _ => {
                let text = format!(
                    "Debate ended after {} rounds without conclusion.",
                    max_rounds
                );
                self.announce(text.clone()).await;
                (DebateStatus::Completed, Some(text))
            }
        };

        tracing::info!(
            %debate_id,
            ?state,
            rounds_completed,
            turns = transcript.len(),
            "debate finished"
        );

        let (debate_history, conversation_transcript) = transcript.into_parts();
        DebateOutcome {
            debate_id,
            status,
            state,
            rounds_completed,
            debate_history,
            final_answer,
            conversation_transcript,
            message,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Wait out the turn delay counted from the end of the previous call.
    /// Returns false if the debate was cancelled before or during the wait.
    async fn pace(&self, last_call_end: Option<Instant>) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        if let Some(previous) = last_call_end {
            let ready_at = previous + self.config.turn_delay;
            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                _ = tokio::time::sleep_until(ready_at) => {}
            }
        }
        !self.cancel.is_cancelled()
    }

    /// One model call. Failures become an error record and an error message
    /// to the sink; the debate always continues. Returns the spoken text.
    async fn take_turn(
        &self,
        debate_id: Ulid,
        card: &ParticipantCard,
        puzzle: &str,
        round: u32,
        transcript: &mut Transcript,
    ) -> Option<String> {
        let system_prompt = build_system_prompt(&card.role, &card.personality, &card.expertise);
        let messages = build_turn_messages(&system_prompt, puzzle, transcript.text());

        tracing::debug!(%debate_id, round, role = %card.role, model = %card.model, "turn dispatched");
        let result = self.client.complete(&card.model, &messages).await;

        match result {
            Ok(text) => {
                self.sink
                    .deliver(&DisplayMessage::turn(&card.role, &card.model, &text))
                    .await;
                transcript.push(TurnRecord::new(card, round, TurnOutcome::Spoke(text.clone())));
                Some(text)
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(
                    %debate_id,
                    round,
                    role = %card.role,
                    model = %card.model,
                    error = %error,
                    "turn failed"
                );
                self.sink
                    .deliver(&DisplayMessage::error(&card.model, &error))
                    .await;
                transcript.push(TurnRecord::new(card, round, TurnOutcome::Failed(error)));
                None
            }
        }
    }

    async fn announce(&self, text: impl Into<String>) {
        self.sink.deliver(&DisplayMessage::system(text)).await;
    }
}
