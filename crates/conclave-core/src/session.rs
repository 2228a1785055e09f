// ABOUTME: Process-wide debate session: card roster, current puzzle, and the debating flag.
// ABOUTME: Guards the single-debate-at-a-time invariant; callers hold it behind one mutex.

use serde::Serialize;
use ulid::Ulid;

use crate::card::ParticipantCard;
use crate::error::{SessionError, ValidationError};
use crate::outcome::DebateOutcome;
use crate::roster::Roster;

/// What `begin` hands the caller so it can launch the engine.
#[derive(Debug, Clone)]
pub struct DebateTicket {
    pub debate_id: Ulid,
    pub puzzle: String,
    pub roster: Roster,
}

/// Mutable session state. Created once per process in the idle state with an
/// empty roster.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DebateSession {
    puzzle: Option<String>,
    cards: Vec<ParticipantCard>,
    debating: bool,
    active_debate: Option<Ulid>,
    last_outcome: Option<DebateOutcome>,
}

impl DebateSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append validated cards in submission order. The roster is never reset
    /// in-band. Returns the new roster size.
    pub fn add_cards(&mut self, cards: Vec<ParticipantCard>) -> usize {
        self.cards.extend(cards);
        self.cards.len()
    }

    pub fn cards(&self) -> &[ParticipantCard] {
        &self.cards
    }

    pub fn puzzle(&self) -> Option<&str> {
        self.puzzle.as_deref()
    }

    pub fn is_debating(&self) -> bool {
        self.debating
    }

    pub fn active_debate(&self) -> Option<Ulid> {
        self.active_debate
    }

    pub fn last_outcome(&self) -> Option<&DebateOutcome> {
        self.last_outcome.as_ref()
    }

    /// Move from idle to running. Rejects with `Busy` while a debate is
    /// active and with a validation error when the puzzle or roster cannot
    /// support a debate; in both cases nothing is modified.
    pub fn begin(&mut self, puzzle: &str) -> Result<DebateTicket, SessionError> {
        if self.debating {
            return Err(SessionError::Busy);
        }
        let puzzle = puzzle.trim();
        if puzzle.is_empty() {
            return Err(ValidationError::EmptyPuzzle.into());
        }
        let roster = Roster::from_cards(&self.cards)?;

        let debate_id = Ulid::new();
        self.debating = true;
        self.active_debate = Some(debate_id);
        self.puzzle = Some(puzzle.to_string());

        Ok(DebateTicket {
            debate_id,
            puzzle: puzzle.to_string(),
            roster,
        })
    }

    /// Record a finished debate and return to idle. Outcomes for a debate
    /// other than the active one are ignored.
    pub fn finish(&mut self, outcome: DebateOutcome) -> bool {
        if self.active_debate != Some(outcome.debate_id) {
            tracing::warn!(
                debate_id = %outcome.debate_id,
                "ignoring outcome for a debate that is not active"
            );
            return false;
        }
        self.debating = false;
        self.active_debate = None;
        self.last_outcome = Some(outcome);
        true
    }

    /// Force the session back to idle without an outcome, e.g. when the
    /// debate task died.
    pub fn abandon(&mut self, debate_id: Ulid) {
        if self.active_debate == Some(debate_id) {
            self.debating = false;
            self.active_debate = None;
        }
    }
}
