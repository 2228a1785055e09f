// ABOUTME: Turn records and the append-only debate transcript shared as context between models.
// ABOUTME: Keeps both the structured record list and the derived "[ROLE]: message" text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{ParticipantCard, Role};

/// What came back from one model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum TurnOutcome {
    Spoke(String),
    Failed(String),
}

/// One participant's turn. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub role: Role,
    pub model: String,
    pub personality: String,
    pub expertise: String,
    pub outcome: TurnOutcome,
    /// Zero-based round index.
    pub round: u32,
    pub timestamp: DateTime<Utc>,
}

impl TurnRecord {
    pub fn new(card: &ParticipantCard, round: u32, outcome: TurnOutcome) -> Self {
        Self {
            role: card.role.clone(),
            model: card.model.clone(),
            personality: card.personality.clone(),
            expertise: card.expertise.clone(),
            outcome,
            round,
            timestamp: Utc::now(),
        }
    }

    /// The spoken message, if the turn succeeded.
    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            TurnOutcome::Spoke(text) => Some(text),
            TurnOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            TurnOutcome::Spoke(_) => None,
            TurnOutcome::Failed(err) => Some(err),
        }
    }
}

/// The ordered record of every turn in one debate. Grows monotonically and
/// is never truncated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    records: Vec<TurnRecord>,
    text: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn. Successful turns also extend the shared context text;
    /// failed turns are recorded but never shown to the other models.
    pub fn push(&mut self, record: TurnRecord) {
        if let TurnOutcome::Spoke(message) = &record.outcome {
            self.text.push_str(&format_line(&record.role, message));
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    /// Context text handed to every model call, `[ROLE]: message` per turn.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (Vec<TurnRecord>, String) {
        (self.records, self.text)
    }
}

fn format_line(role: &Role, message: &str) -> String {
    format!("\n[{}]: {}\n", role.label().to_uppercase(), message)
}
