// ABOUTME: Debate lifecycle states and the result a finished debate reports.
// ABOUTME: The outcome carries the full ordered transcript, the final answer, and rounds executed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::transcript::TurnRecord;

/// Idle → Running → (Concluded | Exhausted | Aborted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateState {
    Idle,
    Running,
    /// The facilitator said the termination phrase.
    Concluded,
    /// Every round ran without a conclusion.
    Exhausted,
    /// Cancelled between turns.
    Aborted,
}

impl DebateState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DebateState::Concluded | DebateState::Exhausted | DebateState::Aborted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStatus {
    Completed,
    Error,
}

/// Everything a finished debate hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutcome {
    pub debate_id: Ulid,
    pub status: DebateStatus,
    pub state: DebateState,
    pub rounds_completed: u32,
    pub debate_history: Vec<TurnRecord>,
    pub final_answer: Option<String>,
    pub conversation_transcript: String,
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DebateOutcome {
    pub fn concluded(&self) -> bool {
        self.state == DebateState::Concluded
    }
}
