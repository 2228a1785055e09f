// ABOUTME: Core library for conclave, containing the debate data model shared by every crate.
// ABOUTME: Cards, roster rules, transcript, display queue, outcome types, and session state.

pub mod card;
pub mod display;
pub mod error;
pub mod outcome;
pub mod queue;
pub mod roster;
pub mod session;
pub mod transcript;

pub use card::{CardDraft, ParticipantCard, Role, validate_batch};
pub use display::{DisplayMessage, PollPayload, role_colour};
pub use error::{SessionError, ValidationError};
pub use outcome::{DebateOutcome, DebateState, DebateStatus};
pub use queue::{MAX_PENDING, MessageQueue};
pub use roster::Roster;
pub use session::{DebateSession, DebateTicket};
pub use transcript::{Transcript, TurnOutcome, TurnRecord};
