// ABOUTME: Error types for rejected submissions: malformed cards/puzzles and busy sessions.
// ABOUTME: Both are raised before any session state changes or model calls happen.

use thiserror::Error;

/// A submission that fails its preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("need at least 2 cards to run a debate, found {found}")]
    TooFewCards { found: usize },

    #[error("no facilitator found in cards; one card must have role 'facilitator'")]
    NoFacilitator,

    #[error("exactly one facilitator is allowed, found {found}")]
    MultipleFacilitators { found: usize },

    #[error("card {index} is missing a non-empty '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("puzzle must not be empty")]
    EmptyPuzzle,

    #[error("max_rounds must be at least 1")]
    ZeroRounds,
}

/// Errors from session state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a debate is already in progress")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
