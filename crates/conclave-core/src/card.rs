// ABOUTME: Defines the ParticipantCard describing one debate persona and its Role.
// ABOUTME: Also validates raw card submissions into cards, rejecting a whole batch on any bad entry.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The part a persona plays in the debate. The four known roles get their
/// own prompt instructions and display colours; anything else is carried
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Facilitator,
    Critic,
    Reasoner,
    StateTracker,
    Other(String),
}

impl Role {
    /// Parse a role name. Known roles match case-insensitively.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "facilitator" => Role::Facilitator,
            "critic" => Role::Critic,
            "reasoner" => Role::Reasoner,
            "statetracker" => Role::StateTracker,
            _ => Role::Other(name.trim().to_string()),
        }
    }

    /// The canonical wire name for this role.
    pub fn label(&self) -> &str {
        match self {
            Role::Facilitator => "facilitator",
            Role::Critic => "critic",
            Role::Reasoner => "reasoner",
            Role::StateTracker => "stateTracker",
            Role::Other(name) => name,
        }
    }

    pub fn is_facilitator(&self) -> bool {
        matches!(self, Role::Facilitator)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.label().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable descriptor of one debate persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantCard {
    /// Provider identifier as chosen in the UI, e.g. "openai" or "kimi".
    pub model: String,
    pub expertise: String,
    pub personality: String,
    pub role: Role,
}

impl ParticipantCard {
    pub fn new(
        model: impl Into<String>,
        expertise: impl Into<String>,
        personality: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            model: model.into(),
            expertise: expertise.into(),
            personality: personality.into(),
            role,
        }
    }
}

/// A card as submitted over the wire, before validation. Every field is
/// optional here so a missing key becomes a ValidationError rather than an
/// opaque deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardDraft {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl CardDraft {
    fn into_card(self, index: usize) -> Result<ParticipantCard, ValidationError> {
        let model = required(self.model, index, "model")?;
        let expertise = required(self.expertise, index, "expertise")?;
        let personality = required(self.personality, index, "personality")?;
        let role = required(self.role, index, "role")?;
        Ok(ParticipantCard {
            model,
            expertise,
            personality,
            role: Role::parse(&role),
        })
    }
}

fn required(
    value: Option<String>,
    index: usize,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField { index, field }),
    }
}

/// Validate a batch of submitted cards. All four fields of every entry must be
/// non-empty; the first bad entry rejects the whole batch.
pub fn validate_batch(drafts: Vec<CardDraft>) -> Result<Vec<ParticipantCard>, ValidationError> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| draft.into_card(index))
        .collect()
}
