// ABOUTME: Display messages relayed to the browser and the fixed role-to-colour table.
// ABOUTME: Covers debate roles plus the "system" and "error" pseudo-roles used for announcements.

use serde::{Deserialize, Serialize};

use crate::card::Role;

pub const SYSTEM_ROLE: &str = "system";
pub const ERROR_ROLE: &str = "error";
pub const DEFAULT_COLOUR: &str = "#FFFFFF";

/// Look up the display colour for a role name. Unmapped roles get white.
pub fn role_colour(role: &str) -> &'static str {
    match role {
        "facilitator" => "#DC143C",
        "critic" => "#00FF00",
        "reasoner" => "#0088FF",
        "stateTracker" => "#FFFF00",
        SYSTEM_ROLE => "#FFFFFF",
        ERROR_ROLE => "#FF6600",
        _ => DEFAULT_COLOUR,
    }
}

/// One line of debate output as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub role: String,
    /// Provider id of the speaker; empty for system announcements.
    #[serde(default)]
    pub model: String,
    /// Raw message body, without the model prefix.
    pub message: String,
    pub colour: String,
}

impl DisplayMessage {
    /// A message with the colour derived from the role.
    pub fn new(role: impl Into<String>, model: impl Into<String>, message: impl Into<String>) -> Self {
        let role = role.into();
        let colour = role_colour(&role).to_string();
        Self {
            role,
            model: model.into(),
            message: message.into(),
            colour,
        }
    }

    pub fn turn(role: &Role, model: &str, message: &str) -> Self {
        Self::new(role.label(), model, message)
    }

    pub fn error(model: &str, error: &str) -> Self {
        Self::new(ERROR_ROLE, model, format!("Error: {}", error))
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(SYSTEM_ROLE, "", message)
    }

    /// The text shown in the UI: `[model] message`, or just the message when
    /// there is no model.
    pub fn display_text(&self) -> String {
        if self.model.is_empty() {
            self.message.clone()
        } else {
            format!("[{}] {}", self.model, self.message)
        }
    }
}

/// Body returned by the poll endpoint. Both fields are empty when nothing is
/// pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPayload {
    pub text: String,
    pub colour: String,
}

impl From<&DisplayMessage> for PollPayload {
    fn from(msg: &DisplayMessage) -> Self {
        Self {
            text: msg.display_text(),
            colour: msg.colour.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_colours_are_distinct() {
        let roles = ["facilitator", "critic", "reasoner", "stateTracker", "error"];
        let mut colours: Vec<&str> = roles.iter().map(|r| role_colour(r)).collect();
        colours.push(role_colour(SYSTEM_ROLE));
        let mut deduped = colours.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(colours.len(), deduped.len());
    }

    #[test]
    fn unmapped_role_gets_default_colour() {
        assert_eq!(role_colour("jester"), DEFAULT_COLOUR);
    }

    #[test]
    fn turn_message_prefixes_model() {
        let msg = DisplayMessage::turn(&Role::Critic, "gemini", "Not so fast.");
        assert_eq!(msg.colour, "#00FF00");
        assert_eq!(msg.display_text(), "[gemini] Not so fast.");
    }

    #[test]
    fn error_message_uses_error_role() {
        let msg = DisplayMessage::error("kimi", "GROQ_API_KEY not set");
        assert_eq!(msg.role, ERROR_ROLE);
        assert_eq!(msg.display_text(), "[kimi] Error: GROQ_API_KEY not set");
    }

    #[test]
    fn system_message_has_no_prefix() {
        let payload = PollPayload::from(&DisplayMessage::system("Round 1 of 4"));
        assert_eq!(payload.text, "Round 1 of 4");
        assert_eq!(payload.colour, "#FFFFFF");
    }
}
