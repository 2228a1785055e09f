// ABOUTME: Splits a validated card list into the facilitator and the speaking participants.
// ABOUTME: Enforces the debate preconditions: at least two cards and exactly one facilitator.

use serde::Serialize;

use crate::card::ParticipantCard;
use crate::error::ValidationError;

pub const MIN_CARDS: usize = 2;

/// The cast of one debate.
#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub facilitator: ParticipantCard,
    /// Non-facilitator cards in submission order. The engine reshuffles a
    /// copy of this every round.
    pub participants: Vec<ParticipantCard>,
}

impl Roster {
    pub fn from_cards(cards: &[ParticipantCard]) -> Result<Self, ValidationError> {
        if cards.len() < MIN_CARDS {
            return Err(ValidationError::TooFewCards { found: cards.len() });
        }

        let (facilitators, participants): (Vec<_>, Vec<_>) =
            cards.iter().cloned().partition(|c| c.role.is_facilitator());

        let facilitator = match facilitators.len() {
            0 => return Err(ValidationError::NoFacilitator),
            1 => facilitators.into_iter().next().ok_or(ValidationError::NoFacilitator)?,
            found => return Err(ValidationError::MultipleFacilitators { found }),
        };

        Ok(Self {
            facilitator,
            participants,
        })
    }

    /// Number of turns in one full round: every participant plus the facilitator.
    pub fn turns_per_round(&self) -> usize {
        self.participants.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Role;

    fn card(model: &str, role: Role) -> ParticipantCard {
        ParticipantCard::new(model, "math", "curious", role)
    }

    #[test]
    fn splits_facilitator_from_participants() {
        let cards = vec![
            card("gemini", Role::Critic),
            card("openai", Role::Facilitator),
            card("llama", Role::Reasoner),
        ];

        let roster = Roster::from_cards(&cards).unwrap();
        assert_eq!(roster.facilitator.model, "openai");
        assert_eq!(roster.participants.len(), 2);
        assert_eq!(roster.participants[0].model, "gemini");
        assert_eq!(roster.participants[1].model, "llama");
        assert_eq!(roster.turns_per_round(), 3);
    }

    #[test]
    fn rejects_fewer_than_two_cards() {
        assert_eq!(
            Roster::from_cards(&[]).unwrap_err(),
            ValidationError::TooFewCards { found: 0 }
        );
        assert_eq!(
            Roster::from_cards(&[card("openai", Role::Facilitator)]).unwrap_err(),
            ValidationError::TooFewCards { found: 1 }
        );
    }

    #[test]
    fn rejects_missing_facilitator() {
        let cards = vec![card("openai", Role::Critic), card("gemini", Role::Reasoner)];
        assert_eq!(
            Roster::from_cards(&cards).unwrap_err(),
            ValidationError::NoFacilitator
        );
    }

    #[test]
    fn rejects_two_facilitators() {
        let cards = vec![
            card("openai", Role::Facilitator),
            card("gemini", Role::Facilitator),
            card("kimi", Role::Critic),
        ];
        assert_eq!(
            Roster::from_cards(&cards).unwrap_err(),
            ValidationError::MultipleFacilitators { found: 2 }
        );
    }
}
