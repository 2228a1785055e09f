// ABOUTME: Builds the per-role system prompt and the ordered message list for each debate turn.
// ABOUTME: Also owns the facilitator's termination phrase and the check for it.

use serde::{Deserialize, Serialize};

use conclave_core::Role;

/// Lowercase phrase the facilitator must end with once the puzzle is solved.
pub const TERMINATION_PHRASE: &str = "that is the answer";

/// Final user message of every turn.
pub const TURN_PROMPT: &str = "It is now your turn to speak.";

const FACILITATOR_INSTRUCTION: &str = "You are making the final decision - the solution that will solve the puzzle. That is your main focus. Listen to your teammates, but be decisive. VERY IMPORTANT: whenever you speak, end with one of the following: 'We need more discussion' or 'That is the answer.'. This is EXTREMELY important. Whatever you do, do not end with something other than this.";

const CRITIC_INSTRUCTION: &str = "Be critical and analytical of your teammates' contributions. Your goal is to achieve the team's objective of solving the puzzle by pushing your team to think of new ideas and challenging current ones.";

const REASONER_INSTRUCTION: &str = "Provide input on what you think the solution is. In all situations, contribute the most logical ideas that will help your team solve the puzzle.";

const STATE_TRACKER_INSTRUCTION: &str = "Your job is not to reason, but to keep your teammates in check. Pay close attention to everything that's being discussed to make sure none of your teammates are fabricating facts. If that happens, remind them of the facts to guide them back on track.";

const FALLBACK_INSTRUCTION: &str = "Participate in the discussion constructively.";

/// Speaker tag of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Role-specific instruction, with a generic fallback for unknown roles.
pub fn role_instruction(role: &Role) -> &'static str {
    match role {
        Role::Facilitator => FACILITATOR_INSTRUCTION,
        Role::Critic => CRITIC_INSTRUCTION,
        Role::Reasoner => REASONER_INSTRUCTION,
        Role::StateTracker => STATE_TRACKER_INSTRUCTION,
        Role::Other(_) => FALLBACK_INSTRUCTION,
    }
}

/// Build the system prompt for one persona. Personality and expertise are
/// interpolated verbatim.
pub fn build_system_prompt(role: &Role, personality: &str, expertise: &str) -> String {
    format!(
        "You are part of an elite reasoning team whose objective is to solve puzzles.\n\
You will all take turns adding to the discussion. Work together to solve the problem. Once everyone has gone,\n\
the facilitator will decide if there should be another round of discussion.\n\
Your role is {role}. {instruction} Your personality is {personality}. Your expertise is {expertise}.\n\
During discussion, act as someone with your personality and expertise would act. Be super concise in your speech. Try your best to go under 600 chars.\n\
Everytime you speak, let everyone know your role in the following format : 'I am the <role>', where role is one of the following: state tracker, facilitator, reasoner, or critic. And remember, don't break character.\n\
Follow the rules, work together, and support the facilitator until they can deliver the solution.\n\
Before you are told to speak, you will be given the conversation that is currently unfolding. Don't hallucinate please.",
        role = role.label(),
        instruction = role_instruction(role),
    )
}

/// Ordered messages for one turn: system prompt, the puzzle, the conversation
/// so far (when there is any), then the turn prompt.
pub fn build_turn_messages(system_prompt: &str, puzzle: &str, transcript: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];

    if !puzzle.trim().is_empty() {
        messages.push(ChatMessage::user(format!("The puzzle is: {}", puzzle)));
    }

    if !transcript.trim().is_empty() {
        messages.push(ChatMessage::user(format!(
            "Conversation so far:\n{}",
            transcript
        )));
    }

    messages.push(ChatMessage::user(TURN_PROMPT));
    messages
}

/// Case-insensitive substring match on the termination phrase.
pub fn is_termination(message: &str) -> bool {
    message.to_lowercase().contains(TERMINATION_PHRASE)
}
