// ABOUTME: Defines the ModelClient trait every model backend implements, plus AdapterError.
// ABOUTME: The debate engine only talks to models through this seam, so tests can script replies.

use async_trait::async_trait;

use crate::prompt::ChatMessage;

/// Everything that can go wrong in one model call. None of these abort a
/// debate; the engine turns them into a failed turn record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// A required credential is missing from configuration.
    #[error("{0} not set in environment")]
    Config(String),

    /// Transport failure or a non-success response from the provider.
    #[error("{0}")]
    Provider(String),

    /// The provider answered but the body had no usable text.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error(
        "Unknown provider: {0}. Use 'openai', 'gemini', 'llama', 'qwen', 'kimi', 'gptoss', or 'deepseek'."
    )]
    UnknownProvider(String),
}

/// Uniform request/response call for any LLM provider.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send `messages` to the provider named by a card's `model_id` and
    /// return the reply text.
    async fn complete(&self, model_id: &str, messages: &[ChatMessage])
    -> Result<String, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_error_display() {
        assert_eq!(
            AdapterError::Config("GROQ_API_KEY".to_string()).to_string(),
            "GROQ_API_KEY not set in environment"
        );
        assert!(
            AdapterError::UnknownProvider("claude".to_string())
                .to_string()
                .starts_with("Unknown provider: claude.")
        );
        assert!(
            AdapterError::Provider("OpenAI error: 500".to_string())
                .to_string()
                .contains("500")
        );
    }
}
