// ABOUTME: Chat Completions adapter shared by OpenAI and the OpenAI-compatible vendors (Groq, DeepSeek).
// ABOUTME: Sends the message list inline, system message first, and extracts the first choice's text.

use serde_json::{Value, json};

use crate::prompt::ChatMessage;
use crate::providers::Vendor;
use crate::runtime::AdapterError;

const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f64 = 0.7;

/// Build the JSON request body for a Chat Completions call.
pub fn build_request_body(model: &str, messages: &[ChatMessage]) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
        .collect();

    json!({
        "model": model,
        "messages": messages,
        "max_tokens": MAX_TOKENS,
        "temperature": TEMPERATURE,
        "stream": false
    })
}

/// Pull the reply text out of a Chat Completions response.
pub fn parse_response(response_body: &Value) -> Result<String, AdapterError> {
    let choice = response_body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| AdapterError::InvalidResponse("missing choices in response".to_string()))?;

    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| AdapterError::InvalidResponse("choice has no text content".to_string()))
}

/// POST the messages to a Chat Completions endpoint and return the reply.
pub async fn complete(
    client: &reqwest::Client,
    url: &str,
    authorization: &str,
    vendor: Vendor,
    model: &str,
    messages: &[ChatMessage],
) -> Result<String, AdapterError> {
    let body = build_request_body(model, messages);

    let response = client
        .post(url)
        .header("Authorization", authorization)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            AdapterError::Provider(format!("{} request failed: {}", vendor.name(), e))
        })?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(AdapterError::Provider(format!(
            "{} API error {}: {}",
            vendor.name(),
            status,
            error_body
        )));
    }

    let response_body: Value = response
        .json()
        .await
        .map_err(|e| AdapterError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

    parse_response(&response_body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_keeps_message_order_and_roles() {
        let messages = vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("The puzzle is: 2+2?"),
            ChatMessage::user("It is now your turn to speak."),
        ];

        let body = build_request_body("gpt-4o", &messages);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 800);
        assert_eq!(body["stream"], false);

        let sent = body["messages"].as_array().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0]["role"], "system");
        assert_eq!(sent[0]["content"], "be brief");
        assert_eq!(sent[2]["role"], "user");
        assert_eq!(sent[2]["content"], "It is now your turn to speak.");
    }

    #[test]
    fn parses_text_response() {
        let response = json!({
            "id": "chatcmpl-1",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": "I am the critic. No." },
                    "finish_reason": "stop"
                }
            ]
        });

        assert_eq!(parse_response(&response).unwrap(), "I am the critic. No.");
    }

    #[test]
    fn rejects_response_without_choices() {
        let err = parse_response(&json!({ "error": { "message": "bad key" } })).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_null_content() {
        let response = json!({
            "choices": [ { "message": { "role": "assistant", "content": null } } ]
        });
        assert!(parse_response(&response).is_err());
    }

    #[tokio::test]
    #[cfg(feature = "live-test")]
    async fn openai_adapter_basic() {
        use crate::providers::{ProviderCredentials, ProviderRouter};
        use crate::runtime::ModelClient;

        let router = ProviderRouter::new(ProviderCredentials::from_env());
        let messages = vec![
            ChatMessage::system("Reply with one short sentence."),
            ChatMessage::user("The puzzle is: what is 2+2?"),
        ];

        let result = router.complete("openai", &messages).await;
        assert!(result.is_ok(), "live test failed: {:?}", result.err());
    }
}
