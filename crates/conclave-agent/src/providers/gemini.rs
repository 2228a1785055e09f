// ABOUTME: Google Gemini generateContent adapter.
// ABOUTME: Moves the system prompt into system_instruction and folds user messages into one content.

use serde_json::{Value, json};

use crate::prompt::{ChatMessage, ChatRole};
use crate::runtime::AdapterError;

const MAX_OUTPUT_TOKENS: u32 = 800;
const TEMPERATURE: f64 = 0.7;

/// Build the JSON request body for the generateContent API. Gemini wants
/// alternating turns, so the user messages are joined into a single part.
pub fn build_request_body(messages: &[ChatMessage]) -> Value {
    let system_prompt = messages
        .iter()
        .filter(|m| m.role == ChatRole::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let user_text = messages
        .iter()
        .filter(|m| m.role == ChatRole::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut body = json!({
        "contents": [
            { "role": "user", "parts": [{ "text": user_text }] }
        ],
        "generation_config": {
            "max_output_tokens": MAX_OUTPUT_TOKENS,
            "temperature": TEMPERATURE
        }
    });

    if !system_prompt.is_empty() {
        body["system_instruction"] = json!({ "parts": [{ "text": system_prompt }] });
    }

    body
}

/// Concatenate the text parts of the first candidate.
pub fn parse_response(response_body: &Value) -> Result<String, AdapterError> {
    let parts = response_body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            AdapterError::InvalidResponse("missing candidate content in response".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(AdapterError::InvalidResponse(
            "candidate has no text parts".to_string(),
        ));
    }
    Ok(text)
}

pub async fn complete(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
) -> Result<String, AdapterError> {
    let body = build_request_body(messages);
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    );

    let response = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| AdapterError::Provider(format!("gemini request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(AdapterError::Provider(format!(
            "gemini API error {}: {}",
            status, error_body
        )));
    }

    let response_body: Value = response
        .json()
        .await
        .map_err(|e| AdapterError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

    parse_response(&response_body)
}
