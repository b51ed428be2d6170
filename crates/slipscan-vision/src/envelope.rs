//! Chat-completion response envelope.

use serde::Deserialize;

use crate::{Result, VisionError};

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the completion text out of an OpenAI-style response body.
///
/// Only the first choice is used. A `null` content is returned as an empty
/// string and left for the parsing pipeline to reject.
pub fn parse_chat_completion(body: &[u8]) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_slice(body).map_err(|e| VisionError::Response {
            op: "parse_response_json",
            reason: format!("failed to unmarshal response: {}", e),
        })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| VisionError::Response {
            op: "check_response_choices",
            reason: "no choices in response".to_string(),
        })?;

    Ok(choice.message.content.unwrap_or_default())
}
