//! OpenRouter chat-completions backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::config::OpenRouterConfig;
use crate::envelope::parse_chat_completion;
use crate::prompt::{EXTRACTION_PROMPT, USER_INSTRUCTION};
use crate::{Result, VisionError, VisionModel};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

/// Vision model reached through the OpenRouter API.
pub struct OpenRouterModel {
    config: OpenRouterConfig,
    client: reqwest::Client,
}

impl OpenRouterModel {
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| VisionError::Http {
                op: "create_model_client",
                source,
            })?;

        Ok(Self { config, client })
    }

    fn build_request<'a>(&'a self, image_url: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model_id,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: vec![ContentPart::Text {
                        text: EXTRACTION_PROMPT,
                    }],
                },
                ChatMessage {
                    role: "user",
                    content: vec![
                        ContentPart::Text {
                            text: USER_INSTRUCTION,
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: image_url },
                        },
                    ],
                },
            ],
        }
    }
}

#[async_trait]
impl VisionModel for OpenRouterModel {
    fn name(&self) -> &str {
        &self.config.model_id
    }

    async fn complete(&self, image_url: &str) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(VisionError::missing(
                "OpenRouter API key is not configured, set OPENROUTER_API_KEY",
            ));
        }

        let request = self.build_request(image_url);
        debug!("Sending extraction request to {}", self.config.model_id);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .json(&request)
            .send()
            .await
            .map_err(|source| VisionError::Http {
                op: "send_extract_request",
                source,
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| VisionError::Http {
            op: "read_response",
            source,
        })?;

        if status != StatusCode::OK {
            return Err(VisionError::Status {
                op: "check_api_response",
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        parse_chat_completion(&body)
    }
}
