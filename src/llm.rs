//! OpenAI-compatible chat completions client.

use log::debug;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{BotError, Result};
use crate::gateway::{ChatRequest, ModelGateway};
use crate::text::truncate_chars;
use crate::types::{ContentSegment, Message, MessageContent};

// Discord's message limit is 2000 characters (standard users)
// Roughly 1 token ≈ 4 characters, so 2000 chars ≈ 500 tokens
// Using 512 tokens to be safe
const MAX_TOKENS: u32 = 512;

// Provider error pages can be whole HTML documents
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<MessageContent>,
}

pub struct LlmClient {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
    text_model: String,
    vision_model: String,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            client,
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
        })
    }

    fn model_for(&self, request: &ChatRequest) -> &str {
        if request.is_vision() {
            &self.vision_model
        } else {
            &self.text_model
        }
    }
}

impl ModelGateway for LlmClient {
    async fn chat(&self, request: &ChatRequest) -> Result<Option<String>> {
        let model = self.model_for(request);
        debug!(
            "Sending request to {} ({model}) with {} messages",
            self.api_url,
            request.messages().len()
        );

        let body = CompletionRequest {
            model,
            messages: request.messages(),
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(api_error(status, &body));
        }

        let api_response: CompletionResponse = response.json().await?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BotError::LlmResponse("No choices in response".to_string()))?
            .message
            .content;

        debug!("Received response from {model}");
        Ok(content.map(|content| reply_text(&content)))
    }
}

fn api_error(status: StatusCode, body: &str) -> BotError {
    BotError::LlmApi {
        status,
        message: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
    }
}

/// Extract reply text, joining text parts of a multi-part answer.
fn reply_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Segments(parts) => parts
            .iter()
            .filter_map(|part| match part {
                ContentSegment::Text(text) => Some(text.as_str()),
                ContentSegment::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_body_matches_completions_api() -> serde_json::Result<()> {
        let request = ChatRequest::text(
            "sys",
            &[Message::user(MessageContent::Text("hi".to_string()))],
        );
        let body = CompletionRequest {
            model: "llama",
            messages: request.messages(),
            max_tokens: MAX_TOKENS,
        };

        assert_eq!(
            serde_json::to_value(&body)?,
            json!({
                "model": "llama",
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "hi" }
                ],
                "max_tokens": 512
            })
        );
        Ok(())
    }

    #[test]
    fn parses_null_content() -> serde_json::Result<()> {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )?;
        assert!(response.choices[0].message.content.is_none());
        Ok(())
    }

    #[test]
    fn error_body_is_capped() {
        let err = api_error(StatusCode::SERVICE_UNAVAILABLE, &"<p>down</p>".repeat(300));

        let BotError::LlmApi { status, message } = err else {
            panic!("expected an API error");
        };
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(message.chars().count(), MAX_ERROR_BODY_CHARS);
        assert!(message.starts_with("<p>down</p>"));
    }

    #[test]
    fn short_error_body_is_kept() {
        let err = api_error(StatusCode::TOO_MANY_REQUESTS, " rate limited\n");
        assert_eq!(
            err.to_string(),
            "LLM API error (429 Too Many Requests): rate limited"
        );
    }

    #[test]
    fn joins_multipart_reply_text() {
        let content = MessageContent::Segments(vec![
            ContentSegment::Text("にゃ".to_string()),
            ContentSegment::Image("https://x.com/a.png".to_string()),
            ContentSegment::Text("ん".to_string()),
        ]);
        assert_eq!(reply_text(&content), "にゃ\nん");
    }

    #[test]
    fn picks_model_by_request_kind() -> Result<()> {
        let client = LlmClient::new(&LlmConfig {
            api_key: "key".to_string(),
            api_url: "http://localhost/v1/chat/completions".to_string(),
            text_model: "text".to_string(),
            vision_model: "vision".to_string(),
            timeout: std::time::Duration::from_secs(10),
        })?;

        let text = ChatRequest::text("sys", &[]);
        let image = ContentSegment::Image("https://x.com/a.png".to_string());
        let vision = ChatRequest::vision("sys", &[image]);

        assert_eq!(client.model_for(&text), "text");
        assert_eq!(client.model_for(&vision), "vision");
        Ok(())
    }
}
