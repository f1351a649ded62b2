//! Chat-completions client for the exercise generation service.
//!
//! Each call makes exactly one HTTP attempt. Retries belong to
//! [`RetryingClient`](super::RetryingClient) and timeouts to the config.

use super::error::GenerationError;
use crate::config::{ApiKey, GenerationConfig};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sends one system + one user message and returns the reply text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn send(
        &self,
        system_prompt: &str,
        user_payload: &str,
        structured_output: bool,
    ) -> Result<String, GenerationError>;
}

// === API Request/Response Types ===

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    url: Url,
    api_key: Option<ApiKey>,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Build a client. Fails only if the endpoint is not a valid URL; a
    /// missing credential is reported on the first `send`.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let raw = format!("{}/chat/completions", config.endpoint.trim().trim_end_matches('/'));
        let url = Url::parse(&raw).map_err(|e| GenerationError::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GenerationError::InvalidUrl(raw));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    #[cfg(test)]
    fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn send(
        &self,
        system_prompt: &str,
        user_payload: &str,
        structured_output: bool,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_ref().ok_or(GenerationError::NoCredential)?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_payload,
                },
            ],
            temperature: self.temperature,
            response_format: structured_output.then_some(ResponseFormat { kind: "json_object" }),
        };
        let body = serde_json::to_vec(&request).map_err(|e| GenerationError::Decoding(e.to_string()))?;

        debug!(model = %self.model, structured_output, bytes = body.len(), "sending generation request");

        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(api_key.expose())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::InvalidResponse(format!("malformed response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("response carried no content".to_string()))
    }
}

/// Message from a structured error body, or the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}
