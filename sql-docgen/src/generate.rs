#![doc = "Text generation adapter: bridges the core `TextGenerator` capability to an OpenAI-compatible chat-completions API."]
//
//! # Text generation (CLI <-> Core)
//!
//! This module wires the [`TextGenerator`] trait from `sql-docgen-core` to a real
//! HTTP endpoint. Everything provider specific (request and response JSON,
//! authentication, status handling) stays here; the pipeline only sees a prompt
//! going in and text or a [`ServiceError`] coming out.
//!
//! ## Client Usage
//!
//! - Build [`ServiceSettings`] (the config loader does this, injecting the API key
//!   from the environment) and pass them to [`OpenAiClient::new`].
//! - One request per call: `POST {base_url}/chat/completions` with a single user
//!   message holding the prompt.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sql_docgen_core::contract::{ServiceError, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Everything needed to talk to the service. The API key is passed in explicitly.
#[derive(Clone)]
pub struct ServiceSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    settings: ServiceSettings,
}

impl OpenAiClient {
    pub fn new(settings: ServiceSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to build HTTP client");
                e
            })?;
        tracing::info!(
            base_url = %settings.base_url,
            model = %settings.model,
            api_key_set = !settings.api_key.is_empty(),
            timeout_secs = settings.timeout.as_secs(),
            "Initialized OpenAiClient"
        );
        Ok(OpenAiClient { http, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

/// Pull the documentation text out of a chat-completions response body.
pub fn parse_completion(body: &str) -> Result<String, ServiceError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::Malformed("response has no choices".to_string()))?;
    match choice.message.content.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ServiceError::Empty),
    }
}

fn classify(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else {
        ServiceError::Transport(e.to_string())
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        tracing::debug!(model = %self.settings.model, prompt_len = prompt.len(), "Requesting completion");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Completion request failed");
                classify(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Completion endpoint returned an error status");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(&body)
    }
}
