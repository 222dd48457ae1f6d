//! AI Gateway — the single point of entry for generative-model calls.
//!
//! Wraps any chat-completions-style provider behind the [`AiGateway`]
//! trait so handlers and pipelines depend on `Arc<dyn AiGateway>` and
//! tests substitute fakes. Failures surface as typed [`GatewayError`]
//! values; callers downstream convert them into deterministic fallback
//! results and never let them reach a client unhandled.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Per-call tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct InvokeOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl InvokeOptions {
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            ..Self::default()
        }
    }
}

/// Typed gateway failure. Every variant is recoverable by the caller's
/// fallback path — none of these propagate to HTTP responses.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("completion was empty")]
    EmptyCompletion,

    #[error("malformed completion envelope: {0}")]
    Malformed(String),
}

/// Boundary trait for the model provider. One configured implementation
/// lives in `AppState` for the whole process.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Sends one prompt and returns the raw completion text.
    async fn invoke(
        &self,
        prompt: &str,
        system: &str,
        options: InvokeOptions,
    ) -> Result<String, GatewayError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (chat-completions shape)
// ────────────────────────────────────────────────────────────────────────────

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
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Text of the first completion, if the provider returned one.
    fn text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Production gateway
// ────────────────────────────────────────────────────────────────────────────

/// Chat-completions client against the configured provider. After a
/// primary-model failure it makes exactly one more attempt with the
/// cheaper fallback model — no backoff loop, no unbounded retries.
pub struct ChatGateway {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    fallback_model: String,
}

impl ChatGateway {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        fallback_model: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            fallback_model,
        }
    }

    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
        options: InvokeOptions,
    ) -> Result<String, GatewayError> {
        let request_body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(GatewayError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                message: message.chars().take(300).collect(),
            });
        }

        let envelope: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let text = envelope.text().ok_or(GatewayError::EmptyCompletion)?;
        debug!(model, chars = text.len(), "completion received");
        Ok(text)
    }
}

#[async_trait]
impl AiGateway for ChatGateway {
    async fn invoke(
        &self,
        prompt: &str,
        system: &str,
        options: InvokeOptions,
    ) -> Result<String, GatewayError> {
        match self.complete(&self.model, prompt, system, options).await {
            Ok(text) => Ok(text),
            Err(primary_err) => {
                warn!(
                    model = %self.model,
                    fallback = %self.fallback_model,
                    error = %primary_err,
                    "primary completion failed, trying fallback model"
                );
                self.complete(&self.fallback_model, prompt, system, options)
                    .await
                    .map_err(|fallback_err| {
                        warn!(error = %fallback_err, "fallback completion failed too");
                        fallback_err
                    })
            }
        }
    }
}
