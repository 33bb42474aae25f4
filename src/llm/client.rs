//! Language-model generation capability.
//!
//! The pipeline talks to generation through the `LanguageModel` trait; the
//! shipped implementation speaks the OpenAI-compatible chat completions
//! API. Upstream failures are classified into the crate error taxonomy so
//! retry and fallback logic can tell rate limiting, oversize payloads, and
//! exhausted budgets apart.

use crate::config::GenerationConfig;
use crate::error::{PapercastError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Black-box text generation capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}

/// OpenAI-compatible chat completions client.
pub struct HttpLanguageModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
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
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl HttpLanguageModel {
    /// Build a client from config. The API key is read from the environment
    /// variable named by `api_key_env`; a missing or empty value means no
    /// auth header (local deployments).
    pub fn from_config(config: &GenerationConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl LanguageModel for HttpLanguageModel {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            temperature,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| PapercastError::Generation {
                message: format!("generation request timed out after {:?}", self.timeout),
            })?
            .map_err(|e| PapercastError::Generation {
                message: format!("generation request failed: {e}"),
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let retry_after = parse_retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, retry_after, &text));
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| PapercastError::Generation {
                    message: format!("malformed generation response: {e}"),
                })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PapercastError::Generation {
                message: "generation response contained no choices".to_string(),
            })
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Map an upstream failure onto the error taxonomy. Status codes are
/// authoritative; body text is a fallback for providers that wrap every
/// failure in a 400/500.
fn classify_failure(status: u16, retry_after: Option<Duration>, body: &str) -> PapercastError {
    let lower = body.to_lowercase();

    if status == 429 {
        return PapercastError::RateLimited { retry_after };
    }
    if status == 402
        || lower.contains("quota")
        || lower.contains("billing")
        || lower.contains("insufficient credit")
    {
        return PapercastError::BudgetExhausted {
            message: truncate(body, 200),
        };
    }
    if status == 413
        || lower.contains("context length")
        || lower.contains("maximum context")
        || lower.contains("too large")
        || lower.contains("too long")
    {
        return PapercastError::PayloadTooLarge;
    }

    PapercastError::Generation {
        message: format!("upstream returned {status}: {}", truncate(body, 200)),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}…")
    }
}
