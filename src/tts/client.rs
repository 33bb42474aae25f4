//! Text-to-speech capability.
//!
//! The synthesizer talks to speech generation through the `TextToSpeech`
//! trait; the shipped implementation posts to an OpenAI-compatible
//! `/v1/audio/speech` endpoint and returns raw WAV bytes. A budget
//! exhaustion response is distinguished from generic failure because it is
//! terminal for the whole request.

use crate::config::SynthesisConfig;
use crate::error::{PapercastError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Black-box speech synthesis capability.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `text` with the given voice and engine tier, returning
    /// encoded audio bytes (WAV).
    async fn synthesize(&self, text: &str, voice: &str, engine: &str) -> Result<Vec<u8>>;
}

/// OpenAI-compatible speech endpoint client.
pub struct HttpTextToSpeech {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    engine: &'a str,
    response_format: &'a str,
}

impl HttpTextToSpeech {
    pub fn from_config(config: &SynthesisConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl TextToSpeech for HttpTextToSpeech {
    async fn synthesize(&self, text: &str, voice: &str, engine: &str) -> Result<Vec<u8>> {
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice,
            engine,
            response_format: "wav",
        };

        let response = tokio::time::timeout(
            self.timeout,
            self.client.post(&self.endpoint).json(&body).send(),
        )
        .await
        .map_err(|_| PapercastError::Synthesis {
            message: format!("synthesis request timed out after {:?}", self.timeout),
        })?
        .map_err(|e| PapercastError::Synthesis {
            message: format!("synthesis request failed: {e}"),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PapercastError::Synthesis {
                message: format!("failed to read synthesis response: {e}"),
            })?;

        if bytes.is_empty() {
            return Err(PapercastError::Synthesis {
                message: "synthesis returned no audio".to_string(),
            });
        }
        Ok(bytes.to_vec())
    }
}

fn classify_failure(status: u16, body: &str) -> PapercastError {
    let lower = body.to_lowercase();
    if status == 402
        || lower.contains("quota")
        || lower.contains("billing")
        || lower.contains("character limit")
        || lower.contains("insufficient credit")
    {
        return PapercastError::BudgetExhausted {
            message: if body.is_empty() {
                format!("synthesis capability returned {status}")
            } else {
                body.chars().take(200).collect()
            },
        };
    }
    PapercastError::Synthesis {
        message: format!("upstream returned {status}: {}", body.chars().take(200).collect::<String>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_budget_exhaustion_by_status() {
        assert!(classify_failure(402, "").is_budget_exhausted());
    }

    #[test]
    fn test_classify_budget_exhaustion_by_body() {
        let err = classify_failure(429, "Monthly character quota exceeded");
        assert!(err.is_budget_exhausted());
    }

    #[test]
    fn test_classify_generic_failure() {
        let err = classify_failure(500, "internal error");
        assert!(matches!(err, PapercastError::Synthesis { .. }));
        assert!(!err.is_budget_exhausted());
    }

    #[test]
    fn test_speech_request_serialization_shape() {
        let body = SpeechRequest {
            model: "kokoro",
            input: "Hello there.",
            voice: "am_adam",
            engine: "standard",
            response_format: "wav",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "kokoro");
        assert_eq!(json["input"], "Hello there.");
        assert_eq!(json["voice"], "am_adam");
        assert_eq!(json["response_format"], "wav");
    }
}
