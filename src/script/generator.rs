//! Script generation state machine.
//!
//! Attempts whole-document generation first; on an oversize-payload signal
//! (or a document already past the request ceiling) falls back to chunked
//! generation through the throttler. Chunk results reassemble in document
//! order no matter when they complete, and a single chunk exhausting its
//! retries fails the whole generation; no partial scripts.

use crate::config::{GenerationConfig, SpeakerConfig};
use crate::defaults;
use crate::error::{PapercastError, Result};
use crate::llm::client::LanguageModel;
use crate::llm::retry::RetryPolicy;
use crate::llm::throttle::Throttler;
use crate::script::chunker::{self, Chunk, ChunkerConfig};
use crate::script::cleaner::{clean_script, strip_thinking_blocks};
use crate::script::prompt;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct ScriptGenerator {
    llm: Arc<dyn LanguageModel>,
    config: GenerationConfig,
    speakers: SpeakerConfig,
    throttler: Arc<Throttler>,
    retry: RetryPolicy,
}

impl ScriptGenerator {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        config: GenerationConfig,
        speakers: SpeakerConfig,
    ) -> Self {
        let throttler = Arc::new(Throttler::new(
            config.max_concurrent,
            Duration::from_millis(config.min_interval_ms),
        ));
        Self {
            llm,
            config,
            speakers,
            throttler,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (tests use a zero-delay one).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Produce the raw dialogue script for `text`.
    pub async fn generate(&self, text: &str) -> Result<String> {
        let target_words = self.config.target_minutes * self.config.words_per_minute;

        if text.chars().count() <= self.config.max_request_chars {
            let user = prompt::whole_document(text, target_words);
            match self.request("whole document", &user).await {
                Ok(script) => return Ok(script),
                Err(PapercastError::PayloadTooLarge) => {
                    info!("whole-document request oversize; falling back to chunked generation");
                }
                Err(err) if err.is_budget_exhausted() => return Err(err),
                Err(err) => {
                    warn!(error = %err, "whole-document generation failed; trying chunked fallback");
                }
            }
        } else {
            info!(
                chars = text.chars().count(),
                ceiling = self.config.max_request_chars,
                "document exceeds single-request ceiling; using chunked generation"
            );
        }

        self.generate_chunked(text, target_words).await
    }

    /// One retried, throttled generation request, with reasoning markup
    /// stripped from the result.
    async fn request(&self, label: &str, user: &str) -> Result<String> {
        let system = prompt::system_prompt(&self.speakers);
        let result = self
            .retry
            .run(label, || {
                let llm = Arc::clone(&self.llm);
                let throttler = Arc::clone(&self.throttler);
                let system = system.clone();
                let user = user.to_string();
                let max_tokens = self.config.max_tokens;
                let temperature = self.config.temperature;
                async move {
                    throttler
                        .submit(async move {
                            llm.complete(&system, &user, max_tokens, temperature).await
                        })
                        .await
                }
            })
            .await?;
        Ok(strip_thinking_blocks(&result))
    }

    async fn generate_chunked(&self, text: &str, target_words: u32) -> Result<String> {
        let chunker_config = ChunkerConfig {
            max_chunk_chars: self.config.max_chunk_chars,
            max_chunks: self.config.max_chunks,
            max_request_chars: self.config.max_request_chars,
        };
        let chunks = chunker::chunk(text, &chunker_config)?;
        let budgets = allocate_budgets(target_words, chunks.len());
        info!(chunks = chunks.len(), target_words, "chunked generation started");

        let mut handles = Vec::with_capacity(chunks.len());
        for (chunk, budget) in chunks.into_iter().zip(budgets) {
            handles.push(self.spawn_chunk_request(chunk, budget));
        }

        let mut segments: BTreeMap<usize, String> = BTreeMap::new();
        let mut failures: Vec<(usize, PapercastError)> = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((index, Ok(segment))) => {
                    // Each chunk response is independent model output and may
                    // carry its own preamble; clean before joining so nothing
                    // leaks into the middle of the script.
                    segments.insert(index, clean_script(&segment, &self.speakers));
                }
                Ok((index, Err(err))) => failures.push((index, err)),
                Err(join_err) => failures.push((
                    usize::MAX,
                    PapercastError::Generation {
                        message: format!("chunk task aborted: {join_err}"),
                    },
                )),
            }
        }

        if !failures.is_empty() {
            // Budget exhaustion must surface distinctly from transient noise
            if let Some(pos) = failures.iter().position(|(_, e)| e.is_budget_exhausted()) {
                return Err(failures.swap_remove(pos).1);
            }
            let (index, err) = failures.swap_remove(0);
            return Err(PapercastError::Generation {
                message: format!("chunk {index} failed: {err}"),
            });
        }

        // BTreeMap iteration restores document order regardless of
        // completion order.
        Ok(segments.into_values().collect::<Vec<_>>().join("\n\n"))
    }

    fn spawn_chunk_request(
        &self,
        chunk: Chunk,
        budget: u32,
    ) -> tokio::task::JoinHandle<(usize, Result<String>)> {
        let llm = Arc::clone(&self.llm);
        let throttler = Arc::clone(&self.throttler);
        let retry = self.retry.clone();
        let system = prompt::system_prompt(&self.speakers);
        let user = prompt::chunk_prompt(&chunk, budget);
        let label = format!("chunk {}/{}", chunk.index + 1, chunk.total);
        let index = chunk.index;
        let max_tokens = self.config.max_tokens;
        let temperature = self.config.temperature;

        tokio::spawn(async move {
            let result = retry
                .run(&label, || {
                    let llm = Arc::clone(&llm);
                    let throttler = Arc::clone(&throttler);
                    let system = system.clone();
                    let user = user.clone();
                    async move {
                        throttler
                            .submit(async move {
                                llm.complete(&system, &user, max_tokens, temperature).await
                            })
                            .await
                    }
                })
                .await
                .map(|s| strip_thinking_blocks(&s));
            (index, result)
        })
    }
}

/// Per-chunk word budgets for a total target of `total` words.
///
/// The first and last chunk carry an opening and a conclusion on top of
/// their material and get +15% over the even split; early middle chunks
/// get +5% and late middle chunks −10%, reflecting front-loaded document
/// density.
pub fn allocate_budgets(total: u32, count: usize) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![total];
    }

    let even = total as f64 / count as f64;
    (0..count)
        .map(|i| {
            let factor = if i == 0 || i == count - 1 {
                defaults::EDGE_CHUNK_BUDGET_FACTOR
            } else if i * 2 < count {
                defaults::EARLY_MIDDLE_BUDGET_FACTOR
            } else {
                defaults::LATE_MIDDLE_BUDGET_FACTOR
            };
            (even * factor).round() as u32
        })
        .collect()
}
