//! Podcast generation pipeline.
//!
//! Orchestrates the complete document-to-audio flow:
//! clean source → generate script → post-process → annotate pauses →
//! synthesize per line → assemble one playable WAV.

use crate::audio::assembler::Assembler;
use crate::config::Config;
use crate::defaults;
use crate::error::{PapercastError, Result};
use crate::llm::client::{HttpLanguageModel, LanguageModel};
use crate::llm::retry::RetryPolicy;
use crate::script::cleaner;
use crate::script::generator::ScriptGenerator;
use crate::script::pauses;
use crate::script::script::{Line, Script};
use crate::script::trimmer;
use crate::tts::client::{HttpTextToSpeech, TextToSpeech};
use crate::tts::synthesizer::Synthesizer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Final artifact of one generation request. Immutable once created.
#[derive(Debug, Clone)]
pub struct Podcast {
    /// The dialogue script with display names, pause markers removed.
    pub script: String,
    /// Path of the assembled episode in the configured output directory.
    pub audio_path: PathBuf,
}

/// One pipeline instance per process; each `generate_podcast` call is an
/// independent request with its own temp files.
pub struct Pipeline {
    config: Config,
    llm: Arc<dyn LanguageModel>,
    tts: Arc<dyn TextToSpeech>,
    retry: RetryPolicy,
}

impl Pipeline {
    /// Build a pipeline backed by the configured HTTP capabilities.
    pub fn new(config: Config) -> Self {
        let llm = Arc::new(HttpLanguageModel::from_config(&config.generation));
        let tts = Arc::new(HttpTextToSpeech::from_config(&config.synthesis));
        Self::with_capabilities(config, llm, tts)
    }

    /// Build a pipeline with explicit capabilities (tests inject mocks).
    pub fn with_capabilities(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        tts: Arc<dyn TextToSpeech>,
    ) -> Self {
        Self {
            config,
            llm,
            tts,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (tests use a zero-delay one).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generate a podcast from already-extracted document text.
    /// `document_name` is used for logging only.
    pub async fn generate_podcast(&self, source_text: &str, document_name: &str) -> Result<Podcast> {
        let text = clean_source(source_text);
        if text.is_empty() {
            return Err(PapercastError::EmptySource);
        }
        info!(
            document = document_name,
            chars = text.chars().count(),
            "podcast generation started"
        );

        // Script generation
        let generator = ScriptGenerator::new(
            Arc::clone(&self.llm),
            self.config.generation.clone(),
            self.config.speakers.clone(),
        )
        .with_retry_policy(self.retry.clone());
        let raw_script = generator.generate(&text).await?;

        // Post-processing
        let cleaned = cleaner::clean_script(&raw_script, &self.config.speakers);
        if cleaned.trim().is_empty() {
            return Err(PapercastError::Generation {
                message: "generated script contained no dialogue lines".to_string(),
            });
        }

        let generation = &self.config.generation;
        let check = cleaner::verify_duration(
            &cleaned,
            generation.words_per_minute,
            generation.target_minutes,
            generation.duration_variance_minutes,
        );
        if check.out_of_range {
            warn!(
                estimated_minutes = check.estimated_minutes,
                target_minutes = generation.target_minutes,
                "script duration outside configured variance"
            );
        }

        let target_words =
            (generation.target_minutes * generation.words_per_minute) as usize;
        let trimmed = if check.estimated_minutes
            > generation.target_minutes as f64 * defaults::TRIM_TRIGGER_FACTOR
        {
            let ceiling = (target_words as f64 * defaults::TRIM_CEILING_FACTOR) as usize;
            info!(
                words = check.word_count,
                ceiling, "script far over budget; trimming"
            );
            trimmer::trim_to_budget(&cleaned, ceiling)
        } else {
            cleaned
        };

        // Pause annotation, then parse into speaker-attributed lines
        let annotated = pauses::annotate(&trimmed);
        let script = Script::parse(&annotated, &self.config.speakers);
        if script.lines.is_empty() {
            return Err(PapercastError::Generation {
                message: "no speaker-attributed lines survived cleaning".to_string(),
            });
        }

        // Synthesis
        let request_id = request_id();
        let work_dir = std::env::temp_dir().join("papercast");
        let synthesizer = Synthesizer::new(
            Arc::clone(&self.tts),
            self.config.synthesis.clone(),
            work_dir,
            request_id.clone(),
        );
        let segments = synthesizer.synthesize_script(&script).await?;

        // Assembly
        let assembler = Assembler::new(
            self.config.output.dir.clone(),
            self.config.synthesis.sample_rate,
        );
        let audio_path = assembler.assemble(&segments, &format!("podcast_{request_id}"))?;

        // The caller-facing script carries display names and no markers
        let display_script = Script {
            lines: script
                .lines
                .iter()
                .map(|l| Line {
                    role: l.role,
                    text: pauses::tts_text(&l.text),
                })
                .collect(),
        };

        info!(
            document = document_name,
            lines = script.lines.len(),
            audio = %audio_path.display(),
            "podcast generation finished"
        );
        Ok(Podcast {
            script: display_script.to_display_text(&self.config.speakers),
            audio_path,
        })
    }
}

/// Unique id for one generation request; disambiguates temp segment files
/// across concurrent requests on the same host. The process-local counter
/// covers requests landing in the same millisecond.
fn request_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static SEQ: AtomicU64 = AtomicU64::new(0);

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{millis}_{seq}")
}

/// Tidy extracted document text before chunking: collapse runs of
/// horizontal whitespace, drop "N of M" page-footer artifacts, and squeeze
/// blank-line runs while keeping paragraph breaks for the chunker.
pub fn clean_source(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        lines.push(strip_page_footers(line));
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut blank_run = 0usize;
    for line in &lines {
        if line.is_empty() {
            blank_run += 1;
            if blank_run == 1 {
                out.push("");
            }
        } else {
            blank_run = 0;
            out.push(line);
        }
    }

    out.join("\n").trim().to_string()
}

/// Drop "12 of 340"-style page footers; whitespace also collapses here.
fn strip_page_footers(line: &str) -> String {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if i + 2 < tokens.len()
            && is_number(tokens[i])
            && tokens[i + 1].eq_ignore_ascii_case("of")
            && is_number(tokens[i + 2])
        {
            i += 3;
            continue;
        }
        kept.push(tokens[i]);
        i += 1;
    }
    kept.join(" ")
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}
