//! End-to-end pipeline scenarios with in-process mock capabilities.

use async_trait::async_trait;
use papercast::audio::wav;
use papercast::config::Config;
use papercast::error::{PapercastError, Result};
use papercast::llm::retry::RetryPolicy;
use papercast::pipeline::orchestrator::Pipeline;
use papercast::{LanguageModel, TextToSpeech};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Config pointing at a temp output dir, with fast throttling for tests.
fn test_config(output_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.generation.min_interval_ms = 0;
    config.generation.max_concurrent = 4;
    config.output.dir = output_dir.to_path_buf();
    config
}

fn test_pipeline(
    config: Config,
    llm: Arc<dyn LanguageModel>,
    tts: Arc<dyn TextToSpeech>,
) -> Pipeline {
    Pipeline::with_capabilities(config, llm, tts).with_retry_policy(RetryPolicy::immediate(5))
}

// ── Mock capabilities ────────────────────────────────────────────────────

/// TTS returning 100ms of flat audio per call, with optional failure
/// injection by 1-based call number.
struct MockTts {
    calls: AtomicUsize,
    budget_out_on: Option<usize>,
}

impl MockTts {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            budget_out_on: None,
        }
    }

    fn budget_out_on(n: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            budget_out_on: Some(n),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextToSpeech for MockTts {
    async fn synthesize(&self, _text: &str, _voice: &str, _engine: &str) -> Result<Vec<u8>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.budget_out_on == Some(n) {
            return Err(PapercastError::BudgetExhausted {
                message: "monthly character quota reached".to_string(),
            });
        }
        wav::encode(&[500i16; 2400], 24000)
    }
}

/// Language model that answers every request with one fixed script.
struct SimpleLlm {
    calls: AtomicUsize,
    script: String,
}

impl SimpleLlm {
    fn new(script: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: script.to_string(),
        }
    }
}

#[async_trait]
impl LanguageModel for SimpleLlm {
    async fn complete(&self, _s: &str, _u: &str, _t: u32, _temp: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.clone())
    }
}

// ── Scenario: short document, single call succeeds ───────────────────────

#[tokio::test]
async fn short_document_single_call() {
    let out = tempfile::tempdir().unwrap();
    let script = "<think>plan the episode</think>\
                  Podcast Episode Script\n\
                  Alex: Welcome to today's episode! We're looking at a short but dense paper.\n\
                  Jamie: It really is dense. The core claim caught my eye immediately.\n\
                  Alex: Walk me through it?\n\
                  Jamie: The authors argue the effect is front-loaded, which matches the data.\n\
                  Alex: Don't forget to subscribe and leave a review!\n\
                  Jamie: That wraps up the main argument nicely.";
    let llm = Arc::new(SimpleLlm::new(script));
    let tts = Arc::new(MockTts::new());
    let pipeline = test_pipeline(
        test_config(out.path()),
        Arc::clone(&llm) as Arc<dyn LanguageModel>,
        Arc::clone(&tts) as Arc<dyn TextToSpeech>,
    );

    let source = "A short document. ".repeat(30);
    let podcast = pipeline.generate_podcast(&source, "short.pdf").await.unwrap();

    // Whole-document generation: exactly one model call
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);

    // Both hosts present, promotional line and metadata gone
    assert!(podcast.script.contains("Alex:"));
    assert!(podcast.script.contains("Jamie:"));
    assert!(!podcast.script.to_lowercase().contains("subscribe"));
    assert!(!podcast.script.contains("Podcast Episode Script"));
    assert!(!podcast.script.contains("<think>"));
    assert!(!podcast.script.contains("[pause:"));

    // Playable artifact at the configured location
    assert!(podcast.audio_path.starts_with(out.path()));
    let bytes = std::fs::read(&podcast.audio_path).unwrap();
    let (samples, spec) = wav::decode(&bytes).unwrap();
    assert_eq!(spec.sample_rate, 24000);
    // 5 spoken lines of speech plus trailing pauses
    assert!(samples.len() > 5 * 2400);
    assert_eq!(tts.call_count(), 5);
}

// ── Scenario: oversize document, chunked fallback ────────────────────────

/// Rejects the whole-document request as oversize, then serves chunk
/// requests with deliberately reversed latency (earliest chunk slowest).
struct OversizeLlm {
    calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for OversizeLlm {
    async fn complete(&self, _s: &str, user: &str, _t: u32, _temp: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if user.contains("complete podcast episode") {
            return Err(PapercastError::PayloadTooLarge);
        }

        let (tag, part, delay_ms) = if user.contains("ALPHA") {
            ("alpha", 1, 90u64)
        } else if user.contains("BRAVO") {
            ("bravo", 2, 40)
        } else {
            ("charlie", 3, 5)
        };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(format!(
            "Part {part} of 3\n\
             Host A: Segment {tag} begins with the main observation.\n\
             Host B: And segment {tag} closes with the supporting data."
        ))
    }
}

#[tokio::test]
async fn oversize_document_falls_back_to_ordered_chunks() {
    let out = tempfile::tempdir().unwrap();
    let mut config = test_config(out.path());
    config.generation.max_chunk_chars = 200;
    config.generation.max_request_chars = 900;

    let para = |tag: &str| format!("{tag} {}.", "filler words for the paragraph ".repeat(5));
    let source = format!("{}\n\n{}\n\n{}", para("ALPHA"), para("BRAVO"), para("CHARLIE"));
    assert!(source.chars().count() < 900, "whole attempt must fire first");

    let llm = Arc::new(OversizeLlm {
        calls: AtomicUsize::new(0),
    });
    let tts = Arc::new(MockTts::new());
    let pipeline = test_pipeline(
        config,
        Arc::clone(&llm) as Arc<dyn LanguageModel>,
        Arc::clone(&tts) as Arc<dyn TextToSpeech>,
    );

    let podcast = pipeline.generate_podcast(&source, "long.pdf").await.unwrap();

    // One oversize whole-document attempt plus one request per chunk
    assert_eq!(llm.calls.load(Ordering::SeqCst), 4);

    // Chunk order preserved despite reversed completion latency
    let alpha = podcast.script.find("alpha").expect("alpha missing");
    let bravo = podcast.script.find("bravo").expect("bravo missing");
    let charlie = podcast.script.find("charlie").expect("charlie missing");
    assert!(alpha < bravo && bravo < charlie, "chunk order not preserved");

    // No per-chunk preamble leaked into the final text
    assert!(!podcast.script.contains("Part"));
}

// ── Scenario: persistent rate limiting ───────────────────────────────────

struct RateLimitedLlm {
    calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for RateLimitedLlm {
    async fn complete(&self, _s: &str, _u: &str, _t: u32, _temp: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PapercastError::RateLimited { retry_after: None })
    }
}

#[tokio::test]
async fn persistent_rate_limiting_fails_as_transient_category() {
    let out = tempfile::tempdir().unwrap();
    let mut config = test_config(out.path());
    // Force the chunked path directly: the document is over the ceiling
    config.generation.max_chunk_chars = 200;
    config.generation.max_request_chars = 300;

    let llm = Arc::new(RateLimitedLlm {
        calls: AtomicUsize::new(0),
    });
    let pipeline = test_pipeline(
        config,
        Arc::clone(&llm) as Arc<dyn LanguageModel>,
        Arc::new(MockTts::new()) as Arc<dyn TextToSpeech>,
    );

    let source = "some document text here. ".repeat(30); // ~750 chars
    let err = pipeline
        .generate_podcast(&source, "doc.pdf")
        .await
        .unwrap_err();

    // Transient-upstream category, not budget exhaustion
    assert!(matches!(err, PapercastError::Generation { .. }));
    assert!(!err.is_budget_exhausted());

    // Every chunk request was retried to the ceiling: 6 attempts each
    let calls = llm.calls.load(Ordering::SeqCst);
    assert!(calls % 6 == 0, "expected 6 attempts per chunk, saw {calls}");
    assert!(calls >= 12, "expected at least two chunks, saw {calls}");
}

// ── Scenario: TTS budget exhausted mid-synthesis ─────────────────────────

#[tokio::test]
async fn tts_budget_exhaustion_stops_immediately() {
    let out = tempfile::tempdir().unwrap();
    let script = "Alex: Line one of the show.\n\
                  Jamie: Line two continues.\n\
                  Alex: Line three digs deeper.\n\
                  Jamie: Line four hits the quota.\n\
                  Alex: Line five never plays.\n\
                  Jamie: Line six never plays either.";
    let llm = Arc::new(SimpleLlm::new(script));
    let tts = Arc::new(MockTts::budget_out_on(4));
    let pipeline = test_pipeline(
        test_config(out.path()),
        Arc::clone(&llm) as Arc<dyn LanguageModel>,
        Arc::clone(&tts) as Arc<dyn TextToSpeech>,
    );

    let err = pipeline
        .generate_podcast("A document to discuss.", "doc.pdf")
        .await
        .unwrap_err();

    // Distinct terminal category, surfaced unchanged
    assert!(err.is_budget_exhausted());
    // Lines five and six were never attempted
    assert_eq!(tts.call_count(), 4);
    // No partial artifact was reported or left in the output dir
    let outputs: Vec<_> = std::fs::read_dir(out.path()).unwrap().collect();
    assert!(outputs.is_empty(), "partial artifact written");
}

// ── Input guards ─────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_source_is_rejected_before_any_generation() {
    let out = tempfile::tempdir().unwrap();
    let llm = Arc::new(SimpleLlm::new("Alex: hi."));
    let pipeline = test_pipeline(
        test_config(out.path()),
        Arc::clone(&llm) as Arc<dyn LanguageModel>,
        Arc::new(MockTts::new()) as Arc<dyn TextToSpeech>,
    );

    let err = pipeline
        .generate_podcast("   \n\t  ", "empty.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, PapercastError::EmptySource));
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn script_without_speakers_is_a_generation_error() {
    let out = tempfile::tempdir().unwrap();
    let llm = Arc::new(SimpleLlm::new("Just narration without any host labels."));
    let pipeline = test_pipeline(
        test_config(out.path()),
        llm as Arc<dyn LanguageModel>,
        Arc::new(MockTts::new()) as Arc<dyn TextToSpeech>,
    );

    let err = pipeline
        .generate_podcast("A document.", "doc.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, PapercastError::Generation { .. }));
}
