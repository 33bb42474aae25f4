//! Default configuration constants for papercast.
//!
//! Shared across configuration types and pipeline stages to keep the tuning
//! knobs in one place.

/// Default speaking rate used to convert word counts to minutes.
///
/// Two-host conversational delivery runs faster than single-narrator
/// audiobook pace; 214 wpm matches measured output of the configured voices.
pub const WORDS_PER_MINUTE: u32 = 214;

/// Default target episode length in minutes.
pub const TARGET_MINUTES: u32 = 12;

/// Allowed deviation from the target duration, in minutes, before a script
/// is flagged as out of range.
pub const DURATION_VARIANCE_MINUTES: f64 = 5.0;

/// Estimated duration above `TRIM_TRIGGER_FACTOR × target` triggers
/// structure-preserving trimming.
pub const TRIM_TRIGGER_FACTOR: f64 = 3.0;

/// Trimming reduces the script to at most `TRIM_CEILING_FACTOR × target`.
pub const TRIM_CEILING_FACTOR: f64 = 2.0;

/// Share of the trimming ceiling spent on body lines; intro and conclusion
/// are retained verbatim on top of this.
pub const BODY_BUDGET_FRACTION: f64 = 0.7;

/// Share of script lines treated as introduction / conclusion when trimming.
pub const EDGE_SECTION_FRACTION: f64 = 0.15;

/// Upper bound on intro/conclusion line counts regardless of script length.
pub const EDGE_SECTION_MAX_LINES: usize = 12;

/// Preferred chunk size in characters for chunked generation.
pub const MAX_CHUNK_CHARS: usize = 24_000;

/// Maximum number of chunks a single document may be split into.
pub const MAX_CHUNKS: usize = 10;

/// Hard per-request character ceiling imposed by the generation capability.
/// A chunk that still exceeds this after splitting is an error.
pub const MAX_REQUEST_CHARS: usize = 30_000;

/// Fraction of a chunk window searched backward for a natural boundary.
pub const BOUNDARY_SEARCH_FRACTION: f64 = 0.2;

/// Word-budget premium for the first and last chunk of a document.
/// Openings and conclusions carry more of the episode than body chunks.
pub const EDGE_CHUNK_BUDGET_FACTOR: f64 = 1.15;

/// Word-budget factor for middle chunks in the first half of a document.
pub const EARLY_MIDDLE_BUDGET_FACTOR: f64 = 1.05;

/// Word-budget factor for middle chunks in the second half of a document.
/// Document density is front-loaded; later chunks contribute less airtime.
pub const LATE_MIDDLE_BUDGET_FACTOR: f64 = 0.90;

/// Maximum concurrent in-flight generation requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 2;

/// Minimum spacing between consecutive generation request starts.
pub const MIN_REQUEST_INTERVAL_MS: u64 = 1_000;

/// Retry ceiling for transient generation failures, not counting the
/// initial attempt.
pub const MAX_RETRIES: u32 = 5;

/// Base delay for exponential backoff.
pub const RETRY_BASE_DELAY_MS: u64 = 2_000;

/// Backoff delay cap.
pub const RETRY_MAX_DELAY_MS: u64 = 32_000;

/// Jitter applied to backoff delays (±20%) so concurrent chunk requests do
/// not retry in lockstep.
pub const RETRY_JITTER: f64 = 0.2;

/// Timeout for a single generation request. Whole-document completions on a
/// large model routinely run for minutes.
pub const GENERATION_TIMEOUT_SECS: u64 = 240;

/// Timeout for a single synthesis request. Per-line synthesis is short.
pub const SYNTHESIS_TIMEOUT_SECS: u64 = 60;

/// Per-request character ceiling of the synthesis capability. Longer lines
/// are split at text boundaries and the audio concatenated.
pub const TTS_MAX_CHARS: usize = 4_000;

/// Output sample rate in Hz. Matches the synthesis capability's native rate.
pub const SAMPLE_RATE: u32 = 24_000;

/// Silence inserted after `!` and `?`.
pub const PAUSE_LONG_MS: u64 = 700;

/// Silence inserted after `.`.
pub const PAUSE_MED_MS: u64 = 450;

/// Silence inserted after `,` and `;`.
pub const PAUSE_SHORT_MS: u64 = 250;

/// Brief hesitation inserted after conversational filler words.
pub const PAUSE_BEAT_MS: u64 = 150;

/// Minimum plausible size of an assembled episode. Anything smaller is a
/// failed assembly, not a podcast.
pub const MIN_OUTPUT_BYTES: u64 = 1_024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_chunks_get_the_largest_budget_factor() {
        assert!(EDGE_CHUNK_BUDGET_FACTOR > EARLY_MIDDLE_BUDGET_FACTOR);
        assert!(EARLY_MIDDLE_BUDGET_FACTOR > LATE_MIDDLE_BUDGET_FACTOR);
    }

    #[test]
    fn pause_durations_are_ordered_by_punctuation_weight() {
        assert!(PAUSE_LONG_MS > PAUSE_MED_MS);
        assert!(PAUSE_MED_MS > PAUSE_SHORT_MS);
        assert!(PAUSE_SHORT_MS > PAUSE_BEAT_MS);
    }

    #[test]
    fn chunk_size_stays_under_request_ceiling() {
        assert!(MAX_CHUNK_CHARS <= MAX_REQUEST_CHARS);
    }
}
