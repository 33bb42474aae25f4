//! Boundary-aware text chunker for chunked script generation.
//!
//! Splits a long document into bounded-size segments, preferring natural
//! boundaries (paragraph > line > sentence > word) so no chunk starts
//! mid-sentence when avoidable. Chunks are exact substrings of the input:
//! concatenating them in index order reconstructs the document byte-for-byte.

use crate::defaults;
use crate::error::{PapercastError, Result};

/// Configuration for the chunker.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Preferred maximum chunk size in characters.
    pub max_chunk_chars: usize,
    /// Maximum number of chunks to produce.
    pub max_chunks: usize,
    /// Hard per-request ceiling imposed by the generation capability.
    pub max_request_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: defaults::MAX_CHUNK_CHARS,
            max_chunks: defaults::MAX_CHUNKS,
            max_request_chars: defaults::MAX_REQUEST_CHARS,
        }
    }
}

/// A contiguous slice of the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Zero-based position in the document.
    pub index: usize,
    /// Total number of chunks the document was split into.
    pub total: usize,
    pub text: String,
}

impl Chunk {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// Split `text` into boundary-aware chunks.
///
/// A document shorter than `max_chunk_chars` yields a single chunk.
/// Otherwise the chunk count is `min(ceil(len / max_chunk_chars),
/// max_chunks)` and each chunk ends at the best boundary found within the
/// last 20% of its window. If the count would reach `max_chunks - 1` with
/// text remaining, the remainder becomes one final chunk; should that (or
/// any chunk) exceed `max_request_chars`, an error is returned so the
/// caller can truncate or reject.
pub fn chunk(text: &str, config: &ChunkerConfig) -> Result<Vec<Chunk>> {
    // Char-index table: boundaries[i] is the byte offset of the i-th char.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = boundaries.len() - 1;

    if total_chars <= config.max_chunk_chars {
        check_ceiling(total_chars, config.max_request_chars)?;
        return Ok(vec![Chunk {
            index: 0,
            total: 1,
            text: text.to_string(),
        }]);
    }

    let target_chunks = total_chars
        .div_ceil(config.max_chunk_chars)
        .min(config.max_chunks);
    let target_size = total_chars
        .div_ceil(target_chunks)
        .min(config.max_request_chars);

    let mut texts: Vec<&str> = Vec::with_capacity(target_chunks);
    let mut start = 0usize; // char offset

    while start < total_chars {
        // Safety valve: one slot left, so take the remainder as a single
        // chunk instead of splitting further.
        if texts.len() == config.max_chunks - 1 {
            texts.push(&text[boundaries[start]..]);
            break;
        }

        let ideal_end = (start + target_size).min(total_chars);
        if ideal_end == total_chars {
            texts.push(&text[boundaries[start]..]);
            break;
        }

        let window =
            ((target_size as f64 * defaults::BOUNDARY_SEARCH_FRACTION) as usize).max(1);
        let window_start = ideal_end.saturating_sub(window).max(start + 1);
        let cut = best_boundary(text, &boundaries, window_start, ideal_end).unwrap_or(ideal_end);

        texts.push(&text[boundaries[start]..boundaries[cut]]);
        start = cut;
    }

    for t in &texts {
        check_ceiling(t.chars().count(), config.max_request_chars)?;
    }

    let total = texts.len();
    Ok(texts
        .into_iter()
        .enumerate()
        .map(|(index, t)| Chunk {
            index,
            total,
            text: t.to_string(),
        })
        .collect())
}

/// Split a single oversize piece of text into parts no longer than
/// `max_chars`, using the same boundary priority as document chunking.
/// Used by the synthesizer for lines beyond the TTS request ceiling.
pub fn split_oversize(text: &str, max_chars: usize) -> Vec<String> {
    let config = ChunkerConfig {
        max_chunk_chars: max_chars,
        // No meaningful count bound here; the ceiling equals the chunk size
        // so every piece fits in one synthesis call.
        max_chunks: usize::MAX,
        max_request_chars: max_chars,
    };
    match chunk(text, &config) {
        Ok(chunks) => chunks.into_iter().map(|c| c.text).collect(),
        // Unreachable in practice (ceiling == chunk size), but never panic
        // on a text path: fall back to the unsplit input.
        Err(_) => vec![text.to_string()],
    }
}

fn check_ceiling(size: usize, limit: usize) -> Result<()> {
    if size > limit {
        return Err(PapercastError::ChunkTooLarge { size, limit });
    }
    Ok(())
}

/// Search backward through `[window_start, ideal_end)` (char offsets) for
/// the best cut point, by priority: blank line, newline, sentence end,
/// whitespace. Returns the char offset to cut at (boundary stays with the
/// left chunk), or None when the window is solid text.
fn best_boundary(
    text: &str,
    boundaries: &[usize],
    window_start: usize,
    ideal_end: usize,
) -> Option<usize> {
    let window = &text[boundaries[window_start]..boundaries[ideal_end]];
    let window_chars: Vec<char> = window.chars().collect();

    // Paragraph break
    if let Some(pos) = rfind_subsequence(&window_chars, &['\n', '\n']) {
        return Some(window_start + pos + 2);
    }
    // Line break
    if let Some(pos) = window_chars.iter().rposition(|&c| c == '\n') {
        return Some(window_start + pos + 1);
    }
    // Sentence end: terminal punctuation followed by whitespace
    for pos in (0..window_chars.len().saturating_sub(1)).rev() {
        if matches!(window_chars[pos], '.' | '?' | '!') && window_chars[pos + 1].is_whitespace() {
            return Some(window_start + pos + 1);
        }
    }
    // Any whitespace: avoid cutting mid-word
    if let Some(pos) = window_chars.iter().rposition(|c| c.is_whitespace()) {
        return Some(window_start + pos + 1);
    }
    None
}

fn rfind_subsequence(haystack: &[char], needle: &[char]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| &haystack[i..i + needle.len()] == needle)
}
