//! Post-processing passes over generated script text.
//!
//! Pure text transforms applied in a fixed order: speaker normalization,
//! leading-metadata stripping, promotional-line filtering, and duration
//! verification. Structure-preserving trimming lives in `trimmer`; pause
//! annotation in `pauses`.

use crate::config::SpeakerConfig;
use crate::script::script::{SpeakerRole, spoken_word_count};

/// Apply passes 1–3 in order: normalize speaker labels, drop everything
/// before the first recognizable speaker line, drop purely promotional
/// lines.
pub fn clean_script(text: &str, speakers: &SpeakerConfig) -> String {
    let normalized = normalize_speakers(text, speakers);
    let stripped = strip_leading_metadata(&normalized);
    filter_promotional_lines(&stripped)
}

/// Rewrite any accepted alias spelling of a host label ("HOST 1:",
/// "**Jamie**:", "Speaker B:") to the canonical `Host A:` / `Host B:` form.
/// Lines without a recognizable label pass through unchanged.
pub fn normalize_speakers(text: &str, speakers: &SpeakerConfig) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim();
            if let Some((label, rest)) = trimmed.split_once(':')
                && let Some(role) = SpeakerRole::from_label(label, speakers)
            {
                format!("{}: {}", role.label(), rest.trim())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop title lines, section headers, and any other text preceding the
/// first line that starts with a canonical speaker label. Runs after
/// normalization, so only the canonical labels need to be recognized.
pub fn strip_leading_metadata(text: &str) -> String {
    let mut lines = text.lines();
    let mut kept: Vec<&str> = Vec::new();

    for line in lines.by_ref() {
        if is_speaker_line(line) {
            kept.push(line);
            break;
        }
    }
    kept.extend(lines);
    kept.join("\n")
}

fn is_speaker_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("Host A:") || trimmed.starts_with("Host B:")
}

/// The spoken part of a line: everything after a canonical speaker label,
/// or the whole line when there is none.
fn line_content(line: &str) -> &str {
    let trimmed = line.trim();
    if is_speaker_line(trimmed) {
        trimmed.split_once(':').map(|(_, rest)| rest).unwrap_or(trimmed)
    } else {
        trimmed
    }
}

/// Remove lines that are purely promotional or self-referential. Filtering
/// works on whole-line intent, not keyword hits: a substantive sentence
/// that happens to contain "subscribe" survives.
pub fn filter_promotional_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !is_promotional(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Intent patterns for promotional lines. Each pattern requires both a
/// call-to-action shape and a promotion keyword, so content like
/// "economists subscribe to this theory" is never dropped.
fn is_promotional(line: &str) -> bool {
    let lower = line_content(line).trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }

    const CALL_TO_ACTION: [&str; 6] = [
        "don't forget to",
        "be sure to",
        "make sure to",
        "remember to",
        "if you enjoyed",
        "hit that",
    ];
    const PROMO_TARGET: [&str; 5] = [
        "subscribe",
        "follow",
        "like",
        "review",
        "notification",
    ];
    if CALL_TO_ACTION.iter().any(|p| lower.contains(p))
        && PROMO_TARGET.iter().any(|t| lower.contains(t))
    {
        return true;
    }

    // "subscribe to our channel/show/podcast" without a lead-in
    if lower.contains("subscribe to our") || lower.contains("like and subscribe") {
        return true;
    }

    // Next-episode teasers framed as sign-offs
    const SIGN_OFF: [&str; 5] = ["see you", "catch you", "join us", "tune in", "we'll be back"];
    if lower.contains("next episode") && SIGN_OFF.iter().any(|p| lower.contains(p)) {
        return true;
    }

    false
}

/// Result of the duration verification pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationCheck {
    pub word_count: usize,
    pub estimated_minutes: f64,
    /// True when the estimate deviates from the target by more than the
    /// configured variance.
    pub out_of_range: bool,
}

/// Estimate the spoken duration of `text` (stage directions excluded) and
/// flag it when outside `target ± variance` minutes.
pub fn verify_duration(
    text: &str,
    words_per_minute: u32,
    target_minutes: u32,
    variance_minutes: f64,
) -> DurationCheck {
    let word_count: usize = text.lines().map(|l| spoken_word_count(line_content(l))).sum();
    let estimated_minutes = word_count as f64 / words_per_minute.max(1) as f64;
    let deviation = (estimated_minutes - target_minutes as f64).abs();
    DurationCheck {
        word_count,
        estimated_minutes,
        out_of_range: deviation > variance_minutes,
    }
}

/// Strip delimited reasoning blocks the generation capability may embed in
/// its output. Content between `<think>` and `</think>` is removed; an
/// unterminated block is stripped to the end of the text.
pub fn strip_thinking_blocks(text: &str) -> String {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        match rest.find(OPEN) {
            Some(start) => {
                out.push_str(&rest[..start]);
                match rest[start..].find(CLOSE) {
                    Some(end_rel) => {
                        rest = &rest[start + end_rel + CLOSE.len()..];
                    }
                    None => break,
                }
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    out.trim().to_string()
}
