//! Structure-preserving script trimming.
//!
//! When a generated script runs far over the duration budget, the body is
//! truncated while the introduction and conclusion are kept verbatim. A
//! script already within budget passes through unchanged.

use crate::defaults;
use crate::script::script::spoken_word_count;

/// Trim `text` to at most `max_words` spoken words (speaker labels and
/// stage directions excluded from the count).
///
/// The first ~15% of lines (capped) are the introduction and the last ~15%
/// (capped) the conclusion; both are always retained verbatim. Body lines
/// are kept greedily, in order, up to ~70% of `max_words`. When the
/// retained conclusion carries no recognizable closing phrasing, a generic
/// closing exchange is appended so the episode still lands.
pub fn trim_to_budget(text: &str, max_words: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let total_words: usize = lines.iter().map(|l| line_words(l)).sum();

    if total_words <= max_words {
        return text.to_string();
    }

    let edge = edge_len(lines.len());
    let intro = &lines[..edge];
    let conclusion = &lines[lines.len() - edge..];
    let body = &lines[edge..lines.len() - edge];

    let body_budget = (max_words as f64 * defaults::BODY_BUDGET_FRACTION) as usize;
    let mut kept_body: Vec<&str> = Vec::new();
    let mut body_words = 0usize;
    for line in body {
        let words = line_words(line);
        if body_words + words > body_budget {
            break;
        }
        body_words += words;
        kept_body.push(line);
    }

    let mut result: Vec<&str> = Vec::with_capacity(edge * 2 + kept_body.len());
    result.extend_from_slice(intro);
    result.extend(kept_body);
    result.extend_from_slice(conclusion);

    let mut out = result.join("\n");
    if !has_closing_phrasing(conclusion) {
        out.push('\n');
        out.push_str(&closing_exchange());
    }
    out
}

fn line_words(line: &str) -> usize {
    let trimmed = line.trim_start();
    let content = trimmed
        .strip_prefix("Host A:")
        .or_else(|| trimmed.strip_prefix("Host B:"))
        .unwrap_or(trimmed);
    spoken_word_count(content)
}

/// Intro/conclusion section length for a script of `line_count` lines.
fn edge_len(line_count: usize) -> usize {
    ((line_count as f64 * defaults::EDGE_SECTION_FRACTION).ceil() as usize)
        .clamp(1, defaults::EDGE_SECTION_MAX_LINES)
        .min(line_count / 3)
        .max(1)
}

/// Heuristic for "this already sounds like an ending".
fn has_closing_phrasing(lines: &[&str]) -> bool {
    const CLOSERS: [&str; 7] = [
        "wrap up",
        "wrapping up",
        "takeaway",
        "to sum up",
        "in summary",
        "thanks for joining",
        "that's all",
    ];
    lines.iter().any(|line| {
        let lower = line.to_lowercase();
        CLOSERS.iter().any(|c| lower.contains(c))
    })
}

/// Generic but on-topic closing exchange, used when trimming cut away the
/// natural ending.
fn closing_exchange() -> String {
    [
        "Host A: That feels like a good place to wrap up. What's your biggest takeaway from all of this?",
        "Host B: For me, it's how much these ideas connect with each other. There's a lot here worth sitting with.",
        "Host A: Couldn't agree more. Thanks for digging into it with me.",
    ]
    .join("\n")
}
