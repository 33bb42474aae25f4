//! Dialogue script data model.
//!
//! A script is an ordered list of lines, each owned by one of two canonical
//! host roles. Display names ("Alex", "Jamie") are presentation only and
//! live in config; nothing downstream branches on raw label strings.

use crate::config::SpeakerConfig;

/// Canonical identity of a conversational participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeakerRole {
    HostA,
    HostB,
}

impl SpeakerRole {
    /// Canonical script label, used for all internal text representations.
    pub fn label(&self) -> &'static str {
        match self {
            SpeakerRole::HostA => "Host A",
            SpeakerRole::HostB => "Host B",
        }
    }

    /// Resolve a raw speaker label to a role. Accepts the canonical labels,
    /// both historical label schemes ("Host A" / "Speaker 1"), and the
    /// configured display names. Case-insensitive; markdown bold and
    /// surrounding whitespace are tolerated.
    pub fn from_label(raw: &str, speakers: &SpeakerConfig) -> Option<SpeakerRole> {
        let cleaned = raw.trim().trim_matches('*').trim().to_lowercase();

        const HOST_A_ALIASES: [&str; 4] = ["host a", "host 1", "speaker a", "speaker 1"];
        const HOST_B_ALIASES: [&str; 4] = ["host b", "host 2", "speaker b", "speaker 2"];

        if HOST_A_ALIASES.contains(&cleaned.as_str())
            || cleaned == speakers.host_a_name.to_lowercase()
        {
            return Some(SpeakerRole::HostA);
        }
        if HOST_B_ALIASES.contains(&cleaned.as_str())
            || cleaned == speakers.host_b_name.to_lowercase()
        {
            return Some(SpeakerRole::HostB);
        }
        None
    }
}

/// One dialogue turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub role: SpeakerRole,
    pub text: String,
}

/// A complete dialogue script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub lines: Vec<Line>,
}

impl Script {
    /// Parse script text into speaker-attributed lines.
    ///
    /// A line with a recognizable `Label:` prefix starts a new turn;
    /// unlabeled continuation lines are appended to the previous turn.
    /// Lines that are stage directions only (nothing left after removing
    /// bracketed spans) are dropped. Unlabeled text before the first
    /// recognized speaker is discarded.
    pub fn parse(text: &str, speakers: &SpeakerConfig) -> Script {
        let mut lines: Vec<Line> = Vec::new();

        for raw in text.lines() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            match split_labeled(trimmed, speakers) {
                Some((role, rest)) => {
                    if !is_stage_direction_only(rest) {
                        lines.push(Line {
                            role,
                            text: rest.trim().to_string(),
                        });
                    }
                }
                None => {
                    if let Some(last) = lines.last_mut()
                        && !is_stage_direction_only(trimmed)
                    {
                        last.text.push(' ');
                        last.text.push_str(trimmed);
                    }
                }
            }
        }

        Script { lines }
    }

    /// Word count with bracketed spans (stage directions, pause markers)
    /// excluded.
    pub fn word_count(&self) -> usize {
        self.lines
            .iter()
            .map(|l| spoken_word_count(&l.text))
            .sum()
    }

    /// Estimated spoken duration in minutes at the given speaking rate.
    pub fn estimated_minutes(&self, words_per_minute: u32) -> f64 {
        self.word_count() as f64 / words_per_minute.max(1) as f64
    }

    /// Render with canonical labels, one turn per line.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}: {}", l.role.label(), l.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render with configured display names, one turn per line.
    pub fn to_display_text(&self, speakers: &SpeakerConfig) -> String {
        self.lines
            .iter()
            .map(|l| {
                let name = match l.role {
                    SpeakerRole::HostA => &speakers.host_a_name,
                    SpeakerRole::HostB => &speakers.host_b_name,
                };
                format!("{}: {}", name, l.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Split `Label: text` when the label resolves to a role.
fn split_labeled<'a>(line: &'a str, speakers: &SpeakerConfig) -> Option<(SpeakerRole, &'a str)> {
    let (label, rest) = line.split_once(':')?;
    let role = SpeakerRole::from_label(label, speakers)?;
    Some((role, rest))
}

/// Count words with bracketed spans removed.
pub fn spoken_word_count(text: &str) -> usize {
    strip_bracketed(text).split_whitespace().count()
}

/// Remove `[...]` and `(...)` spans. Unclosed brackets drop the rest of the
/// text; generated stage directions are occasionally left unterminated.
pub fn strip_bracketed(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for ch in text.chars() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// True when nothing speakable remains after removing bracketed spans.
pub fn is_stage_direction_only(text: &str) -> bool {
    strip_bracketed(text).trim().is_empty()
}
