//! TTS pause annotation.
//!
//! Inserts bracketed pause markers into cleaned script text as synthesis
//! hints: longer after `!`/`?` than after `.`, shorter after `,`/`;`, and a
//! brief hesitation beat after conversational filler. Markers are never
//! spoken: `tts_text` strips them before text reaches the voice
//! capability, and `trailing_pause` translates a line's ending into the
//! silence segment the synthesizer appends.

use crate::defaults;
use std::time::Duration;

/// Silence classes, ordered by duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseClass {
    /// After `!` and `?`.
    Long,
    /// After `.`.
    Med,
    /// After `,` and `;`.
    Short,
    /// After filler words.
    Beat,
}

impl PauseClass {
    pub fn marker(&self) -> &'static str {
        match self {
            PauseClass::Long => "[pause:long]",
            PauseClass::Med => "[pause:med]",
            PauseClass::Short => "[pause:short]",
            PauseClass::Beat => "[pause:beat]",
        }
    }

    pub fn duration(&self) -> Duration {
        let ms = match self {
            PauseClass::Long => defaults::PAUSE_LONG_MS,
            PauseClass::Med => defaults::PAUSE_MED_MS,
            PauseClass::Short => defaults::PAUSE_SHORT_MS,
            PauseClass::Beat => defaults::PAUSE_BEAT_MS,
        };
        Duration::from_millis(ms)
    }

    fn from_marker(marker: &str) -> Option<PauseClass> {
        match marker {
            "[pause:long]" => Some(PauseClass::Long),
            "[pause:med]" => Some(PauseClass::Med),
            "[pause:short]" => Some(PauseClass::Short),
            "[pause:beat]" => Some(PauseClass::Beat),
            _ => None,
        }
    }

    /// Pause class implied by a sentence-ending character.
    fn from_punctuation(ch: char) -> Option<PauseClass> {
        match ch {
            '!' | '?' => Some(PauseClass::Long),
            '.' => Some(PauseClass::Med),
            ',' | ';' => Some(PauseClass::Short),
            _ => None,
        }
    }
}

/// Filler words that get a hesitation beat when followed by a comma.
const FILLERS: [&str; 4] = ["well", "um", "uh", "hmm"];

/// Annotate every line of `text` with pause markers.
pub fn annotate(text: &str) -> String {
    text.lines()
        .map(annotate_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Insert pause markers after punctuation and filler words in one line.
fn annotate_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len() + 32);
    let mut word_start: Option<usize> = None;

    for i in 0..chars.len() {
        let ch = chars[i];
        out.push(ch);

        if ch.is_alphanumeric() {
            if word_start.is_none() {
                word_start = Some(i);
            }
            continue;
        }

        // A filler word directly followed by a comma gets a beat after the
        // comma; the comma's own short pause is subsumed.
        if ch == ','
            && let Some(start) = word_start
        {
            let word: String = chars[start..i].iter().collect::<String>().to_lowercase();
            if FILLERS.contains(&word.as_str()) {
                out.push(' ');
                out.push_str(PauseClass::Beat.marker());
                word_start = None;
                continue;
            }
        }
        if !ch.is_alphanumeric() && ch != '\'' {
            word_start = None;
        }

        // Ellipses annotate once, after the final dot.
        if ch == '.' && chars.get(i + 1) == Some(&'.') {
            continue;
        }

        let at_clause_end = match chars.get(i + 1) {
            None => true,
            Some(next) => next.is_whitespace(),
        };
        // Decimal numbers ("3.14") are not sentence ends.
        let after_digit = i > 0 && chars[i - 1].is_ascii_digit() && ch == '.';

        if at_clause_end
            && !after_digit
            && let Some(class) = PauseClass::from_punctuation(ch)
        {
            out.push(' ');
            out.push_str(class.marker());
        }
    }

    out
}

/// Text safe to send to the voice capability: all pause markers removed.
pub fn tts_text(line: &str) -> String {
    let mut out = line.to_string();
    for class in [
        PauseClass::Long,
        PauseClass::Med,
        PauseClass::Short,
        PauseClass::Beat,
    ] {
        out = out.replace(class.marker(), "");
    }
    // Collapse the doubled spaces the removal leaves behind
    let mut collapsed = String::with_capacity(out.len());
    let mut prev_space = false;
    for ch in out.chars() {
        if ch == ' ' {
            if !prev_space {
                collapsed.push(ch);
            }
            prev_space = true;
        } else {
            collapsed.push(ch);
            prev_space = false;
        }
    }
    collapsed.trim().to_string()
}

/// The silence to append after a line: its trailing pause marker if any,
/// otherwise the class implied by its terminal punctuation.
pub fn trailing_pause(line: &str) -> Option<PauseClass> {
    let trimmed = line.trim_end();

    if trimmed.ends_with(']')
        && let Some(start) = trimmed.rfind('[')
        && let Some(class) = PauseClass::from_marker(&trimmed[start..])
    {
        return Some(class);
    }

    let spoken = tts_text(trimmed);
    spoken
        .chars()
        .last()
        .and_then(PauseClass::from_punctuation)
        // Trailing commas read as clause breaks, not line-end pauses
        .filter(|c| *c != PauseClass::Short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_sentence_end_period() {
        assert_eq!(
            annotate_line("That is the idea."),
            "That is the idea. [pause:med]"
        );
    }

    #[test]
    fn test_annotate_question_gets_long_pause() {
        assert_eq!(
            annotate_line("Really? I had no idea."),
            "Really? [pause:long] I had no idea. [pause:med]"
        );
    }

    #[test]
    fn test_annotate_exclamation_gets_long_pause() {
        assert_eq!(annotate_line("Wow!"), "Wow! [pause:long]");
    }

    #[test]
    fn test_annotate_comma_and_semicolon() {
        assert_eq!(
            annotate_line("First, second; third."),
            "First, [pause:short] second; [pause:short] third. [pause:med]"
        );
    }

    #[test]
    fn test_annotate_filler_word_gets_beat() {
        assert_eq!(
            annotate_line("Well, that depends."),
            "Well, [pause:beat] that depends. [pause:med]"
        );
    }

    #[test]
    fn test_annotate_filler_mid_sentence() {
        assert_eq!(
            annotate_line("I think, um, maybe."),
            "I think, [pause:short] um, [pause:beat] maybe. [pause:med]"
        );
    }

    #[test]
    fn test_annotate_non_filler_comma_is_short() {
        assert_eq!(
            annotate_line("Sure, go on."),
            "Sure, [pause:short] go on. [pause:med]"
        );
    }

    #[test]
    fn test_annotate_decimal_number_not_marked() {
        assert_eq!(
            annotate_line("It grew 3.14 percent."),
            "It grew 3.14 percent. [pause:med]"
        );
    }

    #[test]
    fn test_annotate_ellipsis_marked_once() {
        assert_eq!(
            annotate_line("And then... nothing."),
            "And then... [pause:med] nothing. [pause:med]"
        );
    }

    #[test]
    fn test_annotate_multiline() {
        let annotated = annotate("One.\nTwo!");
        assert_eq!(annotated, "One. [pause:med]\nTwo! [pause:long]");
    }

    #[test]
    fn test_tts_text_strips_all_markers() {
        let line = "Well, [pause:beat] sure. [pause:med] Right? [pause:long]";
        assert_eq!(tts_text(line), "Well, sure. Right?");
    }

    #[test]
    fn test_tts_text_plain_line_unchanged() {
        assert_eq!(tts_text("No markers here."), "No markers here.");
    }

    #[test]
    fn test_trailing_pause_from_marker() {
        assert_eq!(
            trailing_pause("Sure. [pause:med]"),
            Some(PauseClass::Med)
        );
        assert_eq!(
            trailing_pause("What? [pause:long]"),
            Some(PauseClass::Long)
        );
    }

    #[test]
    fn test_trailing_pause_from_bare_punctuation() {
        assert_eq!(trailing_pause("Plain sentence."), Some(PauseClass::Med));
        assert_eq!(trailing_pause("Exciting!"), Some(PauseClass::Long));
    }

    #[test]
    fn test_trailing_pause_none_without_terminal_punctuation() {
        assert_eq!(trailing_pause("trailing words"), None);
        assert_eq!(trailing_pause("a comma,"), None);
    }

    #[test]
    fn test_pause_durations_ordered() {
        assert!(PauseClass::Long.duration() > PauseClass::Med.duration());
        assert!(PauseClass::Med.duration() > PauseClass::Short.duration());
        assert!(PauseClass::Short.duration() > PauseClass::Beat.duration());
    }

    #[test]
    fn test_marker_round_trip() {
        for class in [
            PauseClass::Long,
            PauseClass::Med,
            PauseClass::Short,
            PauseClass::Beat,
        ] {
            assert_eq!(PauseClass::from_marker(class.marker()), Some(class));
        }
    }
}
