//! Prompt construction for script generation.
//!
//! Prompts embed the exact word target, the host display names, and the
//! style constraints. Chunk prompts are position-aware: the first chunk
//! opens the episode, the last one closes it, middle chunks do neither.

use crate::config::SpeakerConfig;
use crate::script::chunker::Chunk;

/// System prompt shared by the whole-document and chunked paths.
pub fn system_prompt(speakers: &SpeakerConfig) -> String {
    format!(
        "You are writing a podcast conversation between two hosts, {a} and {b}. \
         {a} is curious and asks sharp questions; {b} explains and connects ideas. \
         Write natural spoken dialogue: contractions, short sentences, occasional \
         filler words, genuine back-and-forth. Label every line as either \
         \"Host A:\" ({a}) or \"Host B:\" ({b}) with nothing else on the label. \
         Never tell listeners to subscribe or follow, never mention a next \
         episode, and never refer to the script, the document, or yourself as \
         an AI. Output only the dialogue lines.",
        a = speakers.host_a_name,
        b = speakers.host_b_name,
    )
}

/// User prompt for single-call generation over the whole document.
pub fn whole_document(text: &str, target_words: u32) -> String {
    format!(
        "Turn the following document into a complete podcast episode of \
         exactly {target_words} words. Open with a short greeting and an \
         introduction of the topic, discuss the document's main points in \
         depth, and end with final takeaways.\n\nDocument:\n{text}"
    )
}

/// User prompt for one chunk of a longer document.
pub fn chunk_prompt(chunk: &Chunk, target_words: u32) -> String {
    let position = if chunk.is_first() {
        "This is the START of the episode. Open with a short greeting and an \
         introduction of the overall topic, then discuss the material below. \
         Do not wrap up: the conversation continues after this."
    } else if chunk.is_last() {
        "This is the END of the episode. The hosts are already mid-conversation: \
         do not greet the listeners or re-introduce the topic. Discuss the \
         material below, then close with final takeaways."
    } else {
        "This is the MIDDLE of the episode. The hosts are already \
         mid-conversation: do not greet, do not introduce the topic, and do \
         not wrap up. Never mention parts, sections, or that this material \
         comes from a longer document. Flow naturally from an ongoing \
         discussion into this material."
    };

    format!(
        "{position}\n\nWrite exactly {target_words} words of dialogue for \
         this portion.\n\nMaterial:\n{text}",
        text = chunk.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speakers() -> SpeakerConfig {
        SpeakerConfig::default()
    }

    fn make_chunk(index: usize, total: usize) -> Chunk {
        Chunk {
            index,
            total,
            text: "material".to_string(),
        }
    }

    #[test]
    fn system_prompt_names_both_hosts() {
        let prompt = system_prompt(&speakers());
        assert!(prompt.contains("Alex"));
        assert!(prompt.contains("Jamie"));
        assert!(prompt.contains("Host A:"));
        assert!(prompt.contains("Host B:"));
    }

    #[test]
    fn system_prompt_prohibits_self_promotion() {
        let prompt = system_prompt(&speakers());
        assert!(prompt.contains("subscribe"));
        assert!(prompt.contains("next"));
    }

    #[test]
    fn whole_document_embeds_exact_word_target() {
        let prompt = whole_document("the text", 2568);
        assert!(prompt.contains("exactly 2568 words"));
        assert!(prompt.contains("the text"));
    }

    #[test]
    fn first_chunk_introduces() {
        let prompt = chunk_prompt(&make_chunk(0, 3), 800);
        assert!(prompt.contains("START"));
        assert!(prompt.contains("greeting"));
        assert!(prompt.contains("exactly 800 words"));
    }

    #[test]
    fn last_chunk_concludes() {
        let prompt = chunk_prompt(&make_chunk(2, 3), 800);
        assert!(prompt.contains("END"));
        assert!(prompt.contains("takeaways"));
    }

    #[test]
    fn middle_chunk_neither_greets_nor_concludes() {
        let prompt = chunk_prompt(&make_chunk(1, 3), 700);
        assert!(prompt.contains("MIDDLE"));
        assert!(prompt.contains("do not greet"));
        assert!(prompt.contains("Never mention parts"));
    }

    #[test]
    fn single_chunk_counts_as_first() {
        // A one-chunk document is both first and last; opening wins
        let prompt = chunk_prompt(&make_chunk(0, 1), 500);
        assert!(prompt.contains("START"));
    }
}
