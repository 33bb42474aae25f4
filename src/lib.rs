//! papercast - turn extracted document text into a two-host audio podcast.
//!
//! Pipeline: chunk → generate dialogue via a language model → clean and
//! pause-annotate the script → synthesize each line → assemble one WAV.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod script;
pub mod tts;

// Pipeline entry point
pub use pipeline::orchestrator::{Pipeline, Podcast};

// Capability boundaries (implement these to swap providers)
pub use llm::client::LanguageModel;
pub use tts::client::TextToSpeech;

// Error handling
pub use error::{PapercastError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
