//! Speaker-to-voice mapping.
//!
//! Each host role resolves to a voice id through the configured engine
//! tier. Swapping tiers changes the voice pair without touching calling
//! code; explicit per-role overrides in config win over the tier defaults.

use crate::config::SynthesisConfig;
use crate::script::script::SpeakerRole;

/// Resolved role → voice mapping for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceMap {
    pub engine: String,
    host_a: String,
    host_b: String,
}

impl VoiceMap {
    /// Default voice pair for an engine tier. Unknown tiers fall back to
    /// the standard pair.
    fn tier_defaults(engine: &str) -> (&'static str, &'static str) {
        match engine {
            "neural" => ("am_michael", "bf_isabella"),
            "premium" => ("bm_george", "af_bella"),
            _ => ("am_adam", "bf_emma"),
        }
    }

    pub fn from_config(config: &SynthesisConfig) -> Self {
        let (a, b) = Self::tier_defaults(&config.engine);
        Self {
            engine: config.engine.clone(),
            host_a: config.host_a_voice.clone().unwrap_or_else(|| a.to_string()),
            host_b: config.host_b_voice.clone().unwrap_or_else(|| b.to_string()),
        }
    }

    pub fn voice_for(&self, role: SpeakerRole) -> &str {
        match role {
            SpeakerRole::HostA => &self.host_a,
            SpeakerRole::HostB => &self.host_b,
        }
    }
}
