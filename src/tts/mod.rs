//! Text-to-speech capability: client, voice mapping, per-line synthesis.

pub mod client;
pub mod synthesizer;
pub mod voices;
