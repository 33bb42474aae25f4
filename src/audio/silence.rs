//! Programmatically generated silence segments.
//!
//! Pauses between dialogue lines are real PCM silence written with hound,
//! at the same sample rate as the speech segments, so the assembler treats
//! them like any other segment.

use crate::audio::wav;
use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// Write `duration` of silence as a mono 16-bit WAV at `sample_rate`.
pub fn write_silence(path: &Path, duration: Duration, sample_rate: u32) -> Result<()> {
    let bytes = silence_wav(duration, sample_rate)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Silence as an in-memory WAV buffer.
pub fn silence_wav(duration: Duration, sample_rate: u32) -> Result<Vec<u8>> {
    let sample_count = (duration.as_secs_f64() * sample_rate as f64).round() as usize;
    let samples = vec![0i16; sample_count];
    wav::encode(&samples, sample_rate)
}
