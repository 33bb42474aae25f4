//! Per-line speech synthesis.
//!
//! Walks the script sequentially (output order is part of the contract),
//! resolves each line's voice, and writes one temp WAV per line plus a
//! silence segment where the line's ending calls for one. Budget
//! exhaustion stops the whole request immediately; any other per-line
//! failure is logged and the line skipped.

use crate::audio::{AudioSegment, SegmentKind, silence, wav};
use crate::config::SynthesisConfig;
use crate::error::{PapercastError, Result};
use crate::script::chunker;
use crate::script::pauses;
use crate::script::script::{Script, SpeakerRole};
use crate::tts::client::TextToSpeech;
use crate::tts::voices::VoiceMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct Synthesizer {
    tts: Arc<dyn TextToSpeech>,
    voices: VoiceMap,
    config: SynthesisConfig,
    work_dir: PathBuf,
    /// Disambiguates temp file names across concurrent generation requests
    /// on the same host.
    request_id: String,
}

impl Synthesizer {
    pub fn new(
        tts: Arc<dyn TextToSpeech>,
        config: SynthesisConfig,
        work_dir: PathBuf,
        request_id: String,
    ) -> Self {
        let voices = VoiceMap::from_config(&config);
        Self {
            tts,
            voices,
            config,
            work_dir,
            request_id,
        }
    }

    /// Synthesize every line of `script` into ordered audio segments.
    pub async fn synthesize_script(&self, script: &Script) -> Result<Vec<AudioSegment>> {
        fs::create_dir_all(&self.work_dir)?;

        let mut segments: Vec<AudioSegment> = Vec::new();
        for (line_no, line) in script.lines.iter().enumerate() {
            let speech_text = pauses::tts_text(&line.text);
            if speech_text.is_empty() {
                continue;
            }

            match self.synthesize_line(&speech_text, line.role).await {
                Ok(bytes) => {
                    let path = self.segment_path(line_no, "line");
                    fs::write(&path, &bytes)?;
                    segments.push(AudioSegment {
                        order: segments.len(),
                        kind: SegmentKind::Speech,
                        path,
                    });

                    if let Some(pause) = pauses::trailing_pause(&line.text) {
                        let path = self.segment_path(line_no, "pause");
                        silence::write_silence(&path, pause.duration(), self.config.sample_rate)?;
                        segments.push(AudioSegment {
                            order: segments.len(),
                            kind: SegmentKind::Pause,
                            path,
                        });
                    }
                }
                Err(err) if err.is_budget_exhausted() => {
                    // Terminal: stop immediately, surface distinctly, and
                    // leave nothing behind for the assembler.
                    error!(line = line_no, "synthesis budget exhausted; aborting request");
                    remove_segments(&segments);
                    return Err(err);
                }
                Err(err) => {
                    warn!(line = line_no, error = %err, "line synthesis failed; skipping");
                }
            }
        }

        if segments.is_empty() {
            return Err(PapercastError::Synthesis {
                message: "no lines produced audio".to_string(),
            });
        }
        debug!(segments = segments.len(), "script synthesized");
        Ok(segments)
    }

    /// Synthesize one line, splitting at text boundaries when it exceeds
    /// the capability's per-request ceiling and concatenating the sub-call
    /// audio in order.
    async fn synthesize_line(&self, text: &str, role: SpeakerRole) -> Result<Vec<u8>> {
        let voice = self.voices.voice_for(role);

        if text.chars().count() <= self.config.max_request_chars {
            return self.tts.synthesize(text, voice, &self.voices.engine).await;
        }

        let parts = chunker::split_oversize(text, self.config.max_request_chars);
        debug!(parts = parts.len(), "line exceeds synthesis ceiling; splitting");
        let mut buffers = Vec::with_capacity(parts.len());
        for part in &parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            buffers.push(self.tts.synthesize(part, voice, &self.voices.engine).await?);
        }
        wav::concat_buffers(&buffers)
    }

    fn segment_path(&self, line_no: usize, kind: &str) -> PathBuf {
        self.work_dir
            .join(format!("{}_{kind}_{line_no}.wav", self.request_id))
    }
}

/// Best-effort cleanup of segments that will never reach the assembler.
fn remove_segments(segments: &[AudioSegment]) {
    for segment in segments {
        if let Err(e) = fs::remove_file(&segment.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %segment.path.display(), error = %e, "failed to remove segment file");
        }
    }
}
