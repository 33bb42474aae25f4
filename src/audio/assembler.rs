//! Final episode assembly.
//!
//! Concatenates the synthesizer's segments strictly in production order,
//! re-encodes the result to the canonical output format for streaming
//! playback, validates the artifact, and cleans up the temporary segment
//! files whether or not assembly succeeded.

use crate::audio::{AudioSegment, wav};
use crate::defaults;
use crate::error::{PapercastError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct Assembler {
    output_dir: PathBuf,
    /// Canonical output rate; every segment is resampled to it.
    sample_rate: u32,
}

impl Assembler {
    pub fn new(output_dir: PathBuf, sample_rate: u32) -> Self {
        Self {
            output_dir,
            sample_rate,
        }
    }

    /// Combine `segments` into `<output_dir>/<stem>.wav`.
    ///
    /// Unreadable segment files are skipped with a warning; an episode with
    /// no decodable audio at all is an error. When the normalization pass
    /// fails, the unprocessed concatenation at the first segment's rate is
    /// written instead, degraded but playable. Temporary segment files
    /// are deleted best-effort on every path.
    pub fn assemble(&self, segments: &[AudioSegment], stem: &str) -> Result<PathBuf> {
        let result = self.combine(segments, stem);
        cleanup_segments(segments);
        result
    }

    fn combine(&self, segments: &[AudioSegment], stem: &str) -> Result<PathBuf> {
        if segments.is_empty() {
            return Err(PapercastError::Assembly {
                message: "no audio segments to assemble".to_string(),
            });
        }

        let mut decoded: Vec<(Vec<i16>, u32)> = Vec::with_capacity(segments.len());
        for segment in segments {
            let bytes = match fs::read(&segment.path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %segment.path.display(), error = %e, "skipping unreadable segment");
                    continue;
                }
            };
            match wav::decode(&bytes) {
                Ok((samples, spec)) => decoded.push((samples, spec.sample_rate)),
                Err(e) => {
                    warn!(path = %segment.path.display(), error = %e, "skipping undecodable segment");
                }
            }
        }

        if decoded.is_empty() {
            return Err(PapercastError::Assembly {
                message: "no decodable audio segments".to_string(),
            });
        }

        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(format!("{stem}.wav"));

        // Re-encode pass: normalize everything to the canonical rate. On
        // failure, fall back to the unprocessed concatenation.
        match self.reencode(&decoded) {
            Ok(bytes) => fs::write(&output_path, bytes)?,
            Err(e) => {
                warn!(error = %e, "re-encode pass failed; writing unprocessed concatenation");
                let raw_rate = decoded[0].1;
                let raw: Vec<i16> = decoded.iter().flat_map(|(s, _)| s.iter().copied()).collect();
                let bytes = wav::encode(&raw, raw_rate)?;
                fs::write(&output_path, bytes)?;
            }
        }

        self.validate(&output_path)?;
        debug!(path = %output_path.display(), "episode assembled");
        Ok(output_path)
    }

    /// Normalize all decoded segments to the canonical rate and encode one
    /// contiguous stream.
    fn reencode(&self, decoded: &[(Vec<i16>, u32)]) -> Result<Vec<u8>> {
        let mut combined: Vec<i16> = Vec::new();
        for (samples, rate) in decoded {
            if *rate == self.sample_rate {
                combined.extend_from_slice(samples);
            } else {
                combined.extend(wav::resample(samples, *rate, self.sample_rate));
            }
        }
        wav::encode(&combined, self.sample_rate)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let size = fs::metadata(path)?.len();
        if size < defaults::MIN_OUTPUT_BYTES {
            return Err(PapercastError::Assembly {
                message: format!(
                    "assembled file is {size} bytes, below the {}-byte minimum",
                    defaults::MIN_OUTPUT_BYTES
                ),
            });
        }
        Ok(())
    }
}

/// Best-effort removal of temporary segment files. Failures are logged,
/// never propagated.
fn cleanup_segments(segments: &[AudioSegment]) {
    for segment in segments {
        if let Err(e) = fs::remove_file(&segment.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %segment.path.display(), error = %e, "failed to remove segment file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SegmentKind;
    use std::time::Duration;

    fn write_segment(dir: &Path, order: usize, kind: SegmentKind, samples: &[i16]) -> AudioSegment {
        let path = dir.join(format!("seg_{order}.wav"));
        let bytes = wav::encode(samples, 24000).unwrap();
        fs::write(&path, bytes).unwrap();
        AudioSegment { order, kind, path }
    }

    fn make_assembler(dir: &Path) -> Assembler {
        Assembler::new(dir.join("out"), 24000)
    }

    #[test]
    fn assembles_segments_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![
            write_segment(dir.path(), 0, SegmentKind::Speech, &[1i16; 8000]),
            write_segment(dir.path(), 1, SegmentKind::Pause, &[0i16; 4000]),
            write_segment(dir.path(), 2, SegmentKind::Speech, &[2i16; 8000]),
        ];

        let path = make_assembler(dir.path()).assemble(&segments, "episode").unwrap();
        let (samples, spec) = wav::decode(&fs::read(&path).unwrap()).unwrap();

        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(samples.len(), 20000);
        assert_eq!(samples[0], 1);
        assert_eq!(samples[8000], 0);
        assert_eq!(samples[12000], 2);
    }

    #[test]
    fn normalizes_mismatched_sample_rates() {
        let dir = tempfile::tempdir().unwrap();
        let fast = {
            let path = dir.path().join("fast.wav");
            let bytes = wav::encode(&[3i16; 48000], 48000).unwrap(); // 1s at 48kHz
            fs::write(&path, bytes).unwrap();
            AudioSegment {
                order: 1,
                kind: SegmentKind::Speech,
                path,
            }
        };
        let segments = vec![
            write_segment(dir.path(), 0, SegmentKind::Speech, &[1i16; 24000]), // 1s
            fast,
        ];

        let path = make_assembler(dir.path()).assemble(&segments, "episode").unwrap();
        let (samples, spec) = wav::decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(spec.sample_rate, 24000);
        // ~2 seconds total after resampling
        assert!((47900..=48100).contains(&samples.len()));
    }

    #[test]
    fn deletes_segment_files_after_assembly() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![
            write_segment(dir.path(), 0, SegmentKind::Speech, &[1i16; 24000]),
            write_segment(dir.path(), 1, SegmentKind::Speech, &[2i16; 24000]),
        ];

        make_assembler(dir.path()).assemble(&segments, "episode").unwrap();
        for segment in &segments {
            assert!(!segment.path.exists(), "segment file not cleaned up");
        }
    }

    #[test]
    fn deletes_segment_files_even_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A segment that exists but holds garbage, and one missing entirely
        let garbage_path = dir.path().join("garbage.wav");
        fs::write(&garbage_path, b"not audio").unwrap();
        let segments = vec![
            AudioSegment {
                order: 0,
                kind: SegmentKind::Speech,
                path: garbage_path.clone(),
            },
            AudioSegment {
                order: 1,
                kind: SegmentKind::Speech,
                path: dir.path().join("missing.wav"),
            },
        ];

        let result = make_assembler(dir.path()).assemble(&segments, "episode");
        assert!(matches!(result, Err(PapercastError::Assembly { .. })));
        assert!(!garbage_path.exists(), "garbage segment not cleaned up");
    }

    #[test]
    fn skips_unreadable_segments_but_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![
            write_segment(dir.path(), 0, SegmentKind::Speech, &[1i16; 24000]),
            AudioSegment {
                order: 1,
                kind: SegmentKind::Speech,
                path: dir.path().join("missing.wav"),
            },
            write_segment(dir.path(), 2, SegmentKind::Speech, &[2i16; 24000]),
        ];

        let path = make_assembler(dir.path()).assemble(&segments, "episode").unwrap();
        let (samples, _) = wav::decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(samples.len(), 48000);
    }

    #[test]
    fn empty_segment_list_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = make_assembler(dir.path()).assemble(&[], "episode");
        assert!(matches!(result, Err(PapercastError::Assembly { .. })));
    }

    #[test]
    fn undersized_output_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A handful of samples, far below the minimum output size
        let segments = vec![write_segment(dir.path(), 0, SegmentKind::Speech, &[1i16; 10])];
        let result = make_assembler(dir.path()).assemble(&segments, "episode");
        assert!(matches!(result, Err(PapercastError::Assembly { .. })));
    }

    #[test]
    fn output_duration_matches_segment_sum() {
        let dir = tempfile::tempdir().unwrap();
        let speech_len = 24000usize; // 1s
        let pause_len = (Duration::from_millis(450).as_secs_f64() * 24000.0) as usize;
        let segments = vec![
            write_segment(dir.path(), 0, SegmentKind::Speech, &vec![5i16; speech_len]),
            write_segment(dir.path(), 1, SegmentKind::Pause, &vec![0i16; pause_len]),
        ];

        let path = make_assembler(dir.path()).assemble(&segments, "episode").unwrap();
        let (samples, _) = wav::decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(samples.len(), speech_len + pause_len);
    }
}
