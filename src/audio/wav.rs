//! WAV primitives shared by the synthesizer and assembler.
//!
//! Everything here works on 16-bit PCM. Stereo input is downmixed and
//! arbitrary sample rates are brought to the target rate with linear
//! interpolation; quality is ample for speech.

use crate::error::{PapercastError, Result};
use hound::{SampleFormat, WavSpec};
use std::io::Cursor;

/// Decode a WAV buffer into mono 16-bit samples plus the source spec.
pub fn decode(bytes: &[u8]) -> Result<(Vec<i16>, WavSpec)> {
    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| PapercastError::Assembly {
            message: format!("failed to parse WAV data: {e}"),
        })?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(PapercastError::Assembly {
            message: format!(
                "unsupported WAV format: {} bits {:?}",
                spec.bits_per_sample, spec.sample_format
            ),
        });
    }

    let raw: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| PapercastError::Assembly {
            message: format!("failed to read WAV samples: {e}"),
        })?;

    let mono = match spec.channels {
        1 => raw,
        2 => downmix_stereo(&raw),
        n => {
            return Err(PapercastError::Assembly {
                message: format!("unsupported channel count: {n}"),
            });
        }
    };

    Ok((mono, spec))
}

/// Encode mono 16-bit samples at `sample_rate` into a WAV buffer.
pub fn encode(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| PapercastError::Assembly {
                message: format!("failed to create WAV writer: {e}"),
            })?;
        for &s in samples {
            writer
                .write_sample(s)
                .map_err(|e| PapercastError::Assembly {
                    message: format!("failed to write WAV sample: {e}"),
                })?;
        }
        writer.finalize().map_err(|e| PapercastError::Assembly {
            message: format!("failed to finalize WAV data: {e}"),
        })?;
    }
    Ok(cursor.into_inner())
}

/// Average stereo pairs into mono.
pub fn downmix_stereo(samples: &[i16]) -> Vec<i16> {
    samples
        .chunks_exact(2)
        .map(|pair| {
            let left = pair[0] as i32;
            let right = pair[1] as i32;
            ((left + right) / 2) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx.min(samples.len() - 1)]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

/// Concatenate several WAV buffers into one, resampling everything to the
/// first buffer's rate. Used when an oversize line is synthesized in
/// multiple sub-calls.
pub fn concat_buffers(buffers: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut combined: Vec<i16> = Vec::new();
    let mut target_rate: Option<u32> = None;

    for buffer in buffers {
        let (samples, spec) = decode(buffer)?;
        let rate = *target_rate.get_or_insert(spec.sample_rate);
        if spec.sample_rate == rate {
            combined.extend(samples);
        } else {
            combined.extend(resample(&samples, spec.sample_rate, rate));
        }
    }

    let rate = target_rate.ok_or_else(|| PapercastError::Assembly {
        message: "no audio buffers to concatenate".to_string(),
    })?;
    encode(&combined, rate)
}
