//! Audio normalization pipeline for wavfeed.
//!
//! Responsibilities:
//! - Convert interleaved 16-bit PCM into `f32` in `[-1.0, 1.0)`
//! - Downmix to mono
//! - Linearly resample to wavfeed's target sample rate (when needed)
//!
//! Notes:
//! - The pipeline is a single pass with no state beyond its buffers, so it has no failure
//!   modes of its own. Input is validated by [`crate::wav`] before it gets here.
//! - Output is deterministic: the same input always yields bit-identical samples.

use tracing::debug;

use crate::format::FormatDescriptor;
use crate::samples::SampleBuffer;
use crate::wav::RawAudioBlock;

/// wavfeed's target mono sample rate (Hz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Full-scale divisor for signed 16-bit PCM.
const I16_FULL_SCALE: f32 = 32_768.0;

/// Turn a parsed `data` payload into a mono buffer at [`TARGET_SAMPLE_RATE`].
///
/// Takes the raw block by value; the interleaved `i16` buffer is dropped once down-mixed.
pub fn to_target_rate(raw: RawAudioBlock, format: &FormatDescriptor) -> SampleBuffer {
    let channels = usize::from(format.channel_count);
    let mono = downmix_to_mono(raw.samples(), channels);
    drop(raw);

    // Fast path: already at the target sample rate.
    if format.is_target_rate() {
        return SampleBuffer::new(mono);
    }

    let resampled = resample_linear(&mono, format.sample_rate);
    debug!(
        source_rate = format.sample_rate,
        source_frames = mono.len(),
        output_samples = resampled.len(),
        "resampled to target rate"
    );
    SampleBuffer::new(resampled)
}

/// Normalize interleaved PCM and downmix it to mono by averaging channels.
///
/// Policy: equal-weight average across channels (simple, predictable). A partial trailing
/// frame is ignored. `channels == 0` yields an empty buffer.
pub fn downmix_to_mono(interleaved: &[i16], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => interleaved
            .iter()
            .map(|&s| f32::from(s) / I16_FULL_SCALE)
            .collect(),
        _ => interleaved
            .chunks_exact(channels)
            .map(|frame| {
                let sum: f32 = frame.iter().map(|&s| f32::from(s) / I16_FULL_SCALE).sum();
                sum / channels as f32
            })
            .collect(),
    }
}

/// Number of output samples produced when resampling `frame_count` frames from
/// `source_rate` to [`TARGET_SAMPLE_RATE`] (floor of the exact ratio).
pub fn resampled_len(frame_count: usize, source_rate: u32) -> usize {
    if source_rate == 0 {
        return 0;
    }
    (frame_count as u64 * u64::from(TARGET_SAMPLE_RATE) / u64::from(source_rate)) as usize
}

/// Linearly resample mono samples from `source_rate` to [`TARGET_SAMPLE_RATE`].
///
/// Output sample `j` sits at source position `j * source_rate / TARGET_SAMPLE_RATE`.
/// Between two source samples we interpolate; past the last one we hold it. Positions are
/// computed from `j` directly (never accumulated), so long inputs do not drift.
pub fn resample_linear(mono: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_SAMPLE_RATE {
        return mono.to_vec();
    }

    let frame_count = mono.len();
    let output_count = resampled_len(frame_count, source_rate);
    let step = f64::from(source_rate) / f64::from(TARGET_SAMPLE_RATE);

    (0..output_count)
        .map(|j| {
            let src = j as f64 * step;
            let idx0 = src.floor() as usize;
            let frac = (src - idx0 as f64) as f32;

            if idx0 + 1 < frame_count {
                mono[idx0] * (1.0 - frac) + mono[idx0 + 1] * frac
            } else if idx0 < frame_count {
                mono[idx0]
            } else {
                0.0
            }
        })
        .collect()
}
