//! The mono 16 kHz sample buffer handed to a speech engine, and the sink seam it flows through.

use std::io::{Seek, Write};

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio_pipeline::TARGET_SAMPLE_RATE;

/// Consumer callback for normalized samples.
///
/// The sink receives **mono** `f32` samples at wavfeed's target sample rate.
/// Returning `Ok(false)` signals "stop early".
pub trait SamplesSink {
    fn on_samples(&mut self, samples_16k_mono: &[f32]) -> Result<bool>;
}

/// Owned mono `f32` audio at [`TARGET_SAMPLE_RATE`], approximately in `[-1.0, 1.0]`.
///
/// One buffer is produced per ingestion call and owned by the caller from then on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.samples
    }

    /// Playback length at the target sample rate.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(TARGET_SAMPLE_RATE)
    }

    /// Feed the buffer to `sink` in chunks of `chunk_frames` samples.
    ///
    /// `chunk_frames == 0` hands over the whole buffer in a single call. An empty buffer
    /// emits nothing.
    pub fn emit_chunks(&self, chunk_frames: usize, sink: &mut dyn SamplesSink) -> Result<()> {
        if self.samples.is_empty() {
            return Ok(());
        }

        let chunk_frames = match chunk_frames {
            0 => self.samples.len(),
            n => n,
        };

        for chunk in self.samples.chunks(chunk_frames) {
            if !sink.on_samples(chunk)? {
                break;
            }
        }
        Ok(())
    }

    /// Write the buffer as a mono 32-bit float WAV at the target sample rate.
    pub fn write_wav<W>(&self, writer: W) -> Result<()>
    where
        W: Write + Seek,
    {
        let spec = WavSpec {
            channels: 1,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut wav = WavWriter::new(writer, spec).context("failed to start WAV output")?;
        for &sample in &self.samples {
            wav.write_sample(sample)
                .context("failed to write WAV sample")?;
        }
        wav.finalize().context("failed to finalize WAV output")?;
        Ok(())
    }
}

impl AsRef<[f32]> for SampleBuffer {
    fn as_ref(&self) -> &[f32] {
        &self.samples
    }
}

impl From<SampleBuffer> for Vec<f32> {
    fn from(buffer: SampleBuffer) -> Self {
        buffer.samples
    }
}

/// A `SamplesSink` that appends every chunk into a `Vec<f32>`.
pub struct VecSamplesSink<'a> {
    out: &'a mut Vec<f32>,
}

impl<'a> VecSamplesSink<'a> {
    pub fn new(out: &'a mut Vec<f32>) -> Self {
        Self { out }
    }
}

impl SamplesSink for VecSamplesSink<'_> {
    fn on_samples(&mut self, samples_16k_mono: &[f32]) -> Result<bool> {
        self.out.extend_from_slice(samples_16k_mono);
        Ok(true)
    }
}
