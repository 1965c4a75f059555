//! Format descriptor shared by the container parser and the resampling pipeline.

use std::fmt;

use serde::Serialize;

use crate::error::{IngestError, Result};

/// `audio_format` tag for uncompressed linear PCM.
pub const WAVE_FORMAT_PCM: u16 = 1;

/// The only bit depth the pipeline accepts.
pub const SUPPORTED_BITS_PER_SAMPLE: u16 = 16;

/// Encoding parameters read from a `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    /// `audio_format` tag (1 = PCM, 3 = IEEE float, 0xFFFE = extensible, ...).
    pub codec_id: u16,
    /// Number of interleaved channels.
    pub channel_count: u16,
    /// Frames per second, as stored in the file.
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl FormatDescriptor {
    /// Bytes per single-channel sample (integer division, so 12-bit rounds down to 1).
    pub fn bytes_per_sample(&self) -> u32 {
        u32::from(self.bits_per_sample / 8)
    }

    /// Whole frames contained in a `data` chunk of `chunk_size` bytes.
    ///
    /// Partial trailing frames are dropped. Returns 0 for a descriptor that would divide by
    /// zero; such descriptors never pass [`FormatDescriptor::validate_for_ingest`].
    pub fn frame_count_for(&self, chunk_size: u32) -> usize {
        let bytes_per_sample = self.bytes_per_sample();
        let channels = u32::from(self.channel_count);
        if bytes_per_sample == 0 || channels == 0 {
            return 0;
        }
        (chunk_size / bytes_per_sample / channels) as usize
    }

    /// Whether the source rate already matches [`crate::audio_pipeline::TARGET_SAMPLE_RATE`].
    pub fn is_target_rate(&self) -> bool {
        self.sample_rate == crate::audio_pipeline::TARGET_SAMPLE_RATE
    }

    /// Check that the pipeline can consume audio in this format.
    ///
    /// The sample rate field is a signed 32-bit value in the wild; anything that is not
    /// positive under that reading is refused here so the resampler never sees it.
    pub fn validate_for_ingest(&self) -> Result<()> {
        let rate_is_positive = self.sample_rate > 0 && self.sample_rate <= i32::MAX as u32;

        if self.codec_id != WAVE_FORMAT_PCM
            || self.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE
            || self.channel_count == 0
            || !rate_is_positive
        {
            return Err(IngestError::UnsupportedFormat(*self));
        }

        Ok(())
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "codec {}, {} channel(s), {} Hz, {}-bit",
            self.codec_id, self.channel_count, self.sample_rate, self.bits_per_sample
        )
    }
}
