//! `wavfeed`: RIFF/WAVE ingestion for speech models.
//!
//! This crate provides:
//! - A streaming RIFF/WAVE chunk parser with typed failures
//! - Normalization of 16-bit PCM to `f32`, channel downmix, and linear resampling to 16 kHz
//! - An owned mono sample buffer plus a sink seam for handing audio to an inference engine
//!
//! Model loading and inference are out of scope; callers pass the resulting
//! [`SampleBuffer`] (or its slice and length) to their engine of choice.

// High-level API (most consumers should start here).
pub mod ingest;
pub mod opts;

// Container parsing and format validation.
pub mod format;
pub mod wav;

// Normalization, downmix, and resampling.
pub mod audio_pipeline;

// Output buffer and handoff.
pub mod report;
pub mod samples;

pub mod error;

// CLI-facing types.
#[cfg(feature = "cli")]
pub mod output_type;

// Logging configuration for binaries.
#[cfg(feature = "logging")]
pub mod logging;

pub use audio_pipeline::TARGET_SAMPLE_RATE;
pub use error::{IngestError, Result};
pub use format::FormatDescriptor;
pub use ingest::{
    Ingested, ingest_path, ingest_reader, load_samples_from_path, load_samples_from_reader,
};
pub use opts::IngestOpts;
pub use samples::{SampleBuffer, SamplesSink};
pub use wav::RawAudioBlock;
