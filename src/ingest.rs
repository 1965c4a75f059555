//! Ingest a WAVE file or stream into mono `f32` at wavfeed's target sample rate.
//!
//! This module is intentionally small and orchestration-focused:
//! - `wav` handles the chunk walk and format validation
//! - `audio_pipeline` handles normalization (downmix + resample)
//! - `samples` carries the result to whoever runs inference
//!
//! Every call is independent: buffers are allocated per call and moved to the caller.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::audio_pipeline::to_target_rate;
use crate::error::Result;
use crate::format::FormatDescriptor;
use crate::opts::IngestOpts;
use crate::samples::{SampleBuffer, SamplesSink};
use crate::wav::parse_wav_reader_with_opts;

/// Result of a full ingestion: the source format and the normalized samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    /// Format of the source file, as read from its `fmt ` chunk.
    pub format: FormatDescriptor,
    /// Frames in the source `data` chunk, before resampling.
    pub source_frames: usize,
    pub samples: SampleBuffer,
}

/// Load a WAVE file and return mono samples at the target sample rate.
pub fn load_samples_from_path(path: impl AsRef<Path>) -> Result<SampleBuffer> {
    load_samples_from_path_with_opts(path, &IngestOpts::default())
}

/// Like [`load_samples_from_path`], with explicit options.
///
/// Open/read failures surface as [`crate::IngestError::Io`]; everything about the
/// content of the file surfaces as one of the format variants.
pub fn load_samples_from_path_with_opts(
    path: impl AsRef<Path>,
    opts: &IngestOpts,
) -> Result<SampleBuffer> {
    Ok(ingest_path(path, opts)?.samples)
}

/// Load WAVE data from a reader and return mono samples at the target sample rate.
pub fn load_samples_from_reader<R>(reader: R) -> Result<SampleBuffer>
where
    R: Read,
{
    Ok(ingest_reader(reader, &IngestOpts::default())?.samples)
}

/// Open `path` and run a full ingestion.
pub fn ingest_path(path: impl AsRef<Path>, opts: &IngestOpts) -> Result<Ingested> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let ingested = ingest_reader(BufReader::new(file), opts)?;
    info!(
        path = %path.display(),
        output_samples = ingested.samples.len(),
        "ingested WAVE file"
    );
    Ok(ingested)
}

/// Parse, validate, downmix, and resample a WAVE stream.
pub fn ingest_reader<R>(reader: R, opts: &IngestOpts) -> Result<Ingested>
where
    R: Read,
{
    let (format, raw) = parse_wav_reader_with_opts(reader, opts)?;
    let source_frames = raw.frame_count(format.channel_count);
    let samples = to_target_rate(raw, &format);

    info!(
        codec_id = format.codec_id,
        channel_count = format.channel_count,
        sample_rate = format.sample_rate,
        source_frames,
        output_samples = samples.len(),
        "ingested WAVE stream"
    );

    Ok(Ingested {
        format,
        source_frames,
        samples,
    })
}

/// Ingest a WAVE stream and hand the result to `sink` in `opts.target_chunk_frames` chunks.
///
/// Parse failures are reported before the sink sees any samples.
pub fn ingest_into_sink<R>(
    reader: R,
    opts: &IngestOpts,
    sink: &mut dyn SamplesSink,
) -> anyhow::Result<()>
where
    R: Read,
{
    let ingested = ingest_reader(reader, opts)?;
    ingested.samples.emit_chunks(opts.target_chunk_frames, sink)
}
