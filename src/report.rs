use std::fmt;

use serde::Serialize;

use crate::audio_pipeline::TARGET_SAMPLE_RATE;
use crate::format::FormatDescriptor;
use crate::ingest::Ingested;

/// Summary of a completed ingestion, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub source: FormatDescriptor,
    pub source_frames: usize,
    pub output_sample_rate: u32,
    pub output_samples: usize,
    pub duration_seconds: f64,
}

impl From<&Ingested> for IngestReport {
    fn from(ingested: &Ingested) -> Self {
        Self {
            source: ingested.format,
            source_frames: ingested.source_frames,
            output_sample_rate: TARGET_SAMPLE_RATE,
            output_samples: ingested.samples.len(),
            duration_seconds: ingested.samples.duration_seconds(),
        }
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "source: {}", self.source)?;
        writeln!(f, "source frames: {}", self.source_frames)?;
        write!(
            f,
            "output: {} samples @ {} Hz mono ({:.3}s)",
            self.output_samples, self.output_sample_rate, self.duration_seconds
        )
    }
}
