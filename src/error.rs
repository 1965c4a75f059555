use std::io;

use thiserror::Error;

use crate::format::FormatDescriptor;

/// Wavfeed's crate-wide result type.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Wavfeed's crate-wide error type.
///
/// Every variant is terminal for the call that produced it: no partial buffer is returned.
/// Callers can tell a missing file (`Io`) apart from an unsupported encoding
/// (`UnsupportedFormat`) and from a damaged file (`InvalidContainer`, `TruncatedStream`,
/// `MissingFormatChunk`).
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The RIFF/WAVE framing is wrong (bad magic, undersized `fmt ` chunk).
    #[error("invalid WAVE container: {0}")]
    InvalidContainer(&'static str),

    /// Input ended while a header, field, or payload was still expected.
    #[error("WAVE stream ended unexpectedly")]
    TruncatedStream,

    /// A `data` chunk showed up before any `fmt ` chunk.
    #[error("WAVE data chunk found before fmt chunk")]
    MissingFormatChunk,

    /// The stream is well formed but not 16-bit linear PCM with a positive sample rate.
    #[error("unsupported WAVE encoding: {0}")]
    UnsupportedFormat(FormatDescriptor),

    /// The declared `data` payload exceeds the configured cap.
    #[error("WAVE data chunk declares {declared} bytes, limit is {limit}")]
    DataTooLarge { declared: u64, limit: u64 },

    /// Underlying open/read failure.
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for IngestError {
    fn from(err: io::Error) -> Self {
        // A short read is a property of the input, not of the device.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedStream
        } else {
            Self::Io(err)
        }
    }
}
