/// Options that control how an ingestion is performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that other frontends
/// (services, tests, batch jobs) can construct options programmatically.
#[derive(Debug, Clone)]
pub struct IngestOpts {
    /// Upper bound on the declared size of the `data` chunk, in bytes.
    ///
    /// When `None`, the payload is still never allocated beyond what the stream actually
    /// delivers; this cap additionally refuses oversized declarations up front.
    pub max_data_bytes: Option<u64>,

    /// Chunk size (target-rate frames) used when handing samples to a
    /// [`crate::samples::SamplesSink`]. `0` hands over the whole buffer in one call.
    ///
    /// Examples:
    /// - 320  = 20ms
    /// - 1600 = 100ms
    pub target_chunk_frames: usize,
}

impl Default for IngestOpts {
    fn default() -> Self {
        Self {
            max_data_bytes: None,
            target_chunk_frames: 0,
        }
    }
}
