use clap::ValueEnum;

/// How the CLI reports a completed ingestion.
///
/// `ValueEnum` allows this enum to be used directly as a CLI flag with `clap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputType {
    /// Human-readable summary lines.
    Text,

    /// A single JSON object (see [`crate::report::IngestReport`]).
    Json,
}
