use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use wavfeed::ingest::ingest_path;
use wavfeed::logging;
use wavfeed::opts::IngestOpts;
use wavfeed::output_type::OutputType;
use wavfeed::report::IngestReport;

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;

    let opts = IngestOpts {
        max_data_bytes: params.max_data_bytes,
        ..IngestOpts::default()
    };

    let ingested = ingest_path(&params.audio_path, &opts)
        .with_context(|| format!("failed to ingest '{}'", params.audio_path.display()))?;

    if let Some(output_path) = &params.output_path {
        let file = File::create(output_path)
            .with_context(|| format!("failed to create '{}'", output_path.display()))?;
        ingested.samples.write_wav(BufWriter::new(file))?;
    }

    let report = IngestReport::from(&ingested);
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    match params.output_type {
        OutputType::Text => writeln!(writer, "{report}")?,
        OutputType::Json => {
            serde_json::to_writer(&mut writer, &report)?;
            writeln!(writer)?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "wavfeed")]
#[command(about = "Convert a PCM WAVE file into 16 kHz mono samples for speech models")]
struct Params {
    /// Input WAVE file (16-bit PCM).
    #[arg(short = 'a', long = "audio")]
    pub audio_path: PathBuf,

    /// Optional path to write the 16 kHz mono result as a 32-bit float WAVE file.
    #[arg(short = 'o', long = "output")]
    pub output_path: Option<PathBuf>,

    #[arg(
        short = 'r',
        long = "report",
        value_enum,
        default_value_t = OutputType::Text
    )]
    pub output_type: OutputType,

    /// Refuse `data` chunks that declare more than this many bytes.
    #[arg(long = "max-data-bytes")]
    pub max_data_bytes: Option<u64>,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
