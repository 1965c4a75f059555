//! Streaming RIFF/WAVE container parser.
//!
//! We walk the chunk list sequentially from any `Read` source:
//! - `fmt ` populates a [`FormatDescriptor`]
//! - `data` ends the scan and yields the interleaved 16-bit payload
//! - anything else is skipped by its declared size
//!
//! Notes:
//! - Chunks after `data` are never inspected. A WAVE file may legally carry trailing
//!   chunks (`LIST`, `id3 `, ...) and we do not need them.
//! - Odd-sized chunks are *not* realigned to an even boundary. Producers that pad
//!   odd chunks will desynchronize the walk; this is a known limitation.

use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::format::FormatDescriptor;
use crate::opts::IngestOpts;

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";
const FMT_TAG: &[u8; 4] = b"fmt ";
const DATA_TAG: &[u8; 4] = b"data";

/// Size of the classic PCM `fmt ` body we read field by field.
const FMT_BODY_LEN: u32 = 16;

// Upfront reservation for the payload buffer. Beyond this the buffer grows only as bytes
// actually arrive, so a corrupted chunk size cannot force a huge allocation.
const PAYLOAD_PREALLOC_LIMIT: u64 = 1 << 20;

/// Interleaved signed 16-bit samples read from a `data` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAudioBlock {
    samples: Vec<i16>,
}

impl RawAudioBlock {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    /// Interleaved samples (`frame * channel_count + channel`).
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Total samples across all channels.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whole frames for the given channel count.
    pub fn frame_count(&self, channel_count: u16) -> usize {
        match channel_count {
            0 => 0,
            channels => self.samples.len() / usize::from(channels),
        }
    }
}

/// Parse a WAVE stream with default options.
///
/// See [`parse_wav_reader_with_opts`].
pub fn parse_wav_reader<R>(reader: R) -> Result<(FormatDescriptor, RawAudioBlock)>
where
    R: Read,
{
    parse_wav_reader_with_opts(reader, &IngestOpts::default())
}

/// Parse a WAVE stream and return its format plus the raw interleaved PCM payload.
///
/// What we require:
/// - `RIFF` / `WAVE` magic
/// - a `fmt ` chunk before the `data` chunk
/// - 16-bit linear PCM with at least one channel and a positive sample rate
///
/// Any failure is terminal; no partial payload is returned.
pub fn parse_wav_reader_with_opts<R>(
    mut reader: R,
    opts: &IngestOpts,
) -> Result<(FormatDescriptor, RawAudioBlock)>
where
    R: Read,
{
    read_riff_header(&mut reader)?;

    let mut format: Option<FormatDescriptor> = None;

    // Running out of input anywhere in this loop surfaces as `TruncatedStream`.
    loop {
        let (chunk_id, chunk_size) = read_chunk_header(&mut reader)?;

        match &chunk_id {
            FMT_TAG => {
                let parsed = read_fmt_chunk(&mut reader, chunk_size)?;
                debug!(
                    codec_id = parsed.codec_id,
                    channel_count = parsed.channel_count,
                    sample_rate = parsed.sample_rate,
                    bits_per_sample = parsed.bits_per_sample,
                    chunk_size,
                    "parsed fmt chunk"
                );
                format = Some(parsed);
            }
            DATA_TAG => {
                let format = format.ok_or(IngestError::MissingFormatChunk)?;
                format.validate_for_ingest()?;

                let block = read_data_chunk(&mut reader, &format, chunk_size, opts)?;
                debug!(chunk_size, samples = block.len(), "read data chunk");
                return Ok((format, block));
            }
            other => {
                debug!(
                    chunk_id = %String::from_utf8_lossy(other),
                    chunk_size,
                    "skipping chunk"
                );
                skip_exact(&mut reader, u64::from(chunk_size))?;
            }
        }
    }
}

fn read_riff_header<R: Read>(reader: &mut R) -> Result<()> {
    let mut header = [0u8; 12];
    reader.read_exact(&mut header)?;

    // Bytes 4..8 hold the RIFF size. We don't validate it against the stream length.
    if &header[0..4] != RIFF_TAG {
        return Err(IngestError::InvalidContainer("missing RIFF tag"));
    }
    if &header[8..12] != WAVE_TAG {
        return Err(IngestError::InvalidContainer("missing WAVE tag"));
    }

    Ok(())
}

fn read_chunk_header<R: Read>(reader: &mut R) -> Result<([u8; 4], u32)> {
    let mut chunk_id = [0u8; 4];
    reader.read_exact(&mut chunk_id)?;
    let chunk_size = reader.read_u32::<LittleEndian>()?;
    Ok((chunk_id, chunk_size))
}

fn read_fmt_chunk<R: Read>(reader: &mut R, chunk_size: u32) -> Result<FormatDescriptor> {
    if chunk_size < FMT_BODY_LEN {
        return Err(IngestError::InvalidContainer("fmt chunk shorter than 16 bytes"));
    }

    let codec_id = reader.read_u16::<LittleEndian>()?;
    let channel_count = reader.read_u16::<LittleEndian>()?;
    let sample_rate = reader.read_u32::<LittleEndian>()?;
    // byte rate (4) + block align (2): derivable, so unused.
    skip_exact(reader, 6)?;
    let bits_per_sample = reader.read_u16::<LittleEndian>()?;

    // WAVEFORMATEX / WAVEFORMATEXTENSIBLE tails are tolerated but ignored.
    skip_exact(reader, u64::from(chunk_size - FMT_BODY_LEN))?;

    Ok(FormatDescriptor {
        codec_id,
        channel_count,
        sample_rate,
        bits_per_sample,
    })
}

fn read_data_chunk<R: Read>(
    reader: &mut R,
    format: &FormatDescriptor,
    chunk_size: u32,
    opts: &IngestOpts,
) -> Result<RawAudioBlock> {
    if let Some(limit) = opts.max_data_bytes {
        let declared = u64::from(chunk_size);
        if declared > limit {
            return Err(IngestError::DataTooLarge { declared, limit });
        }
    }

    // Remainder bytes that don't form a whole frame are left unread.
    let frame_count = format.frame_count_for(chunk_size);
    let sample_count = frame_count * usize::from(format.channel_count);
    let byte_len = sample_count as u64 * u64::from(format.bytes_per_sample());

    let mut bytes = Vec::with_capacity(byte_len.min(PAYLOAD_PREALLOC_LIMIT) as usize);
    reader.by_ref().take(byte_len).read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < byte_len {
        return Err(IngestError::TruncatedStream);
    }

    let mut samples = vec![0i16; sample_count];
    LittleEndian::read_i16_into(&bytes, &mut samples);

    Ok(RawAudioBlock::new(samples))
}

/// Discard exactly `len` bytes, failing if the stream ends first.
fn skip_exact<R: Read>(reader: &mut R, len: u64) -> Result<()> {
    let skipped = io::copy(&mut reader.by_ref().take(len), &mut io::sink())?;
    if skipped < len {
        return Err(IngestError::TruncatedStream);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &[u8; 4], declared_size: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + payload.len());
        out.extend_from_slice(id);
        out.extend_from_slice(&declared_size.to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn fmt_body(codec_id: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
        let block_align = channels * (bits / 8);
        let byte_rate = sample_rate * u32::from(block_align);
        let mut body = Vec::with_capacity(16);
        body.extend_from_slice(&codec_id.to_le_bytes());
        body.extend_from_slice(&channels.to_le_bytes());
        body.extend_from_slice(&sample_rate.to_le_bytes());
        body.extend_from_slice(&byte_rate.to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&bits.to_le_bytes());
        body
    }

    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = Vec::with_capacity(12 + body.len());
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(4 + body.len() as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(&body);
        out
    }

    fn fmt_chunk(codec_id: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
        chunk(b"fmt ", 16, &fmt_body(codec_id, channels, sample_rate, bits))
    }

    fn data_chunk(samples: &[i16]) -> Vec<u8> {
        let payload = pcm_bytes(samples);
        chunk(b"data", payload.len() as u32, &payload)
    }

    #[test]
    fn parses_minimal_mono_file() -> anyhow::Result<()> {
        let bytes = riff(&[fmt_chunk(1, 1, 16_000, 16), data_chunk(&[1, -2, 3])]);

        let (format, block) = parse_wav_reader(bytes.as_slice())?;

        assert_eq!(format.codec_id, 1);
        assert_eq!(format.channel_count, 1);
        assert_eq!(format.sample_rate, 16_000);
        assert_eq!(format.bits_per_sample, 16);
        assert_eq!(block.samples(), &[1, -2, 3]);
        Ok(())
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = riff(&[fmt_chunk(1, 1, 16_000, 16), data_chunk(&[0])]);
        bytes[0..4].copy_from_slice(b"RIFX");
        assert!(matches!(
            parse_wav_reader(bytes.as_slice()),
            Err(IngestError::InvalidContainer(_))
        ));

        let mut bytes = riff(&[fmt_chunk(1, 1, 16_000, 16), data_chunk(&[0])]);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(
            parse_wav_reader(bytes.as_slice()),
            Err(IngestError::InvalidContainer(_))
        ));
    }

    #[test]
    fn short_header_is_truncated() {
        assert!(matches!(
            parse_wav_reader(&b"RIFF\0\0"[..]),
            Err(IngestError::TruncatedStream)
        ));
        assert!(matches!(
            parse_wav_reader(&b""[..]),
            Err(IngestError::TruncatedStream)
        ));
    }

    #[test]
    fn missing_data_chunk_is_truncated() {
        let bytes = riff(&[fmt_chunk(1, 1, 16_000, 16)]);
        assert!(matches!(
            parse_wav_reader(bytes.as_slice()),
            Err(IngestError::TruncatedStream)
        ));
    }

    #[test]
    fn data_before_fmt_is_missing_format() {
        let bytes = riff(&[data_chunk(&[1, 2]), fmt_chunk(1, 1, 16_000, 16)]);
        assert!(matches!(
            parse_wav_reader(bytes.as_slice()),
            Err(IngestError::MissingFormatChunk)
        ));
    }

    #[test]
    fn skips_unknown_chunks_by_declared_size() -> anyhow::Result<()> {
        let list = chunk(b"LIST", 10, b"INFOabcdef");
        let fact = chunk(b"fact", 4, &7u32.to_le_bytes());
        let bytes = riff(&[fact, fmt_chunk(1, 1, 16_000, 16), list, data_chunk(&[9, 8])]);

        let (_, block) = parse_wav_reader(bytes.as_slice())?;
        assert_eq!(block.samples(), &[9, 8]);
        Ok(())
    }

    #[test]
    fn unknown_chunk_cut_short_is_truncated() {
        let mut bytes = riff(&[fmt_chunk(1, 1, 16_000, 16)]);
        bytes.extend_from_slice(&chunk(b"LIST", 100, b"only a few bytes"));
        assert!(matches!(
            parse_wav_reader(bytes.as_slice()),
            Err(IngestError::TruncatedStream)
        ));
    }

    #[test]
    fn extended_fmt_chunk_is_tolerated() -> anyhow::Result<()> {
        // WAVEFORMATEX: 16-byte body + cbSize (2 bytes) = 18.
        let mut body = fmt_body(1, 2, 22_050, 16);
        body.extend_from_slice(&0u16.to_le_bytes());
        let fmt = chunk(b"fmt ", 18, &body);
        let bytes = riff(&[fmt, data_chunk(&[1, 2, 3, 4])]);

        let (format, block) = parse_wav_reader(bytes.as_slice())?;
        assert_eq!(format.channel_count, 2);
        assert_eq!(format.sample_rate, 22_050);
        assert_eq!(block.frame_count(format.channel_count), 2);
        Ok(())
    }

    #[test]
    fn undersized_fmt_chunk_is_invalid() {
        let fmt = chunk(b"fmt ", 14, &fmt_body(1, 1, 16_000, 16)[..14]);
        let bytes = riff(&[fmt, data_chunk(&[0])]);
        assert!(matches!(
            parse_wav_reader(bytes.as_slice()),
            Err(IngestError::InvalidContainer(_))
        ));
    }

    #[test]
    fn later_fmt_chunk_replaces_earlier_one() -> anyhow::Result<()> {
        let bytes = riff(&[
            fmt_chunk(1, 1, 8_000, 16),
            fmt_chunk(1, 1, 44_100, 16),
            data_chunk(&[0]),
        ]);
        let (format, _) = parse_wav_reader(bytes.as_slice())?;
        assert_eq!(format.sample_rate, 44_100);
        Ok(())
    }

    #[test]
    fn unsupported_codec_or_depth_is_rejected() {
        let float = riff(&[fmt_chunk(3, 1, 16_000, 32), chunk(b"data", 4, &[0; 4])]);
        assert!(matches!(
            parse_wav_reader(float.as_slice()),
            Err(IngestError::UnsupportedFormat(f)) if f.codec_id == 3
        ));

        let eight_bit = riff(&[fmt_chunk(1, 1, 16_000, 8), chunk(b"data", 2, &[128, 128])]);
        assert!(matches!(
            parse_wav_reader(eight_bit.as_slice()),
            Err(IngestError::UnsupportedFormat(f)) if f.bits_per_sample == 8
        ));
    }

    #[test]
    fn zero_or_negative_rate_is_rejected() {
        for rate in [0u32, 0xFFFF_FFF0] {
            let bytes = riff(&[fmt_chunk(1, 1, rate, 16), data_chunk(&[0])]);
            assert!(matches!(
                parse_wav_reader(bytes.as_slice()),
                Err(IngestError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let mut bytes = riff(&[fmt_chunk(1, 1, 16_000, 16)]);
        bytes.extend_from_slice(&chunk(b"data", 8, &pcm_bytes(&[1, 2])));
        assert!(matches!(
            parse_wav_reader(bytes.as_slice()),
            Err(IngestError::TruncatedStream)
        ));
    }

    #[test]
    fn huge_declared_payload_on_tiny_stream_is_truncated() {
        let mut bytes = riff(&[fmt_chunk(1, 2, 48_000, 16)]);
        bytes.extend_from_slice(&chunk(b"data", u32::MAX, &pcm_bytes(&[1, 2, 3, 4])));
        assert!(matches!(
            parse_wav_reader(bytes.as_slice()),
            Err(IngestError::TruncatedStream)
        ));
    }

    #[test]
    fn partial_trailing_frame_is_dropped() -> anyhow::Result<()> {
        // Stereo: 4 bytes per frame. 10 bytes declared => 2 frames, 2 bytes ignored.
        let mut payload = pcm_bytes(&[1, 2, 3, 4]);
        payload.extend_from_slice(&[0xAA, 0xBB]);
        let bytes = riff(&[fmt_chunk(1, 2, 16_000, 16), chunk(b"data", 10, &payload)]);

        let (_, block) = parse_wav_reader(bytes.as_slice())?;
        assert_eq!(block.samples(), &[1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn trailing_chunks_after_data_are_not_inspected() -> anyhow::Result<()> {
        let mut bytes = riff(&[fmt_chunk(1, 1, 16_000, 16), data_chunk(&[5, 6])]);
        // A chunk header that claims far more bytes than exist.
        bytes.extend_from_slice(&chunk(b"junk", u32::MAX, b"x"));

        let (_, block) = parse_wav_reader(bytes.as_slice())?;
        assert_eq!(block.samples(), &[5, 6]);
        Ok(())
    }

    #[test]
    fn data_cap_rejects_oversized_declarations() {
        let bytes = riff(&[fmt_chunk(1, 1, 16_000, 16), data_chunk(&[0; 64])]);
        let opts = IngestOpts {
            max_data_bytes: Some(32),
            ..IngestOpts::default()
        };

        match parse_wav_reader_with_opts(bytes.as_slice(), &opts) {
            Err(IngestError::DataTooLarge { declared, limit }) => {
                assert_eq!(declared, 128);
                assert_eq!(limit, 32);
            }
            other => panic!("expected DataTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn empty_data_chunk_is_valid() -> anyhow::Result<()> {
        let bytes = riff(&[fmt_chunk(1, 1, 16_000, 16), chunk(b"data", 0, &[])]);
        let (_, block) = parse_wav_reader(bytes.as_slice())?;
        assert!(block.is_empty());
        Ok(())
    }
}
