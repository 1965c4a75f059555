//! Hand-built RIFF/WAVE byte layouts for exercising malformed and unusual inputs.

#![allow(dead_code)]

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

pub fn chunk(id: &[u8; 4], declared_size: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + payload.len());
    out.extend_from_slice(id);
    out.extend_from_slice(&declared_size.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn fmt_chunk(codec_id: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    let block_align = channels.wrapping_mul(bits / 8);
    let byte_rate = sample_rate.wrapping_mul(u32::from(block_align));

    let mut body = Vec::with_capacity(16);
    body.extend_from_slice(&codec_id.to_le_bytes());
    body.extend_from_slice(&channels.to_le_bytes());
    body.extend_from_slice(&sample_rate.to_le_bytes());
    body.extend_from_slice(&byte_rate.to_le_bytes());
    body.extend_from_slice(&block_align.to_le_bytes());
    body.extend_from_slice(&bits.to_le_bytes());
    chunk(b"fmt ", 16, &body)
}

pub fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn data_chunk(samples: &[i16]) -> Vec<u8> {
    let payload = pcm_bytes(samples);
    chunk(b"data", payload.len() as u32, &payload)
}

pub fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut out = Vec::with_capacity(12 + body.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(4 + body.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(&body);
    out
}

/// A 16-bit PCM WAVE produced by `hound`, as a reference writer.
pub fn hound_pcm16(
    channels: u16,
    sample_rate: u32,
    interleaved: &[i16],
) -> anyhow::Result<Vec<u8>> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    for &s in interleaved {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}
