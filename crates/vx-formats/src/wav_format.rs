//! WAV decoding for phoneme assets.

use vx_ir::PhonemeBuffer;

use crate::FormatError;

/// Decode a PCM WAV file into a planar f32 phoneme buffer.
///
/// Supports 8-bit and 16-bit mono or stereo data. The buffer's sample
/// rate is taken from the header.
pub fn load_wav(data: &[u8]) -> Result<PhonemeBuffer, FormatError> {
    let header = parse_header(data)?;
    let end = (header.data_offset + header.data_size).min(data.len());
    let raw = &data[header.data_offset..end];

    let channels = match header.bits_per_sample {
        8 => deinterleave(raw, header.num_channels, 1, |b| (b[0] as f32 - 128.0) / 128.0),
        16 => deinterleave(raw, header.num_channels, 2, |b| {
            i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0
        }),
        _ => return Err(FormatError::UnsupportedVersion),
    };

    Ok(PhonemeBuffer::from_channels(header.sample_rate, channels))
}

struct WavHeader {
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    data_offset: usize,
    data_size: usize,
}

fn parse_header(data: &[u8]) -> Result<WavHeader, FormatError> {
    if data.len() < 44 {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(FormatError::InvalidHeader);
    }

    let mut pos = 12;
    let mut fmt: Option<(u16, u32, u16)> = None;
    let mut data_chunk: Option<(usize, usize)> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32_le(data, pos + 4) as usize;

        if chunk_id == b"fmt " && chunk_size >= 16 && pos + 24 <= data.len() {
            let format = read_u16_le(data, pos + 8);
            if format != 1 {
                return Err(FormatError::UnsupportedVersion);
            }
            let channels = read_u16_le(data, pos + 10);
            let rate = read_u32_le(data, pos + 12);
            let bits = read_u16_le(data, pos + 22);
            fmt = Some((channels, rate, bits));
        } else if chunk_id == b"data" {
            data_chunk = Some((pos + 8, chunk_size));
        }

        pos = pos.saturating_add(8 + chunk_size);
        if pos % 2 != 0 {
            pos += 1;
        }
    }

    let (num_channels, sample_rate, bits_per_sample) = fmt.ok_or(FormatError::InvalidHeader)?;
    let (data_offset, data_size) = data_chunk.ok_or(FormatError::InvalidHeader)?;

    if bits_per_sample != 8 && bits_per_sample != 16 {
        return Err(FormatError::UnsupportedVersion);
    }
    if !(1..=2).contains(&num_channels) {
        return Err(FormatError::UnsupportedVersion);
    }

    Ok(WavHeader { num_channels, sample_rate, bits_per_sample, data_offset, data_size })
}

/// Split interleaved frames into per-channel f32 planes.
fn deinterleave(
    raw: &[u8],
    num_channels: u16,
    bytes_per_sample: usize,
    decode: impl Fn(&[u8]) -> f32,
) -> Vec<Vec<f32>> {
    let channels = num_channels as usize;
    let frame_bytes = channels * bytes_per_sample;
    let frames = raw.len() / frame_bytes;

    let mut planes = vec![Vec::with_capacity(frames); channels];
    for frame in raw.chunks_exact(frame_bytes) {
        for (ch, sample) in frame.chunks_exact(bytes_per_sample).enumerate() {
            planes[ch].push(decode(sample));
        }
    }
    planes
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}
