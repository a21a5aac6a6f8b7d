//! WAV encoding for 16-bit PCM.

use std::io::Write;

/// Write interleaved f32 samples as a 16-bit PCM WAV stream.
///
/// Samples are clamped to [-1, 1] before quantizing.
pub fn write_wav(
    w: &mut impl Write,
    samples: &[f32],
    num_channels: u16,
    sample_rate: u32,
) -> std::io::Result<()> {
    let num_channels = num_channels.max(1);
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let frames = samples.len() / num_channels as usize;
    let data_size = frames as u32 * block_align as u32;

    write_riff_header(w, data_size)?;
    write_fmt_chunk(w, num_channels, sample_rate, block_align, bits_per_sample)?;
    write_data_chunk(w, &samples[..frames * num_channels as usize], data_size)
}

pub fn samples_to_wav(samples: &[f32], num_channels: u16, sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    write_wav(&mut buf, samples, num_channels, sample_rate).expect("Vec<u8> write cannot fail");
    buf
}

#[inline]
fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn write_riff_header(w: &mut impl Write, data_size: u32) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(
    w: &mut impl Write,
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
) -> std::io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&num_channels.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())
}

fn write_data_chunk(w: &mut impl Write, samples: &[f32], data_size: u32) -> std::io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for &sample in samples {
        w.write_all(&quantize(sample).to_le_bytes())?;
    }
    Ok(())
}
