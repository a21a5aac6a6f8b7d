//! Multichannel f32 phoneme buffers with planar layout.

use alloc::vec;
use alloc::vec::Vec;

/// Bytes billed per stored sample (16-bit PCM accounting).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Acoustic shape of a buffer: channel count, frame length, sample rate.
///
/// Used as the strongly-typed composite key for shaped cache lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferShape {
    pub channels: u16,
    pub frames: usize,
    pub sample_rate: u32,
}

impl BufferShape {
    pub const fn new(channels: u16, frames: usize, sample_rate: u32) -> Self {
        Self { channels, frames, sample_rate }
    }

    /// Size billed against a cache ceiling: `frames * channels * 2`.
    pub const fn tracked_bytes(&self) -> usize {
        self.frames * self.channels as usize * BYTES_PER_SAMPLE
    }
}

/// Decoded phoneme audio.
///
/// Data is stored as `channels` contiguous planes of `frames` samples each.
/// `data[ch * frames + frame]` gives the sample for channel `ch` at `frame`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhonemeBuffer {
    data: Vec<f32>,
    shape: BufferShape,
}

impl PhonemeBuffer {
    /// Create a silent buffer with the given shape.
    pub fn new(shape: BufferShape) -> Self {
        Self {
            data: vec![0.0; shape.channels as usize * shape.frames],
            shape,
        }
    }

    /// Create a buffer with every sample set to `value`.
    pub fn filled(shape: BufferShape, value: f32) -> Self {
        Self {
            data: vec![value; shape.channels as usize * shape.frames],
            shape,
        }
    }

    /// Build a buffer from per-channel sample vectors.
    ///
    /// Channels shorter than the longest one are zero-padded.
    pub fn from_channels(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        let shape = BufferShape::new(channels.len() as u16, frames, sample_rate);
        let mut data = Vec::with_capacity(channels.len() * frames);
        for plane in channels {
            let pad = frames - plane.len();
            data.extend(plane);
            data.extend(core::iter::repeat(0.0).take(pad));
        }
        Self { data, shape }
    }

    pub fn shape(&self) -> BufferShape {
        self.shape
    }

    pub fn channels(&self) -> u16 {
        self.shape.channels
    }

    pub fn frames(&self) -> usize {
        self.shape.frames
    }

    pub fn sample_rate(&self) -> u32 {
        self.shape.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.shape.frames == 0 || self.shape.channels == 0
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        if self.shape.sample_rate == 0 {
            return 0.0;
        }
        self.shape.frames as f64 / self.shape.sample_rate as f64
    }

    pub fn tracked_bytes(&self) -> usize {
        self.shape.tracked_bytes()
    }

    /// Read-only access to one channel's sample data.
    pub fn channel(&self, ch: u16) -> &[f32] {
        let start = ch as usize * self.shape.frames;
        &self.data[start..start + self.shape.frames]
    }

    /// Mutable access to one channel's sample data.
    pub fn channel_mut(&mut self, ch: u16) -> &mut [f32] {
        let start = ch as usize * self.shape.frames;
        let len = self.shape.frames;
        &mut self.data[start..start + len]
    }

    /// Sample at `frame` of channel `ch`, or `None` when out of range.
    #[inline]
    pub fn sample(&self, ch: u16, frame: usize) -> Option<f32> {
        if ch >= self.shape.channels || frame >= self.shape.frames {
            return None;
        }
        self.data.get(ch as usize * self.shape.frames + frame).copied()
    }
}
