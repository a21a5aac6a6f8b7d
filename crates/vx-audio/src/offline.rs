//! Device stand-in driven by a manual clock.

use std::cell::Cell;

use vx_engine::BufferAllocator;
use vx_ir::{BufferShape, PhonemeBuffer};

use crate::traits::AudioDevice;

/// An audio device with no hardware behind it.
///
/// The clock only moves when [`OfflineDevice::advance`] is called, which
/// makes rendering against it deterministic.
#[derive(Debug)]
pub struct OfflineDevice {
    sample_rate: u32,
    channels: u16,
    now: Cell<f64>,
}

impl OfflineDevice {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            now: Cell::new(0.0),
        }
    }

    /// Move the clock forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }

    /// Move the clock forward by the duration of `frames` frames.
    pub fn advance_frames(&self, frames: usize) {
        if self.sample_rate > 0 {
            self.advance(frames as f64 / self.sample_rate as f64);
        }
    }
}

impl BufferAllocator for OfflineDevice {
    fn allocate(&self, shape: BufferShape) -> PhonemeBuffer {
        PhonemeBuffer::new(shape)
    }
}

impl AudioDevice for OfflineDevice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn current_time(&self) -> f64 {
        self.now.get()
    }
}
