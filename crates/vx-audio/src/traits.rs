//! Audio device trait and error types.

use std::time::Instant;

use thiserror::Error;
use vx_engine::BufferAllocator;

/// Failure to establish the real-time callback with a device.
#[derive(Debug, Error)]
pub enum InitializationError {
    /// No audio device available
    #[error("no audio output device available")]
    NoDevice,
    /// Failed to query the device configuration
    #[error("device configuration error: {0}")]
    DeviceConfig(String),
    /// Failed to create the output stream
    #[error("stream create error: {0}")]
    StreamCreate(String),
    /// Failed to start or pause the stream
    #[error("playback error: {0}")]
    Playback(String),
}

/// The audio device collaborator.
///
/// Supplies the device sample rate and channel layout, a monotonic clock,
/// and the allocation primitive for shaped buffers.
pub trait AudioDevice: BufferAllocator {
    /// Device sample rate.
    fn sample_rate(&self) -> u32;

    /// Interleaved output channels per frame.
    fn channels(&self) -> u16;

    /// Monotonic clock, in seconds.
    fn current_time(&self) -> f64;
}

/// Monotonic seconds since the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct DeviceClock {
    epoch: Instant,
}

impl DeviceClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl Default for DeviceClock {
    fn default() -> Self {
        Self::new()
    }
}
