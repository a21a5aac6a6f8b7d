//! Controller configuration.

use vx_engine::CacheConfig;

use crate::spool::SpoolConfig;

pub const DEFAULT_OFFLINE_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_OFFLINE_CHANNELS: u16 = 2;
/// Ten minutes.
pub const DEFAULT_MAX_RENDER_SECONDS: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerConfig {
    pub cache: CacheConfig,
    pub spool: SpoolConfig,
    /// Sample rate used by offline rendering
    pub offline_sample_rate: u32,
    /// Channel count used by offline rendering
    pub offline_channels: u16,
    /// Longest offline render accepted, in seconds
    pub max_render_seconds: f64,
}

impl ControllerConfig {
    /// Longest offline render accepted, in frames at the offline rate.
    pub fn max_render_frames(&self) -> usize {
        // Saturating cast: NaN and negative limits allow nothing.
        (self.max_render_seconds * self.offline_sample_rate as f64) as usize
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            spool: SpoolConfig::default(),
            offline_sample_rate: DEFAULT_OFFLINE_SAMPLE_RATE,
            offline_channels: DEFAULT_OFFLINE_CHANNELS,
            max_render_seconds: DEFAULT_MAX_RENDER_SECONDS,
        }
    }
}
