//! Playback configuration.

use serde::{Deserialize, Serialize};

/// Playback parameters read by the renderer.
///
/// Replaced wholesale by the controller; the renderer never sees a
/// partially updated value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Pitch offset in percent of the pitch ratio (0 = unchanged)
    pub pitch_offset: f32,
    /// Master volume multiplier
    pub volume: f32,
    /// Playback speed. Carried for the controlling side; the renderer plays at 1.0.
    pub speed: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            pitch_offset: 0.0,
            volume: 1.0,
            speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn with_pitch_offset(mut self, pitch_offset: f32) -> Self {
        self.pitch_offset = pitch_offset;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }
}
