//! Timed phoneme events.

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Pitch used when an input carries no melody (middle C).
pub const DEFAULT_PITCH: i32 = 60;

/// Linear volume used when an input carries no volume (0-100 scale).
pub const DEFAULT_VOLUME: u8 = 100;

/// A timed phoneme/pitch/volume event in the playback timeline.
///
/// The active interval is half-open: `[start_time, end_time)`.
/// `duration` always equals `end_time - start_time`; use [`Note::new`] or
/// [`Note::set_interval`] rather than writing the time fields directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Key into the sample cache
    pub phoneme: String,
    /// Start of the active interval, in seconds
    pub start_time: f64,
    /// End of the active interval (exclusive), in seconds
    pub end_time: f64,
    /// `end_time - start_time`, in seconds
    pub duration: f64,
    /// Target MIDI note number
    pub pitch: i32,
    /// Linear gain, 0-100
    pub volume: u8,
    /// Display label, independent of `phoneme`
    pub lyric: String,
}

impl Note {
    /// Create a note at the default pitch and volume with an empty lyric.
    pub fn new(phoneme: &str, start_time: f64, end_time: f64) -> Self {
        Self {
            phoneme: String::from(phoneme),
            start_time,
            end_time,
            duration: end_time - start_time,
            pitch: DEFAULT_PITCH,
            volume: DEFAULT_VOLUME,
            lyric: String::new(),
        }
    }

    pub fn with_pitch(mut self, pitch: i32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_lyric(mut self, lyric: &str) -> Self {
        self.lyric = String::from(lyric);
        self
    }

    /// Move the note, keeping `duration` consistent.
    pub fn set_interval(&mut self, start_time: f64, end_time: f64) {
        self.start_time = start_time;
        self.end_time = end_time;
        self.duration = end_time - start_time;
    }

    /// Returns true if `time` falls inside `[start_time, end_time)`.
    #[inline]
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time < self.end_time
    }

    /// Linear gain for this note (volume / 100).
    #[inline]
    pub fn gain(&self) -> f32 {
        self.volume as f32 / 100.0
    }
}
