//! Playback clock state and the control-to-render handoff.

use alloc::sync::Arc;
use vx_ir::{PlaybackConfig, Timeline};

use crate::bank::SampleBank;

/// Playback clock state owned by the renderer.
///
/// Together with the callback time these fields define the elapsed
/// playback time for every rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackSession {
    /// Is playback active?
    pub playing: bool,
    /// Clock time (seconds) at which playback started
    pub start_time: f64,
    /// Frames rendered since playback started
    pub frames_rendered: u64,
}

impl PlaybackSession {
    /// Start playing at clock time `at`, resetting the frame counter.
    pub fn start(&mut self, at: f64) {
        self.playing = true;
        self.start_time = at;
        self.frames_rendered = 0;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Seconds of playback at clock time `now`.
    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.start_time
    }

    /// Clock time implied by the frame counter alone (offline rendering).
    pub fn frame_clock(&self, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return self.start_time;
        }
        self.start_time + self.frames_rendered as f64 / sample_rate as f64
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.frames_rendered += 1;
    }
}

/// A whole-value replacement sent from the controller to the renderer.
///
/// Applied between callback invocations, so a callback sees either the old
/// value or the new one for its whole duration.
#[derive(Clone, Debug)]
pub enum SessionUpdate {
    Timeline(Arc<Timeline>),
    Config(PlaybackConfig),
    Bank(Arc<SampleBank>),
    Start { at: f64 },
    Stop,
}

/// A value displaced by a [`SessionUpdate`], returned to the control side
/// so the render thread never frees memory.
#[derive(Debug)]
pub enum Retired {
    Timeline(Arc<Timeline>),
    Bank(Arc<SampleBank>),
}
