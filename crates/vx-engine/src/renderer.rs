//! Real-time renderer.
//!
//! For every output frame the renderer finds the active note for the
//! frame's playback time, reads the note's phoneme buffer at a
//! pitch-scaled nearest-sample index, applies volume and writes the value
//! to every output channel. It owns no locks and never allocates; all
//! inputs arrive as whole values through [`Renderer::apply`].

use alloc::sync::Arc;
use vx_ir::{Note, PlaybackConfig, Timeline};

use crate::bank::SampleBank;
use crate::frequency::pitch_ratio;
use crate::session::{PlaybackSession, Retired, SessionUpdate};

/// Gain applied when no note is active (the sample value is 0 there anyway).
const IDLE_GAIN: f32 = 0.5;

/// The real-time render engine.
pub struct Renderer {
    /// Notes being played
    timeline: Arc<Timeline>,
    /// Phoneme buffers, read only
    bank: Arc<SampleBank>,
    config: PlaybackConfig,
    session: PlaybackSession,
    /// Device sample rate (e.g., 44100)
    sample_rate: u32,
    /// Interleaved output channels per frame
    channels: u16,
}

impl Renderer {
    /// Create an idle renderer with an empty timeline and bank.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            timeline: Arc::new(Timeline::empty()),
            bank: Arc::new(SampleBank::new()),
            config: PlaybackConfig::default(),
            session: PlaybackSession::default(),
            sample_rate,
            channels: channels.max(1),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_playing(&self) -> bool {
        self.session.playing
    }

    /// Apply a control update, returning any displaced shared value.
    pub fn apply(&mut self, update: SessionUpdate) -> Option<Retired> {
        match update {
            SessionUpdate::Timeline(timeline) => {
                Some(Retired::Timeline(core::mem::replace(&mut self.timeline, timeline)))
            }
            SessionUpdate::Bank(bank) => Some(Retired::Bank(core::mem::replace(&mut self.bank, bank))),
            SessionUpdate::Config(config) => {
                self.config = config;
                None
            }
            SessionUpdate::Start { at } => {
                self.session.start(at);
                None
            }
            SessionUpdate::Stop => {
                self.session.stop();
                None
            }
        }
    }

    /// Start playback at clock time `at`.
    pub fn play(&mut self, at: f64) {
        self.session.start(at);
    }

    /// Stop playback; the next render produces silence.
    pub fn stop(&mut self) {
        self.session.stop();
    }

    /// Render one callback of interleaved frames.
    ///
    /// `callback_time` is the device clock (seconds) at the first frame.
    pub fn render(&mut self, callback_time: f64, output: &mut [f32]) {
        #[cfg(feature = "alloc_check")]
        assert_no_alloc::assert_no_alloc(|| self.render_block(callback_time, output));
        #[cfg(not(feature = "alloc_check"))]
        self.render_block(callback_time, output);
    }

    /// Render one callback using the session's frame counter as the clock.
    pub fn render_offline(&mut self, output: &mut [f32]) {
        let now = self.session.frame_clock(self.sample_rate);
        self.render(now, output);
    }

    fn render_block(&mut self, callback_time: f64, output: &mut [f32]) {
        if !self.session.playing {
            output.fill(0.0);
            return;
        }

        let elapsed = self.session.elapsed(callback_time);
        let rate = self.sample_rate as f64;

        for (i, frame) in output.chunks_mut(self.channels as usize).enumerate() {
            let sample_time = elapsed + i as f64 / rate;
            let note = self.timeline.active_at(sample_time);
            for (ch, out) in frame.iter_mut().enumerate() {
                *out = self.voice(note, sample_time, ch as u16);
            }
            self.session.advance();
        }
    }

    /// Output value for `channel` at playback time `sample_time`.
    ///
    /// Pure with respect to the renderer state: the same time, timeline,
    /// bank and config always give the same value.
    pub fn sample_at(&self, sample_time: f64, channel: u16) -> f32 {
        if !self.session.playing {
            return 0.0;
        }
        self.voice(self.timeline.active_at(sample_time), sample_time, channel)
    }

    #[inline]
    fn voice(&self, note: Option<&Note>, sample_time: f64, channel: u16) -> f32 {
        let gain = note.map_or(IDLE_GAIN, Note::gain) * self.config.volume;
        let value = note
            .and_then(|n| self.source_sample(n, sample_time, channel))
            .unwrap_or(0.0);
        value * gain
    }

    /// Nearest-sample read with pitch-ratio index scaling.
    ///
    /// Output channel `c` reads buffer channel `c % buffer.channels()`, so a
    /// stereo phoneme keeps its left/right planes and a mono phoneme feeds
    /// every output channel. The pitch-scaled index only selects the frame.
    fn source_sample(&self, note: &Note, sample_time: f64, channel: u16) -> Option<f32> {
        let buffer = self.bank.get(&note.phoneme)?;
        if buffer.is_empty() {
            return None;
        }
        let frames = buffer.frames() as f64;

        let source_index = libm::floor((sample_time - note.start_time) * buffer.sample_rate() as f64);
        if !(source_index >= 0.0 && source_index < frames) {
            return None;
        }

        let ratio = pitch_ratio(note.pitch, self.config.pitch_offset);
        let adjusted = libm::floor(source_index * ratio);
        if !(adjusted >= 0.0 && adjusted < frames) {
            return None;
        }

        buffer.sample(channel % buffer.channels(), adjusted as usize)
    }
}
