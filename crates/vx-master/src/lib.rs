//! Headless controller for voxline.
//!
//! Owns the note timeline, playback config and sample cache on the control
//! side, publishes them to the audio callback as whole values, renders
//! offline, and spools finished audio to a persistent store.

mod config;
mod spool;
mod store;
mod wav;

use std::sync::Arc;
use std::time::{Duration, Instant};

use ringbuf::traits::{Consumer, Producer};
use thiserror::Error;
use vx_audio::{AudioDevice, CpalOutput, Handoff};
use vx_engine::{HeapAllocator, Renderer, SampleCache, SessionUpdate};

// Re-export common types so callers don't need the member crates directly.
pub use config::{
    ControllerConfig, DEFAULT_MAX_RENDER_SECONDS, DEFAULT_OFFLINE_CHANNELS,
    DEFAULT_OFFLINE_SAMPLE_RATE,
};
pub use spool::{DrainReport, Segment, SpoolConfig, SpoolError, SpoolQueue, DEFAULT_SPOOL_CAPACITY};
pub use store::{SegmentStore, StoreError, WavDirStore};
pub use vx_audio::InitializationError;
pub use vx_engine::{midi_to_frequency, CacheConfig};
pub use vx_formats::{FormatError, LegacyScore, LyricEntry, MelodyNote};
pub use vx_ir::{BufferShape, Note, PhonemeBuffer, PlaybackConfig, Timeline};
pub use wav::{samples_to_wav, write_wav};

/// Frames per render call when rendering offline.
const OFFLINE_BLOCK_FRAMES: usize = 512;

/// How long to wait for the callback to make room for an update.
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Initialization(#[from] InitializationError),
    #[error(transparent)]
    Spool(#[from] SpoolError),
    #[error("no audio output is open")]
    NoOutput,
    #[error("audio callback stopped accepting updates")]
    OutputStalled,
    #[error("render of {frames} frames exceeds the {limit}-frame limit")]
    RenderTooLong { frames: usize, limit: usize },
}

/// Headless synthesis controller.
pub struct Controller {
    config: ControllerConfig,
    timeline: Arc<Timeline>,
    playback: PlaybackConfig,
    cache: SampleCache,
    /// Cache contents changed since the last bank was published
    bank_dirty: bool,
    playing: bool,
    device: Option<CpalOutput>,
    /// Control-side ends of the callback's update rings
    link: Option<Handoff>,
    publish_timeout: Duration,
    spool: SpoolQueue,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            timeline: Arc::new(Timeline::empty()),
            playback: PlaybackConfig::default(),
            cache: SampleCache::new(config.cache),
            bank_dirty: false,
            playing: false,
            device: None,
            link: None,
            publish_timeout: PUBLISH_TIMEOUT,
            spool: SpoolQueue::new(config.spool),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // --- Timeline ---

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Replace the note sequence. The callback sees it on its next invocation.
    pub fn install_notes(&mut self, notes: Vec<Note>) -> Result<(), ControllerError> {
        self.install_timeline(Timeline::new(notes))
    }

    /// On error the previous timeline stays installed on both sides.
    pub fn install_timeline(&mut self, timeline: Timeline) -> Result<(), ControllerError> {
        let timeline = Arc::new(timeline);
        self.publish(SessionUpdate::Timeline(timeline.clone()))?;
        self.timeline = timeline;
        Ok(())
    }

    /// Parse lyric and melody documents, pair them and install the result.
    ///
    /// Returns the number of installed notes.
    pub fn load_lyric_and_melody(&mut self, lyric: &str, melody: &str) -> Result<usize, ControllerError> {
        let lyric = vx_formats::parse_lyric(lyric)?;
        let melody = vx_formats::parse_melody(melody)?;
        let notes = vx_formats::integrate_lyric_and_melody(&lyric, &melody);
        let count = notes.len();
        self.install_notes(notes)?;
        Ok(count)
    }

    /// Parse a legacy score, flatten its tracks and install the result.
    pub fn load_legacy_score(&mut self, json: &str) -> Result<usize, ControllerError> {
        let notes = vx_formats::parse_legacy_score(json)?.into_notes();
        let count = notes.len();
        self.install_notes(notes)?;
        Ok(count)
    }

    /// Relabel the installed notes, one character of `text` per note.
    pub fn override_lyrics(&mut self, text: &str) -> Result<(), ControllerError> {
        let notes = vx_formats::apply_lyric_override(text, self.timeline.notes());
        self.install_notes(notes)
    }

    // --- Playback config ---

    pub fn playback_config(&self) -> &PlaybackConfig {
        &self.playback
    }

    /// On error the previous config stays installed on both sides.
    pub fn install_config(&mut self, config: PlaybackConfig) -> Result<(), ControllerError> {
        self.publish(SessionUpdate::Config(config))?;
        self.playback = config;
        Ok(())
    }

    pub fn load_playback_config(&mut self, json: &str) -> Result<(), ControllerError> {
        let config = vx_formats::parse_playback_config(json)?;
        self.install_config(config)
    }

    // --- Sample cache ---

    pub fn cache(&self) -> &SampleCache {
        &self.cache
    }

    pub fn has_phoneme(&self, phoneme: &str) -> bool {
        self.cache.has(phoneme)
    }

    /// Fetch a phoneme buffer, marking it recently used.
    pub fn phoneme(&mut self, phoneme: &str) -> Option<Arc<PhonemeBuffer>> {
        self.cache.get(phoneme)
    }

    /// Store a decoded phoneme buffer. During playback the callback picks
    /// it up immediately; otherwise on the next `start`.
    pub fn insert_phoneme(&mut self, phoneme: &str, buffer: PhonemeBuffer) -> Result<(), ControllerError> {
        self.cache.insert_phoneme(phoneme, buffer);
        self.bank_dirty = true;
        if self.playing {
            self.sync_samples()?;
        }
        Ok(())
    }

    /// Decode WAV bytes and store them under `phoneme`.
    pub fn load_phoneme_wav(&mut self, phoneme: &str, data: &[u8]) -> Result<(), ControllerError> {
        let buffer = vx_formats::load_wav(data)?;
        self.insert_phoneme(phoneme, buffer)
    }

    pub fn remove_phoneme(&mut self, phoneme: &str) -> Result<bool, ControllerError> {
        let removed = self.cache.remove(phoneme);
        if removed {
            self.bank_dirty = true;
            if self.playing {
                self.sync_samples()?;
            }
        }
        Ok(removed)
    }

    /// Shaped scratch buffer from the cache, allocated by the open device
    /// (or the heap when no device is open).
    pub fn get_or_create_buffer(&mut self, shape: BufferShape) -> Arc<PhonemeBuffer> {
        match &self.device {
            Some(device) => self.cache.get_or_create(shape, device),
            None => self.cache.get_or_create(shape, &HeapAllocator),
        }
    }

    /// Publish the current cache contents to the callback if they changed.
    pub fn sync_samples(&mut self) -> Result<(), ControllerError> {
        if !self.bank_dirty || self.link.is_none() {
            return Ok(());
        }
        let bank = Arc::new(self.cache.bank());
        self.publish(SessionUpdate::Bank(bank))?;
        self.bank_dirty = false;
        Ok(())
    }

    // --- Real-time playback ---

    /// Open the default audio device and start its callback.
    ///
    /// The callback starts idle (silent) with the current timeline, config
    /// and samples already installed.
    pub fn open_output(&mut self) -> Result<(), ControllerError> {
        if self.link.is_some() {
            return Ok(());
        }
        let mut device = CpalOutput::new()?;
        let renderer = self.primed_renderer(device.sample_rate(), device.channels());
        let handoff = device.build_stream(renderer)?;
        self.bank_dirty = false;
        self.device = Some(device);
        self.link = Some(handoff);
        Ok(())
    }

    /// Stop playback and release the audio device.
    pub fn close_output(&mut self) {
        self.device = None;
        if self.link.take().is_some() {
            tracing::info!("closed audio output");
        }
        self.playing = false;
    }

    pub fn has_output(&self) -> bool {
        self.link.is_some()
    }

    /// Start playback from the beginning of the timeline.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        let at = match &self.device {
            Some(device) => device.current_time(),
            None => return Err(ControllerError::NoOutput),
        };
        self.sync_samples()?;
        self.publish(SessionUpdate::Start { at })?;
        self.playing = true;
        tracing::info!(notes = self.timeline.len(), "playback started");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ControllerError> {
        if !self.playing {
            return Ok(());
        }
        self.publish(SessionUpdate::Stop)?;
        self.playing = false;
        tracing::info!("playback stopped");
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Hand an update to the callback, waiting briefly if its ring is full.
    ///
    /// Without an open output this is a no-op; `open_output` installs the
    /// current state directly.
    fn publish(&mut self, update: SessionUpdate) -> Result<(), ControllerError> {
        let Some(link) = self.link.as_mut() else {
            return Ok(());
        };
        let deadline = Instant::now() + self.publish_timeout;
        let mut update = update;
        loop {
            // Displaced values are freed here, off the audio thread.
            while link.retired.try_pop().is_some() {}
            match link.updates.try_push(update) {
                Ok(()) => return Ok(()),
                Err(rejected) if Instant::now() < deadline => {
                    update = rejected;
                    std::thread::yield_now();
                }
                Err(_) => {
                    tracing::warn!("audio callback is not draining session updates");
                    return Err(ControllerError::OutputStalled);
                }
            }
        }
    }

    // --- Offline rendering ---

    /// Render `frames` frames from the start of the timeline.
    ///
    /// Fails with `RenderTooLong` beyond `max_render_seconds`.
    pub fn render_offline(&self, name: &str, frames: usize) -> Result<Segment, ControllerError> {
        let sample_rate = self.config.offline_sample_rate;
        let channels = self.config.offline_channels.max(1);
        let limit = self.config.max_render_frames();
        let len = frames
            .checked_mul(channels as usize)
            .filter(|_| frames <= limit)
            .ok_or(ControllerError::RenderTooLong { frames, limit })?;

        let mut renderer = self.primed_renderer(sample_rate, channels);
        renderer.play(0.0);

        let mut samples = vec![0.0f32; len];
        for block in samples.chunks_mut(OFFLINE_BLOCK_FRAMES * channels as usize) {
            renderer.render_offline(block);
        }

        Ok(Segment {
            name: name.to_string(),
            sample_rate,
            channels,
            samples,
        })
    }

    /// Render the whole timeline, up to the latest note end.
    pub fn render_timeline(&self, name: &str) -> Result<Segment, ControllerError> {
        let end = self.timeline.end_time();
        // Saturating cast: huge end times fail the length check.
        let frames = if end.is_finite() && end > 0.0 {
            (end * self.config.offline_sample_rate as f64).ceil() as usize
        } else {
            0
        };
        self.render_offline(name, frames)
    }

    fn primed_renderer(&self, sample_rate: u32, channels: u16) -> Renderer {
        let mut renderer = Renderer::new(sample_rate, channels);
        renderer.apply(SessionUpdate::Timeline(self.timeline.clone()));
        renderer.apply(SessionUpdate::Config(self.playback));
        renderer.apply(SessionUpdate::Bank(Arc::new(self.cache.bank())));
        renderer
    }

    // --- Spool ---

    /// Shared handle to the spool, e.g. for a worker thread running
    /// [`SpoolQueue::run`].
    pub fn spool(&self) -> SpoolQueue {
        self.spool.clone()
    }

    pub fn spool_segment(&self, segment: Segment) -> Result<(), ControllerError> {
        self.spool.enqueue(segment)?;
        Ok(())
    }

    /// Persist everything queued so far.
    pub fn drain_spool(&self, store: &mut impl SegmentStore) -> DrainReport {
        self.spool.drain(store)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
