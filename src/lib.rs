//! Singing-voice synthesis engine.
//!
//! Builds note timelines from lyric, melody and legacy score documents,
//! keeps decoded phoneme audio in a bounded cache, renders the timeline
//! sample by sample in the audio callback, and spools finished audio to
//! a persistent store.
//!
//! ```no_run
//! use voxline::{Controller, WavDirStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ctl = Controller::default();
//! ctl.load_lyric_and_melody(
//!     r#"{"phonemes": ["a"], "start_times": [0.0], "end_times": [1.0]}"#,
//!     r#"{"notes": [{"start_time": 0.0, "end_time": 1.0, "duration": 1.0, "pitch": 64}]}"#,
//! )?;
//! ctl.load_phoneme_wav("a", &std::fs::read("a.wav")?)?;
//!
//! ctl.spool_segment(ctl.render_timeline("take-1")?)?;
//! ctl.drain_spool(&mut WavDirStore::new("renders")?);
//!
//! ctl.open_output()?;
//! ctl.start()?;
//! # Ok(())
//! # }
//! ```

pub use vx_master::*;
