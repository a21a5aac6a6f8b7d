//! Core types for the voxline singing synthesizer.
//!
//! This crate defines the note timeline, playback configuration and
//! phoneme buffer types shared by the parsers, the sample cache and the
//! real-time renderer.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod audio_buffer;
mod config;
mod note;
mod timeline;

pub use audio_buffer::{BufferShape, PhonemeBuffer, BYTES_PER_SAMPLE};
pub use config::PlaybackConfig;
pub use note::{Note, DEFAULT_PITCH, DEFAULT_VOLUME};
pub use timeline::Timeline;
