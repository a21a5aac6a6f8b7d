//! Sample cache and real-time renderer for the voxline singing synthesizer.
//!
//! The control side fills a [`SampleCache`], snapshots it into a
//! [`SampleBank`] and hands whole values to the [`Renderer`] through
//! [`SessionUpdate`]s. The renderer turns a note timeline into output
//! samples without locking or allocating.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bank;
mod frequency;
mod renderer;
mod sample_cache;
mod session;

pub use bank::SampleBank;
pub use frequency::{midi_to_frequency, pitch_ratio, REFERENCE_NOTE};
pub use renderer::Renderer;
pub use sample_cache::{
    BufferAllocator, CacheConfig, HeapAllocator, SampleCache, DEFAULT_CEILING_BYTES,
};
pub use session::{PlaybackSession, Retired, SessionUpdate};
