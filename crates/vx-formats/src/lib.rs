//! Input parsers for the voxline singing synthesizer.
//!
//! Turns lyric, melody and legacy score documents into note sequences,
//! pairs lyrics with melodies, and decodes phoneme WAV assets.

mod align;
mod config;
mod legacy;
mod lyric;
mod melody;
mod wav_format;

pub use align::{apply_lyric_override, integrate_lyric_and_melody};
pub use config::parse_playback_config;
pub use legacy::{parse_legacy_score, LegacyScore, LegacyTrack};
pub use lyric::{parse_lyric, LyricEntry};
pub use melody::{parse_melody, MelodyNote};
pub use wav_format::load_wav;

use thiserror::Error;

/// Status code reported for structurally invalid input.
pub const FORMAT_ERROR_CODE: u16 = 400;

/// Error type for input parsing.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A required field is absent or has the wrong shape
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// Parallel sequences disagree in length
    #[error("`{field}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Legacy score sequence has no elements
    #[error("legacy score is empty")]
    EmptyScore,
    /// Legacy score top level is not a sequence
    #[error("legacy score must be a sequence")]
    NotASequence,
    /// Entry has non-finite times or does not end after it starts
    #[error("entry {index} has an invalid time interval")]
    InvalidInterval { index: usize },
    /// Document is not valid JSON or a field has the wrong type
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// Invalid file header or magic bytes
    #[error("invalid WAV header")]
    InvalidHeader,
    /// Unexpected end of file
    #[error("unexpected end of WAV data")]
    UnexpectedEof,
    /// Unsupported WAV encoding
    #[error("unsupported WAV encoding")]
    UnsupportedVersion,
}

impl FormatError {
    /// Status code surfaced to the caller alongside the message.
    pub fn code(&self) -> u16 {
        FORMAT_ERROR_CODE
    }
}

/// Reject intervals that are non-finite or do not end after they start.
pub(crate) fn check_interval(index: usize, start: f64, end: f64) -> Result<(), FormatError> {
    if start.is_finite() && end.is_finite() && start < end {
        Ok(())
    } else {
        Err(FormatError::InvalidInterval { index })
    }
}
