//! Pairing lyrics with melodies.
//!
//! Pairing is positional: element `i` of one sequence goes with element
//! `i` of the other. When lengths differ both sides are truncated to the
//! shorter one. No time-based realignment is attempted.

use vx_ir::{Note, DEFAULT_VOLUME};

use crate::lyric::LyricEntry;
use crate::melody::MelodyNote;

/// Combine lyric timing/phonemes with melody pitches.
///
/// The note label is the melody's lyric when it has one, else the phoneme.
pub fn integrate_lyric_and_melody(lyric: &[LyricEntry], melody: &[MelodyNote]) -> Vec<Note> {
    let count = lyric.len().min(melody.len());
    if lyric.len() != melody.len() {
        tracing::warn!(
            lyric = lyric.len(),
            melody = melody.len(),
            kept = count,
            "lyric and melody lengths differ; pairing by position and truncating"
        );
    }

    lyric
        .iter()
        .zip(melody)
        .map(|(entry, note)| {
            let label = note.lyric.as_deref().unwrap_or(&entry.phoneme);
            Note::new(&entry.phoneme, entry.start_time, entry.end_time)
                .with_pitch(note.pitch)
                .with_volume(DEFAULT_VOLUME)
                .with_lyric(label)
        })
        .collect()
}

/// Relabel notes from `text`, one character per note.
///
/// Only `lyric` changes; phoneme, timing and pitch are kept.
pub fn apply_lyric_override(text: &str, notes: &[Note]) -> Vec<Note> {
    let symbols = text.chars().count();
    if symbols != notes.len() {
        tracing::warn!(
            symbols,
            notes = notes.len(),
            kept = symbols.min(notes.len()),
            "lyric text and note count differ; pairing by position and truncating"
        );
    }

    let mut buf = [0u8; 4];
    text.chars()
        .zip(notes)
        .map(|(symbol, note)| {
            let mut note = note.clone();
            note.lyric = symbol.encode_utf8(&mut buf).to_string();
            note
        })
        .collect()
}
