//! MIDI pitch to frequency and playback-rate conversion.
//!
//! Pitch shifting is nearest-sample index scaling: the renderer multiplies
//! the source frame index by a ratio derived from the note's MIDI pitch
//! relative to middle C.

/// MIDI note that plays a phoneme buffer at its recorded rate (C-4).
pub const REFERENCE_NOTE: i32 = 60;

/// Concert A (MIDI 69) in Hz.
const A4_FREQUENCY: f64 = 440.0;
const A4_NOTE: i32 = 69;

/// Convert a MIDI note to frequency in Hz (12-TET, A4 = 440 Hz).
///
/// Notes at or below 0 produce 0 Hz.
pub fn midi_to_frequency(note: i32) -> f64 {
    if note <= 0 {
        return 0.0;
    }
    A4_FREQUENCY * libm::pow(2.0, (note - A4_NOTE) as f64 / 12.0)
}

/// Playback-rate multiplier for `pitch` with a percentage offset.
///
/// `ratio = f(pitch) / f(60) * (1 + pitch_offset / 100)`.
pub fn pitch_ratio(pitch: i32, pitch_offset: f32) -> f64 {
    let base = midi_to_frequency(pitch) / midi_to_frequency(REFERENCE_NOTE);
    base * (1.0 + pitch_offset as f64 / 100.0)
}
