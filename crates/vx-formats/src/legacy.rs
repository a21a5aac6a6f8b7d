//! Legacy multi-track score format.
//!
//! ```text
//! [ { "info": { .. },
//!     "data": { "<track>": { "<id>": { loadtime, pitch, volume, time, lyric }, .. }, .. } } ]
//! ```
//!
//! Numeric fields may be numbers or numeric strings. Values that do not
//! coerce become NaN (times) or 0 (pitch, volume) rather than failing.

use std::cmp::Ordering;

use serde_json::{Map, Value};
use vx_ir::Note;

use crate::FormatError;

/// A parsed legacy score.
#[derive(Clone, Debug)]
pub struct LegacyScore {
    /// Score metadata, passed through untouched
    pub info: Map<String, Value>,
    pub tracks: Vec<LegacyTrack>,
}

/// One track of a legacy score, notes in entry-id order.
#[derive(Clone, Debug)]
pub struct LegacyTrack {
    pub name: String,
    pub notes: Vec<Note>,
}

impl LegacyScore {
    /// Total number of notes across all tracks.
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    /// Flatten all tracks into one sequence, stably ordered by start time.
    pub fn into_notes(self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.tracks.into_iter().flat_map(|t| t.notes).collect();
        notes.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        notes
    }
}

/// Parse a legacy score document.
pub fn parse_legacy_score(json: &str) -> Result<LegacyScore, FormatError> {
    let value: Value = serde_json::from_str(json)?;
    let items = value.as_array().ok_or(FormatError::NotASequence)?;
    let first = items.first().ok_or(FormatError::EmptyScore)?;

    let info = first
        .get("info")
        .and_then(Value::as_object)
        .ok_or(FormatError::MissingField("info"))?;
    let data = first
        .get("data")
        .and_then(Value::as_object)
        .ok_or(FormatError::MissingField("data"))?;

    let tracks = data
        .iter()
        .filter_map(|(name, entries)| match entries.as_object() {
            Some(entries) => Some(parse_track(name, entries)),
            None => {
                tracing::warn!(track = %name, "legacy track is not a mapping; skipped");
                None
            }
        })
        .collect();

    Ok(LegacyScore {
        info: info.clone(),
        tracks,
    })
}

fn parse_track(name: &str, entries: &Map<String, Value>) -> LegacyTrack {
    let mut keyed: Vec<(&String, Note)> = entries
        .iter()
        .map(|(id, fields)| (id, parse_entry(fields)))
        .collect();
    // Entry ids are usually integers; order them numerically, not lexically.
    keyed.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });

    LegacyTrack {
        name: name.to_string(),
        notes: keyed.into_iter().map(|(_, note)| note).collect(),
    }
}

fn parse_entry(fields: &Value) -> Note {
    let loadtime = coerce_f64(fields.get("loadtime"));
    let time = coerce_f64(fields.get("time"));
    let lyric = coerce_string(fields.get("lyric"));

    Note::new(&lyric, loadtime, loadtime + time)
        .with_pitch(coerce_i32(fields.get("pitch")))
        .with_volume(coerce_volume(fields.get("volume")))
        .with_lyric(&lyric)
}

fn coerce_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => f64::NAN,
    }
}

// Saturating casts: NaN coerces to 0.
fn coerce_i32(value: Option<&Value>) -> i32 {
    coerce_f64(value) as i32
}

fn coerce_volume(value: Option<&Value>) -> u8 {
    coerce_f64(value).clamp(0.0, 100.0) as u8
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORE: &str = r#"[
        {
            "info": { "title": "test", "bpm": 120 },
            "data": {
                "track1": {
                    "10": { "loadtime": 2.0, "pitch": 64, "volume": 80, "time": 0.5, "lyric": "u" },
                    "2":  { "loadtime": "1.0", "pitch": "62", "volume": "90", "time": "0.5", "lyric": "i" },
                    "1":  { "loadtime": 0, "pitch": 60, "volume": 100, "time": 1, "lyric": "a" }
                },
                "track2": {
                    "1": { "loadtime": 0.5, "pitch": 48, "volume": 50, "time": 0.25, "lyric": "o" }
                }
            }
        }
    ]"#;

    #[test]
    fn parses_tracks_in_numeric_id_order() {
        let score = parse_legacy_score(SCORE).unwrap();
        assert_eq!(score.info["title"], "test");
        assert_eq!(score.tracks.len(), 2);
        assert_eq!(score.note_count(), 4);

        let lyrics: Vec<&str> = score.tracks[0].notes.iter().map(|n| n.lyric.as_str()).collect();
        assert_eq!(lyrics, vec!["a", "i", "u"]);
    }

    #[test]
    fn coerces_numeric_strings() {
        let score = parse_legacy_score(SCORE).unwrap();
        let note = &score.tracks[0].notes[1];
        assert_eq!(note.start_time, 1.0);
        assert_eq!(note.end_time, 1.5);
        assert_eq!(note.duration, 0.5);
        assert_eq!(note.pitch, 62);
        assert_eq!(note.volume, 90);
        assert_eq!(note.phoneme, "i");
    }

    #[test]
    fn into_notes_merges_tracks_by_start_time() {
        let notes = parse_legacy_score(SCORE).unwrap().into_notes();
        let order: Vec<&str> = notes.iter().map(|n| n.phoneme.as_str()).collect();
        assert_eq!(order, vec!["a", "o", "i", "u"]);
    }

    #[test]
    fn unparseable_numbers_become_nan() {
        let score = parse_legacy_score(
            r#"[{ "info": {}, "data": { "t": { "1": { "loadtime": "soon", "pitch": "high", "volume": null, "time": 1, "lyric": "a" } } } }]"#,
        )
        .unwrap();
        let note = &score.tracks[0].notes[0];
        assert!(note.start_time.is_nan());
        assert_eq!(note.pitch, 0);
        assert_eq!(note.volume, 0);
    }

    #[test]
    fn empty_sequence_rejected() {
        let err = parse_legacy_score("[]").unwrap_err();
        assert!(matches!(err, FormatError::EmptyScore));
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn non_sequence_rejected() {
        let err = parse_legacy_score(r#"{ "info": {}, "data": {} }"#).unwrap_err();
        assert!(matches!(err, FormatError::NotASequence));
    }

    #[test]
    fn missing_info_rejected() {
        let err = parse_legacy_score(r#"[{ "data": {} }]"#).unwrap_err();
        assert!(matches!(err, FormatError::MissingField("info")));
    }

    #[test]
    fn missing_data_rejected() {
        let err = parse_legacy_score(r#"[{ "info": {} }]"#).unwrap_err();
        assert!(matches!(err, FormatError::MissingField("data")));
    }

    #[test]
    fn non_mapping_track_skipped() {
        let score = parse_legacy_score(r#"[{ "info": {}, "data": { "bad": [1, 2] } }]"#).unwrap();
        assert!(score.tracks.is_empty());
    }
}
