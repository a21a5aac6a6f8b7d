//! Melody documents: a `notes` list carrying timing and pitch.

use serde::Deserialize;

use crate::{check_interval, FormatError};

/// One note from a melody document.
///
/// `duration` is recomputed from the interval; the wire value is ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct MelodyNote {
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub pitch: i32,
    pub lyric: Option<String>,
}

#[derive(Deserialize)]
struct MelodyDocument {
    notes: Option<Vec<WireNote>>,
}

#[derive(Deserialize)]
struct WireNote {
    start_time: f64,
    end_time: f64,
    pitch: i32,
    #[serde(default)]
    lyric: Option<String>,
}

/// Parse `{ notes: [{ start_time, end_time, duration, pitch, lyric? }, ..] }`.
pub fn parse_melody(json: &str) -> Result<Vec<MelodyNote>, FormatError> {
    let doc: MelodyDocument = serde_json::from_str(json)?;
    let notes = doc.notes.ok_or(FormatError::MissingField("notes"))?;

    notes
        .into_iter()
        .enumerate()
        .map(|(index, note)| {
            check_interval(index, note.start_time, note.end_time)?;
            Ok(MelodyNote {
                start_time: note.start_time,
                end_time: note.end_time,
                duration: note.end_time - note.start_time,
                pitch: note.pitch,
                lyric: note.lyric,
            })
        })
        .collect()
}
