//! Lyric documents: parallel phoneme / start / end sequences.

use serde::Deserialize;

use crate::{check_interval, FormatError};

/// One timed phoneme from a lyric document.
#[derive(Clone, Debug, PartialEq)]
pub struct LyricEntry {
    pub phoneme: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

#[derive(Deserialize)]
struct LyricDocument {
    phonemes: Option<Vec<String>>,
    start_times: Option<Vec<f64>>,
    end_times: Option<Vec<f64>>,
}

/// Parse `{ phonemes: [..], start_times: [..], end_times: [..] }`.
///
/// The three sequences must be present and of equal length.
pub fn parse_lyric(json: &str) -> Result<Vec<LyricEntry>, FormatError> {
    let doc: LyricDocument = serde_json::from_str(json)?;

    let phonemes = doc.phonemes.ok_or(FormatError::MissingField("phonemes"))?;
    let starts = doc.start_times.ok_or(FormatError::MissingField("start_times"))?;
    let ends = doc.end_times.ok_or(FormatError::MissingField("end_times"))?;

    if starts.len() != phonemes.len() {
        return Err(FormatError::LengthMismatch {
            field: "start_times",
            expected: phonemes.len(),
            actual: starts.len(),
        });
    }
    if ends.len() != phonemes.len() {
        return Err(FormatError::LengthMismatch {
            field: "end_times",
            expected: phonemes.len(),
            actual: ends.len(),
        });
    }

    phonemes
        .into_iter()
        .zip(starts.into_iter().zip(ends))
        .enumerate()
        .map(|(index, (phoneme, (start_time, end_time)))| {
            check_interval(index, start_time, end_time)?;
            Ok(LyricEntry {
                phoneme,
                start_time,
                end_time,
                duration: end_time - start_time,
            })
        })
        .collect()
}
