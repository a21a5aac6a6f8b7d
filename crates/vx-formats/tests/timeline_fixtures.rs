//! Integration tests for the timeline parsers against fixture documents.

use std::fs;
use std::path::PathBuf;

use vx_formats::{
    apply_lyric_override, integrate_lyric_and_melody, parse_legacy_score, parse_lyric,
    parse_melody,
};
use vx_ir::Timeline;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures")
}

fn load_fixture(kind: &str, name: &str) -> String {
    let path = fixtures_dir().join(kind).join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

// --- lyric + melody ---

#[test]
fn sakura_lyric_durations_match_intervals() {
    let lyric = parse_lyric(&load_fixture("lyric", "sakura.json")).unwrap();
    assert_eq!(lyric.len(), 6);
    for entry in &lyric {
        assert_eq!(entry.duration, entry.end_time - entry.start_time);
    }
}

#[test]
fn sakura_pairs_to_shorter_melody() {
    let lyric = parse_lyric(&load_fixture("lyric", "sakura.json")).unwrap();
    let melody = parse_melody(&load_fixture("melody", "sakura.json")).unwrap();
    assert_eq!(melody.len(), 5);

    let notes = integrate_lyric_and_melody(&lyric, &melody);
    assert_eq!(notes.len(), 5);

    let labels: Vec<&str> = notes.iter().map(|n| n.lyric.as_str()).collect();
    assert_eq!(labels, ["sa", "a", "ku", "u", "ra"]);
    let pitches: Vec<i32> = notes.iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, [69, 69, 71, 71, 69]);
    assert!(notes.iter().all(|n| n.volume == 100));

    // Timing comes from the lyric side.
    assert_eq!(notes[4].phoneme, "r");
    assert_eq!(notes[4].end_time, 1.32);
}

#[test]
fn sakura_timeline_is_indexed_and_gapless() {
    let lyric = parse_lyric(&load_fixture("lyric", "sakura.json")).unwrap();
    let melody = parse_melody(&load_fixture("melody", "sakura.json")).unwrap();
    let timeline = Timeline::new(integrate_lyric_and_melody(&lyric, &melody));

    assert!(timeline.is_indexed());
    assert_eq!(timeline.end_time(), 1.32);
    for t in [0.0, 0.11, 0.12, 0.59, 0.6, 1.0, 1.31] {
        assert!(timeline.active_at(t).is_some(), "no note at {t}");
    }
    assert!(timeline.active_at(1.32).is_none());
    assert_eq!(timeline.active_at(0.6).map(|n| n.phoneme.as_str()), Some("k"));
}

#[test]
fn sakura_override_relabels_each_note() {
    let lyric = parse_lyric(&load_fixture("lyric", "sakura.json")).unwrap();
    let melody = parse_melody(&load_fixture("melody", "sakura.json")).unwrap();
    let notes = integrate_lyric_and_melody(&lyric, &melody);

    let relabeled = apply_lyric_override("さくらさく", &notes);
    assert_eq!(relabeled.len(), 5);
    assert_eq!(relabeled[0].lyric, "さ");
    assert_eq!(relabeled[4].lyric, "く");
    assert_eq!(relabeled[1].phoneme, notes[1].phoneme);

    assert_eq!(apply_lyric_override("さくら", &notes).len(), 3);
}

// --- legacy ---

#[test]
fn duet_keeps_info_and_mapping_tracks() {
    let score = parse_legacy_score(&load_fixture("legacy", "duet.json")).unwrap();
    assert_eq!(score.info["title"], "duet");
    assert_eq!(score.tracks.len(), 2);
    assert_eq!(score.note_count(), 5);
}

#[test]
fn duet_track_entries_in_numeric_id_order() {
    let score = parse_legacy_score(&load_fixture("legacy", "duet.json")).unwrap();
    let lead = score.tracks.iter().find(|t| t.name == "lead").unwrap();
    let phonemes: Vec<&str> = lead.notes.iter().map(|n| n.phoneme.as_str()).collect();
    assert_eq!(phonemes, ["a", "e", "o"]);
    assert_eq!(lead.notes[2].pitch, 64);
    assert_eq!(lead.notes[2].volume, 80);
    assert_eq!(lead.notes[2].end_time, 1.5);
}

#[test]
fn duet_coerces_leniently() {
    let score = parse_legacy_score(&load_fixture("legacy", "duet.json")).unwrap();
    let harmony = score.tracks.iter().find(|t| t.name == "harmony").unwrap();
    assert_eq!(harmony.notes[0].volume, 0);
    assert!(harmony.notes[1].start_time.is_nan());
    assert!(harmony.notes[1].end_time.is_nan());
}

#[test]
fn duet_flattens_by_start_time() {
    let notes = parse_legacy_score(&load_fixture("legacy", "duet.json"))
        .unwrap()
        .into_notes();
    let starts: Vec<f64> = notes.iter().take(4).map(|n| n.start_time).collect();
    assert_eq!(starts, [0.0, 0.25, 0.5, 1.0]);
    // NaN start times sort last
    assert!(notes[4].start_time.is_nan());
}
