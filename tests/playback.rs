//! Integration test: parse documents → install timeline → render offline → spool → verify output.

use std::fs;
use std::path::{Path, PathBuf};

use voxline::{
    samples_to_wav, BufferShape, Controller, ControllerConfig, ControllerError, PhonemeBuffer,
    PlaybackConfig, Segment, SpoolConfig, SpoolError, WavDirStore,
};

const RATE: u32 = 8000;

const LYRIC: &str = r#"{
    "phonemes": ["a", "i"],
    "start_times": [0.0, 0.5],
    "end_times": [0.5, 1.0]
}"#;

const MELODY: &str = r#"{
    "notes": [
        {"start_time": 0.0, "end_time": 0.5, "duration": 0.5, "pitch": 60, "lyric": "la"},
        {"start_time": 0.5, "end_time": 1.0, "duration": 0.5, "pitch": 72, "lyric": "li"}
    ]
}"#;

const LEGACY: &str = r#"[{
    "info": {"title": "scale", "tempo": 120},
    "data": {
        "melody": {
            "2": {"loadtime": "0.25", "pitch": 60, "volume": 50, "time": 0.25, "lyric": "i"},
            "1": {"loadtime": 0, "pitch": "60", "volume": "100", "time": "0.25", "lyric": "a"}
        }
    }
}]"#;

fn scratch_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("voxline-it-{}-{}", tag, std::process::id()))
}

fn read_wav(path: &Path) -> PhonemeBuffer {
    vx_formats::load_wav(&fs::read(path).unwrap()).unwrap()
}

fn controller() -> Controller {
    Controller::new(ControllerConfig {
        offline_sample_rate: RATE,
        offline_channels: 2,
        ..Default::default()
    })
}

/// Mono ramp: frame `i` holds `i / frames`.
fn ramp(frames: usize) -> PhonemeBuffer {
    let data = (0..frames).map(|i| i as f32 / frames as f32).collect();
    PhonemeBuffer::from_channels(RATE, vec![data])
}

fn frame(segment: &Segment, index: usize, channel: usize) -> f32 {
    segment.samples[index * segment.channels as usize + channel]
}

fn max_amplitude(segment: &Segment) -> f32 {
    segment.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

#[test]
fn lyric_and_melody_render_nonsilent() {
    let mut ctl = controller();
    assert_eq!(ctl.load_lyric_and_melody(LYRIC, MELODY).unwrap(), 2);
    ctl.insert_phoneme("a", ramp(RATE as usize)).unwrap();
    ctl.insert_phoneme("i", ramp(RATE as usize)).unwrap();

    let segment = ctl.render_timeline("take").unwrap();
    assert_eq!(segment.frames(), RATE as usize);
    assert!(max_amplitude(&segment) > 0.1);
    assert!(max_amplitude(&segment) <= 1.0);
}

#[test]
fn channels_carry_the_same_mono_voice() {
    let mut ctl = controller();
    ctl.load_lyric_and_melody(LYRIC, MELODY).unwrap();
    ctl.insert_phoneme("a", ramp(RATE as usize)).unwrap();

    let segment = ctl.render_timeline("stereo").unwrap();
    for i in (0..segment.frames()).step_by(97) {
        assert_eq!(frame(&segment, i, 0), frame(&segment, i, 1));
    }
}

#[test]
fn octave_note_reads_source_twice_as_fast() {
    let mut ctl = controller();
    ctl.load_lyric_and_melody(LYRIC, MELODY).unwrap();
    ctl.insert_phoneme("a", ramp(RATE as usize)).unwrap();
    ctl.insert_phoneme("i", ramp(RATE as usize)).unwrap();

    let segment = ctl.render_timeline("pitch").unwrap();
    let quarter = RATE as usize / 4;
    let half = RATE as usize / 2;
    // Reference pitch: 0.25 s into the note reads source frame 2000.
    assert!((frame(&segment, quarter, 0) - 0.25).abs() < 1e-3);
    // One octave up: 0.25 s into the second note reads source frame ~4000.
    assert!((frame(&segment, half + quarter, 0) - 0.5).abs() < 1e-3);
}

#[test]
fn octave_note_past_buffer_end_is_silent() {
    let mut ctl = controller();
    ctl.load_lyric_and_melody(LYRIC, MELODY).unwrap();
    // Half a second of source: the octave-up note runs out halfway through.
    ctl.insert_phoneme("i", ramp(RATE as usize / 2)).unwrap();

    let segment = ctl.render_timeline("short").unwrap();
    let start = RATE as usize / 2;
    assert!(frame(&segment, start + 100, 0) > 0.0);
    assert_eq!(frame(&segment, start + RATE as usize / 4 + 100, 0), 0.0);
}

#[test]
fn playback_config_scales_output() {
    let mut ctl = controller();
    ctl.install_notes(vec![voxline::Note::new("a", 0.0, 0.5)]).unwrap();
    ctl.insert_phoneme("a", PhonemeBuffer::filled(BufferShape::new(1, RATE as usize, RATE), 0.5))
        .unwrap();
    ctl.load_playback_config(r#"{"volume": 0.5}"#).unwrap();
    assert_eq!(ctl.playback_config(), &PlaybackConfig::default().with_volume(0.5));

    let segment = ctl.render_timeline("quiet").unwrap();
    assert!((frame(&segment, 10, 0) - 0.25).abs() < 1e-6);
}

#[test]
fn renders_are_repeatable() {
    let mut ctl = controller();
    ctl.load_lyric_and_melody(LYRIC, MELODY).unwrap();
    ctl.insert_phoneme("a", ramp(RATE as usize)).unwrap();
    ctl.insert_phoneme("i", ramp(RATE as usize)).unwrap();

    let first = ctl.render_timeline("one").unwrap();
    let second = ctl.render_timeline("two").unwrap();
    assert_eq!(first.samples, second.samples);
}

#[test]
fn legacy_score_flattens_in_time_order() {
    let mut ctl = controller();
    assert_eq!(ctl.load_legacy_score(LEGACY).unwrap(), 2);

    let notes = ctl.timeline().notes();
    assert_eq!(notes[0].phoneme, "a");
    assert_eq!(notes[0].volume, 100);
    assert_eq!(notes[1].phoneme, "i");
    assert_eq!(notes[1].start_time, 0.25);
    assert_eq!(notes[1].end_time, 0.5);
    assert_eq!(notes[1].volume, 50);
}

#[test]
fn legacy_score_errors_report_code_400() {
    let mut ctl = controller();
    for doc in ["[]", "{}", r#"[{"data": {}}]"#, r#"[{"info": {}}]"#] {
        match ctl.load_legacy_score(doc) {
            Err(ControllerError::Format(err)) => assert_eq!(err.code(), 400, "{doc}"),
            other => panic!("expected format error for {doc}, got {other:?}"),
        }
    }
}

#[test]
fn lyric_override_keeps_phonemes() {
    let mut ctl = controller();
    ctl.load_lyric_and_melody(LYRIC, MELODY).unwrap();
    ctl.override_lyrics("ab").unwrap();
    let notes = ctl.timeline().notes();
    assert_eq!(notes[0].lyric, "a");
    assert_eq!(notes[1].lyric, "b");
    assert_eq!(notes[1].phoneme, "i");
    assert_eq!(notes[1].pitch, 72);
}

#[test]
fn phoneme_wav_assets_feed_the_renderer() {
    let mut ctl = controller();
    ctl.install_notes(vec![voxline::Note::new("o", 0.0, 0.1)]).unwrap();
    let wav = samples_to_wav(&vec![0.5; RATE as usize], 1, RATE);
    ctl.load_phoneme_wav("o", &wav).unwrap();

    let segment = ctl.render_offline("asset", 100).unwrap();
    assert!((frame(&segment, 50, 1) - 0.5).abs() < 1e-3);
}

#[test]
fn spooled_segments_land_on_disk() {
    let dir = scratch_dir("spool");
    let mut ctl = controller();
    ctl.load_lyric_and_melody(LYRIC, MELODY).unwrap();
    ctl.insert_phoneme("a", ramp(RATE as usize)).unwrap();

    ctl.spool_segment(ctl.render_timeline("verse").unwrap()).unwrap();
    ctl.spool_segment(ctl.render_offline("intro", 800).unwrap()).unwrap();

    let mut store = WavDirStore::new(&dir).unwrap();
    let report = ctl.drain_spool(&mut store);
    assert_eq!(report.persisted, 2);
    assert_eq!(report.failed, 0);

    let verse = read_wav(&store.path_for("verse"));
    assert_eq!(verse.frames(), RATE as usize);
    assert_eq!(verse.channels(), 2);
    let intro = read_wav(&store.path_for("intro"));
    assert_eq!(intro.frames(), 800);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn bounded_spool_rejects_when_full() {
    let ctl = Controller::new(ControllerConfig {
        offline_sample_rate: RATE,
        spool: SpoolConfig { capacity: 1 },
        ..Default::default()
    });
    ctl.spool_segment(ctl.render_offline("a", 8).unwrap()).unwrap();
    let err = ctl.spool_segment(ctl.render_offline("b", 8).unwrap()).unwrap_err();
    assert!(matches!(err, ControllerError::Spool(SpoolError::Full { capacity: 1 })));
}

#[test]
fn far_future_legacy_score_fails_to_render() {
    let mut ctl = Controller::new(ControllerConfig {
        offline_sample_rate: RATE,
        ..Default::default()
    });
    ctl.load_legacy_score(
        r#"[{"info": {}, "data": {"melody": {
            "1": {"loadtime": "1e300", "pitch": 60, "volume": 100, "time": 1, "lyric": "a"}
        }}}]"#,
    )
    .unwrap();
    ctl.insert_phoneme("a", ramp(RATE as usize)).unwrap();

    let err = ctl.render_timeline("far").unwrap_err();
    assert!(matches!(err, ControllerError::RenderTooLong { .. }));
    assert!(err.to_string().contains("frame limit"));
}
