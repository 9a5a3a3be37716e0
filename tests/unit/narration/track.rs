use super::*;
use crate::narration::provider::SilentNarration;
use crate::scene::model::{Scene, SceneKind};

/// Emits a constant tone sample so placement is observable.
struct Tone {
    secs: f64,
}

impl NarrationProvider for Tone {
    fn name(&self) -> &str {
        "tone"
    }

    fn synthesize(&self, text: &str, sample_rate: u32, channels: u16) -> CastResult<Vec<f32>> {
        if text.contains("fail") {
            return Err(CastError::encode("synth failed"));
        }
        let frames = (self.secs * f64::from(sample_rate)) as usize;
        Ok(vec![0.5; frames * usize::from(channels)])
    }
}

fn settings() -> AudioSettings {
    AudioSettings {
        sample_rate: 100,
        channels: 2,
        bitrate_kbps: 128,
    }
}

fn timeline() -> Timeline {
    let mut tl = Timeline::new("t");
    tl.add_scene(Scene::new(SceneKind::Intro, 1.0)).unwrap();
    tl.add_scene(
        Scene::builder(SceneKind::Narration, 2.0)
            .narration("hello")
            .build(),
    )
    .unwrap();
    tl.add_scene(
        Scene::builder(SceneKind::Narration, 1.0)
            .narration("fail here")
            .build(),
    )
    .unwrap();
    tl
}

#[test]
fn clips_are_placed_at_scene_start_and_truncated() {
    let mut tl = timeline();
    let track = build_narration_track(&mut tl, &Tone { secs: 3.0 }, &settings(), false).unwrap();
    assert_eq!(track.samples.len(), 4 * 100 * 2);
    assert!((track.duration_secs() - 4.0).abs() < 1e-9);
    assert_eq!(track.clips.len(), 1);
    assert_eq!(track.clips[0].scene_index, 1);
    assert_eq!(track.clips[0].start_secs, 1.0);

    // Silence before scene 1, tone inside it, truncated at its end.
    assert_eq!(track.samples[199], 0.0);
    assert_eq!(track.samples[200], 0.5);
    assert_eq!(track.samples[599], 0.5);
    assert_eq!(track.samples[600], 0.0);
}

#[test]
fn aligned_durations_follow_clip_length() {
    let mut tl = timeline();
    let track = build_narration_track(&mut tl, &Tone { secs: 0.5 }, &settings(), true).unwrap();
    assert_eq!(tl.scenes()[1].duration, 0.5);
    // The failed scene keeps its duration.
    assert_eq!(tl.scenes()[2].duration, 1.0);
    assert_eq!(tl.scenes()[2].start_time, 1.5);
    assert!((track.duration_secs() - 2.5).abs() < 1e-9);
}

#[test]
fn silent_provider_produces_a_silent_timeline_length_track() {
    let mut tl = timeline();
    let track =
        build_narration_track(&mut tl, &SilentNarration::default(), &settings(), false).unwrap();
    assert_eq!(track.clips.len(), 2);
    assert!(track.samples.iter().all(|s| *s == 0.0));
    assert_eq!(tl.total_duration(), 4.0);
}

#[test]
fn write_f32le_persists_little_endian_samples() {
    let path = std::env::temp_dir()
        .join(format!("scenecast_narr_{}", std::process::id()))
        .join("n.f32");
    write_f32le(&[0.25, -2.0], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes(bytes[0..4].try_into().unwrap()), 0.25);
    assert_eq!(f32::from_le_bytes(bytes[4..8].try_into().unwrap()), -1.0);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn zero_sample_rate_is_rejected() {
    let mut tl = timeline();
    let mut audio = settings();
    audio.sample_rate = 0;
    assert!(build_narration_track(&mut tl, &SilentNarration::default(), &audio, false).is_err());
}
