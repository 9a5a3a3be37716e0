use super::*;
use crate::scene::model::{Scene, SceneKind};
use crate::scene::timeline::Timeline;

fn two_scenes(first: f64, second: f64) -> Timeline {
    let mut tl = Timeline::new("t");
    tl.add_scene(Scene::builder(SceneKind::TitleSlide, first).id("a").build())
        .unwrap();
    tl.add_scene(Scene::builder(SceneKind::Narration, second).id("b").build())
        .unwrap();
    tl
}

#[test]
fn frames_map_to_covering_scene_at_boundary() {
    let tl = two_scenes(1.0, 1.0);
    let fps = Fps::integer(10).unwrap();
    assert_eq!(total_frames(&tl, fps), 20);

    let f9 = plan_frame(&tl, FrameIndex(9), fps, 0.2).unwrap();
    assert_eq!(f9.paint.scene().id.as_str(), "a");
    let f10 = plan_frame(&tl, FrameIndex(10), fps, 0.2).unwrap();
    assert_eq!(f10.paint.scene().id.as_str(), "b");
    assert_eq!(f10.time_secs, 1.0);
}

#[test]
fn frames_past_the_end_are_skipped() {
    let tl = two_scenes(1.0, 1.0);
    let fps = Fps::integer(10).unwrap();
    assert!(plan_frame(&tl, FrameIndex(20), fps, 0.2).is_none());
    assert!(plan_frame(&Timeline::new("empty"), FrameIndex(0), fps, 0.2).is_none());
}

#[test]
fn transition_window_is_twenty_percent_from_scene_start() {
    let tl = two_scenes(2.0, 10.0);
    let fps = Fps::integer(30).unwrap();

    // 1.0 s into the 10 s scene.
    let early = plan_frame(&tl, FrameIndex(90), fps, 0.2).unwrap();
    match early.paint {
        FramePaint::Transition { from, to, fraction, .. } => {
            assert_eq!(from.id.as_str(), "a");
            assert_eq!(to.id.as_str(), "b");
            assert!((fraction - 0.5).abs() < 1e-9);
        }
        other => panic!("expected transition, got {other:?}"),
    }

    // 3.0 s into the scene.
    let late = plan_frame(&tl, FrameIndex(150), fps, 0.2).unwrap();
    assert!(!late.paint.is_transition());
    assert_eq!(late.paint.scene().id.as_str(), "b");
}

#[test]
fn first_scene_never_transitions() {
    let tl = two_scenes(2.0, 10.0);
    let fps = Fps::integer(30).unwrap();
    let f0 = plan_frame(&tl, FrameIndex(0), fps, 0.2).unwrap();
    assert!(!f0.paint.is_transition());
}

#[test]
fn zero_window_disables_transitions() {
    let tl = two_scenes(2.0, 10.0);
    let fps = Fps::integer(30).unwrap();
    let f = plan_frame(&tl, FrameIndex(60), fps, 0.0).unwrap();
    assert!(!f.paint.is_transition());
}

#[test]
fn steady_progress_tracks_elapsed_fraction() {
    let tl = two_scenes(2.0, 10.0);
    let fps = Fps::integer(10).unwrap();
    let f = plan_frame(&tl, FrameIndex(70), fps, 0.2).unwrap();
    match f.paint {
        FramePaint::Steady { progress, .. } => assert!((progress - 0.5).abs() < 1e-9),
        other => panic!("expected steady, got {other:?}"),
    }
}

#[test]
fn each_frame_of_tenth_second_scenes_gets_its_own_scene() {
    let mut tl = Timeline::new("t");
    for i in 0..10 {
        tl.add_scene(
            Scene::builder(SceneKind::TitleSlide, 0.1)
                .id(format!("s{i}"))
                .build(),
        )
        .unwrap();
    }
    let fps = Fps::integer(10).unwrap();
    assert_eq!(total_frames(&tl, fps), 10);
    for i in 0..10u64 {
        let req = plan_frame(&tl, FrameIndex(i), fps, 0.0).unwrap();
        assert_eq!(req.paint.scene().id.as_str(), format!("s{i}"));
    }
}
