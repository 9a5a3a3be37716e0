use super::*;
use crate::scene::model::SceneKind;

#[test]
fn solid_frame_fills_every_pixel() {
    let f = FrameRGBA::solid(Canvas { width: 3, height: 2 }, [1, 2, 3, 255]);
    assert_eq!(f.byte_len(), 24);
    assert_eq!(f.pixel(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(f.pixel(3, 0), None);
}

#[test]
fn frame_paint_reports_active_scene() {
    let a = Scene::new(SceneKind::Intro, 1.0);
    let b = Scene::new(SceneKind::Outro, 1.0);
    let steady = FramePaint::Steady {
        scene: &a,
        progress: 0.5,
    };
    let trans = FramePaint::Transition {
        from: &a,
        to: &b,
        fraction: 0.1,
        progress: 0.02,
    };
    assert_eq!(steady.scene().id, a.id);
    assert!(!steady.is_transition());
    assert_eq!(trans.scene().id, b.id);
    assert!(trans.is_transition());
}
