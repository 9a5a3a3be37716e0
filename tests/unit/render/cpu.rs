use super::*;
use crate::foundation::core::FrameIndex;
use crate::scene::model::{Scene, SceneKind};

const SMALL: Canvas = Canvas {
    width: 64,
    height: 36,
};

fn bar_scene() -> Scene {
    Scene::builder(SceneKind::Visualization, 1.0)
        .payload("array", vec![7i64])
        .build()
}

fn steady(scene: &Scene) -> PaintRequest<'_> {
    PaintRequest {
        idx: FrameIndex(0),
        time_secs: 0.0,
        paint: FramePaint::Steady {
            scene,
            progress: 0.5,
        },
    }
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 3)
}

#[test]
fn blank_scene_renders_background() {
    let mut s = CpuSurface::new(SMALL, Theme::default()).unwrap();
    let blank = Scene::new(SceneKind::Transition, 1.0);
    s.paint(&steady(&blank)).unwrap();
    let frame = s.capture().unwrap();
    assert_eq!((frame.width, frame.height), (64, 36));
    assert_eq!(frame.data.len(), 64 * 36 * 4);
    assert!(frame.data.chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
}

#[test]
fn visualization_bar_uses_primary_color() {
    let theme = Theme::default();
    let mut s = CpuSurface::new(SMALL, theme.clone()).unwrap();
    let scene = bar_scene();
    s.paint(&steady(&scene)).unwrap();
    let frame = s.capture().unwrap();
    let bar = frame.pixel(32, 20).unwrap();
    assert!(close(bar, theme.primary.to_premul_bytes()), "got {bar:?}");
    assert_eq!(frame.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn transition_cross_fades_into_incoming_scene() {
    let theme = Theme::default();
    let mut s = CpuSurface::new(SMALL, theme.clone()).unwrap();
    let from = Scene::new(SceneKind::Transition, 1.0);
    let to = bar_scene();
    let req = PaintRequest {
        idx: FrameIndex(3),
        time_secs: 0.1,
        paint: FramePaint::Transition {
            from: &from,
            to: &to,
            fraction: 0.5,
            progress: 0.1,
        },
    };
    s.paint(&req).unwrap();
    let px = s.capture().unwrap().pixel(32, 20).unwrap();
    let p = theme.primary;
    let half = |c: u8| ((u16::from(c) + 255) / 2) as u8;
    assert!(
        close(px, [half(p.r), half(p.g), half(p.b), 255]),
        "got {px:?}"
    );
}

#[test]
fn capture_requires_a_paint() {
    let mut s = CpuSurface::new(SMALL, Theme::default()).unwrap();
    assert!(s.capture().is_err());
}

#[test]
fn oversized_canvas_is_rejected() {
    let big = Canvas {
        width: 70_000,
        height: 2,
    };
    assert!(CpuSurface::new(big, Theme::default()).is_err());
    assert!(CpuSurface::new(Canvas { width: 0, height: 2 }, Theme::default()).is_err());
}

#[test]
fn title_text_is_rasterized() {
    if crate::render::text::resolve_font_path(None).is_none() {
        eprintln!("skipping: no system font installed");
        return;
    }
    let canvas = Canvas {
        width: 640,
        height: 360,
    };
    let mut s = CpuSurface::new(canvas, Theme::default()).unwrap();
    let scene = Scene::builder(SceneKind::TitleSlide, 1.0)
        .payload("title", "Bubble Sort")
        .build();
    s.paint(&steady(&scene)).unwrap();
    let frame = s.capture().unwrap();

    // Dark glyph coverage around the center row, background elsewhere.
    let inked = (150..210)
        .flat_map(|y| (200..440).map(move |x| (x, y)))
        .filter(|&(x, y)| frame.pixel(x, y).is_some_and(|p| p[0] < 128))
        .count();
    assert!(inked > 20, "only {inked} dark pixels");
    assert_eq!(frame.pixel(5, 5), Some([255, 255, 255, 255]));
}

#[test]
fn surface_without_font_skips_text() {
    let mut s = CpuSurface::new(SMALL, Theme::default())
        .unwrap()
        .with_text_engine(TextLayoutEngine::new());
    let scene = Scene::builder(SceneKind::TitleSlide, 1.0)
        .payload("title", "Bubble Sort")
        .build();
    s.paint(&steady(&scene)).unwrap();
    let frame = s.capture().unwrap();
    assert!(frame.data.chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
}
