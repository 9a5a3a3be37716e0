use super::*;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CastError, CastResult};
use crate::render::backend::{FrameRGBA, PaintRequest, RenderSurface};
use crate::scene::model::{Scene, SceneKind};
use crate::scene::timeline::Timeline;
use std::sync::mpsc;

const CANVAS: Canvas = Canvas {
    width: 1,
    height: 1,
};

/// Fails on frame 2, panics on frame 3.
struct Flaky;

impl RenderSurface for Flaky {
    fn canvas(&self) -> Canvas {
        CANVAS
    }

    fn paint(&mut self, req: &PaintRequest<'_>) -> CastResult<()> {
        match req.idx.0 {
            2 => Err(CastError::render("bad frame")),
            3 => panic!("exploded"),
            _ => Ok(()),
        }
    }

    fn capture(&mut self) -> CastResult<FrameRGBA> {
        Ok(FrameRGBA::solid(CANVAS, [1, 1, 1, 255]))
    }
}

fn ctx() -> ComputeCtx {
    let mut tl = Timeline::new("t");
    tl.add_scene(Scene::new(SceneKind::TitleSlide, 0.5)).unwrap();
    ComputeCtx {
        seq: Arc::new(tl),
        surface: SharedSurface::init(Flaky),
        buffer: Arc::new(ReorderBuffer::new()),
        state: Arc::new(PipelineState::new(6)),
        fps: Fps::integer(10).unwrap(),
        transition_window: 0.2,
        cancel: CancelToken::new(),
    }
}

#[test]
fn rendered_frames_are_parked_and_counted() {
    let c = ctx();
    assert_eq!(compute_frame(&c, FrameIndex(0)), Outcome::Rendered);
    assert_eq!(c.state.frames_computed(), 1);
    assert!(c.buffer.take_if_present(FrameIndex(0)).is_some());
}

#[test]
fn uncovered_frames_are_skipped() {
    let c = ctx();
    assert_eq!(
        compute_frame(&c, FrameIndex(5)),
        Outcome::Missing(FrameMiss::Skipped)
    );
    assert_eq!(c.state.missing(5), Some(FrameMiss::Skipped));
    assert_eq!(c.state.frames_computed(), 1);
    assert!(c.buffer.is_empty());
}

#[test]
fn render_errors_and_panics_stay_local() {
    let c = ctx();
    assert_eq!(
        compute_frame(&c, FrameIndex(2)),
        Outcome::Missing(FrameMiss::Failed)
    );
    assert_eq!(
        compute_frame(&c, FrameIndex(3)),
        Outcome::Missing(FrameMiss::Failed)
    );
    // The surface is still usable after the panic.
    assert_eq!(compute_frame(&c, FrameIndex(4)), Outcome::Rendered);

    let snap = c.state.snapshot();
    assert_eq!((snap.computed, snap.failed, snap.rendered), (3, 2, 1));
}

#[test]
fn cancelled_frames_are_not_painted() {
    let c = ctx();
    c.cancel.cancel();
    assert_eq!(
        compute_frame(&c, FrameIndex(0)),
        Outcome::Missing(FrameMiss::Cancelled)
    );
    assert_eq!(c.surface.stats().paints, 0);
}

#[test]
fn task_guard_reports_even_when_the_task_panics() {
    let c = ctx();
    let (tx, rx) = mpsc::channel();
    let state = c.state.clone();
    let res = std::panic::catch_unwind(AssertUnwindSafe(move || {
        let _guard = TaskGuard::new(state, tx, 9);
        panic!("task body blew up");
    }));
    assert!(res.is_err());
    assert_eq!(rx.recv().unwrap(), (9, Outcome::Missing(FrameMiss::Failed)));
    assert_eq!(c.state.in_flight(), 0);
}
