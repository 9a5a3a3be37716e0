use super::*;
use crate::encode::sink::{InMemorySink, VideoCodec};
use crate::foundation::core::{Canvas, Fps};
use crate::render::backend::{FrameRGBA, PaintRequest, RenderSurface};
use crate::scene::model::{Scene, SceneKind};
use crate::scene::timeline::Timeline;

const CANVAS: Canvas = Canvas {
    width: 2,
    height: 2,
};

struct Solid;

impl RenderSurface for Solid {
    fn canvas(&self) -> Canvas {
        CANVAS
    }

    fn paint(&mut self, _req: &PaintRequest<'_>) -> CastResult<()> {
        Ok(())
    }

    fn capture(&mut self) -> CastResult<FrameRGBA> {
        Ok(FrameRGBA::solid(CANVAS, [9, 9, 9, 255]))
    }
}

fn sink_cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig::new(w, h, Fps::integer(10).unwrap(), 100, VideoCodec::H264)
}

fn timeline(secs: f64) -> Arc<dyn SceneSequence> {
    let mut tl = Timeline::new("t");
    tl.add_scene(Scene::new(SceneKind::TitleSlide, secs)).unwrap();
    Arc::new(tl)
}

fn small_opts() -> PipelineOpts {
    PipelineOpts {
        threads: Some(2),
        batch_size: Some(4),
        drain_poll: Duration::from_millis(1),
        ..PipelineOpts::default()
    }
}

#[test]
fn writer_error_wins_unless_it_only_saw_the_abort() {
    let w = prefer_writer_error(
        Err(CastError::MissingFrame { index: 3 }),
        Err(CastError::pipeline("aborted")),
    );
    assert!(matches!(w, Err(CastError::MissingFrame { index: 3 })));

    let d = prefer_writer_error(Err(CastError::Cancelled), Err(CastError::pipeline("aborted")));
    assert!(matches!(d, Err(CastError::Pipeline(_))));

    assert!(prefer_writer_error(Ok(()), Ok(())).is_ok());
    assert!(matches!(
        prefer_writer_error(Ok(()), Err(CastError::Cancelled)),
        Err(CastError::Cancelled)
    ));
}

#[test]
fn thread_pool_requires_a_thread() {
    assert!(build_thread_pool(0).is_err());
    assert_eq!(build_thread_pool(3).unwrap().current_num_threads(), 3);
}

#[test]
fn pipeline_runs_once() {
    let mut p = FramePipeline::new(small_opts(), sink_cfg(2, 2)).unwrap();
    assert_eq!(p.phase(), PipelinePhase::Idle);
    let surface = SharedSurface::init(Solid);
    let mut sink = InMemorySink::new();

    let stats = p.run(timeline(1.0), surface.clone(), &mut sink).unwrap();
    assert_eq!(stats.frames_written, 10);
    assert_eq!(p.phase(), PipelinePhase::Closed);
    assert!(sink.ended());

    let again = p.run(timeline(1.0), surface, &mut InMemorySink::new());
    assert!(matches!(again, Err(CastError::Pipeline(_))));
}

#[test]
fn surface_and_sink_dimensions_must_match() {
    let mut p = FramePipeline::new(small_opts(), sink_cfg(4, 4)).unwrap();
    let mut sink = InMemorySink::new();
    let err = p
        .run(timeline(1.0), SharedSurface::init(Solid), &mut sink)
        .unwrap_err();
    assert!(matches!(err, CastError::Validation(_)));
    assert!(sink.config().is_none());
    assert_eq!(p.phase(), PipelinePhase::Idle);
}

#[test]
fn shut_down_surface_is_rejected() {
    let surface = SharedSurface::init(Solid);
    assert!(surface.shutdown().is_some());
    let mut p = FramePipeline::new(small_opts(), sink_cfg(2, 2)).unwrap();
    let err = p.run(timeline(1.0), surface, &mut InMemorySink::new()).unwrap_err();
    assert!(matches!(err, CastError::Pipeline(_)));
}

#[test]
fn empty_timeline_is_a_validation_error() {
    let mut p = FramePipeline::new(small_opts(), sink_cfg(2, 2)).unwrap();
    let empty: Arc<dyn SceneSequence> = Arc::new(Timeline::new("empty"));
    let err = p
        .run(empty, SharedSurface::init(Solid), &mut InMemorySink::new())
        .unwrap_err();
    assert!(matches!(err, CastError::Validation(_)));
}

#[test]
fn invalid_opts_are_rejected_up_front() {
    let opts = PipelineOpts {
        batch_size: Some(0),
        ..PipelineOpts::default()
    };
    assert!(FramePipeline::new(opts, sink_cfg(2, 2)).is_err());
}
