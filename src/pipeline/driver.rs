use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{CastError, CastResult};
use crate::pipeline::buffer::ReorderBuffer;
use crate::pipeline::compute::{CancelToken, ComputeCtx, Outcome, TaskGuard, compute_frame};
use crate::pipeline::opts::PipelineOpts;
use crate::pipeline::state::{PipelinePhase, PipelineState};
use crate::pipeline::writer::{WriterCtx, run_writer};
use crate::render::plan::total_frames;
use crate::render::shared::{SharedSurface, SurfaceStats};
use crate::scene::timeline::SceneSequence;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

/// What happened to one batch of frame indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    /// Position of the batch in dispatch order.
    pub index: usize,
    /// Frame indices covered by the batch.
    pub range: FrameRange,
    /// `frames_written` observed right before the batch was dispatched.
    pub written_at_dispatch: u64,
    /// Tasks in the batch that produced a raster.
    pub rendered: u64,
    /// Tasks in the batch that resolved without a raster.
    pub missing: u64,
}

/// Summary of one pipeline run.
#[derive(Clone, Debug, Default)]
pub struct RenderStats {
    pub frames_total: u64,
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub frames_failed: u64,
    pub frames_cancelled: u64,
    pub frames_written: u64,
    /// Writes that reused a previous frame (or the blank background) for a missing index.
    pub frames_repeated: u64,
    pub batches: Vec<BatchReport>,
    /// Largest number of frames parked in the reorder buffer at once.
    pub peak_buffered: usize,
    pub elapsed: Duration,
    pub surface: SurfaceStats,
}

/// Batch driver: dispatches frame indices to the compute pool and keeps the ordered writer
/// at most one batch behind.
///
/// A pipeline runs once. Its phase moves `Idle -> Encoding -> Draining -> Closed` and a closed
/// pipeline rejects further runs.
#[derive(Debug)]
pub struct FramePipeline {
    opts: PipelineOpts,
    sink_cfg: SinkConfig,
    background: [u8; 4],
    phase: PipelinePhase,
    cancel: CancelToken,
}

impl FramePipeline {
    /// Validate `opts` and `sink_cfg` and build an idle pipeline.
    pub fn new(opts: PipelineOpts, sink_cfg: SinkConfig) -> CastResult<Self> {
        opts.validate()?;
        sink_cfg.validate()?;
        Ok(Self {
            opts,
            sink_cfg,
            background: [255, 255, 255, 255],
            phase: PipelinePhase::Idle,
            cancel: CancelToken::new(),
        })
    }

    /// Premultiplied RGBA used for a repeated frame when nothing has been written yet.
    pub fn with_background(mut self, premul: [u8; 4]) -> Self {
        self.background = premul;
        self
    }

    /// Handle that cancels a running pipeline from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Render every frame of `seq` through `surface` and stream them to `sink` in order.
    ///
    /// `sink` is opened with the pipeline's [`SinkConfig`] and either ended (success) or aborted
    /// (any fatal error). The surface is left live; the caller owns its shutdown.
    #[tracing::instrument(skip_all, fields(width = self.sink_cfg.width, height = self.sink_cfg.height))]
    pub fn run(
        &mut self,
        seq: Arc<dyn SceneSequence>,
        surface: Arc<SharedSurface>,
        sink: &mut dyn FrameSink,
    ) -> CastResult<RenderStats> {
        if self.phase != PipelinePhase::Idle {
            return Err(CastError::pipeline(format!(
                "pipeline already used (phase {:?}); build a new one",
                self.phase
            )));
        }
        if !surface.is_live() {
            return Err(CastError::pipeline("render surface is not initialized"));
        }
        let canvas = surface.canvas();
        if canvas.width != self.sink_cfg.width || canvas.height != self.sink_cfg.height {
            return Err(CastError::validation(format!(
                "surface is {}x{} but the sink expects {}x{}",
                canvas.width, canvas.height, self.sink_cfg.width, self.sink_cfg.height
            )));
        }

        let fps = self.sink_cfg.fps;
        let total = total_frames(seq.as_ref(), fps);
        if total == 0 {
            return Err(CastError::validation("timeline has no frames to render"));
        }
        let batch_size = self.opts.resolve_batch_size(fps, canvas.rgba8_bytes());
        let threads = self.opts.resolve_threads();
        let pool = build_thread_pool(threads)?;

        sink.begin(self.sink_cfg.clone())?;
        self.phase = PipelinePhase::Encoding;
        let started = Instant::now();
        tracing::info!(
            total_frames = total,
            duration_secs = seq.total_duration(),
            batch_size,
            threads,
            "pipeline started"
        );

        let state = Arc::new(PipelineState::new(total));
        let buffer = Arc::new(ReorderBuffer::new());
        let ctx = Arc::new(ComputeCtx {
            seq,
            surface: surface.clone(),
            buffer: buffer.clone(),
            state: state.clone(),
            fps,
            transition_window: self.opts.transition_window,
            cancel: self.cancel.clone(),
        });
        let batches = FrameRange::new(FrameIndex(0), FrameIndex(total))?.chunks(batch_size);

        let batcher = Batcher {
            opts: &self.opts,
            cancel: &self.cancel,
            pool: &pool,
            ctx: &ctx,
            state: &state,
        };
        let background = self.background;
        let phase = &mut self.phase;
        let (reports, result) = std::thread::scope(|scope| {
            let writer_ctx = WriterCtx {
                state: &state,
                buffer: &buffer,
                opts: batcher.opts,
                fps,
                canvas,
                background,
            };
            let sink_ref: &mut dyn FrameSink = &mut *sink;
            let writer = std::thread::Builder::new()
                .name("scenecast-writer".to_owned())
                .spawn_scoped(scope, move || {
                    let res = run_writer(&writer_ctx, sink_ref);
                    if res.is_err() {
                        writer_ctx.state.abort();
                    }
                    res
                });
            let writer = match writer {
                Ok(h) => h,
                Err(e) => {
                    return (
                        Vec::new(),
                        Err(CastError::pipeline(format!("failed to spawn writer thread: {e}"))),
                    );
                }
            };

            let mut reports = Vec::with_capacity(batches.len());
            let mut driver_res = Ok(());
            for (i, range) in batches.iter().copied().enumerate() {
                match batcher.run_batch(i, range, || writer.is_finished()) {
                    Ok(report) => reports.push(report),
                    Err(e) => {
                        state.abort();
                        driver_res = Err(e);
                        break;
                    }
                }
            }

            *phase = PipelinePhase::Draining;
            let writer_res = writer
                .join()
                .map_err(|_| CastError::pipeline("writer thread panicked"))
                .and_then(|r| r);
            (reports, prefer_writer_error(writer_res, driver_res))
        });

        let snap = state.snapshot();
        if let Err(e) = result {
            self.shutdown_after_error(&state);
            sink.abort();
            self.phase = PipelinePhase::Closed;
            tracing::error!(
                written = snap.written,
                total_frames = total,
                "pipeline failed: {e}"
            );
            return Err(e);
        }

        sink.end()?;
        self.phase = PipelinePhase::Closed;
        let stats = RenderStats {
            frames_total: total,
            frames_rendered: snap.rendered,
            frames_skipped: snap.skipped,
            frames_failed: snap.failed,
            frames_cancelled: snap.cancelled,
            frames_written: snap.written,
            frames_repeated: snap.repeated,
            batches: reports,
            peak_buffered: buffer.peak(),
            elapsed: started.elapsed(),
            surface: surface.stats(),
        };
        tracing::info!(
            frames = stats.frames_written,
            repeated = stats.frames_repeated,
            failed = stats.frames_failed,
            elapsed_secs = format_args!("{:.2}", stats.elapsed.as_secs_f64()),
            "pipeline finished"
        );
        Ok(stats)
    }

    /// Ask queued tasks to stand down and give running ones `shutdown_grace` to finish.
    fn shutdown_after_error(&self, state: &PipelineState) {
        self.cancel.cancel();
        state.abort();
        let deadline = Instant::now() + self.opts.shutdown_grace;
        while state.in_flight() > 0 {
            if Instant::now() >= deadline {
                tracing::warn!(
                    in_flight = state.in_flight(),
                    "shutdown grace elapsed; abandoning running compute tasks"
                );
                return;
            }
            std::thread::sleep(self.opts.drain_poll);
        }
    }
}

/// Borrowed view the driver thread uses to run batches while the writer owns the sink.
struct Batcher<'a> {
    opts: &'a PipelineOpts,
    cancel: &'a CancelToken,
    pool: &'a rayon::ThreadPool,
    ctx: &'a Arc<ComputeCtx>,
    state: &'a PipelineState,
}

impl Batcher<'_> {
    /// Dispatch one batch, wait for its tasks, then wait for the writer to pass its end.
    fn run_batch(
        &self,
        index: usize,
        range: FrameRange,
        writer_done: impl Fn() -> bool,
    ) -> CastResult<BatchReport> {
        self.check_interrupt()?;
        let written_at_dispatch = self.state.frames_written();
        tracing::debug!(
            batch = index,
            start = range.start.0,
            end = range.end.0,
            written_at_dispatch,
            "dispatching batch"
        );

        let (done_tx, done_rx) = mpsc::channel::<(u64, Outcome)>();
        for f in range.start.0..range.end.0 {
            let ctx = self.ctx.clone();
            let mut guard = TaskGuard::new(ctx.state.clone(), done_tx.clone(), f);
            self.pool.spawn(move || {
                let outcome = compute_frame(&ctx, FrameIndex(f));
                guard.finish(outcome);
            });
        }
        drop(done_tx);

        let mut rendered = 0u64;
        let mut missing = 0u64;
        loop {
            match done_rx.recv_timeout(self.opts.drain_poll) {
                Ok((_, Outcome::Rendered)) => rendered += 1,
                Ok((_, Outcome::Missing(_))) => missing += 1,
                Err(RecvTimeoutError::Timeout) => self.check_interrupt()?,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        while self.state.frames_written() < range.end.0 {
            self.check_interrupt()?;
            if writer_done() {
                return Err(CastError::pipeline("writer stopped before draining the batch"));
            }
            std::thread::sleep(self.opts.drain_poll);
        }

        tracing::debug!(batch = index, rendered, missing, "batch drained");
        Ok(BatchReport {
            index,
            range,
            written_at_dispatch,
            rendered,
            missing,
        })
    }

    fn check_interrupt(&self) -> CastResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CastError::Cancelled);
        }
        if self.state.is_aborted() {
            return Err(CastError::pipeline("pipeline aborted"));
        }
        Ok(())
    }
}

/// The writer's error names the frame that broke the run, so it wins over the driver's
/// generic abort unless the writer only saw the abort itself.
fn prefer_writer_error(writer: CastResult<()>, driver: CastResult<()>) -> CastResult<()> {
    match (writer, driver) {
        (Err(CastError::Cancelled), Err(d)) => Err(d),
        (Err(w), _) => Err(w),
        (Ok(()), d) => d,
    }
}

fn build_thread_pool(threads: usize) -> CastResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(CastError::validation("compute pool needs at least one thread"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("scenecast-compute-{i}"))
        .panic_handler(|_| tracing::error!("compute task panicked outside the frame guard"))
        .build()
        .map_err(|e| CastError::pipeline(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/driver.rs"]
mod tests;
