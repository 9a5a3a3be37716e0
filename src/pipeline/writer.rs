use crate::encode::sink::FrameSink;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{CastError, CastResult};
use crate::pipeline::buffer::ReorderBuffer;
use crate::pipeline::opts::{MissingFramePolicy, PipelineOpts};
use crate::pipeline::state::PipelineState;
use crate::render::backend::FrameRGBA;
use std::time::Instant;

/// Inputs of the ordered writer loop.
pub(crate) struct WriterCtx<'a> {
    pub(crate) state: &'a PipelineState,
    pub(crate) buffer: &'a ReorderBuffer,
    pub(crate) opts: &'a PipelineOpts,
    pub(crate) fps: Fps,
    pub(crate) canvas: Canvas,
    /// Premultiplied fill used when the very first frame has to be repeated.
    pub(crate) background: [u8; 4],
}

/// Feed the sink in strict index order until every frame is written.
///
/// Polls the reorder buffer for the next expected index and sleeps `writer_poll` when it is
/// absent. Returns early when the state is aborted or a fatal condition is hit.
pub(crate) fn run_writer(ctx: &WriterCtx<'_>, sink: &mut dyn FrameSink) -> CastResult<()> {
    let total = ctx.state.total();
    let started = Instant::now();
    let progress_every = ctx.opts.progress_every_frames(ctx.fps);
    let mut last: Option<FrameRGBA> = None;
    let mut waiting_since: Option<Instant> = None;
    let mut stall_logged = false;

    while ctx.state.frames_written() < total {
        if ctx.state.is_aborted() {
            return Err(CastError::Cancelled);
        }
        let next = ctx.state.frames_written();
        let idx = FrameIndex(next);

        if let Some(rendered) = ctx.buffer.take_if_present(idx) {
            sink.push_frame(rendered.idx, &rendered.image)?;
            ctx.buffer.retire_below(FrameIndex(next + 1));
            ctx.state.advance_written(false);
            last = Some(rendered.image);
            waiting_since = None;
            stall_logged = false;
            maybe_log_progress(ctx, next + 1, progress_every, started);
            continue;
        }

        if let Some(miss) = ctx.state.missing(next) {
            match ctx.opts.missing_frame_policy {
                MissingFramePolicy::RepeatPrevious => {
                    let fill = last
                        .take()
                        .unwrap_or_else(|| FrameRGBA::solid(ctx.canvas, ctx.background));
                    tracing::warn!(
                        frame = next,
                        ?miss,
                        "frame missing; repeating previous frame"
                    );
                    sink.push_frame(idx, &fill)?;
                    ctx.state.clear_missing(next);
                    ctx.buffer.retire_below(FrameIndex(next + 1));
                    ctx.state.advance_written(true);
                    last = Some(fill);
                    waiting_since = None;
                    maybe_log_progress(ctx, next + 1, progress_every, started);
                    continue;
                }
                MissingFramePolicy::Fail => {
                    tracing::error!(frame = next, ?miss, "frame missing; failing run");
                    return Err(CastError::MissingFrame { index: next });
                }
                MissingFramePolicy::Stall => {
                    if !stall_logged {
                        tracing::warn!(frame = next, ?miss, "frame missing; writer stalled");
                        stall_logged = true;
                    }
                }
            }
        }

        let since = *waiting_since.get_or_insert_with(Instant::now);
        if let Some(limit) = ctx.opts.stall_timeout {
            let waited = since.elapsed();
            if waited > limit {
                let waited_ms = waited.as_millis().min(u128::from(u64::MAX)) as u64;
                tracing::error!(frame = next, waited_ms, "writer stalled");
                return Err(CastError::Stalled {
                    index: next,
                    waited_ms,
                });
            }
        }
        std::thread::sleep(ctx.opts.writer_poll);
    }

    log_progress(ctx, total, started);
    Ok(())
}

fn maybe_log_progress(ctx: &WriterCtx<'_>, written: u64, every: u64, started: Instant) {
    if written.is_multiple_of(every) && written < ctx.state.total() {
        log_progress(ctx, written, started);
    }
}

fn log_progress(ctx: &WriterCtx<'_>, written: u64, started: Instant) {
    let total = ctx.state.total();
    let frame_secs = ctx.fps.frame_duration_secs();
    let written_secs = written as f64 * frame_secs;
    let elapsed = started.elapsed().as_secs_f64();
    let speed = if elapsed > 0.0 {
        written_secs / elapsed
    } else {
        0.0
    };
    let percent = if total == 0 {
        100.0
    } else {
        written as f64 * 100.0 / total as f64
    };
    tracing::info!(
        written_secs = format_args!("{written_secs:.1}"),
        total_secs = format_args!("{:.1}", total as f64 * frame_secs),
        percent = format_args!("{percent:.1}"),
        computed = ctx.state.frames_computed(),
        total_frames = total,
        elapsed_secs = format_args!("{elapsed:.1}"),
        speed = format_args!("{speed:.2}x"),
        "render progress"
    );
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/writer.rs"]
mod tests;
