use crate::foundation::core::{Fps, FrameIndex};
use crate::pipeline::buffer::ReorderBuffer;
use crate::pipeline::state::{FrameMiss, PipelineState};
use crate::render::plan::plan_frame;
use crate::render::shared::SharedSurface;
use crate::scene::timeline::SceneSequence;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

/// Cooperative cancellation flag shared by the driver and compute tasks.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// `true` once cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a compute task reads. Shared by `Arc` across the pool.
pub(crate) struct ComputeCtx {
    pub(crate) seq: Arc<dyn SceneSequence>,
    pub(crate) surface: Arc<SharedSurface>,
    pub(crate) buffer: Arc<ReorderBuffer>,
    pub(crate) state: Arc<PipelineState>,
    pub(crate) fps: Fps,
    pub(crate) transition_window: f64,
    pub(crate) cancel: CancelToken,
}

/// How one compute task resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Rendered,
    Missing(FrameMiss),
}

/// Decrements the in-flight count and reports the outcome on drop, panics included.
pub(crate) struct TaskGuard {
    state: Arc<PipelineState>,
    done: Sender<(u64, Outcome)>,
    idx: u64,
    outcome: Outcome,
}

impl TaskGuard {
    pub(crate) fn new(
        state: Arc<PipelineState>,
        done: Sender<(u64, Outcome)>,
        idx: u64,
    ) -> Self {
        state.task_started();
        Self {
            state,
            done,
            idx,
            outcome: Outcome::Missing(FrameMiss::Failed),
        }
    }

    pub(crate) fn finish(&mut self, outcome: Outcome) {
        self.outcome = outcome;
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.state.task_finished();
        // The driver may have stopped listening after a fatal error.
        let _ = self.done.send((self.idx, self.outcome));
    }
}

/// Resolve frame `idx`: plan it, draw it through the shared surface, park the raster.
///
/// Failures stay local to the frame: they are logged and recorded as missing.
pub(crate) fn compute_frame(ctx: &ComputeCtx, idx: FrameIndex) -> Outcome {
    if ctx.cancel.is_cancelled() {
        return missing(ctx, idx, FrameMiss::Cancelled);
    }

    let Some(req) = plan_frame(ctx.seq.as_ref(), idx, ctx.fps, ctx.transition_window) else {
        tracing::debug!(frame = idx.0, "no scene covers frame; skipping");
        return missing(ctx, idx, FrameMiss::Skipped);
    };

    match catch_unwind(AssertUnwindSafe(|| ctx.surface.render(&req))) {
        Ok(Ok(image)) => {
            ctx.state.record_rendered();
            if let Err(e) = ctx.buffer.put(idx, image) {
                tracing::error!(frame = idx.0, "{e}");
            }
            Outcome::Rendered
        }
        Ok(Err(e)) => {
            tracing::warn!(
                frame = idx.0,
                scene = %req.paint.scene().id,
                "frame render failed: {e}"
            );
            missing(ctx, idx, FrameMiss::Failed)
        }
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_owned());
            tracing::warn!(
                frame = idx.0,
                scene = %req.paint.scene().id,
                "frame render panicked: {msg}"
            );
            missing(ctx, idx, FrameMiss::Failed)
        }
    }
}

fn missing(ctx: &ComputeCtx, idx: FrameIndex, miss: FrameMiss) -> Outcome {
    ctx.state.mark_missing(idx.0, miss);
    Outcome::Missing(miss)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/compute.rs"]
mod tests;
