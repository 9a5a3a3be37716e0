use crate::foundation::core::Fps;
use crate::foundation::error::{CastError, CastResult};
use std::time::Duration;

/// What the writer does when the next frame index resolved without a raster
/// (render failure, no covering scene, or cancellation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFramePolicy {
    /// Write the last written frame again (a background frame if nothing was written yet).
    #[default]
    RepeatPrevious,
    /// Abort the pipeline with [`CastError::MissingFrame`].
    Fail,
    /// Keep waiting for the frame. Only `stall_timeout` ends the wait.
    Stall,
}

impl MissingFramePolicy {
    /// Parse `repeat`, `fail` or `stall`.
    pub fn from_name(name: &str) -> CastResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "repeat" | "repeat_previous" => Ok(Self::RepeatPrevious),
            "fail" => Ok(Self::Fail),
            "stall" => Ok(Self::Stall),
            other => Err(CastError::validation(format!(
                "unknown missing-frame policy '{other}' (expected repeat, fail or stall)"
            ))),
        }
    }
}

/// Runtime knobs for [`FramePipeline`](crate::pipeline::FramePipeline).
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Compute pool size. `None` uses `threads_per_core * available_parallelism`.
    pub threads: Option<usize>,
    /// Pool size multiplier when `threads` is unset.
    pub threads_per_core: usize,
    /// Frames per batch. `None` uses `max(2 * fps, 120)`.
    pub batch_size: Option<u64>,
    /// Upper bound on raster bytes a batch may park in the reorder buffer.
    pub max_buffered_bytes: u64,
    /// Writer sleep while the next frame is absent.
    pub writer_poll: Duration,
    /// Driver sleep while waiting for the writer to drain a batch.
    pub drain_poll: Duration,
    /// Handling of frames that resolve without a raster.
    pub missing_frame_policy: MissingFramePolicy,
    /// Longest the writer may wait on one index before the run fails. `None` waits forever.
    pub stall_timeout: Option<Duration>,
    /// How long shutdown waits for in-flight compute tasks before abandoning them.
    pub shutdown_grace: Duration,
    /// Progress log cadence in seconds of output.
    pub progress_every_secs: f64,
    /// Transition window as a fraction of the incoming scene's duration.
    pub transition_window: f64,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            threads: None,
            threads_per_core: 4,
            batch_size: None,
            max_buffered_bytes: 1 << 30,
            writer_poll: Duration::from_millis(1),
            drain_poll: Duration::from_millis(10),
            missing_frame_policy: MissingFramePolicy::RepeatPrevious,
            stall_timeout: Some(Duration::from_secs(60)),
            shutdown_grace: Duration::from_secs(60),
            progress_every_secs: 3.0,
            transition_window: 0.2,
        }
    }
}

impl PipelineOpts {
    /// Reject values the driver cannot work with.
    pub fn validate(&self) -> CastResult<()> {
        if self.threads == Some(0) {
            return Err(CastError::validation("threads must be >= 1 when set"));
        }
        if self.threads.is_none() && self.threads_per_core == 0 {
            return Err(CastError::validation("threads_per_core must be >= 1"));
        }
        if self.batch_size == Some(0) {
            return Err(CastError::validation("batch_size must be >= 1 when set"));
        }
        if !(0.0..=1.0).contains(&self.transition_window) {
            return Err(CastError::validation(
                "transition_window must be within [0, 1]",
            ));
        }
        if !self.progress_every_secs.is_finite() || self.progress_every_secs <= 0.0 {
            return Err(CastError::validation("progress_every_secs must be > 0"));
        }
        Ok(())
    }

    /// Effective compute pool size.
    pub fn resolve_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            cores.saturating_mul(self.threads_per_core).max(1)
        })
    }

    /// Effective batch size for `fps` and a raster of `frame_bytes` bytes.
    ///
    /// The memory bound wins over the requested size.
    pub fn resolve_batch_size(&self, fps: Fps, frame_bytes: u64) -> u64 {
        let wanted = self
            .batch_size
            .unwrap_or_else(|| (2 * fps.frames_per_sec_ceil()).max(120))
            .max(1);
        let by_mem = (self.max_buffered_bytes / frame_bytes.max(1)).max(1);
        if by_mem < wanted {
            tracing::warn!(
                wanted,
                by_mem,
                "batch size clamped by max_buffered_bytes"
            );
        }
        wanted.min(by_mem)
    }

    /// Frames between progress log lines.
    pub fn progress_every_frames(&self, fps: Fps) -> u64 {
        ((self.progress_every_secs * fps.as_f64()).ceil() as u64).max(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/opts.rs"]
mod tests;
