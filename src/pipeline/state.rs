use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Lifecycle of one pipeline run. `Closed` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelinePhase {
    /// Created, nothing dispatched.
    #[default]
    Idle,
    /// Batch loop running.
    Encoding,
    /// All batches dispatched; writer catching up and encoder finishing.
    Draining,
    /// Finished, failed or cancelled.
    Closed,
}

/// Why a frame index resolved without a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameMiss {
    /// No scene covers the frame's time.
    Skipped,
    /// The render surface returned an error or panicked.
    Failed,
    /// The run was cancelled before the frame was computed.
    Cancelled,
}

/// Counters shared by compute tasks, the writer and the driver.
///
/// `frames_computed` counts every resolved compute attempt and is bumped before the frame is
/// parked or marked missing, so `frames_written <= frames_computed <= total` always holds.
#[derive(Debug)]
pub struct PipelineState {
    total: u64,
    computed: AtomicU64,
    rendered: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
    written: AtomicU64,
    repeated: AtomicU64,
    in_flight: AtomicU64,
    aborted: AtomicBool,
    missing: DashMap<u64, FrameMiss>,
}

/// Point-in-time copy of the counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Frames in the run.
    pub total: u64,
    /// Resolved compute attempts.
    pub computed: u64,
    /// Frames that produced a raster.
    pub rendered: u64,
    /// Frames with no covering scene.
    pub skipped: u64,
    /// Frames whose render failed.
    pub failed: u64,
    /// Frames cancelled before compute.
    pub cancelled: u64,
    /// Frames handed to the sink.
    pub written: u64,
    /// Written frames that repeated an earlier raster.
    pub repeated: u64,
}

impl PipelineState {
    /// Zeroed state for `total` frames.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            computed: AtomicU64::new(0),
            rendered: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
            written: AtomicU64::new(0),
            repeated: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            aborted: AtomicBool::new(false),
            missing: DashMap::new(),
        }
    }

    /// Frames in the run.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Resolved compute attempts.
    pub fn frames_computed(&self) -> u64 {
        self.computed.load(Ordering::Acquire)
    }

    /// Frames handed to the sink; also the next index the writer expects.
    pub fn frames_written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// `true` once every frame was written.
    pub fn is_complete(&self) -> bool {
        self.frames_written() >= self.total
    }

    pub(crate) fn record_rendered(&self) {
        self.computed.fetch_add(1, Ordering::AcqRel);
        self.rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn mark_missing(&self, idx: u64, miss: FrameMiss) {
        self.computed.fetch_add(1, Ordering::AcqRel);
        let counter = match miss {
            FrameMiss::Skipped => &self.skipped,
            FrameMiss::Failed => &self.failed,
            FrameMiss::Cancelled => &self.cancelled,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.missing.insert(idx, miss);
    }

    /// Why `idx` has no raster, if it resolved without one.
    pub fn missing(&self, idx: u64) -> Option<FrameMiss> {
        self.missing.get(&idx).map(|m| *m)
    }

    pub(crate) fn clear_missing(&self, idx: u64) {
        self.missing.remove(&idx);
    }

    pub(crate) fn advance_written(&self, repeated: bool) {
        if repeated {
            self.repeated.fetch_add(1, Ordering::Relaxed);
        }
        self.written.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn task_started(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn task_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    /// Compute tasks dispatched but not yet finished.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Ask the writer and driver to stop.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    /// `true` after [`PipelineState::abort`].
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Copy the counters.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            total: self.total,
            computed: self.frames_computed(),
            rendered: self.rendered.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            written: self.frames_written(),
            repeated: self.repeated.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/state.rs"]
mod tests;
