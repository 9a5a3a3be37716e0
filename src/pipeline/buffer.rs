use crate::foundation::core::FrameIndex;
use crate::foundation::error::{CastError, CastResult};
use crate::render::backend::{FrameRGBA, RenderedFrame};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Completed frames waiting for the ordered writer.
///
/// Many compute tasks insert concurrently; the single writer removes entries in index order.
/// Indices below the writer's position are retired and can never be inserted again.
#[derive(Debug, Default)]
pub struct ReorderBuffer {
    frames: DashMap<u64, RenderedFrame>,
    peak: AtomicUsize,
    retired_below: AtomicU64,
}

impl ReorderBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `frame` under `idx`. A second insert for the same index replaces the first.
    pub fn put(&self, idx: FrameIndex, frame: FrameRGBA) -> CastResult<()> {
        if idx.0 < self.retired_below.load(Ordering::Acquire) {
            return Err(CastError::pipeline(format!(
                "frame {} was already written and cannot be buffered again",
                idx.0
            )));
        }
        if self
            .frames
            .insert(idx.0, RenderedFrame { idx, image: frame })
            .is_some()
        {
            tracing::warn!(frame = idx.0, "reorder buffer entry replaced");
        }
        // The writer may already have taken the entry; the map is the only count.
        self.peak.fetch_max(self.frames.len(), Ordering::AcqRel);
        Ok(())
    }

    /// Remove and return the frame for `idx`, if present.
    pub fn take_if_present(&self, idx: FrameIndex) -> Option<RenderedFrame> {
        self.frames.remove(&idx.0).map(|(_, frame)| frame)
    }

    /// Mark every index below `idx` as written.
    pub(crate) fn retire_below(&self, idx: FrameIndex) {
        self.retired_below.fetch_max(idx.0, Ordering::AcqRel);
    }

    /// Entries currently parked.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when nothing is parked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest number of entries parked at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/buffer.rs"]
mod tests;
