//! Parallel frame rendering with ordered, batch-bounded encoding.
//!
//! Frames for one batch are computed on a rayon pool, drawn one at a time through the
//! [`SharedSurface`](crate::render::shared::SharedSurface), parked in a [`ReorderBuffer`], and
//! written to the sink strictly in index order by a single writer thread. The driver does not
//! dispatch batch `k + 1` until the writer has drained batch `k`.

/// Reordering frame buffer.
pub mod buffer;
/// Per-frame compute task and cancellation.
pub mod compute;
/// Batch driver.
pub mod driver;
/// Runtime options.
pub mod opts;
/// Shared counters and lifecycle phase.
pub mod state;
/// Ordered writer loop.
pub mod writer;

pub use buffer::ReorderBuffer;
pub use compute::CancelToken;
pub use driver::{BatchReport, FramePipeline, RenderStats};
pub use opts::{MissingFramePolicy, PipelineOpts};
pub use state::{FrameMiss, PipelinePhase, PipelineState, StateSnapshot};
