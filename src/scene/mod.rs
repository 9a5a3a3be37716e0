//! Timed scene sequence.
//!
//! Scenes are contiguous by construction: the [`Timeline`](timeline::Timeline) owns start times and
//! recomputes them on every mutation. The render pipeline only sees the read-only
//! [`SceneSequence`](timeline::SceneSequence) boundary.

/// Bubble-sort walkthrough content generator.
pub mod bubble_sort;
/// Scene entity and content kinds.
pub mod model;
/// Ordered scene list and the lookup-by-time boundary.
pub mod timeline;
