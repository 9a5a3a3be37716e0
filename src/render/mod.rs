//! Scene-to-pixels rendering.
//!
//! - [`plan`] turns a frame index into a [`backend::PaintRequest`] (active scene, transition state)
//! - [`shared::SharedSurface`] serializes every paint-and-capture through one render context
//! - [`cpu::CpuSurface`] is the `vello_cpu` render context
//! - [`kinds::RendererRegistry`] maps each scene kind to its paint routine
//! - [`text::TextLayoutEngine`] shapes titles, narration and code with `parley`

/// Frame types and the render-surface contract.
pub mod backend;
/// CPU render context powered by `vello_cpu`.
pub mod cpu;
/// Per-kind scene renderers.
pub mod kinds;
/// Frame-index to paint-request planning.
pub mod plan;
/// Mutex-guarded singleton surface handle.
pub mod shared;
/// Font loading and text shaping.
pub mod text;
