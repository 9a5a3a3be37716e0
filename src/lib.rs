//! Scenecast renders narrated slideshow videos.
//!
//! A [`Timeline`] of timed scenes is rendered frame by frame on a CPU pool, written in order to
//! a streaming `ffmpeg` encoder, and merged with a narration track:
//!
//! - Load or build a [`Timeline`]
//! - Run a [`FramePipeline`] against a [`SharedSurface`] and a [`FrameSink`]
//! - Or let [`VideoGenerator`] do narration, rendering and muxing end to end
#![forbid(unsafe_code)]

/// Output, audio, theme and narration settings.
pub mod config;
/// Streaming encoders and muxing.
pub mod encode;
/// Core primitives and errors.
pub mod foundation;
/// End-to-end generation.
pub mod generator;
/// Narration providers and tracks.
pub mod narration;
/// Parallel render, ordered write.
pub mod pipeline;
/// Render surfaces and scene renderers.
pub mod render;
/// Scenes and timelines.
pub mod scene;

pub use crate::config::{Resolution, Theme, VideoConfig};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, VideoCodec};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8};
pub use crate::foundation::error::{CastError, CastResult};
pub use crate::generator::{GeneratedVideo, VideoGenerator};
pub use crate::pipeline::{FramePipeline, MissingFramePolicy, PipelineOpts, RenderStats};
pub use crate::render::backend::{FrameRGBA, RenderSurface};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::shared::SharedSurface;
pub use crate::render::text::TextLayoutEngine;
pub use crate::scene::model::{Scene, SceneKind};
pub use crate::scene::timeline::{SceneSequence, Timeline};
