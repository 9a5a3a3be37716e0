//! Streaming encoders and the final audio/video merge.
//!
//! Sinks consume rendered frames in presentation order and are driven by
//! [`crate::pipeline::FramePipeline::run`].

/// `ffmpeg`-based streaming sink.
pub mod ffmpeg;
/// Audio/video merge through `ffmpeg`.
pub mod mux;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
