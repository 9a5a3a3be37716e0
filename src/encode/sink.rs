use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CastError, CastResult};
use crate::render::backend::FrameRGBA;
use std::path::PathBuf;

/// Video codec selectable by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    /// H.264 through `libx264`.
    #[default]
    H264,
    /// H.265 through `libx265`.
    Hevc,
}

impl VideoCodec {
    /// Parse a codec name. Unknown names fall back to H.264.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "hevc" | "h265" | "x265" | "libx265" => Self::Hevc,
            "h264" | "x264" | "libx264" | "avc" => Self::H264,
            other => {
                tracing::warn!(codec = other, "unknown codec name, falling back to h264");
                Self::H264
            }
        }
    }

    /// Canonical short name.
    pub fn name(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::Hevc => "hevc",
        }
    }

    /// `ffmpeg` encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::Hevc => "libx265",
        }
    }
}

impl serde::Serialize for VideoCodec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for VideoCodec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_name(&s))
    }
}

/// Configuration provided to a [`FrameSink`] before any frame is pushed.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Target video bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Video codec.
    pub codec: VideoCodec,
    /// Container format (`mp4`, `mkv`, ...).
    pub container: String,
    /// Keyframe interval in frames.
    pub gop: u32,
    /// Optional raw PCM audio input muxed while encoding.
    pub audio: Option<AudioInputConfig>,
}

impl SinkConfig {
    /// Config with GOP equal to one second of frames and no audio.
    pub fn new(width: u32, height: u32, fps: Fps, bitrate_kbps: u32, codec: VideoCodec) -> Self {
        Self {
            width,
            height,
            fps,
            bitrate_kbps,
            codec,
            container: "mp4".to_owned(),
            gop: fps.frames_per_sec_ceil().max(1) as u32,
            audio: None,
        }
    }

    /// Check the values every sink relies on.
    pub fn validate(&self) -> CastResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(CastError::validation("fps must be non-zero"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(CastError::validation("sink width/height must be non-zero"));
        }
        if self.bitrate_kbps == 0 {
            return Err(CastError::validation("sink bitrate must be non-zero"));
        }
        if self.gop == 0 {
            return Err(CastError::validation("sink gop must be non-zero"));
        }
        Ok(())
    }
}

/// Raw PCM audio input for sinks that mux audio while encoding.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Consumer of rendered frames in presentation order.
///
/// `push_frame` is called with strictly increasing, contiguous `FrameIndex` values starting at 0.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> CastResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CastResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> CastResult<()>;
    /// Release resources after a fatal pipeline error. `end` is not called in that case.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// `true` once `abort` was called.
    pub fn aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> CastResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CastResult<()> {
        if self.cfg.is_none() {
            return Err(CastError::encode("in-memory sink not started"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> CastResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
