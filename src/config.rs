//! Video, audio, theme and narration configuration.
//!
//! Everything is `serde(default)` so a JSON config file only needs the fields it overrides.

use crate::encode::sink::VideoCodec;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{CastError, CastResult};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Output resolution preset. Each preset implies a frame rate and a default bitrate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Resolution {
    /// 1920x1080 at 30 fps.
    #[serde(rename = "1080p30")]
    Hd1080p30,
    /// 1920x1080 at 60 fps.
    #[serde(rename = "1080p60")]
    Hd1080p60,
    /// 3840x2160 at 60 fps.
    #[serde(rename = "4k60")]
    Uhd4k,
    /// 7680x4320 at 60 fps.
    #[serde(rename = "8k60")]
    Uhd8k,
}

impl Resolution {
    /// Canvas size for this preset.
    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            Self::Hd1080p30 | Self::Hd1080p60 => (1920, 1080),
            Self::Uhd4k => (3840, 2160),
            Self::Uhd8k => (7680, 4320),
        };
        Canvas { width, height }
    }

    /// Frame rate implied by the preset.
    pub fn fps(self) -> u32 {
        match self {
            Self::Hd1080p30 => 30,
            Self::Hd1080p60 | Self::Uhd4k | Self::Uhd8k => 60,
        }
    }

    /// Default video bitrate in kbps.
    pub fn default_bitrate_kbps(self) -> u32 {
        match self {
            Self::Hd1080p30 => 8_000,
            Self::Hd1080p60 => 12_000,
            Self::Uhd4k => 45_000,
            Self::Uhd8k => 85_000,
        }
    }

    /// Short display name, also accepted by [`Resolution::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Hd1080p30 => "1080p30",
            Self::Hd1080p60 => "1080p60",
            Self::Uhd4k => "4k60",
            Self::Uhd8k => "8k60",
        }
    }

    /// Parse a preset name (case-insensitive).
    pub fn from_name(name: &str) -> CastResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "1080p30" | "fast" => Ok(Self::Hd1080p30),
            "1080p60" | "1080p" => Ok(Self::Hd1080p60),
            "4k60" | "4k" => Ok(Self::Uhd4k),
            "8k60" | "8k" => Ok(Self::Uhd8k),
            other => Err(CastError::validation(format!(
                "unknown resolution preset '{other}'"
            ))),
        }
    }
}

/// Narration audio format and encoded bitrate.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// AAC bitrate in kbps used when muxing.
    pub bitrate_kbps: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            bitrate_kbps: 320,
        }
    }
}

/// Colors used by the built-in scene renderers.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Surface clear color.
    pub background: Rgba8,
    /// Text blocks.
    pub text: Rgba8,
    /// Bars and accents.
    pub primary: Rgba8,
    /// Highlighted bars.
    pub highlight: Rgba8,
    /// Code panel fill.
    pub panel: Rgba8,
    /// Font file for all text. An installed sans-serif font is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba8::WHITE,
            text: Rgba8::BLACK,
            primary: Rgba8::rgb(0x21, 0x96, 0xF3),
            highlight: Rgba8::rgb(0xFF, 0xD7, 0x00),
            panel: Rgba8::rgb(0xF4, 0xF4, 0xF4),
            font: None,
        }
    }
}

/// Narration source selection.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    /// Provider name (`silent`).
    pub provider: String,
    /// Stretch or shrink narrated scenes to the length of their synthesized clip.
    pub align_durations: bool,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            provider: "silent".to_owned(),
            align_durations: false,
        }
    }
}

/// Top-level output configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Resolution preset.
    pub resolution: Resolution,
    /// Integer frame rate.
    pub fps: u32,
    /// Video codec.
    pub codec: VideoCodec,
    /// Video bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Container format passed to the encoder (`mp4`, `mkv`, ...).
    pub container: String,
    /// Narration audio settings.
    pub audio: AudioSettings,
    /// Renderer colors.
    pub theme: Theme,
    /// Narration source.
    pub narration: NarrationSettings,
    /// Final output directory.
    pub output_dir: PathBuf,
    /// Scratch directory for the intermediate video and audio.
    pub temp_dir: PathBuf,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self::with_resolution(Resolution::Uhd4k)
    }
}

impl VideoConfig {
    /// Config for `resolution` with its preset frame rate and bitrate.
    pub fn with_resolution(resolution: Resolution) -> Self {
        Self {
            resolution,
            fps: resolution.fps(),
            codec: VideoCodec::Hevc,
            bitrate_kbps: resolution.default_bitrate_kbps(),
            container: "mp4".to_owned(),
            audio: AudioSettings::default(),
            theme: Theme::default(),
            narration: NarrationSettings::default(),
            output_dir: PathBuf::from("output"),
            temp_dir: PathBuf::from("temp"),
        }
    }

    /// Switch preset and re-derive frame rate and bitrate from it.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
        self.fps = resolution.fps();
        self.bitrate_kbps = resolution.default_bitrate_kbps();
    }

    /// Parse a config from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> CastResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| CastError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CastResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CastError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check values the encoder cannot accept.
    pub fn validate(&self) -> CastResult<()> {
        if self.fps == 0 {
            return Err(CastError::validation("fps must be > 0"));
        }
        if self.bitrate_kbps == 0 {
            return Err(CastError::validation("bitrate_kbps must be > 0"));
        }
        if self.container.trim().is_empty() {
            return Err(CastError::validation("container must be non-empty"));
        }
        if self.audio.sample_rate == 0 || self.audio.channels == 0 {
            return Err(CastError::validation(
                "audio sample_rate and channels must be > 0",
            ));
        }
        Ok(())
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.resolution.canvas()
    }

    /// Output frame rate.
    pub fn frame_rate(&self) -> CastResult<Fps> {
        Fps::integer(self.fps)
    }
}

impl std::fmt::Display for VideoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VideoConfig{{resolution={}, fps={}, codec={}, bitrate={} kbps}}",
            self.resolution.name(),
            self.fps,
            self.codec.name(),
            self.bitrate_kbps
        )
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
