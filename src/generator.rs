//! End-to-end video generation: narration, frame rendering, final merge.

use crate::config::VideoConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::mux::merge_audio_video;
use crate::encode::sink::{AudioInputConfig, SinkConfig};
use crate::foundation::error::{CastError, CastResult};
use crate::narration::{build_narration_track, provider_by_name, write_f32le};
use crate::pipeline::{FramePipeline, PipelineOpts, RenderStats};
use crate::render::cpu::CpuSurface;
use crate::render::shared::SharedSurface;
use crate::scene::timeline::{SceneSequence, Timeline};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Turns a [`Timeline`] into a finished video file under the configured output directory.
#[derive(Clone, Debug)]
pub struct VideoGenerator {
    config: VideoConfig,
    opts: PipelineOpts,
    narration: bool,
}

/// Result of [`VideoGenerator::generate`].
#[derive(Clone, Debug)]
pub struct GeneratedVideo {
    /// Final muxed file.
    pub path: PathBuf,
    /// Frame pipeline statistics.
    pub stats: RenderStats,
    /// Seconds of narration audio merged in (0 when none).
    pub narration_secs: f64,
}

impl VideoGenerator {
    pub fn new(config: VideoConfig, opts: PipelineOpts) -> CastResult<Self> {
        config.validate()?;
        opts.validate()?;
        Ok(Self {
            config,
            opts,
            narration: true,
        })
    }

    /// Skip narration synthesis; the output carries video only.
    pub fn without_narration(mut self) -> Self {
        self.narration = false;
        self
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    /// Render `timeline` to `<output_dir>/<file_name>` and return the output path.
    ///
    /// With narration alignment enabled the timeline is retimed in place before rendering.
    pub fn generate(&self, timeline: &mut Timeline, file_name: &str) -> CastResult<PathBuf> {
        self.generate_with_stats(timeline, file_name).map(|v| v.path)
    }

    /// Same as [`VideoGenerator::generate`], also returning pipeline statistics.
    #[tracing::instrument(skip_all, fields(title = timeline.title(), file = file_name))]
    pub fn generate_with_stats(
        &self,
        timeline: &mut Timeline,
        file_name: &str,
    ) -> CastResult<GeneratedVideo> {
        if timeline.is_empty() {
            return Err(CastError::validation("timeline has no scenes"));
        }
        let file_name = file_name.trim();
        if file_name.is_empty() || Path::new(file_name).file_name().is_none() {
            return Err(CastError::validation(format!(
                "invalid output file name '{file_name}'"
            )));
        }
        let cfg = &self.config;
        for dir in [&cfg.output_dir, &cfg.temp_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create directory '{}'", dir.display()))?;
        }
        let stem = unique_stem();
        tracing::info!(config = %cfg, scenes = timeline.len(), "generating video");

        let mut audio_tmp = TempFileGuard(None);
        let mut narration_secs = 0.0;
        let audio = if self.narration {
            let provider = provider_by_name(&cfg.narration.provider);
            let track = build_narration_track(
                timeline,
                provider.as_ref(),
                &cfg.audio,
                cfg.narration.align_durations,
            )?;
            if track.clips.is_empty() {
                tracing::info!("timeline has no narration; rendering video only");
                None
            } else {
                let path = cfg.temp_dir.join(format!("narration_{stem}.f32le"));
                write_f32le(&track.samples, &path)?;
                audio_tmp.0 = Some(path.clone());
                narration_secs = track.duration_secs();
                Some(AudioInputConfig {
                    path,
                    sample_rate: track.sample_rate,
                    channels: track.channels,
                })
            }
        } else {
            None
        };

        let canvas = cfg.canvas();
        let mut sink_cfg = SinkConfig::new(
            canvas.width,
            canvas.height,
            cfg.frame_rate()?,
            cfg.bitrate_kbps,
            cfg.codec,
        );
        sink_cfg.container = cfg.container.clone();

        let video_name = format!("video_{stem}.{}", cfg.container.trim());
        let video_tmp = TempFileGuard(Some(cfg.temp_dir.join(video_name)));
        let video_path = video_tmp.path().to_path_buf();
        let bg = cfg.theme.background;
        let mut sink = FfmpegSink::new(
            FfmpegSinkOpts::new(&video_path).with_background([bg.r, bg.g, bg.b, 255]),
        );
        let mut pipeline =
            FramePipeline::new(self.opts.clone(), sink_cfg)?.with_background(bg.to_premul_bytes());

        let surface = SharedSurface::init(CpuSurface::new(canvas, cfg.theme.clone())?);
        let seq: Arc<dyn SceneSequence> = Arc::new(timeline.clone());
        let rendered = pipeline.run(seq, surface.clone(), &mut sink);
        drop(surface.shutdown());
        let stats = rendered?;

        let out = cfg.output_dir.join(file_name);
        merge_audio_video(&video_path, audio.as_ref(), &out, cfg.audio.bitrate_kbps)?;
        drop(audio_tmp);
        drop(video_tmp);

        tracing::info!(
            out = %out.display(),
            frames = stats.frames_written,
            narration_secs = format_args!("{narration_secs:.1}"),
            "video generated"
        );
        Ok(GeneratedVideo {
            path: out,
            stats,
            narration_secs,
        })
    }
}

fn unique_stem() -> String {
    format!(
        "{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    )
}

/// Removes the wrapped file when dropped, on success and failure alike.
struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    fn path(&self) -> &Path {
        self.0.as_deref().unwrap_or(Path::new(""))
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take()
            && path.exists()
        {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), "failed to remove temp file: {e}");
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/generator.rs"]
mod tests;
