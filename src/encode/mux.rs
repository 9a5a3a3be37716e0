//! Final audio/video merge.
//!
//! The encoded video stream is copied untouched; narration PCM is encoded to AAC.

use crate::encode::ffmpeg::{ensure_parent_dir, is_ffmpeg_on_path};
use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{CastError, CastResult};
use std::path::Path;
use std::process::{Command, Stdio};

/// Merge `video` with the raw narration track into `out`.
///
/// When `audio` is `None` or its file does not exist, the video is copied as-is.
pub fn merge_audio_video(
    video: &Path,
    audio: Option<&AudioInputConfig>,
    out: &Path,
    audio_bitrate_kbps: u32,
) -> CastResult<()> {
    if !video.is_file() {
        return Err(CastError::validation(format!(
            "video file '{}' does not exist",
            video.display()
        )));
    }
    ensure_parent_dir(out)?;

    let args = match audio {
        Some(a) if a.path.is_file() => merge_args(video, a, out, audio_bitrate_kbps),
        Some(a) => {
            tracing::warn!(
                audio = %a.path.display(),
                "narration audio missing, writing video without audio"
            );
            copy_args(video, out)
        }
        None => copy_args(video, out),
    };
    run_ffmpeg(&args)?;
    tracing::info!(out = %out.display(), "merged final video");
    Ok(())
}

/// Copy the video stream into `out` without re-encoding.
pub fn copy_video(video: &Path, out: &Path) -> CastResult<()> {
    merge_audio_video(video, None, out, 0)
}

pub(crate) fn merge_args(
    video: &Path,
    audio: &AudioInputConfig,
    out: &Path,
    audio_bitrate_kbps: u32,
) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-loglevel", "error", "-i"]
        .map(str::to_owned)
        .to_vec();
    args.push(video.display().to_string());
    args.extend(["-f", "f32le", "-ar"].map(str::to_owned));
    args.push(audio.sample_rate.to_string());
    args.push("-ac".to_owned());
    args.push(audio.channels.to_string());
    args.push("-i".to_owned());
    args.push(audio.path.display().to_string());
    args.extend(["-c:v", "copy", "-c:a", "aac", "-b:a"].map(str::to_owned));
    args.push(format!("{audio_bitrate_kbps}k"));
    args.extend(["-map", "0:v:0", "-map", "1:a:0", "-shortest"].map(str::to_owned));
    args.push(out.display().to_string());
    args
}

pub(crate) fn copy_args(video: &Path, out: &Path) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-loglevel", "error", "-i"]
        .map(str::to_owned)
        .to_vec();
    args.push(video.display().to_string());
    args.extend(["-c", "copy"].map(str::to_owned));
    args.push(out.display().to_string());
    args
}

fn run_ffmpeg(args: &[String]) -> CastResult<()> {
    if !is_ffmpeg_on_path() {
        return Err(CastError::encode(
            "ffmpeg is required for muxing, but was not found on PATH",
        ));
    }
    let output = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CastError::encode(format!("failed to spawn ffmpeg: {e}")))?;
    if !output.status.success() {
        return Err(CastError::encode(format!(
            "ffmpeg mux exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;
