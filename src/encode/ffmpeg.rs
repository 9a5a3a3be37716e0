use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CastError, CastResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// x264/x265 preset.
    pub preset: String,
    /// x264/x265 tune. `None` omits the flag.
    pub tune: Option<String>,
}

impl FfmpegSinkOpts {
    /// Options for encoding into `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [255, 255, 255, 255],
            preset: "medium".to_owned(),
            tune: Some("animation".to_owned()),
        }
    }

    /// Replace the flatten background.
    pub fn with_background(mut self, bg_rgba: [u8; 4]) -> Self {
        self.bg_rgba = bg_rgba;
        self
    }
}

/// Streaming encoder that spawns the system `ffmpeg` and writes raw frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a sink. Nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Output path.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }
}

/// Build the `ffmpeg` argument list for `cfg`, excluding the program name.
pub(crate) fn ffmpeg_args(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> Vec<String> {
    let mut args: Vec<String> = Vec::with_capacity(48);
    let overwrite = if opts.overwrite { "-y" } else { "-n" };
    args.push(overwrite.to_owned());

    // Input: raw RGBA8, alpha already flattened in push_frame.
    args.extend(
        [
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
        ]
        .map(str::to_owned),
    );
    args.push(format!("{}x{}", cfg.width, cfg.height));
    args.push("-r".to_owned());
    args.push(fps_arg(cfg.fps));
    args.extend(["-i", "pipe:0"].map(str::to_owned));

    if let Some(audio) = cfg.audio.as_ref() {
        args.extend(["-f", "f32le", "-ar"].map(str::to_owned));
        args.push(audio.sample_rate.to_string());
        args.push("-ac".to_owned());
        args.push(audio.channels.to_string());
        args.push("-i".to_owned());
        args.push(audio.path.display().to_string());
    }

    args.push("-c:v".to_owned());
    args.push(cfg.codec.ffmpeg_encoder().to_owned());
    args.push("-preset".to_owned());
    args.push(opts.preset.clone());
    if let Some(tune) = opts.tune.as_ref() {
        args.push("-tune".to_owned());
        args.push(tune.clone());
    }
    args.push("-b:v".to_owned());
    args.push(format!("{}k", cfg.bitrate_kbps));
    args.push("-g".to_owned());
    args.push(cfg.gop.to_string());
    args.push("-keyint_min".to_owned());
    args.push(cfg.gop.to_string());
    args.extend(["-pix_fmt", "yuv420p"].map(str::to_owned));

    if cfg.audio.is_some() {
        args.extend(["-c:a", "aac", "-shortest"].map(str::to_owned));
    } else {
        args.push("-an".to_owned());
    }
    if cfg.container == "mp4" || cfg.container == "mov" {
        args.extend(["-movflags", "+faststart"].map(str::to_owned));
    }
    args.push("-f".to_owned());
    args.push(cfg.container.clone());
    args.push(opts.out_path.display().to_string());
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> CastResult<()> {
        cfg.validate()?;
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(CastError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && (audio.sample_rate == 0 || audio.channels == 0)
        {
            return Err(CastError::validation(
                "audio sample_rate and channels must be non-zero when audio is enabled",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(CastError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(CastError::encode(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(ffmpeg_args(&self.opts, &cfg));

        tracing::info!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            codec = cfg.codec.name(),
            bitrate_kbps = cfg.bitrate_kbps,
            "starting ffmpeg encoder"
        );

        let mut child = cmd.spawn().map_err(|e| {
            CastError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CastError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| CastError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CastResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CastError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(CastError::encode(format!(
                "ffmpeg sink received out-of-order frame {} after {}",
                idx.0, last.0
            )));
        }

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(CastError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(CastError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(CastError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            CastError::encode(format!("failed to write frame {} to ffmpeg stdin: {e}", idx.0))
        })?;
        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> CastResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| CastError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| CastError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = self.join_stderr()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(CastError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::info!(out = %self.opts.out_path.display(), "ffmpeg encoder finished");
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::warn!("failed to kill ffmpeg: {e}");
            }
            let _ = child.wait();
        }
        if let Err(e) = self.join_stderr() {
            tracing::warn!("{e}");
        }
        self.cfg = None;
    }
}

impl FfmpegSink {
    fn join_stderr(&mut self) -> CastResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| CastError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| CastError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

// Rational rates go through as `num/den`.
fn fps_arg(fps: Fps) -> String {
    format!("{}/{}", fps.num, fps.den)
}

pub(crate) fn flatten_premul_over_bg(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> CastResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(CastError::validation(
            "flatten_premul_over_bg expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (s[0] as u16 + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (s[1] as u16 + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (s[2] as u16 + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> CastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
