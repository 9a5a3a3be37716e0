use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scenecast::config::{Resolution, VideoConfig};
use scenecast::encode::ffmpeg::ensure_parent_dir;
use scenecast::encode::sink::VideoCodec;
use scenecast::pipeline::{MissingFramePolicy, PipelineOpts};
use scenecast::render::backend::RenderSurface as _;
use scenecast::render::cpu::CpuSurface;
use scenecast::render::plan::{plan_frame, total_frames};
use scenecast::scene::bubble_sort::bubble_sort_timeline;
use scenecast::scene::timeline::Timeline;
use scenecast::{FrameIndex, VideoGenerator};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scenecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a timeline to a video file (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print a timeline summary.
    Summary(SummaryArgs),
    /// Write a bubble-sort walkthrough timeline as JSON.
    Demo(DemoArgs),
}

/// Output settings shared by `render` and `frame`.
#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Video config JSON. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resolution preset: 1080p30, 1080p60, 4k60, 8k60.
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input timeline JSON.
    #[arg(long)]
    timeline: PathBuf,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Video codec: h264 or hevc.
    #[arg(long)]
    codec: Option<String>,

    /// Override compute pool threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per batch.
    #[arg(long)]
    batch_size: Option<u64>,

    /// Missing-frame handling: repeat, fail or stall.
    #[arg(long, default_value = "repeat")]
    missing_frames: String,

    /// Seconds the writer may wait on one frame before failing (0 waits forever).
    #[arg(long, default_value_t = 60)]
    stall_timeout_secs: u64,

    /// Scratch directory for the intermediate video and narration audio.
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Skip narration; the output has no audio track.
    #[arg(long, default_value_t = false)]
    no_narration: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input timeline JSON.
    #[arg(long)]
    timeline: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    /// Input timeline JSON.
    #[arg(long)]
    timeline: PathBuf,
}

#[derive(Parser, Debug)]
struct DemoArgs {
    /// Output timeline JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Comma-separated values to sort.
    #[arg(long, value_delimiter = ',', default_values_t = [5i64, 1, 4, 2, 8])]
    values: Vec<i64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Summary(args) => cmd_summary(args),
        Command::Demo(args) => cmd_demo(args),
    }
}

fn load_config(args: &OutputArgs) -> anyhow::Result<VideoConfig> {
    let mut cfg = match &args.config {
        Some(path) => VideoConfig::from_path(path)?,
        None => VideoConfig::default(),
    };
    if let Some(name) = &args.preset {
        cfg.set_resolution(Resolution::from_name(name)?);
    }
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.output)?;
    if let Some(codec) = &args.codec {
        cfg.codec = VideoCodec::from_name(codec);
    }

    let file_name = args
        .out
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("output path '{}' has no file name", args.out.display()))?
        .to_owned();
    if let Some(dir) = args.temp_dir {
        cfg.temp_dir = dir;
    }
    cfg.output_dir = match args.out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let opts = PipelineOpts {
        threads: args.threads,
        batch_size: args.batch_size,
        missing_frame_policy: MissingFramePolicy::from_name(&args.missing_frames)?,
        stall_timeout: (args.stall_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(args.stall_timeout_secs)),
        ..PipelineOpts::default()
    };

    let mut timeline = Timeline::from_path(&args.timeline)?;
    let mut generator = VideoGenerator::new(cfg, opts)?;
    if args.no_narration {
        generator = generator.without_narration();
    }
    let video = generator.generate_with_stats(&mut timeline, &file_name)?;

    eprintln!(
        "wrote {} ({} frames, {} repeated, {:.1}s)",
        video.path.display(),
        video.stats.frames_written,
        video.stats.frames_repeated,
        video.stats.elapsed.as_secs_f64()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.output)?;
    let timeline = Timeline::from_path(&args.timeline)?;
    let fps = cfg.frame_rate()?;
    let total = total_frames(&timeline, fps);

    let req = plan_frame(&timeline, FrameIndex(args.frame), fps, 0.2).with_context(|| {
        format!("frame {} is outside the timeline ({total} frames)", args.frame)
    })?;
    let mut surface = CpuSurface::new(cfg.canvas(), cfg.theme.clone())?;
    surface.paint(&req)?;
    let frame = surface.capture()?;

    ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_summary(args: SummaryArgs) -> anyhow::Result<()> {
    let timeline = Timeline::from_path(&args.timeline)?;
    println!("{}", timeline.summary());
    Ok(())
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let timeline = bubble_sort_timeline(&args.values)?;
    timeline.save(&args.out)?;
    eprintln!(
        "wrote {} ({} scenes, {})",
        args.out.display(),
        timeline.len(),
        timeline.formatted_duration()
    );
    Ok(())
}
