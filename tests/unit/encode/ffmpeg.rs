use super::*;
use crate::encode::sink::{AudioInputConfig, VideoCodec};

fn cfg(codec: VideoCodec) -> SinkConfig {
    SinkConfig::new(64, 32, Fps::integer(30).unwrap(), 8000, codec)
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn args_carry_codec_bitrate_and_gop() {
    let opts = FfmpegSinkOpts::new("out/video.mp4");
    let args = ffmpeg_args(&opts, &cfg(VideoCodec::Hevc));
    let joined = args.join(" ");
    assert!(joined.starts_with("-y "));
    assert!(joined.contains("-s 64x32 -r 30/1 -i pipe:0"));
    assert!(joined.contains("-c:v libx265 -preset medium -tune animation"));
    assert!(joined.contains("-b:v 8000k -g 30 -keyint_min 30 -pix_fmt yuv420p"));
    assert!(joined.contains("-an"));
    assert!(joined.ends_with("-f mp4 out/video.mp4"));
}

#[test]
fn args_with_audio_input_map_aac() {
    let mut opts = FfmpegSinkOpts::new("v.mkv");
    opts.tune = None;
    opts.overwrite = false;
    let mut c = cfg(VideoCodec::H264);
    c.container = "matroska".to_owned();
    c.audio = Some(AudioInputConfig {
        path: "a.f32".into(),
        sample_rate: 48_000,
        channels: 2,
    });
    let joined = ffmpeg_args(&opts, &c).join(" ");
    assert!(joined.starts_with("-n "));
    assert!(joined.contains("-f f32le -ar 48000 -ac 2 -i a.f32"));
    assert!(joined.contains("-c:a aac -shortest"));
    assert!(!joined.contains("-tune"));
    assert!(!joined.contains("faststart"));
    assert!(!joined.contains("-an"));
}

#[test]
fn begin_rejects_odd_dimensions() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
        std::env::temp_dir().join("scenecast_odd.mp4"),
    ));
    let c = SinkConfig::new(3, 2, Fps::integer(30).unwrap(), 100, VideoCodec::H264);
    let err = sink.begin(c).unwrap_err();
    assert!(err.to_string().contains("even"));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let root = std::env::temp_dir().join(format!("scenecast_parent_{}", std::process::id()));
    let file = root.join("a").join("b").join("x.mp4");
    ensure_parent_dir(&file).unwrap();
    assert!(root.join("a").join("b").is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
    let _ = std::fs::remove_dir_all(root);
}
