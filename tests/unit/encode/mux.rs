use super::*;

fn audio() -> AudioInputConfig {
    AudioInputConfig {
        path: "narration.f32".into(),
        sample_rate: 48_000,
        channels: 2,
    }
}

#[test]
fn merge_args_copy_video_and_encode_aac() {
    let args = merge_args(Path::new("v.mp4"), &audio(), Path::new("out.mp4"), 320).join(" ");
    assert!(args.contains("-i v.mp4 -f f32le -ar 48000 -ac 2 -i narration.f32"));
    assert!(args.contains("-c:v copy -c:a aac -b:a 320k"));
    assert!(args.contains("-map 0:v:0 -map 1:a:0 -shortest"));
    assert!(args.ends_with("out.mp4"));
}

#[test]
fn copy_args_use_stream_copy() {
    let args = copy_args(Path::new("v.mp4"), Path::new("o.mp4"));
    assert_eq!(
        args,
        vec!["-y", "-loglevel", "error", "-i", "v.mp4", "-c", "copy", "o.mp4"]
    );
}

#[test]
fn missing_video_is_a_validation_error() {
    let err = merge_audio_video(
        Path::new("/definitely/not/here.mp4"),
        Some(&audio()),
        Path::new("out.mp4"),
        320,
    )
    .unwrap_err();
    assert!(matches!(err, CastError::Validation(_)));
}
