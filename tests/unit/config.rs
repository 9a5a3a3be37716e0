use super::*;

#[test]
fn presets_imply_fps_and_bitrate() {
    let cfg = VideoConfig::with_resolution(Resolution::Hd1080p30);
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.bitrate_kbps, 8_000);
    assert_eq!(cfg.canvas(), Canvas { width: 1920, height: 1080 });

    let mut cfg = VideoConfig::default();
    assert_eq!(cfg.resolution, Resolution::Uhd4k);
    assert_eq!(cfg.codec, VideoCodec::Hevc);
    cfg.set_resolution(Resolution::Uhd8k);
    assert_eq!(cfg.bitrate_kbps, 85_000);
    assert_eq!(cfg.canvas().width, 7680);
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let json = r##"{
        "resolution": "1080p60",
        "codec": "h264",
        "theme": {"background": "#000000"},
        "narration": {"align_durations": true}
    }"##;
    let cfg = VideoConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.resolution, Resolution::Hd1080p60);
    assert_eq!(cfg.codec, VideoCodec::H264);
    assert_eq!(cfg.theme.background, Rgba8::BLACK);
    assert_eq!(cfg.theme.text, Rgba8::BLACK);
    assert_eq!(cfg.theme.font, None);
    assert!(cfg.narration.align_durations);
    assert_eq!(cfg.narration.provider, "silent");
    assert_eq!(cfg.audio.sample_rate, 48_000);
}

#[test]
fn theme_font_path_is_read_from_json() {
    let json = r#"{"theme": {"font": "fonts/Inter-Regular.ttf"}}"#;
    let cfg = VideoConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(
        cfg.theme.font.as_deref(),
        Some(Path::new("fonts/Inter-Regular.ttf"))
    );
    assert_eq!(cfg.theme.background, Rgba8::WHITE);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(VideoConfig::from_reader(r#"{"fps": 0}"#.as_bytes()).is_err());
    assert!(VideoConfig::from_reader(r#"{"container": " "}"#.as_bytes()).is_err());
    assert!(VideoConfig::from_reader(r#"{"resolution": "720p"}"#.as_bytes()).is_err());
}

#[test]
fn preset_names_round_trip() {
    for r in [
        Resolution::Hd1080p30,
        Resolution::Hd1080p60,
        Resolution::Uhd4k,
        Resolution::Uhd8k,
    ] {
        assert_eq!(Resolution::from_name(r.name()).unwrap(), r);
    }
    assert_eq!(Resolution::from_name("FAST").unwrap(), Resolution::Hd1080p30);
    assert!(Resolution::from_name("nope").is_err());
}

#[test]
fn display_is_compact() {
    let s = VideoConfig::with_resolution(Resolution::Hd1080p30).to_string();
    assert!(s.contains("1080p30"));
    assert!(s.contains("hevc"));
}
