use super::*;
use crate::config::Resolution;
use crate::scene::model::{Scene, SceneKind};

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("scenecast_gen_{name}_{}", std::process::id()))
}

fn config_in(root: &Path) -> VideoConfig {
    let mut cfg = VideoConfig::with_resolution(Resolution::Hd1080p30);
    cfg.output_dir = root.join("out");
    cfg.temp_dir = root.join("tmp");
    cfg
}

#[test]
fn empty_timeline_is_rejected_before_any_io() {
    let root = scratch("empty");
    let generator = VideoGenerator::new(config_in(&root), PipelineOpts::default()).unwrap();
    let err = generator
        .generate(&mut Timeline::new("nothing"), "x.mp4")
        .unwrap_err();
    assert!(matches!(err, CastError::Validation(_)));
    assert!(!root.exists());
}

#[test]
fn output_name_must_be_a_file_name() {
    let root = scratch("name");
    let generator = VideoGenerator::new(config_in(&root), PipelineOpts::default()).unwrap();
    let mut tl = Timeline::new("t");
    tl.add_scene(Scene::new(SceneKind::Intro, 1.0)).unwrap();
    for bad in ["", "   ", ".."] {
        assert!(generator.generate(&mut tl, bad).is_err(), "{bad:?}");
    }
}

#[test]
fn invalid_settings_are_rejected() {
    let mut cfg = VideoConfig::default();
    cfg.bitrate_kbps = 0;
    assert!(VideoGenerator::new(cfg, PipelineOpts::default()).is_err());

    let opts = PipelineOpts {
        threads: Some(0),
        ..PipelineOpts::default()
    };
    assert!(VideoGenerator::new(VideoConfig::default(), opts).is_err());
}

#[test]
fn temp_guard_removes_its_file() {
    let path = scratch("guard.bin");
    std::fs::write(&path, b"x").unwrap();
    {
        let guard = TempFileGuard(Some(path.clone()));
        assert_eq!(guard.path(), path.as_path());
    }
    assert!(!path.exists());
    // A guard whose file never appeared drops quietly.
    drop(TempFileGuard(Some(scratch("never"))));
}

#[test]
fn unique_stems_differ() {
    let a = unique_stem();
    std::thread::sleep(std::time::Duration::from_millis(1));
    assert_ne!(a, unique_stem());
}
