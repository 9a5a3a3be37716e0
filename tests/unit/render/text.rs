use super::*;

fn system_engine() -> Option<TextLayoutEngine> {
    let Some(path) = resolve_font_path(None) else {
        eprintln!("skipping: no system font installed");
        return None;
    };
    Some(TextLayoutEngine::from_path(&path).unwrap())
}

#[test]
fn engine_without_font_shapes_nothing() {
    let mut engine = TextLayoutEngine::new();
    assert!(!engine.has_font());
    assert!(engine.family_name().is_none());
    let shaped = engine.shape("hello", 24.0, Rgba8::BLACK, None).unwrap();
    assert!(shaped.is_none());
}

#[test]
fn non_positive_size_is_rejected() {
    let mut engine = TextLayoutEngine::new();
    assert!(engine.shape("x", 0.0, Rgba8::BLACK, None).is_err());
    assert!(engine.shape("x", f32::NAN, Rgba8::BLACK, None).is_err());
}

#[test]
fn garbage_font_bytes_are_rejected() {
    assert!(TextLayoutEngine::with_font_bytes(b"not a font".to_vec()).is_err());
}

#[test]
fn configured_font_must_exist() {
    let theme = Theme {
        font: Some(PathBuf::from("/definitely/not/here.ttf")),
        ..Theme::default()
    };
    assert_eq!(
        resolve_font_path(theme.font.as_deref()),
        theme.font.clone()
    );
    assert!(TextLayoutEngine::for_theme(&theme).is_err());
}

#[test]
fn loaded_font_exposes_its_family() {
    let Some(engine) = system_engine() else {
        return;
    };
    assert!(engine.has_font());
    assert!(!engine.family_name().unwrap_or_default().trim().is_empty());
}

#[test]
fn single_line_is_shaped_left_to_right() {
    let Some(mut engine) = system_engine() else {
        return;
    };
    let color = Rgba8::rgb(10, 20, 30);
    let shaped = engine
        .shape("scenecast", 32.0, color, None)
        .unwrap()
        .unwrap();
    assert_eq!(shaped.lines.len(), 1);
    assert_eq!(shaped.glyph_count(), 9);
    assert_eq!(shaped.color, color);
    assert_eq!(shaped.size, 32.0);

    let line = &shaped.lines[0];
    assert!(line.baseline > 0.0 && line.baseline < 64.0);
    assert!(line.glyphs.windows(2).all(|w| w[1].x > w[0].x));
    assert!(shaped.width() > 32.0);
}

#[test]
fn max_width_breaks_lines() {
    let Some(mut engine) = system_engine() else {
        return;
    };
    let text = "one two three four five six";
    let wide = engine
        .shape(text, 20.0, Rgba8::BLACK, None)
        .unwrap()
        .unwrap();
    let narrow = engine
        .shape(text, 20.0, Rgba8::BLACK, Some(wide.width() / 2.0))
        .unwrap()
        .unwrap();
    assert_eq!(wide.lines.len(), 1);
    assert!(narrow.lines.len() >= 2);
    assert!(narrow.lines.windows(2).all(|w| w[1].baseline > w[0].baseline));
    assert!(narrow.width() < wide.width());
}
