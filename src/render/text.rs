//! Text shaping with `parley`. Shaped lines are drawn as `vello_cpu` glyph runs.

use crate::config::Theme;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{CastError, CastResult};
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Font files tried in order when the theme does not name one.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Font file to load: `configured` when set, otherwise the first installed candidate.
pub fn resolve_font_path(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// One shaped line. Glyph positions are relative to the layout's top-left corner.
#[derive(Clone, Debug)]
pub struct ShapedLine {
    pub glyphs: Vec<vello_cpu::Glyph>,
    /// Horizontal extent of the line's glyphs.
    pub width: f32,
    /// Baseline offset from the layout top.
    pub baseline: f32,
}

/// Text shaped at one size and color, ready to hand to a [`crate::render::kinds::Painter`].
#[derive(Clone, Debug)]
pub struct ShapedText {
    pub font: vello_cpu::peniko::FontData,
    pub size: f32,
    pub color: Rgba8,
    pub lines: Vec<ShapedLine>,
}

impl ShapedText {
    /// Widest line.
    pub fn width(&self) -> f32 {
        self.lines.iter().map(|l| l.width).fold(0.0, f32::max)
    }

    /// Total glyphs across all lines.
    pub fn glyph_count(&self) -> usize {
        self.lines.iter().map(|l| l.glyphs.len()).sum()
    }
}

struct LoadedFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Builds `parley` layouts from one registered font.
///
/// An engine without a font shapes nothing; text is then left out of the frame.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    font: Option<LoadedFont>,
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("family", &self.family_name())
            .finish_non_exhaustive()
    }
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Engine with no font loaded.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            font: None,
        }
    }

    /// Register `font_bytes` and shape all text with its first family.
    pub fn with_font_bytes(font_bytes: Vec<u8>) -> CastResult<Self> {
        let mut engine = Self::new();
        let families = engine
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CastError::validation("no font families registered from font bytes")
        })?;
        let family = engine
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CastError::validation("registered font family has no name"))?
            .to_owned();

        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        engine.font = Some(LoadedFont { family, data });
        Ok(engine)
    }

    /// Load the font file at `path`.
    pub fn from_path(path: &Path) -> CastResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        Self::with_font_bytes(bytes)
    }

    /// Engine for `theme`: its configured font, else an installed system font.
    ///
    /// A configured font that cannot be loaded is an error. When no system font is found the
    /// engine is created without one and a warning is logged.
    pub fn for_theme(theme: &Theme) -> CastResult<Self> {
        match resolve_font_path(theme.font.as_deref()) {
            Some(path) => {
                let engine = Self::from_path(&path)?;
                tracing::debug!(
                    font = %path.display(),
                    family = engine.family_name().unwrap_or_default(),
                    "loaded font"
                );
                Ok(engine)
            }
            None => {
                tracing::warn!("no font found; set theme.font to draw text");
                Ok(Self::new())
            }
        }
    }

    /// `true` once a font is registered.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Family name of the registered font.
    pub fn family_name(&self) -> Option<&str> {
        self.font.as_ref().map(|f| f.family.as_str())
    }

    /// Shape `text` at `size_px`, breaking lines at `max_width_px` when given.
    ///
    /// Returns `None` when no font is registered.
    pub fn shape(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgba8,
        max_width_px: Option<f32>,
    ) -> CastResult<Option<ShapedText>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CastError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let Some(font) = self.font.as_ref() else {
            return Ok(None);
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(color));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        if let Some(w) = max_width_px {
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        }

        let mut lines = Vec::new();
        for line in layout.lines() {
            let mut glyphs = Vec::new();
            let mut width = 0.0f32;
            let mut baseline = None;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                for g in run.positioned_glyphs() {
                    baseline.get_or_insert(g.y);
                    width = width.max(g.x + g.advance);
                    glyphs.push(vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                }
            }
            if let Some(baseline) = baseline {
                lines.push(ShapedLine {
                    glyphs,
                    width,
                    baseline,
                });
            }
        }

        Ok(Some(ShapedText {
            font: font.data.clone(),
            size: size_px,
            color,
            lines,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
