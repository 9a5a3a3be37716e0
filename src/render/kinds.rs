//! Paint routines for each [`SceneKind`].
//!
//! Coordinates are laid out on a 3840x2160 reference canvas and scaled to the output height.
//! Text goes through [`TextLayoutEngine`] and reaches the painter as glyph runs.

use crate::config::Theme;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{CastError, CastResult};
use crate::render::text::{ShapedLine, ShapedText, TextLayoutEngine};
use crate::scene::model::{Scene, SceneKind};
use kurbo::{Point, Rect};
use std::collections::HashMap;
use std::sync::Arc;

const REFERENCE_HEIGHT: f64 = 2160.0;

/// Minimal drawing surface the scene renderers target.
pub trait Painter {
    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8);
    /// Fill a rectangle with rounded corners.
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba8);
    /// Fill one shaped line. `origin` is where the layout's top-left corner lands.
    fn fill_glyphs(&mut self, text: &ShapedText, line: &ShapedLine, origin: Point);
    /// Start a group composited with `alpha` opacity.
    fn push_opacity(&mut self, alpha: f32);
    /// End the group started by the matching `push_opacity`.
    fn pop_layer(&mut self);
}

/// Horizontal anchor for a text line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    /// `x` is the left edge.
    Left,
    /// `x` is the center.
    Center,
}

/// Drawing helpers bound to one canvas and theme.
pub struct DrawCtx<'a> {
    painter: &'a mut dyn Painter,
    text: &'a mut TextLayoutEngine,
    canvas: Canvas,
    theme: &'a Theme,
}

impl<'a> DrawCtx<'a> {
    /// Wrap a painter. Text is shaped with `text`.
    pub fn new(
        painter: &'a mut dyn Painter,
        text: &'a mut TextLayoutEngine,
        canvas: Canvas,
        theme: &'a Theme,
    ) -> Self {
        Self {
            painter,
            text,
            canvas,
            theme,
        }
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Active theme.
    pub fn theme(&self) -> &Theme {
        self.theme
    }

    /// Reference-to-output scale factor.
    pub fn scale(&self) -> f64 {
        f64::from(self.canvas.height) / REFERENCE_HEIGHT
    }

    /// Output width in pixels.
    pub fn width(&self) -> f64 {
        f64::from(self.canvas.width)
    }

    /// Output height in pixels.
    pub fn height(&self) -> f64 {
        f64::from(self.canvas.height)
    }

    /// Fill the whole canvas.
    pub fn clear(&mut self, color: Rgba8) {
        let full = Rect::new(0.0, 0.0, self.width(), self.height());
        self.painter.fill_rect(full, color);
    }

    /// Fill a rectangle given in output pixels.
    pub fn rect(&mut self, rect: Rect, color: Rgba8) {
        if rect.width() > 0.0 && rect.height() > 0.0 {
            self.painter.fill_rect(rect, color);
        }
    }

    /// Fill a rounded rectangle given in output pixels.
    pub fn rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba8) {
        if rect.width() > 0.0 && rect.height() > 0.0 {
            self.painter.fill_rounded_rect(rect, radius, color);
        }
    }

    /// Run `f` inside an opacity group. Fully opaque groups are drawn directly.
    pub fn with_opacity(
        &mut self,
        alpha: f32,
        f: impl FnOnce(&mut Self) -> CastResult<()>,
    ) -> CastResult<()> {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha >= 1.0 {
            return f(self);
        }
        self.painter.push_opacity(alpha);
        let out = f(self);
        self.painter.pop_layer();
        out
    }

    /// Draw `shaped` with its first baseline at `first_baseline`. Each line is anchored at `x`.
    fn draw_shaped(&mut self, shaped: &ShapedText, x: f64, first_baseline: f64, align: Align) {
        let Some(first) = shaped.lines.first() else {
            return;
        };
        let top = first_baseline - f64::from(first.baseline);
        for line in &shaped.lines {
            let left = match align {
                Align::Left => x,
                Align::Center => x - f64::from(line.width) / 2.0,
            };
            self.painter.fill_glyphs(shaped, line, Point::new(left, top));
        }
    }

    /// Draw one line of text sitting on `baseline`. Returns the drawn width.
    pub fn text_line(
        &mut self,
        text: &str,
        x: f64,
        baseline: f64,
        size: f64,
        align: Align,
        color: Rgba8,
    ) -> CastResult<f64> {
        let Some(shaped) = self.text.shape(text, size as f32, color, None)? else {
            return Ok(0.0);
        };
        self.draw_shaped(&shaped, x, baseline, align);
        Ok(f64::from(shaped.width()))
    }

    /// Draw `text` broken into centered lines no wider than `max_width`. Returns the line count.
    pub fn wrapped_text(
        &mut self,
        text: &str,
        cx: f64,
        first_baseline: f64,
        size: f64,
        max_width: f64,
        color: Rgba8,
    ) -> CastResult<usize> {
        let Some(shaped) = self
            .text
            .shape(text, size as f32, color, Some(max_width as f32))?
        else {
            return Ok(0);
        };
        self.draw_shaped(&shaped, cx, first_baseline, Align::Center);
        Ok(shaped.lines.len())
    }
}

/// Paint routine for one scene kind.
pub trait SceneRenderer: Send + Sync {
    /// Draw `scene` at `progress` (elapsed fraction in `[0, 1]`) over an already cleared canvas.
    fn paint(&self, scene: &Scene, progress: f64, ctx: &mut DrawCtx<'_>) -> CastResult<()>;
}

/// Opening card: title fading in over the first third of the scene.
#[derive(Debug, Default)]
pub struct IntroRenderer;

impl SceneRenderer for IntroRenderer {
    fn paint(&self, scene: &Scene, progress: f64, ctx: &mut DrawCtx<'_>) -> CastResult<()> {
        let title = scene.payload_str("title").unwrap_or("Educational Video");
        let s = ctx.scale();
        let (cx, cy) = (ctx.width() / 2.0, ctx.height() / 2.0);
        let color = ctx.theme().text;
        ctx.with_opacity((progress * 3.0) as f32, |ctx| {
            ctx.text_line(title, cx, cy, 120.0 * s, Align::Center, color)?;
            Ok(())
        })
    }
}

/// Closing card.
#[derive(Debug, Default)]
pub struct OutroRenderer;

impl SceneRenderer for OutroRenderer {
    fn paint(&self, scene: &Scene, _progress: f64, ctx: &mut DrawCtx<'_>) -> CastResult<()> {
        let s = ctx.scale();
        let (cx, cy) = (ctx.width() / 2.0, ctx.height() / 2.0);
        let color = ctx.theme().text;
        let title = scene.payload_str("title").unwrap_or("Thank You!");
        let subtitle = scene
            .payload_str("subtitle")
            .unwrap_or("Subscribe for More!");
        ctx.text_line(title, cx, cy, 100.0 * s, Align::Center, color)?;
        ctx.text_line(subtitle, cx, cy + 100.0 * s, 60.0 * s, Align::Center, color)?;
        Ok(())
    }
}

/// Centered title, if the scene has one.
#[derive(Debug, Default)]
pub struct TitleRenderer;

impl SceneRenderer for TitleRenderer {
    fn paint(&self, scene: &Scene, _progress: f64, ctx: &mut DrawCtx<'_>) -> CastResult<()> {
        if let Some(title) = scene.payload_str("title") {
            let s = ctx.scale();
            let (cx, cy) = (ctx.width() / 2.0, ctx.height() / 2.0);
            let color = ctx.theme().text;
            ctx.text_line(title, cx, cy, 80.0 * s, Align::Center, color)?;
        }
        Ok(())
    }
}

/// Heading plus the wrapped narration text.
#[derive(Debug, Default)]
pub struct NarrationRenderer;

impl SceneRenderer for NarrationRenderer {
    fn paint(&self, scene: &Scene, _progress: f64, ctx: &mut DrawCtx<'_>) -> CastResult<()> {
        let s = ctx.scale();
        let cx = ctx.width() / 2.0;
        let color = ctx.theme().text;
        if let Some(title) = scene.payload_str("title") {
            ctx.text_line(title, cx, 300.0 * s, 100.0 * s, Align::Center, color)?;
        }
        if let Some(text) = scene.narration.as_deref() {
            let max_width = ctx.width() - 400.0 * s;
            let y = ctx.height() / 2.0 + 100.0 * s;
            ctx.wrapped_text(text, cx, y, 45.0 * s, max_width, color)?;
        }
        Ok(())
    }
}

/// Source listing on a panel, one text row per line.
#[derive(Debug, Default)]
pub struct CodeRenderer;

impl SceneRenderer for CodeRenderer {
    fn paint(&self, scene: &Scene, _progress: f64, ctx: &mut DrawCtx<'_>) -> CastResult<()> {
        let Some(code) = scene.payload_str("code") else {
            return Ok(());
        };
        let s = ctx.scale();
        let margin = 100.0 * s;
        let panel = Rect::new(margin, margin, ctx.width() - margin, ctx.height() - margin);
        let (panel_color, text_color) = (ctx.theme().panel, ctx.theme().text);
        ctx.rounded_rect(panel, 24.0 * s, panel_color);

        let mut y = 180.0 * s;
        for line in code.lines() {
            ctx.text_line(line, 150.0 * s, y, 35.0 * s, Align::Left, text_color)?;
            y += 50.0 * s;
        }
        Ok(())
    }
}

/// Bar chart of `payload.array` with `highlight1`/`highlight2` drawn in the highlight color.
#[derive(Debug, Default)]
pub struct VisualizationRenderer;

impl SceneRenderer for VisualizationRenderer {
    fn paint(&self, scene: &Scene, progress: f64, ctx: &mut DrawCtx<'_>) -> CastResult<()> {
        let Some(values) = scene.payload_i64_array("array").filter(|v| !v.is_empty()) else {
            return TitleRenderer.paint(scene, progress, ctx);
        };
        let s = ctx.scale();
        let theme = ctx.theme().clone();
        let cx = ctx.width() / 2.0;
        let title = scene.payload_str("title").unwrap_or("Visualization");
        ctx.text_line(title, cx, 180.0 * s, 90.0 * s, Align::Center, theme.text)?;

        let h1 = scene.payload_i64("highlight1");
        let h2 = scene.payload_i64("highlight2");
        let bar_slot = (ctx.width() - 300.0 * s) / values.len() as f64;
        let max_bar = (ctx.height() - 600.0 * s).max(0.0);
        let (x0, y0) = (150.0 * s, 300.0 * s);
        let max_value = values.iter().copied().max().unwrap_or(0).max(1) as f64;

        for (i, &v) in values.iter().enumerate() {
            let h = (v.max(0) as f64 / max_value) * max_bar;
            let x = x0 + i as f64 * bar_slot;
            let highlighted = h1 == Some(i as i64) || h2 == Some(i as i64);
            let color = if highlighted {
                theme.highlight
            } else {
                theme.primary
            };
            let gap = (15.0 * s).min(bar_slot * 0.5);
            ctx.rect(
                Rect::new(x, y0 + max_bar - h, x + bar_slot - gap, y0 + max_bar),
                color,
            );
            ctx.text_line(
                &v.to_string(),
                x + bar_slot / 2.0,
                y0 + max_bar + 70.0 * s,
                50.0 * s,
                Align::Center,
                theme.text,
            )?;
        }

        if let Some(caption) = scene.narration.as_deref() {
            let y = ctx.height() - 80.0 * s;
            ctx.text_line(caption, cx, y, 55.0 * s, Align::Center, theme.text)?;
        }
        Ok(())
    }
}

/// Background only.
#[derive(Debug, Default)]
pub struct ClearRenderer;

impl SceneRenderer for ClearRenderer {
    fn paint(&self, _scene: &Scene, _progress: f64, _ctx: &mut DrawCtx<'_>) -> CastResult<()> {
        Ok(())
    }
}

/// Built-in renderer for `kind`.
pub fn default_renderer(kind: SceneKind) -> Arc<dyn SceneRenderer> {
    match kind {
        SceneKind::Intro => Arc::new(IntroRenderer),
        SceneKind::Outro => Arc::new(OutroRenderer),
        SceneKind::TitleSlide | SceneKind::Animation => Arc::new(TitleRenderer),
        SceneKind::Narration => Arc::new(NarrationRenderer),
        SceneKind::CodeDisplay => Arc::new(CodeRenderer),
        SceneKind::Visualization => Arc::new(VisualizationRenderer),
        SceneKind::Transition => Arc::new(ClearRenderer),
    }
}

/// One renderer per scene kind.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: HashMap<SceneKind, Arc<dyn SceneRenderer>>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.renderers.keys().collect();
        kinds.sort();
        f.debug_struct("RendererRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl RendererRegistry {
    /// Registry populated with the built-in renderers.
    pub fn new() -> Self {
        let renderers = SceneKind::ALL
            .iter()
            .map(|&k| (k, default_renderer(k)))
            .collect();
        Self { renderers }
    }

    /// Replace the renderer for `kind`.
    pub fn register(&mut self, kind: SceneKind, renderer: impl SceneRenderer + 'static) {
        self.renderers.insert(kind, Arc::new(renderer));
    }

    /// Renderer for `kind`.
    pub fn get(&self, kind: SceneKind) -> Option<&dyn SceneRenderer> {
        self.renderers.get(&kind).map(|r| r.as_ref())
    }

    /// Dispatch `scene` to its renderer.
    pub fn paint(&self, scene: &Scene, progress: f64, ctx: &mut DrawCtx<'_>) -> CastResult<()> {
        let renderer = self.get(scene.kind).ok_or_else(|| {
            CastError::render(format!("no renderer registered for {:?}", scene.kind))
        })?;
        renderer.paint(scene, progress, ctx)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/kinds.rs"]
mod tests;
