use crate::config::Theme;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{CastError, CastResult};
use crate::render::backend::{FramePaint, FrameRGBA, PaintRequest, RenderSurface};
use crate::render::kinds::{DrawCtx, Painter, RendererRegistry};
use crate::render::text::{ShapedLine, ShapedText, TextLayoutEngine};
use vello_cpu::kurbo::Shape as _;

/// Render context backed by `vello_cpu`.
///
/// Every `paint` fully resets the context, so a surface left in any state by a failed paint
/// is safe to reuse.
pub struct CpuSurface {
    canvas: Canvas,
    theme: Theme,
    registry: RendererRegistry,
    text: TextLayoutEngine,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    painted: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("canvas", &self.canvas)
            .field("registry", &self.registry)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    /// Create a surface with the built-in renderers.
    pub fn new(canvas: Canvas, theme: Theme) -> CastResult<Self> {
        Self::with_registry(canvas, theme, RendererRegistry::new())
    }

    /// Create a surface with a custom renderer registry.
    ///
    /// Text uses the theme's font, or an installed one when the theme names none.
    pub fn with_registry(
        canvas: Canvas,
        theme: Theme,
        registry: RendererRegistry,
    ) -> CastResult<Self> {
        let (w, h) = canvas_dims(canvas)?;
        let text = TextLayoutEngine::for_theme(&theme)?;
        Ok(Self {
            canvas,
            theme,
            registry,
            text,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            painted: false,
        })
    }

    /// Replace the text engine, e.g. to pin a font.
    pub fn with_text_engine(mut self, text: TextLayoutEngine) -> Self {
        self.text = text;
        self
    }

    /// Active theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }
}

fn canvas_dims(canvas: Canvas) -> CastResult<(u16, u16)> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(CastError::validation("canvas width/height must be non-zero"));
    }
    let w: u16 = canvas.width.try_into().map_err(|_| {
        CastError::validation(format!("canvas width exceeds u16: {}", canvas.width))
    })?;
    let h: u16 = canvas.height.try_into().map_err(|_| {
        CastError::validation(format!("canvas height exceeds u16: {}", canvas.height))
    })?;
    Ok((w, h))
}

struct VelloPainter<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
}

impl Painter for VelloPainter<'_> {
    fn fill_rect(&mut self, rect: kurbo::Rect, color: Rgba8) {
        self.ctx.set_paint(color.to_peniko());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
    }

    fn fill_rounded_rect(&mut self, rect: kurbo::Rect, radius: f64, color: Rgba8) {
        let rr =
            vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, radius);
        self.ctx.set_paint(color.to_peniko());
        self.ctx.fill_path(&rr.to_path(0.1));
    }

    fn fill_glyphs(&mut self, text: &ShapedText, line: &ShapedLine, origin: kurbo::Point) {
        if line.glyphs.is_empty() {
            return;
        }
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        self.ctx.set_paint(text.color.to_peniko());
        self.ctx
            .glyph_run(&text.font)
            .font_size(text.size)
            .fill_glyphs(line.glyphs.iter().copied());
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn push_opacity(&mut self, alpha: f32) {
        self.ctx.push_opacity_layer(alpha);
    }

    fn pop_layer(&mut self) {
        self.ctx.pop_layer();
    }
}

impl RenderSurface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn paint(&mut self, req: &PaintRequest<'_>) -> CastResult<()> {
        self.painted = false;
        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());

        let mut painter = VelloPainter { ctx: &mut self.ctx };
        let mut dc = DrawCtx::new(&mut painter, &mut self.text, self.canvas, &self.theme);
        let bg = self.theme.background;
        dc.clear(bg);

        match req.paint {
            FramePaint::Steady { scene, progress } => self.registry.paint(scene, progress, &mut dc)?,
            FramePaint::Transition {
                from,
                to,
                fraction,
                progress,
            } => {
                self.registry.paint(from, 1.0, &mut dc)?;
                let registry = &self.registry;
                dc.with_opacity(fraction as f32, |dc| {
                    dc.clear(bg);
                    registry.paint(to, progress, dc)
                })?;
            }
        }
        self.painted = true;
        Ok(())
    }

    fn capture(&mut self) -> CastResult<FrameRGBA> {
        if !self.painted {
            return Err(CastError::render("capture called before a successful paint"));
        }
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
