use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::CastResult;
use crate::scene::model::Scene;

/// A rendered frame as RGBA8 pixels, premultiplied alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// A frame filled with one premultiplied color.
    pub fn solid(canvas: Canvas, premul: [u8; 4]) -> Self {
        let px = (canvas.width as usize) * (canvas.height as usize);
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&premul);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// Pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Size of `data` in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// An owned raster plus the frame index it belongs to.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    /// Presentation index.
    pub idx: FrameIndex,
    /// Pixels.
    pub image: FrameRGBA,
}

/// What to draw for one frame.
#[derive(Clone, Copy, Debug)]
pub enum FramePaint<'a> {
    /// The scene's steady-state visual at `progress` in `[0, 1]`.
    Steady {
        /// Active scene.
        scene: &'a Scene,
        /// Elapsed fraction of the scene.
        progress: f64,
    },
    /// Cross-fade from the preceding scene into the active one.
    Transition {
        /// Preceding scene, drawn in its final state.
        from: &'a Scene,
        /// Active scene.
        to: &'a Scene,
        /// Elapsed fraction of the transition window in `[0, 1)`.
        fraction: f64,
        /// Elapsed fraction of the active scene.
        progress: f64,
    },
}

impl<'a> FramePaint<'a> {
    /// The scene that is active at this frame's time.
    pub fn scene(&self) -> &'a Scene {
        match *self {
            Self::Steady { scene, .. } => scene,
            Self::Transition { to, .. } => to,
        }
    }

    /// `true` for the transition path.
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }
}

/// A fully planned paint operation for one frame index.
#[derive(Clone, Copy, Debug)]
pub struct PaintRequest<'a> {
    /// Presentation index.
    pub idx: FrameIndex,
    /// Presentation time in seconds.
    pub time_secs: f64,
    /// Draw instructions.
    pub paint: FramePaint<'a>,
}

/// A render context that paints one frame at a time and reads it back.
///
/// Implementations hold mutable drawing state and are never called concurrently;
/// [`crate::render::shared::SharedSurface`] provides the exclusion.
pub trait RenderSurface: Send {
    /// Output dimensions.
    fn canvas(&self) -> Canvas;
    /// Reset the surface and draw `req`.
    fn paint(&mut self, req: &PaintRequest<'_>) -> CastResult<()>;
    /// Read back the pixels of the last paint.
    fn capture(&mut self) -> CastResult<FrameRGBA>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
