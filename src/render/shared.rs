use crate::foundation::core::Canvas;
use crate::foundation::error::{CastError, CastResult};
use crate::render::backend::{FrameRGBA, PaintRequest, RenderSurface};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Counters describing how the shared surface was used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    /// Successful paint-and-capture operations.
    pub paints: u64,
    /// Paint or capture calls that returned an error.
    pub failures: u64,
    /// Total time callers spent waiting for the lock.
    pub lock_wait: Duration,
}

/// The process-wide render context handle.
///
/// Created once with [`SharedSurface::init`], handed to the pipeline by `Arc`, and released
/// with [`SharedSurface::shutdown`]. Every paint-and-capture holds the lock for its whole
/// duration, so at most one frame is being drawn at any time.
pub struct SharedSurface {
    slot: Mutex<Option<Box<dyn RenderSurface>>>,
    canvas: Canvas,
    paints: AtomicU64,
    failures: AtomicU64,
    wait_nanos: AtomicU64,
}

impl std::fmt::Debug for SharedSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSurface")
            .field("canvas", &self.canvas)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl SharedSurface {
    /// Take ownership of `surface` and return the shared handle.
    pub fn init(surface: impl RenderSurface + 'static) -> Arc<Self> {
        Self::from_boxed(Box::new(surface))
    }

    /// Same as [`SharedSurface::init`] for an already boxed surface.
    pub fn from_boxed(surface: Box<dyn RenderSurface>) -> Arc<Self> {
        let canvas = surface.canvas();
        tracing::debug!(width = canvas.width, height = canvas.height, "render surface initialized");
        Arc::new(Self {
            slot: Mutex::new(Some(surface)),
            canvas,
            paints: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            wait_nanos: AtomicU64::new(0),
        })
    }

    /// Output dimensions of the wrapped surface.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// `false` once [`SharedSurface::shutdown`] has run.
    pub fn is_live(&self) -> bool {
        self.lock().is_some()
    }

    /// Paint `req` and capture the result under the lock.
    pub fn render(&self, req: &PaintRequest<'_>) -> CastResult<FrameRGBA> {
        let started = Instant::now();
        let mut guard = self.lock();
        let waited = started.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
        self.wait_nanos.fetch_add(waited, Ordering::Relaxed);

        let surface = guard
            .as_mut()
            .ok_or_else(|| CastError::render("render surface has been shut down"))?;
        let out = surface.paint(req).and_then(|()| surface.capture());
        match &out {
            Ok(_) => self.paints.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failures.fetch_add(1, Ordering::Relaxed),
        };
        out
    }

    /// Release the wrapped surface. Later renders fail; returns `None` if already shut down.
    pub fn shutdown(&self) -> Option<Box<dyn RenderSurface>> {
        let surface = self.lock().take();
        if surface.is_some() {
            tracing::debug!(stats = ?self.stats(), "render surface shut down");
        }
        surface
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> SurfaceStats {
        SurfaceStats {
            paints: self.paints.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            lock_wait: Duration::from_nanos(self.wait_nanos.load(Ordering::Relaxed)),
        }
    }

    // A panic mid-paint poisons the lock; the next paint resets the surface.
    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn RenderSurface>>> {
        self.slot.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("render surface lock was poisoned by a panicking paint; recovering");
            self.slot.clear_poison();
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/shared.rs"]
mod tests;
