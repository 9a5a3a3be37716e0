use crate::foundation::core::{Fps, FrameIndex};
use crate::render::backend::{FramePaint, PaintRequest};
use crate::scene::timeline::SceneSequence;

/// Plan the paint for frame `idx`.
///
/// Returns `None` when no scene covers the frame's time; such frames are skipped.
///
/// The transition path applies while the elapsed time in the active scene is below
/// `window_fraction * scene.duration` and a different scene was active one frame before
/// the active scene's start.
pub fn plan_frame<'a>(
    seq: &'a dyn SceneSequence,
    idx: FrameIndex,
    fps: Fps,
    window_fraction: f64,
) -> Option<PaintRequest<'a>> {
    let time_secs = fps.frame_time_secs(idx);
    let scene = seq.scene_at(time_secs)?;

    let elapsed = (time_secs - scene.start_time).max(0.0);
    let progress = (elapsed / scene.duration).clamp(0.0, 1.0);
    let window_secs = scene.duration * window_fraction.max(0.0);

    let paint = if window_secs > 0.0 && elapsed < window_secs {
        let before = scene.start_time - fps.frame_duration_secs();
        match seq.scene_at(before).filter(|prev| prev.id != scene.id) {
            Some(from) => FramePaint::Transition {
                from,
                to: scene,
                fraction: (elapsed / window_secs).clamp(0.0, 1.0),
                progress,
            },
            None => FramePaint::Steady { scene, progress },
        }
    } else {
        FramePaint::Steady { scene, progress }
    };

    Some(PaintRequest {
        idx,
        time_secs,
        paint,
    })
}

/// Total frame count for a sequence: `floor(total_duration * fps)`.
pub fn total_frames(seq: &dyn SceneSequence, fps: Fps) -> u64 {
    fps.secs_to_frames_floor(seq.total_duration())
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
