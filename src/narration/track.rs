use crate::config::AudioSettings;
use crate::foundation::error::{CastError, CastResult};
use crate::narration::provider::NarrationProvider;
use crate::scene::timeline::Timeline;
use rayon::prelude::*;
use std::path::Path;

/// Where one synthesized clip landed in the track.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationClip {
    /// Index of the narrated scene in the timeline.
    pub scene_index: usize,
    /// Clip start in seconds (the scene start).
    pub start_secs: f64,
    /// Synthesized clip length in seconds, before truncation at the scene end.
    pub clip_secs: f64,
}

/// Timeline-length interleaved PCM narration.
#[derive(Clone, Debug)]
pub struct NarrationTrack {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Interleaved `f32` samples.
    pub samples: Vec<f32>,
    /// Placed clips in scene order.
    pub clips: Vec<NarrationClip>,
}

impl NarrationTrack {
    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        let frames = self.samples.len() / usize::from(self.channels.max(1));
        frames as f64 / f64::from(self.sample_rate.max(1))
    }
}

/// Synthesize every narrated scene and lay the clips out over the timeline.
///
/// Scenes are synthesized in parallel. A scene whose synthesis fails keeps its duration and
/// contributes silence. With `align_durations`, each narrated scene's duration becomes its
/// clip length and the timeline is retimed before clips are placed.
#[tracing::instrument(skip_all, fields(provider = provider.name(), scenes = timeline.len()))]
pub fn build_narration_track(
    timeline: &mut Timeline,
    provider: &dyn NarrationProvider,
    audio: &AudioSettings,
    align_durations: bool,
) -> CastResult<NarrationTrack> {
    if audio.sample_rate == 0 || audio.channels == 0 {
        return Err(CastError::validation(
            "audio sample_rate and channels must be > 0",
        ));
    }
    if !provider.is_configured() {
        tracing::warn!("narration provider is not configured; clips may be empty");
    }

    let (sample_rate, channels) = (audio.sample_rate, audio.channels);
    let clips: Vec<(usize, Vec<f32>)> = timeline
        .scenes()
        .par_iter()
        .enumerate()
        .filter_map(|(i, scene)| {
            let text = scene.narration.as_deref()?.trim();
            if text.is_empty() {
                return None;
            }
            match provider.synthesize(text, sample_rate, channels) {
                Ok(pcm) => Some((i, pcm)),
                Err(e) => {
                    tracing::warn!(scene = %scene.id, "narration failed, using silence: {e}");
                    None
                }
            }
        })
        .collect();

    let ch = usize::from(channels);
    let clip_secs = |pcm: &[f32]| (pcm.len() / ch) as f64 / f64::from(sample_rate);

    if align_durations {
        let scenes = timeline.scenes_mut();
        for (i, pcm) in &clips {
            let secs = clip_secs(pcm);
            if secs > 0.0 {
                tracing::debug!(
                    scene = %scenes[*i].id,
                    from = scenes[*i].duration,
                    to = secs,
                    "aligning scene to narration"
                );
                scenes[*i].duration = secs;
            }
        }
        timeline.retime();
    }

    let total_frames = (timeline.total_duration() * f64::from(sample_rate)).floor() as usize;
    let mut samples = vec![0.0f32; total_frames * ch];
    let mut placed = Vec::with_capacity(clips.len());
    for (i, pcm) in &clips {
        let scene = &timeline.scenes()[*i];
        let start = (scene.start_time * f64::from(sample_rate)).round() as usize * ch;
        let end = ((scene.end_time() * f64::from(sample_rate)).round() as usize * ch)
            .min(samples.len());
        if start < end {
            let n = pcm.len().min(end - start);
            samples[start..start + n].copy_from_slice(&pcm[..n]);
        }
        placed.push(NarrationClip {
            scene_index: *i,
            start_secs: scene.start_time,
            clip_secs: clip_secs(pcm),
        });
    }

    tracing::info!(
        clips = placed.len(),
        duration_secs = timeline.total_duration(),
        "narration track assembled"
    );
    Ok(NarrationTrack {
        sample_rate,
        channels,
        samples,
        clips: placed,
    })
}

/// Write interleaved `f32` PCM samples to a raw little-endian file.
pub fn write_f32le(samples: &[f32], out_path: &Path) -> CastResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(out_path)?;

    let mut bytes = Vec::<u8>::with_capacity(samples.len() * 4);
    for &sample in samples {
        bytes.extend_from_slice(&sample.clamp(-1.0, 1.0).to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        CastError::encode(format!(
            "failed to write narration audio '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/narration/track.rs"]
mod tests;
