//! Narration audio: speech providers and the timeline-length PCM track.

/// Speech providers.
pub mod provider;
/// Narration track assembly and raw PCM output.
pub mod track;

pub use provider::{NarrationProvider, SilentNarration, provider_by_name};
pub use track::{NarrationClip, NarrationTrack, build_narration_track, write_f32le};
