use crate::foundation::error::CastResult;
use std::sync::Arc;
use std::time::Duration;

/// Text-to-speech source.
///
/// `synthesize` returns interleaved `f32` PCM at the requested rate and channel count.
pub trait NarrationProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// `false` when the provider lacks credentials or tooling and will produce nothing useful.
    fn is_configured(&self) -> bool {
        true
    }

    /// Synthesize `text`.
    fn synthesize(&self, text: &str, sample_rate: u32, channels: u16) -> CastResult<Vec<f32>>;
}

/// Placeholder provider producing silence whose length follows the text length.
#[derive(Clone, Copy, Debug)]
pub struct SilentNarration {
    /// Silence emitted per character of text.
    pub per_char: Duration,
}

impl Default for SilentNarration {
    fn default() -> Self {
        Self {
            per_char: Duration::from_millis(50),
        }
    }
}

impl SilentNarration {
    /// Length of the clip produced for `text`.
    pub fn clip_duration(&self, text: &str) -> Duration {
        self.per_char
            .saturating_mul(text.chars().count().min(u32::MAX as usize) as u32)
    }
}

impl NarrationProvider for SilentNarration {
    fn name(&self) -> &str {
        "silent"
    }

    fn synthesize(&self, text: &str, sample_rate: u32, channels: u16) -> CastResult<Vec<f32>> {
        let frames = (self.clip_duration(text).as_secs_f64() * f64::from(sample_rate)).round();
        Ok(vec![0.0; frames as usize * usize::from(channels)])
    }
}

/// Provider for a configured name. Unknown names fall back to silence.
pub fn provider_by_name(name: &str) -> Arc<dyn NarrationProvider> {
    match name.trim().to_ascii_lowercase().as_str() {
        "silent" | "" => Arc::new(SilentNarration::default()),
        other => {
            tracing::warn!(provider = other, "unknown narration provider, using silent");
            Arc::new(SilentNarration::default())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/provider.rs"]
mod tests;
