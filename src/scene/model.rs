use crate::foundation::error::{CastError, CastResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque scene identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    /// Allocate a process-unique id of the form `scene_<n>`.
    pub fn generate() -> Self {
        let n = NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("scene_{n}"))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content-kind tag that selects the scene's paint routine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// Opening title card.
    Intro,
    /// Closing card.
    Outro,
    /// Centered title.
    TitleSlide,
    /// Title plus narration text.
    Narration,
    /// Source listing on a panel.
    CodeDisplay,
    /// Array bar chart with highlighted indices.
    Visualization,
    /// Animated title.
    Animation,
    /// Blank background between scenes.
    Transition,
}

impl SceneKind {
    /// Every kind, in declaration order.
    pub const ALL: [SceneKind; 8] = [
        SceneKind::Intro,
        SceneKind::Outro,
        SceneKind::TitleSlide,
        SceneKind::Narration,
        SceneKind::CodeDisplay,
        SceneKind::Visualization,
        SceneKind::Animation,
        SceneKind::Transition,
    ];
}

/// A timed unit of content.
///
/// `start_time` is owned by the timeline; callers set `duration`, `kind` and content.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Opaque id, generated when absent from JSON.
    #[serde(default = "SceneId::generate")]
    pub id: SceneId,
    /// Content-kind tag.
    pub kind: SceneKind,
    /// Duration in seconds (> 0).
    pub duration: f64,
    /// Start time in seconds, assigned by the timeline.
    #[serde(default)]
    pub start_time: f64,
    /// Text spoken over the scene, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
    /// Kind-specific content keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub payload: BTreeMap<String, serde_json::Value>,
}

impl Scene {
    /// Create a scene with a generated id and empty content.
    pub fn new(kind: SceneKind, duration: f64) -> Self {
        Self {
            id: SceneId::generate(),
            kind,
            duration,
            start_time: 0.0,
            narration: None,
            payload: BTreeMap::new(),
        }
    }

    /// Start a [`SceneBuilder`].
    pub fn builder(kind: SceneKind, duration: f64) -> SceneBuilder {
        SceneBuilder {
            scene: Self::new(kind, duration),
        }
    }

    /// `start_time + duration`.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// `true` when `t` lies in `[start_time, end_time)`.
    pub fn covers(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time()
    }

    /// Validate duration and id.
    pub fn validate(&self) -> CastResult<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(CastError::validation(format!(
                "scene '{}' duration must be a positive number of seconds (got {})",
                self.id, self.duration
            )));
        }
        if self.id.0.is_empty() {
            return Err(CastError::validation("scene id must be non-empty"));
        }
        Ok(())
    }

    /// Payload entry as a string.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }

    /// Payload entry as an integer.
    pub fn payload_i64(&self, key: &str) -> Option<i64> {
        self.payload.get(key).and_then(|v| v.as_i64())
    }

    /// Payload entry as an integer array. Non-integer elements make the whole entry absent.
    pub fn payload_i64_array(&self, key: &str) -> Option<Vec<i64>> {
        self.payload
            .get(key)?
            .as_array()?
            .iter()
            .map(|v| v.as_i64())
            .collect()
    }
}

/// Fluent construction of a [`Scene`].
#[derive(Debug)]
pub struct SceneBuilder {
    scene: Scene,
}

impl SceneBuilder {
    /// Override the generated id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.scene.id = SceneId(id.into());
        self
    }

    /// Attach narration text.
    pub fn narration(mut self, text: impl Into<String>) -> Self {
        self.scene.narration = Some(text.into());
        self
    }

    /// Insert one payload entry.
    pub fn payload(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.scene.payload.insert(key.into(), value.into());
        self
    }

    /// Set an explicit start time (normally assigned by the timeline).
    pub fn start_time(mut self, start: f64) -> Self {
        self.scene.start_time = start;
        self
    }

    /// Finish the builder.
    pub fn build(self) -> Scene {
        self.scene
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
