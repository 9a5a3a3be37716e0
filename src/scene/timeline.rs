use crate::foundation::error::{CastError, CastResult};
use crate::scene::model::{Scene, SceneId};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Slack, in seconds, applied when resolving a time that sits on a scene boundary.
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// Read-only lookup-by-time boundary consumed by the render pipeline.
///
/// Implementations guarantee scenes are sorted by start time and contiguous.
pub trait SceneSequence: Send + Sync {
    /// Scene whose half-open interval `[start, end)` contains `t`, if any.
    fn scene_at(&self, t: f64) -> Option<&Scene>;
    /// End time of the last scene in seconds.
    fn total_duration(&self) -> f64;
}

/// Ordered, contiguous list of scenes.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    title: String,
    scenes: Vec<Scene>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            scenes: Vec::new(),
        }
    }

    /// Parse a timeline from JSON and assign contiguous start times.
    pub fn from_reader<R: std::io::Read>(r: R) -> CastResult<Self> {
        let mut tl: Timeline = serde_json::from_reader(r)
            .map_err(|e| CastError::serde(format!("parse timeline JSON: {e}")))?;
        for s in &tl.scenes {
            s.validate()?;
        }
        tl.retime();
        Ok(tl)
    }

    /// Parse a timeline from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CastResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CastError::validation(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as pretty JSON.
    pub fn to_writer<W: std::io::Write>(&self, w: W) -> CastResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| CastError::serde(format!("write timeline JSON: {e}")))
    }

    /// Serialize as pretty JSON to a file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> CastResult<()> {
        use anyhow::Context as _;

        let path = path.as_ref();
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        let f = File::create(path)
            .with_context(|| format!("create timeline JSON '{}'", path.display()))?;
        self.to_writer(BufWriter::new(f))
    }

    /// Append a scene at the end.
    pub fn add_scene(&mut self, scene: Scene) -> CastResult<()> {
        scene.validate()?;
        self.scenes.push(scene);
        self.retime();
        Ok(())
    }

    /// Append several scenes in order.
    pub fn add_scenes(&mut self, scenes: impl IntoIterator<Item = Scene>) -> CastResult<()> {
        for s in scenes {
            self.add_scene(s)?;
        }
        Ok(())
    }

    /// Insert a scene at `index` (0..=len) and retime everything after it.
    pub fn insert_scene(&mut self, index: usize, scene: Scene) -> CastResult<()> {
        if index > self.scenes.len() {
            return Err(CastError::validation(format!(
                "insert index {index} out of range (len {})",
                self.scenes.len()
            )));
        }
        scene.validate()?;
        self.scenes.insert(index, scene);
        self.retime();
        Ok(())
    }

    /// Remove every scene with `id`. Returns `true` when something was removed.
    pub fn remove_scene_by_id(&mut self, id: &SceneId) -> bool {
        let before = self.scenes.len();
        self.scenes.retain(|s| &s.id != id);
        let removed = self.scenes.len() != before;
        if removed {
            self.retime();
        }
        removed
    }

    /// Remove and return the scene at `index`.
    pub fn remove_scene_at(&mut self, index: usize) -> CastResult<Scene> {
        if index >= self.scenes.len() {
            return Err(CastError::validation(format!(
                "remove index {index} out of range (len {})",
                self.scenes.len()
            )));
        }
        let s = self.scenes.remove(index);
        self.retime();
        Ok(s)
    }

    /// Change one scene's duration and retime the rest.
    pub fn set_scene_duration(&mut self, index: usize, duration: f64) -> CastResult<()> {
        let scene = self.scenes.get_mut(index).ok_or_else(|| {
            CastError::validation(format!("scene index {index} out of range"))
        })?;
        let prev = scene.duration;
        scene.duration = duration;
        if let Err(e) = scene.validate() {
            scene.duration = prev;
            return Err(e);
        }
        self.retime();
        Ok(())
    }

    /// Look up a scene by id.
    pub fn scene_by_id(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| &s.id == id)
    }

    /// Remove all scenes.
    pub fn clear(&mut self) {
        self.scenes.clear();
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// `true` when there are no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Scenes in presentation order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Video title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the video title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Total duration formatted as `MM:SS`.
    pub fn formatted_duration(&self) -> String {
        let total = self.total_duration().max(0.0) as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    /// Multi-line human-readable summary.
    pub fn summary(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "title: {}", self.title);
        let _ = writeln!(out, "scenes: {}", self.scenes.len());
        let _ = writeln!(out, "duration: {}", self.formatted_duration());
        for (i, s) in self.scenes.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>4}. {:?} [{:.2}s - {:.2}s] ({:.2}s) {}",
                i + 1,
                s.kind,
                s.start_time,
                s.end_time(),
                s.duration,
                s.id
            );
        }
        out
    }

    /// Scene covering `t` (half-open), found by binary search over end times.
    ///
    /// A `t` within [`BOUNDARY_EPSILON`] below a scene boundary resolves to the later scene, so
    /// rounding in summed start times cannot pull a boundary frame back into the previous scene.
    pub fn scene_at(&self, t: f64) -> Option<&Scene> {
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        self.covering(t + BOUNDARY_EPSILON)
            .or_else(|| self.covering(t))
    }

    fn covering(&self, t: f64) -> Option<&Scene> {
        // First scene ending after `t`; contiguity makes it the only candidate.
        let i = self.scenes.partition_point(|s| s.end_time() <= t);
        self.scenes.get(i).filter(|s| s.covers(t))
    }

    /// End time of the last scene in seconds.
    pub fn total_duration(&self) -> f64 {
        self.scenes.last().map(Scene::end_time).unwrap_or(0.0)
    }

    pub(crate) fn scenes_mut(&mut self) -> &mut [Scene] {
        &mut self.scenes
    }

    /// Reassign contiguous start times from 0.
    ///
    /// Uses a compensated (Neumaier) sum so long runs of short scenes do not drift.
    pub(crate) fn retime(&mut self) {
        let (mut sum, mut comp) = (0.0f64, 0.0f64);
        for s in &mut self.scenes {
            s.start_time = sum + comp;
            let next = sum + s.duration;
            comp += if sum.abs() >= s.duration.abs() {
                (sum - next) + s.duration
            } else {
                (s.duration - next) + sum
            };
            sum = next;
        }
    }
}

impl SceneSequence for Timeline {
    fn scene_at(&self, t: f64) -> Option<&Scene> {
        Timeline::scene_at(self, t)
    }

    fn total_duration(&self) -> f64 {
        Timeline::total_duration(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/timeline.rs"]
mod tests;
