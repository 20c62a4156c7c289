use std::collections::BTreeSet;

use crate::foundation::error::{StoryError, StoryResult};

/// Archive entry name reserved for the serialized story index.
pub const INDEX_ENTRY_NAME: &str = "index.mvsj";

/// Current [`StoryContainer`] format version.
pub const STORY_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// A complete authored story: shared script, ordered scenes and attached assets.
///
/// A story is a pure data model that can be:
/// - built programmatically (see [`crate::StoryBuilder`])
/// - serialized/deserialized via Serde (JSON for authoring, bincode for sessions)
///
/// The pipeline never mutates a story; every entry point borrows it.
pub struct Story {
    /// Story-level metadata.
    pub metadata: StoryMetadata,
    /// Script run before every scene's own script.
    #[serde(default)]
    pub javascript: String,
    /// Scenes in playback (and execution) order.
    #[serde(default)]
    pub scenes: Vec<SceneData>,
    /// Binary files packaged next to the index when present.
    #[serde(default)]
    pub assets: Vec<SceneAsset>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Story-level metadata.
pub struct StoryMetadata {
    /// Story title, copied into the index metadata.
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A named binary file shipped with a story.
pub struct SceneAsset {
    /// File name, also the archive entry path.
    pub name: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// One step of a story.
pub struct SceneData {
    /// Stable author-assigned identifier.
    pub id: String,
    /// Display title, becomes the snapshot title.
    pub header: String,
    /// Short deep-link key; blank keys are omitted from the snapshot.
    #[serde(default)]
    pub key: String,
    /// Markdown description shown next to the viewer.
    #[serde(default)]
    pub description: String,
    /// Scene script, run after the story script.
    #[serde(default)]
    pub javascript: String,
    /// Camera pose applied after the script ran.
    #[serde(default)]
    pub camera: Option<CameraData>,
    /// How long the viewer stays on this scene (ms).
    #[serde(default)]
    pub linger_duration_ms: Option<u64>,
    /// Duration of the transition into this scene (ms).
    #[serde(default)]
    pub transition_duration_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Camera projection mode.
pub enum ProjectionMode {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Stored camera pose of a scene.
pub struct CameraData {
    /// Projection mode.
    pub mode: ProjectionMode,
    /// Point the camera looks at.
    pub target: [f64; 3],
    /// Eye position as the author saw it.
    pub position: [f64; 3],
    /// Up vector.
    pub up: [f64; 3],
    /// Field of view in radians, within `(0, π)`.
    pub fov: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Versioned envelope persisted by session serialization.
pub struct StoryContainer {
    /// Container format version.
    pub version: u32,
    /// Wrapped story.
    pub story: Story,
}

impl StoryContainer {
    /// Wrap `story` with the current format version.
    pub fn new(story: Story) -> Self {
        Self {
            version: STORY_FORMAT_VERSION,
            story,
        }
    }
}

impl Story {
    /// Check structural invariants the pipeline relies on.
    pub fn validate(&self) -> StoryResult<()> {
        let mut ids = BTreeSet::new();
        for scene in &self.scenes {
            if scene.id.trim().is_empty() {
                return Err(StoryError::validation(format!(
                    "scene '{}' has an empty id",
                    scene.header
                )));
            }
            if !ids.insert(scene.id.as_str()) {
                return Err(StoryError::validation(format!(
                    "duplicate scene id '{}'",
                    scene.id
                )));
            }
            if let Some(camera) = &scene.camera {
                camera.validate().map_err(|e| {
                    StoryError::validation(format!("scene '{}': {e}", scene.id))
                })?;
            }
        }

        validate_asset_names(&self.assets)
    }
}

impl CameraData {
    /// Check that the pose is finite and the field of view is usable.
    pub fn validate(&self) -> StoryResult<()> {
        let finite = self
            .target
            .iter()
            .chain(&self.position)
            .chain(&self.up)
            .all(|v| v.is_finite());
        if !finite {
            return Err(StoryError::validation("camera vectors must be finite"));
        }
        if !(self.fov > 0.0 && self.fov < std::f64::consts::PI) {
            return Err(StoryError::validation(format!(
                "camera fov {} is outside (0, pi)",
                self.fov
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_asset_names(assets: &[SceneAsset]) -> StoryResult<()> {
    let mut names = BTreeSet::new();
    for asset in assets {
        if asset.name.trim().is_empty() {
            return Err(StoryError::validation("asset name must be non-empty"));
        }
        if asset.name == INDEX_ENTRY_NAME {
            return Err(StoryError::validation(format!(
                "asset name '{INDEX_ENTRY_NAME}' is reserved for the story index"
            )));
        }
        if !names.insert(asset.name.as_str()) {
            return Err(StoryError::validation(format!(
                "duplicate asset name '{}'",
                asset.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/story/model.rs"]
mod tests;
