use crate::{
    foundation::error::StoryResult,
    story::model::{CameraData, SceneAsset, SceneData, Story, StoryMetadata},
};

/// Fluent builder for [`Story`]; `build` validates the result.
pub struct StoryBuilder {
    title: String,
    javascript: String,
    scenes: Vec<SceneData>,
    assets: Vec<SceneAsset>,
}

impl StoryBuilder {
    /// Start a story with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            javascript: String::new(),
            scenes: Vec::new(),
            assets: Vec::new(),
        }
    }

    /// Set the script shared by every scene.
    pub fn javascript(mut self, code: impl Into<String>) -> Self {
        self.javascript = code.into();
        self
    }

    /// Append a scene.
    pub fn scene(mut self, scene: SceneData) -> Self {
        self.scenes.push(scene);
        self
    }

    /// Append a binary asset.
    pub fn asset(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.assets.push(SceneAsset {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    /// Finish the story, rejecting duplicate ids/asset names and bad cameras.
    pub fn build(self) -> StoryResult<Story> {
        let story = Story {
            metadata: StoryMetadata { title: self.title },
            javascript: self.javascript,
            scenes: self.scenes,
            assets: self.assets,
        };
        story.validate()?;
        Ok(story)
    }
}

/// Fluent builder for [`SceneData`].
pub struct SceneBuilder {
    scene: SceneData,
}

impl SceneBuilder {
    /// Start a scene with its stable id and display header.
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            scene: SceneData {
                id: id.into(),
                header: header.into(),
                ..SceneData::default()
            },
        }
    }

    /// Deep-link key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.scene.key = key.into();
        self
    }

    /// Markdown description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.scene.description = text.into();
        self
    }

    /// Scene script.
    pub fn javascript(mut self, code: impl Into<String>) -> Self {
        self.scene.javascript = code.into();
        self
    }

    /// Camera pose applied after the script.
    pub fn camera(mut self, camera: CameraData) -> Self {
        self.scene.camera = Some(camera);
        self
    }

    /// Linger duration in milliseconds.
    pub fn linger_ms(mut self, ms: u64) -> Self {
        self.scene.linger_duration_ms = Some(ms);
        self
    }

    /// Transition duration in milliseconds.
    pub fn transition_ms(mut self, ms: u64) -> Self {
        self.scene.transition_duration_ms = Some(ms);
        self
    }

    /// Finish the scene.
    pub fn build(self) -> SceneData {
        self.scene
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/dsl.rs"]
mod tests;
