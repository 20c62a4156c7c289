/// Convenience result type used across the story pipeline.
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// Invalid story data or an output that breaks a size ceiling.
    #[error("validation error: {0}")]
    Validation(String),

    /// A scene script failed to parse, raised an error, or misused the builder API.
    #[error("script error in scene '{scene}': {message}")]
    Script {
        /// Id of the scene whose script failed.
        scene: String,
        /// Interpreter or builder message.
        message: String,
    },

    /// Errors while writing the multi-file archive.
    #[error("archive error: {0}")]
    Archive(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build a [`StoryError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryError::Script`] value for the given scene id.
    pub fn script(scene: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Script {
            scene: scene.into(),
            message: msg.into(),
        }
    }

    /// Build a [`StoryError::Archive`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Build a [`StoryError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

impl From<zip::result::ZipError> for StoryError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::archive(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
