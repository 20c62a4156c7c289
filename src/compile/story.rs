use chrono::{SecondsFormat, Utc};

use crate::{
    compile::snapshot::assemble_snapshot,
    foundation::error::StoryResult,
    mvs::tree::{IndexKind, IndexMetadata, MVS_VERSION, StoryIndex},
    package::archive::package_archive,
    script::api::StoryState,
    script::sandbox::{SandboxLimits, ScriptEngine},
    story::model::Story,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Knobs for a generation run.
pub struct GenerateOptions {
    /// Interpreter limits applied to every scene script.
    pub limits: SandboxLimits,
}

#[derive(Clone, Debug, PartialEq)]
/// Result of compiling a story.
pub enum MvsOutput {
    /// Plain index (`.mvsj`), produced when the story has no assets.
    Index(StoryIndex),
    /// Zip archive (`.mvsx`) holding the index and every asset.
    Archive(Vec<u8>),
}

impl MvsOutput {
    /// Viewer format tag / file extension: `mvsj` or `mvsx`.
    pub fn format(&self) -> &'static str {
        match self {
            Self::Index(_) => "mvsj",
            Self::Archive(_) => "mvsx",
        }
    }

    /// The plain index, if this is not an archive.
    pub fn as_index(&self) -> Option<&StoryIndex> {
        match self {
            Self::Index(index) => Some(index),
            Self::Archive(_) => None,
        }
    }

    /// The archive bytes, if this is an archive.
    pub fn as_archive(&self) -> Option<&[u8]> {
        match self {
            Self::Index(_) => None,
            Self::Archive(bytes) => Some(bytes),
        }
    }

    /// File contents: index JSON or archive bytes.
    pub fn to_bytes(&self) -> StoryResult<Vec<u8>> {
        match self {
            Self::Index(index) => Ok(serde_json::to_vec(index)?),
            Self::Archive(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Compile `story` with default options.
pub fn generate(story: &Story) -> StoryResult<MvsOutput> {
    generate_with(story, &GenerateOptions::default())
}

/// Compile `story` into an index, or into an archive when it carries assets.
#[tracing::instrument(skip_all, fields(title = %story.metadata.title))]
pub fn generate_with(story: &Story, opts: &GenerateOptions) -> StoryResult<MvsOutput> {
    let index = generate_index_with(story, opts)?;
    if story.assets.is_empty() {
        return Ok(MvsOutput::Index(index));
    }

    let archive = package_archive(&index, &story.assets)?;
    tracing::info!(
        assets = story.assets.len(),
        bytes = archive.len(),
        "packaged story archive"
    );
    Ok(MvsOutput::Archive(archive))
}

/// Compile `story` into its index, ignoring assets.
pub fn generate_index(story: &Story) -> StoryResult<StoryIndex> {
    generate_index_with(story, &GenerateOptions::default())
}

/// Compile every scene, in order, into one [`StoryIndex`].
///
/// Scenes run one after another against a shared [`StoryState`]; the first failing
/// scene aborts the whole story.
pub fn generate_index_with(story: &Story, opts: &GenerateOptions) -> StoryResult<StoryIndex> {
    story.validate()?;

    let engine = ScriptEngine::new(&opts.limits);
    let state = StoryState::new();

    let mut snapshots = Vec::with_capacity(story.scenes.len());
    for scene in &story.scenes {
        snapshots.push(assemble_snapshot(&engine, story, scene, &state)?);
    }

    tracing::debug!(snapshots = snapshots.len(), "story compiled");

    Ok(StoryIndex {
        kind: IndexKind::Multiple,
        metadata: IndexMetadata {
            title: story.metadata.title.clone(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: MVS_VERSION.to_string(),
        },
        snapshots,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compile/story.rs"]
mod tests;
