//! mvs-story compiles authored molecular stories into MolViewSpec (MVS) data.
//!
//! A [`Story`] is an ordered list of scenes. Each scene carries a small script that
//! drives an [`MvsBuilder`] (download a structure, parse it, add components,
//! representations, labels, primitives, ...). Running every scene in order yields one
//! [`Snapshot`] per scene, aggregated into a multi-snapshot [`StoryIndex`].
//!
//! # Pipeline overview
//!
//! 1. **Validate**: reject duplicate scene ids, colliding asset names and unusable cameras.
//! 2. **Run**: execute the story script plus each scene script in a sandboxed
//!    interpreter ([`ScriptEngine`]), sharing one [`StoryState`] across scenes.
//! 3. **Assemble**: append the scene camera (FOV-adjusted) and presentation metadata.
//! 4. **Package**: return the index as `.mvsj`, or a `.mvsx` zip archive when the
//!    story carries assets.
//!
//! Optional outputs: a self-contained HTML page ([`generate_html`]) and a compact,
//! deflated session blob ([`prepare_session_data`] / [`load_session_data`]).
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No network IO**: the builder records URLs; the viewer fetches them.
//! - **All-or-nothing**: the first failing scene aborts the whole story.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod camera;
mod compile;
mod foundation;
mod mvs;
mod package;
mod script;
mod story;

pub use camera::adjust::{adjusted_camera_position, fov_centered_position, fov_distance_factor};
pub use compile::snapshot::{
    DEFAULT_LINGER_MS, DEFAULT_TRANSITION_MS, assemble_snapshot, snapshot_metadata,
};
pub use compile::story::{
    GenerateOptions, MvsOutput, generate, generate_index, generate_index_with, generate_with,
};
pub use foundation::error::{StoryError, StoryResult};
pub use mvs::builder::{
    Component, Download, MvsBuilder, Parse, Primitives, Representation, Structure, Volume,
    VolumeRepresentation,
};
pub use mvs::tree::{
    DescriptionFormat, IndexKind, IndexMetadata, MVS_VERSION, Params, Snapshot, SnapshotMetadata,
    StoryIndex, TreeNode,
};
pub use package::archive::{package_archive, unpack_archive};
pub use package::html::{DEFAULT_VIEWER_VERSION, HtmlOptions, generate_html, render_html};
pub use package::session::{
    MAX_INFLATED_SESSION_BYTES, MAX_SESSION_BYTES, load_session_data, prepare_session_data,
};
pub use script::api::StoryState;
pub use script::sandbox::{SandboxLimits, SceneScript, ScriptEngine};
pub use story::dsl::{SceneBuilder, StoryBuilder};
pub use story::model::{
    CameraData, INDEX_ENTRY_NAME, ProjectionMode, STORY_FORMAT_VERSION, SceneAsset, SceneData,
    Story, StoryContainer, StoryMetadata,
};
