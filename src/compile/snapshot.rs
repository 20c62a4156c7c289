use serde_json::json;

use crate::{
    camera::adjust::adjusted_camera_position,
    foundation::error::StoryResult,
    mvs::builder::MvsBuilder,
    mvs::tree::{DescriptionFormat, Params, Snapshot, SnapshotMetadata},
    script::api::StoryState,
    script::sandbox::ScriptEngine,
    story::model::{CameraData, SceneData, Story},
};

/// Linger duration used when a scene leaves it unset or zero.
pub const DEFAULT_LINGER_MS: u64 = 5000;
/// Transition duration used when a scene leaves it unset or zero.
pub const DEFAULT_TRANSITION_MS: u64 = 500;

/// Run one scene's script and finalize the builder into a snapshot.
///
/// Failures are logged with the scene identity and returned unchanged.
#[tracing::instrument(skip_all, fields(scene = %scene.id))]
pub fn assemble_snapshot(
    engine: &ScriptEngine,
    story: &Story,
    scene: &SceneData,
    state: &StoryState,
) -> StoryResult<Snapshot> {
    let result = build_snapshot(engine, story, scene, state);
    if let Err(err) = &result {
        tracing::error!(
            scene = %scene.id,
            header = %scene.header,
            error = %err,
            "failed to assemble snapshot"
        );
    }
    result
}

fn build_snapshot(
    engine: &ScriptEngine,
    story: &Story,
    scene: &SceneData,
    state: &StoryState,
) -> StoryResult<Snapshot> {
    let builder = MvsBuilder::new();
    let script = engine.compile(&scene.id, &story.javascript, &scene.javascript)?;
    script.run(engine, &builder, state)?;

    if let Some(camera) = &scene.camera {
        builder.camera(camera_params(camera))?;
    }

    Ok(builder.snapshot(snapshot_metadata(scene)))
}

/// Snapshot metadata for `scene`, with defaults substituted for unset or zero durations.
pub fn snapshot_metadata(scene: &SceneData) -> SnapshotMetadata {
    let key = scene.key.trim();
    SnapshotMetadata {
        key: (!key.is_empty()).then(|| key.to_string()),
        title: scene.header.clone(),
        description: scene.description.clone(),
        description_format: DescriptionFormat::Markdown,
        linger_duration_ms: nonzero_or(scene.linger_duration_ms, DEFAULT_LINGER_MS),
        transition_duration_ms: nonzero_or(scene.transition_duration_ms, DEFAULT_TRANSITION_MS),
    }
}

fn nonzero_or(value: Option<u64>, default: u64) -> u64 {
    value.filter(|&ms| ms != 0).unwrap_or(default)
}

fn camera_params(camera: &CameraData) -> Params {
    let mut params = Params::new();
    params.insert("target".to_string(), json!(camera.target));
    params.insert(
        "position".to_string(),
        json!(adjusted_camera_position(camera)),
    );
    params.insert("up".to_string(), json!(camera.up));
    params
}

#[cfg(test)]
#[path = "../../tests/unit/compile/snapshot.rs"]
mod tests;
