use super::*;
use crate::{
    camera::adjust::fov_centered_position,
    foundation::error::StoryError,
    story::model::{ProjectionMode, StoryMetadata},
};

fn story(prelude: &str) -> Story {
    Story {
        metadata: StoryMetadata {
            title: "unit".to_string(),
        },
        javascript: prelude.to_string(),
        scenes: Vec::new(),
        assets: Vec::new(),
    }
}

fn scene(code: &str) -> SceneData {
    SceneData {
        id: "s0".to_string(),
        header: "Header".to_string(),
        key: "  key0  ".to_string(),
        description: "# Desc".to_string(),
        javascript: code.to_string(),
        ..SceneData::default()
    }
}

fn assemble(story: &Story, scene: &SceneData) -> StoryResult<Snapshot> {
    assemble_snapshot(&ScriptEngine::default(), story, scene, &StoryState::new())
}

#[test]
fn metadata_applies_defaults_for_unset_durations() {
    let m = snapshot_metadata(&scene(""));
    assert_eq!(m.linger_duration_ms, DEFAULT_LINGER_MS);
    assert_eq!(m.transition_duration_ms, DEFAULT_TRANSITION_MS);
}

#[test]
fn metadata_treats_zero_durations_as_unset() {
    let mut s = scene("");
    s.linger_duration_ms = Some(0);
    s.transition_duration_ms = Some(0);
    let m = snapshot_metadata(&s);
    assert_eq!(m.linger_duration_ms, 5000);
    assert_eq!(m.transition_duration_ms, 500);
}

#[test]
fn metadata_passes_explicit_durations_through() {
    let mut s = scene("");
    s.linger_duration_ms = Some(1234);
    s.transition_duration_ms = Some(77);
    let m = snapshot_metadata(&s);
    assert_eq!(m.linger_duration_ms, 1234);
    assert_eq!(m.transition_duration_ms, 77);
}

#[test]
fn metadata_trims_key_and_drops_blank_keys() {
    assert_eq!(snapshot_metadata(&scene("")).key.as_deref(), Some("key0"));

    for blank in ["", "   ", "\t\n"] {
        let mut s = scene("");
        s.key = blank.to_string();
        assert_eq!(snapshot_metadata(&s).key, None);
    }
}

#[test]
fn metadata_copies_header_and_description() {
    let m = snapshot_metadata(&scene(""));
    assert_eq!(m.title, "Header");
    assert_eq!(m.description, "# Desc");
    assert_eq!(m.description_format, DescriptionFormat::Markdown);
}

#[test]
fn snapshot_contains_the_script_tree() {
    let snap = assemble(
        &story(""),
        &scene(r#"builder.download(#{ url: "u" }).parse(#{ format: "pdb" });"#),
    )
    .unwrap();
    assert_eq!(snap.root.kind, "root");
    assert_eq!(snap.root.children[0].kind, "download");
    assert_eq!(snap.metadata.title, "Header");
}

#[test]
fn camera_is_registered_with_adjusted_position() {
    let camera = CameraData {
        mode: ProjectionMode::Perspective,
        target: [1.0, 2.0, 3.0],
        position: [1.0, 2.0, 43.0],
        up: [0.0, 1.0, 0.0],
        fov: std::f64::consts::FRAC_PI_4,
    };
    let mut s = scene("");
    s.camera = Some(camera);
    let snap = assemble(&story(""), &s).unwrap();

    let cam = snap.root.child("camera").unwrap();
    let position: [f64; 3] = serde_json::from_value(cam.params["position"].clone()).unwrap();
    let target: [f64; 3] = serde_json::from_value(cam.params["target"].clone()).unwrap();
    assert_eq!(target, camera.target);
    assert_eq!(cam.params["up"], serde_json::json!([0.0, 1.0, 0.0]));

    let restored = fov_centered_position(camera.mode, camera.fov, target, position);
    for (a, b) in restored.iter().zip(camera.position.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn camera_is_appended_after_script_nodes() {
    let mut s = scene(r#"builder.canvas(#{ background_color: "black" });"#);
    s.camera = Some(CameraData {
        mode: ProjectionMode::Orthographic,
        target: [0.0; 3],
        position: [0.0, 0.0, 10.0],
        up: [0.0, 1.0, 0.0],
        fov: 1.0,
    });
    let snap = assemble(&story(""), &s).unwrap();
    let kinds: Vec<_> = snap.root.children.iter().map(|c| c.kind.as_str()).collect();
    assert_eq!(kinds, ["canvas", "camera"]);
}

#[test]
fn script_failure_is_returned_with_scene_id() {
    let err = assemble(&story(""), &scene(r#"throw "nope";"#)).unwrap_err();
    match err {
        StoryError::Script { scene, message } => {
            assert_eq!(scene, "s0");
            assert!(message.contains("nope"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn prelude_failure_fails_the_scene() {
    let err = assemble(&story("let x = ;"), &scene("")).unwrap_err();
    assert!(matches!(err, StoryError::Script { .. }));
}
