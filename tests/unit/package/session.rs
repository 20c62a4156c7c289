use super::*;
use crate::story::{
    dsl::{SceneBuilder, StoryBuilder},
    model::{CameraData, ProjectionMode, Story},
};

fn sample_story() -> Story {
    StoryBuilder::new("Session sample")
        .javascript("let s = builder.state;")
        .scene(
            SceneBuilder::new("intro", "Intro")
                .key("intro")
                .description("# Hello\n\nA *markdown* body.")
                .javascript(r#"builder.download(#{ url: "./1cbs.cif" }).parse(#{ format: "mmcif" });"#)
                .camera(CameraData {
                    mode: ProjectionMode::Orthographic,
                    target: [1.0, 2.0, 3.0],
                    position: [1.0, 2.0, 30.0],
                    up: [0.0, 1.0, 0.0],
                    fov: 0.7,
                })
                .linger_ms(8000)
                .build(),
        )
        .scene(SceneBuilder::new("outro", "Outro").transition_ms(250).build())
        .asset("1cbs.cif", b"data_1cbs\n".to_vec())
        .build()
        .unwrap()
}

fn noise(len: usize) -> Vec<u8> {
    let mut x: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x >> 24) as u8
        })
        .collect()
}

#[test]
fn session_round_trip_preserves_the_story() {
    let container = StoryContainer::new(sample_story());
    let bytes = prepare_session_data(&container).unwrap();
    let restored = load_session_data(&bytes).unwrap();

    assert_eq!(restored.version, STORY_FORMAT_VERSION);
    assert_eq!(restored.story.scenes.len(), 2);
    assert_eq!(restored.story.scenes[0].header, "Intro");
    assert_eq!(restored.story.javascript, "let s = builder.state;");
    assert_eq!(restored, container);
}

#[test]
fn repetitive_content_is_compressed() {
    let mut story = sample_story();
    story.scenes[0].description = "lorem ipsum ".repeat(10_000);
    let bytes = prepare_session_data(&StoryContainer::new(story)).unwrap();
    assert!(bytes.len() < 10_000);
}

#[test]
fn oversized_sessions_are_rejected() {
    let mut story = sample_story();
    story.assets.push(crate::story::model::SceneAsset {
        name: "noise.bin".to_string(),
        content: noise(4096),
    });

    let err = prepare_session_data_with_limit(&StoryContainer::new(story), 1024).unwrap_err();
    match err {
        StoryError::Validation(msg) => {
            assert!(msg.starts_with("session data size "));
            assert!(msg.ends_with("exceeds maximum allowed size of 1024 bytes"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn default_ceiling_is_fifty_mebibytes() {
    assert_eq!(MAX_SESSION_BYTES, 52_428_800);

    let mut story = sample_story();
    story.assets.push(crate::story::model::SceneAsset {
        name: "noise.bin".to_string(),
        content: noise(MAX_SESSION_BYTES + 1024 * 1024),
    });
    let err = prepare_session_data(&StoryContainer::new(story)).unwrap_err();
    assert!(err.to_string().contains("52428800 bytes"));
}

#[test]
fn garbage_is_not_a_session() {
    assert!(load_session_data(b"\x00\x01 not deflate data").is_err());
}

#[test]
fn unknown_versions_are_rejected() {
    let mut container = StoryContainer::new(sample_story());
    container.version = STORY_FORMAT_VERSION + 1;
    let bytes = prepare_session_data(&container).unwrap();
    assert!(matches!(
        load_session_data(&bytes),
        Err(StoryError::Validation(_))
    ));
}

#[test]
fn inflation_stops_at_the_limit() {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(DEFLATE_LEVEL));
    encoder.write_all(&vec![0u8; 1024 * 1024]).unwrap();
    let bomb = encoder.finish().unwrap();
    assert!(bomb.len() < 16 * 1024);

    let err = load_session_data_with_limit(&bomb, 64 * 1024).unwrap_err();
    match err {
        StoryError::Validation(msg) => assert!(msg.contains("65536 bytes")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sessions_within_the_inflation_limit_load() {
    let container = StoryContainer::new(sample_story());
    let bytes = prepare_session_data(&container).unwrap();
    let encoded_len = bincode::serialize(&container).unwrap().len();

    assert_eq!(
        load_session_data_with_limit(&bytes, encoded_len).unwrap(),
        container
    );
    assert!(load_session_data_with_limit(&bytes, encoded_len - 1).is_err());
}
