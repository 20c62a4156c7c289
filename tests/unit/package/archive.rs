use super::*;
use crate::mvs::{
    builder::MvsBuilder,
    tree::{IndexKind, IndexMetadata, SnapshotMetadata},
};

fn index() -> StoryIndex {
    let builder = MvsBuilder::new();
    builder
        .download(serde_json::json!({ "url": "./1cbs.cif" }).as_object().unwrap().clone())
        .unwrap();
    StoryIndex {
        kind: IndexKind::Multiple,
        metadata: IndexMetadata {
            title: "archive".to_string(),
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            version: "1".to_string(),
        },
        snapshots: vec![builder.snapshot(SnapshotMetadata {
            key: None,
            title: "one".to_string(),
            description: String::new(),
            description_format: Default::default(),
            linger_duration_ms: 5000,
            transition_duration_ms: 500,
        })],
    }
}

fn asset(name: &str, content: &[u8]) -> SceneAsset {
    SceneAsset {
        name: name.to_string(),
        content: content.to_vec(),
    }
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[test]
fn index_is_the_first_entry() {
    let bytes = package_archive(&index(), &[asset("1cbs.cif", b"data_1cbs")]).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    assert_eq!(archive.len(), 2);
    assert_eq!(archive.by_index(0).unwrap().name(), INDEX_ENTRY_NAME);
    assert_eq!(archive.by_index(1).unwrap().name(), "1cbs.cif");
}

#[test]
fn entries_are_deflated() {
    let bytes = package_archive(&index(), &[asset("a.txt", &[b'a'; 4096])]).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    let entry = archive.by_name("a.txt").unwrap();
    assert_eq!(entry.compression(), CompressionMethod::Deflated);
    assert!(entry.compressed_size() < entry.size());
}

#[test]
fn unpack_restores_index_and_assets() {
    let original = index();
    let assets = vec![asset("x.bcif", &[0, 1, 2, 255]), asset("dir/y.json", b"{}")];
    let bytes = package_archive(&original, &assets).unwrap();

    let (restored, restored_assets) = unpack_archive(&bytes).unwrap();
    assert_eq!(restored, original);
    assert_eq!(restored_assets, assets);
}

#[test]
fn archive_without_assets_holds_only_the_index() {
    let bytes = package_archive(&index(), &[]).unwrap();
    assert_eq!(entry_names(&bytes), [INDEX_ENTRY_NAME]);
}

#[test]
fn colliding_asset_names_are_rejected() {
    let err = package_archive(&index(), &[asset("a", b"1"), asset("a", b"2")]).unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)));

    let err = package_archive(&index(), &[asset(INDEX_ENTRY_NAME, b"{}")]).unwrap_err();
    assert!(err.to_string().contains("reserved"));
}

#[test]
fn unpack_requires_an_index_entry() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("other.txt", entry_options()).unwrap();
    zip.write_all(b"hello").unwrap();
    let bytes = zip.finish().unwrap().into_inner();

    let err = unpack_archive(&bytes).unwrap_err();
    assert!(matches!(err, StoryError::Archive(_)));
}

#[test]
fn unpack_rejects_non_zip_bytes() {
    assert!(matches!(
        unpack_archive(b"definitely not a zip"),
        Err(StoryError::Archive(_))
    ));
}

fn patch_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn nth_signature(bytes: &[u8], sig: &[u8; 4], n: usize) -> usize {
    bytes
        .windows(4)
        .enumerate()
        .filter(|(_, w)| w == sig)
        .nth(n)
        .map(|(i, _)| i)
        .unwrap()
}

#[test]
fn declared_entry_size_is_not_trusted() {
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(INDEX_ENTRY_NAME, stored).unwrap();
    zip.write_all(&serde_json::to_vec(&index()).unwrap()).unwrap();
    zip.start_file("tiny.bin", stored).unwrap();
    zip.write_all(b"tiny").unwrap();
    let mut bytes = zip.finish().unwrap().into_inner();

    // claim an almost-4 GiB uncompressed size for the second entry
    let local = nth_signature(&bytes, b"PK\x03\x04", 1);
    patch_u32(&mut bytes, local + 22, 0xFFFF_FFF0);
    let central = nth_signature(&bytes, b"PK\x01\x02", 1);
    patch_u32(&mut bytes, central + 24, 0xFFFF_FFF0);

    match unpack_archive(&bytes) {
        Ok((_, assets)) => assert_eq!(assets[0].content, b"tiny"),
        Err(err) => assert!(matches!(err, StoryError::Archive(_) | StoryError::Other(_))),
    }
}
