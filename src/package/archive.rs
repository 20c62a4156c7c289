use std::io::{Cursor, Read, Write};

use anyhow::Context;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::{
    foundation::error::{StoryError, StoryResult},
    mvs::tree::StoryIndex,
    story::model::{INDEX_ENTRY_NAME, SceneAsset, validate_asset_names},
};

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Write `index` and `assets` into an in-memory `.mvsx` zip archive.
///
/// The index is stored first as `index.mvsj`; each asset follows under its own name,
/// so scene scripts can reference assets by relative URI.
pub fn package_archive(index: &StoryIndex, assets: &[SceneAsset]) -> StoryResult<Vec<u8>> {
    validate_asset_names(assets)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(INDEX_ENTRY_NAME, entry_options())?;
    let json = serde_json::to_vec(index)?;
    zip.write_all(&json)
        .with_context(|| format!("write archive entry '{INDEX_ENTRY_NAME}'"))?;

    for asset in assets {
        zip.start_file(asset.name.as_str(), entry_options())?;
        zip.write_all(&asset.content)
            .with_context(|| format!("write archive entry '{}'", asset.name))?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Read an archive written by [`package_archive`] back into its index and assets.
///
/// Assets come back in archive order; directory entries are skipped.
pub fn unpack_archive(bytes: &[u8]) -> StoryResult<(StoryIndex, Vec<SceneAsset>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut index = None;
    let mut assets = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .with_context(|| format!("read archive entry '{name}'"))?;

        if name == INDEX_ENTRY_NAME {
            index = Some(serde_json::from_slice::<StoryIndex>(&content)?);
        } else {
            assets.push(SceneAsset { name, content });
        }
    }

    let index = index.ok_or_else(|| {
        StoryError::archive(format!("archive has no '{INDEX_ENTRY_NAME}' entry"))
    })?;
    Ok((index, assets))
}

#[cfg(test)]
#[path = "../../tests/unit/package/archive.rs"]
mod tests;
