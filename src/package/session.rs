//! Compact persisted form of a story.
//!
//! A session blob is the bincode encoding of a [`StoryContainer`], raw-deflated at
//! level 3. Blobs larger than [`MAX_SESSION_BYTES`] after compression are refused, and
//! loading stops inflating past [`MAX_INFLATED_SESSION_BYTES`].

use std::io::{Read, Write};

use anyhow::Context;
use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};

use crate::{
    foundation::error::{StoryError, StoryResult},
    story::model::{STORY_FORMAT_VERSION, StoryContainer},
};

/// Largest accepted session blob, in bytes.
pub const MAX_SESSION_BYTES: usize = 50 * 1024 * 1024;

/// Largest accepted session payload after inflation, in bytes.
pub const MAX_INFLATED_SESSION_BYTES: usize = 512 * 1024 * 1024;

const DEFLATE_LEVEL: u32 = 3;

/// Encode and compress `container` for storage.
pub fn prepare_session_data(container: &StoryContainer) -> StoryResult<Vec<u8>> {
    prepare_session_data_with_limit(container, MAX_SESSION_BYTES)
}

#[tracing::instrument(skip(container), fields(scenes = container.story.scenes.len()))]
pub(crate) fn prepare_session_data_with_limit(
    container: &StoryContainer,
    max_bytes: usize,
) -> StoryResult<Vec<u8>> {
    let encoded = bincode::serialize(container)
        .map_err(|e| StoryError::serde(format!("encode session: {e}")))?;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(DEFLATE_LEVEL));
    encoder.write_all(&encoded).context("deflate session data")?;
    let deflated = encoder.finish().context("deflate session data")?;

    tracing::debug!(
        encoded = encoded.len(),
        deflated = deflated.len(),
        "session data prepared"
    );

    if deflated.len() > max_bytes {
        return Err(StoryError::validation(format!(
            "session data size {} bytes exceeds maximum allowed size of {max_bytes} bytes",
            deflated.len()
        )));
    }
    Ok(deflated)
}

/// Decompress and decode a blob produced by [`prepare_session_data`].
pub fn load_session_data(bytes: &[u8]) -> StoryResult<StoryContainer> {
    load_session_data_with_limit(bytes, MAX_INFLATED_SESSION_BYTES)
}

pub(crate) fn load_session_data_with_limit(
    bytes: &[u8],
    max_inflated: usize,
) -> StoryResult<StoryContainer> {
    let mut encoded = Vec::new();
    DeflateDecoder::new(bytes)
        .take(max_inflated as u64 + 1)
        .read_to_end(&mut encoded)
        .context("inflate session data")?;
    if encoded.len() > max_inflated {
        return Err(StoryError::validation(format!(
            "inflated session data exceeds maximum allowed size of {max_inflated} bytes"
        )));
    }

    let container: StoryContainer = bincode::deserialize(&encoded)
        .map_err(|e| StoryError::serde(format!("decode session: {e}")))?;

    if container.version != STORY_FORMAT_VERSION {
        return Err(StoryError::validation(format!(
            "unsupported session version {} (expected {STORY_FORMAT_VERSION})",
            container.version
        )));
    }
    Ok(container)
}

#[cfg(test)]
#[path = "../../tests/unit/package/session.rs"]
mod tests;
