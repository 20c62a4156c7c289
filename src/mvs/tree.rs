use crate::foundation::error::StoryResult;

/// MVS format version written into every story index.
pub const MVS_VERSION: &str = "1";

/// Parameter object attached to a tree node.
pub type Params = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One node of an MVS state tree.
pub struct TreeNode {
    /// MVS node kind (`root`, `download`, `structure`, ...).
    pub kind: String,
    /// Node parameters; omitted when empty.
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
    /// Child nodes in declaration order; omitted when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// First direct child of the given kind.
    pub fn child(&self, kind: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Depth-first iterator over this node and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Markup language of a snapshot description.
pub enum DescriptionFormat {
    /// Markdown text.
    #[default]
    Markdown,
    /// Plain text.
    Plaintext,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Presentation metadata of one snapshot.
pub struct SnapshotMetadata {
    /// Deep-link key; absent rather than empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Snapshot title.
    pub title: String,
    /// Snapshot description.
    pub description: String,
    /// Markup of `description`.
    pub description_format: DescriptionFormat,
    /// Time the viewer stays on this snapshot (ms).
    pub linger_duration_ms: u64,
    /// Duration of the transition into this snapshot (ms).
    pub transition_duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Finalized, viewer-ready state of one scene.
pub struct Snapshot {
    /// Root of the state tree.
    pub root: TreeNode,
    /// Presentation metadata.
    pub metadata: SnapshotMetadata,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Discriminator of the top-level MVS document.
pub enum IndexKind {
    /// A sequence of snapshots.
    #[default]
    Multiple,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Story-level metadata of an index.
pub struct IndexMetadata {
    /// Story title.
    pub title: String,
    /// ISO-8601 generation time.
    pub timestamp: String,
    /// MVS format version.
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// All snapshots of a story plus its metadata; the `.mvsj` document.
pub struct StoryIndex {
    /// Always [`IndexKind::Multiple`].
    pub kind: IndexKind,
    /// Story metadata.
    pub metadata: IndexMetadata,
    /// Snapshots in scene order.
    pub snapshots: Vec<Snapshot>,
}

impl StoryIndex {
    /// Compact JSON text of the index.
    pub fn to_json(&self) -> StoryResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
