//! Fluent recorder for MVS state trees.
//!
//! Every handle is a cheap clone of a shared node, so chained and branching calls
//! (`structure.component(..)` twice from the same `structure`) append to the same tree.
//! Handles are typed by node kind: only the children MVS allows under a kind can be
//! created from its handle.

use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use crate::{
    foundation::error::{StoryError, StoryResult},
    mvs::tree::{Params, Snapshot, SnapshotMetadata, TreeNode},
};

#[derive(Debug)]
struct NodeData {
    kind: &'static str,
    params: Params,
    children: Vec<NodeRef>,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeRef(Rc<RefCell<NodeData>>);

impl NodeRef {
    fn new(kind: &'static str, params: Params) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            params,
            children: Vec::new(),
        })))
    }

    fn append(&self, kind: &'static str, params: Params) -> StoryResult<NodeRef> {
        check_required(kind, &params)?;
        let child = NodeRef::new(kind, params);
        self.0.borrow_mut().children.push(child.clone());
        Ok(child)
    }

    fn to_tree(&self) -> TreeNode {
        let data = self.0.borrow();
        TreeNode {
            kind: data.kind.to_string(),
            params: data.params.clone(),
            children: data.children.iter().map(NodeRef::to_tree).collect(),
        }
    }
}

fn required_params(kind: &str) -> &'static [&'static str] {
    match kind {
        "download" => &["url"],
        "parse" => &["format"],
        "component_from_uri" | "color_from_uri" | "label_from_uri" | "tooltip_from_uri" => {
            &["uri", "format", "schema"]
        }
        "component_from_source" | "color_from_source" | "label_from_source"
        | "tooltip_from_source" => &["schema"],
        "label" | "tooltip" => &["text"],
        "opacity" => &["opacity"],
        "camera" => &["target", "position"],
        "canvas" => &["background_color"],
        "primitives_from_uri" => &["uri", "format"],
        _ => &[],
    }
}

/// Script-facing primitive methods.
pub(crate) const PRIMITIVE_METHODS: &[&str] = &[
    "mesh", "lines", "tube", "arrow", "distance", "angle", "label", "ellipse", "ellipsoid",
    "sphere", "box",
];

/// MVS `kind` written by a primitive method, and the parameters it requires.
fn primitive_spec(method: &str) -> Option<(&'static str, &'static [&'static str])> {
    Some(match method {
        "mesh" => ("mesh", &["vertices", "indices"]),
        "lines" => ("lines", &["vertices", "indices"]),
        "tube" => ("tube", &["start", "end"]),
        "arrow" => ("arrow", &["start"]),
        "distance" => ("distance_measurement", &["start", "end"]),
        "angle" => ("angle_measurement", &["a", "b", "c"]),
        "label" => ("label", &["position", "text"]),
        "ellipse" => ("ellipse", &["center"]),
        "ellipsoid" => ("ellipsoid", &["center"]),
        // a sphere is an ellipsoid with a scalar radius
        "sphere" => ("ellipsoid", &["center", "radius"]),
        "box" => ("box", &["center"]),
        _ => return None,
    })
}

fn check_required(kind: &str, params: &Params) -> StoryResult<()> {
    for name in required_params(kind) {
        if params.get(*name).is_none_or(Value::is_null) {
            return Err(StoryError::validation(format!(
                "{kind} requires parameter '{name}'"
            )));
        }
    }
    Ok(())
}

fn with_default(mut params: Params, key: &str, value: &str) -> Params {
    params
        .entry(key.to_string())
        .or_insert_with(|| Value::String(value.to_string()));
    params
}

fn with_forced(mut params: Params, key: &str, value: &str) -> Params {
    params.insert(key.to_string(), Value::String(value.to_string()));
    params
}

macro_rules! node_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            node: NodeRef,
        }

        impl $name {
            fn wrap(node: NodeRef) -> Self {
                Self { node }
            }
        }
    };
}

node_handle!(
    /// Root of an MVS tree; the object scene scripts receive as `builder`.
    MvsBuilder
);
node_handle!(
    /// `download` node: a resource fetched by the viewer.
    Download
);
node_handle!(
    /// `parse` node: a downloaded resource interpreted in a given format.
    Parse
);
node_handle!(
    /// `structure` node.
    Structure
);
node_handle!(
    /// `component` (or `component_from_*`) node: a selection of a structure.
    Component
);
node_handle!(
    /// `representation` node of a structure component.
    Representation
);
node_handle!(
    /// `volume` node.
    Volume
);
node_handle!(
    /// `volume_representation` node.
    VolumeRepresentation
);
node_handle!(
    /// `primitives` group node.
    Primitives
);

impl Default for MvsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MvsBuilder {
    /// Fresh tree with an empty `root` node.
    pub fn new() -> Self {
        Self::wrap(NodeRef::new("root", Params::new()))
    }

    /// Declare a resource to be downloaded by the viewer.
    pub fn download(&self, params: Params) -> StoryResult<Download> {
        self.node.append("download", params).map(Download::wrap)
    }

    /// Open a group of geometric primitives.
    pub fn primitives(&self, params: Params) -> StoryResult<Primitives> {
        self.node.append("primitives", params).map(Primitives::wrap)
    }

    /// Load primitives from an external MVS node file.
    pub fn primitives_from_uri(&self, params: Params) -> StoryResult<Self> {
        self.node.append("primitives_from_uri", params)?;
        Ok(self.clone())
    }

    /// Set the camera explicitly (`target`, `position`, optional `up`).
    pub fn camera(&self, params: Params) -> StoryResult<Self> {
        self.node.append("camera", params)?;
        Ok(self.clone())
    }

    /// Set canvas properties such as `background_color`.
    pub fn canvas(&self, params: Params) -> StoryResult<Self> {
        self.node.append("canvas", params)?;
        Ok(self.clone())
    }

    /// Current state of the tree.
    pub fn tree(&self) -> TreeNode {
        self.node.to_tree()
    }

    /// Finalize the tree into a snapshot carrying `metadata`.
    pub fn snapshot(&self, metadata: SnapshotMetadata) -> Snapshot {
        Snapshot {
            root: self.tree(),
            metadata,
        }
    }
}

impl Download {
    /// Interpret the downloaded data (`format`: `mmcif`, `bcif`, `pdb`, ...).
    pub fn parse(&self, params: Params) -> StoryResult<Parse> {
        self.node.append("parse", params).map(Parse::wrap)
    }
}

impl Parse {
    fn structure(&self, kind: &str, params: Params) -> StoryResult<Structure> {
        self.node
            .append("structure", with_forced(params, "type", kind))
            .map(Structure::wrap)
    }

    /// Structure of the deposited model.
    pub fn model_structure(&self, params: Params) -> StoryResult<Structure> {
        self.structure("model", params)
    }

    /// Biological assembly structure.
    pub fn assembly_structure(&self, params: Params) -> StoryResult<Structure> {
        self.structure("assembly", params)
    }

    /// Crystal symmetry structure.
    pub fn symmetry_structure(&self, params: Params) -> StoryResult<Structure> {
        self.structure("symmetry", params)
    }

    /// Symmetry mates structure.
    pub fn symmetry_mates_structure(&self, params: Params) -> StoryResult<Structure> {
        self.structure("symmetry_mates", params)
    }

    /// Volumetric data channel.
    pub fn volume(&self, params: Params) -> StoryResult<Volume> {
        self.node.append("volume", params).map(Volume::wrap)
    }
}

impl Structure {
    /// Select part of the structure; `selector` defaults to `all`.
    pub fn component(&self, params: Params) -> StoryResult<Component> {
        self.node
            .append("component", with_default(params, "selector", "all"))
            .map(Component::wrap)
    }

    /// Select part of the structure using an annotation file.
    pub fn component_from_uri(&self, params: Params) -> StoryResult<Component> {
        self.node.append("component_from_uri", params).map(Component::wrap)
    }

    /// Select part of the structure using annotations embedded in the source file.
    pub fn component_from_source(&self, params: Params) -> StoryResult<Component> {
        self.node
            .append("component_from_source", params)
            .map(Component::wrap)
    }

    /// Apply a rotation/translation to the structure.
    pub fn transform(&self, params: Params) -> StoryResult<Self> {
        self.node.append("transform", params)?;
        Ok(self.clone())
    }

    /// Labels from an annotation file.
    pub fn label_from_uri(&self, params: Params) -> StoryResult<Self> {
        self.node.append("label_from_uri", params)?;
        Ok(self.clone())
    }

    /// Labels from annotations embedded in the source file.
    pub fn label_from_source(&self, params: Params) -> StoryResult<Self> {
        self.node.append("label_from_source", params)?;
        Ok(self.clone())
    }

    /// Tooltips from an annotation file.
    pub fn tooltip_from_uri(&self, params: Params) -> StoryResult<Self> {
        self.node.append("tooltip_from_uri", params)?;
        Ok(self.clone())
    }

    /// Tooltips from annotations embedded in the source file.
    pub fn tooltip_from_source(&self, params: Params) -> StoryResult<Self> {
        self.node.append("tooltip_from_source", params)?;
        Ok(self.clone())
    }
}

impl Component {
    /// Visual representation; `type` defaults to `cartoon`.
    pub fn representation(&self, params: Params) -> StoryResult<Representation> {
        self.node
            .append("representation", with_default(params, "type", "cartoon"))
            .map(Representation::wrap)
    }

    /// Text label anchored on the component.
    pub fn label(&self, params: Params) -> StoryResult<Self> {
        self.node.append("label", params)?;
        Ok(self.clone())
    }

    /// Hover tooltip on the component.
    pub fn tooltip(&self, params: Params) -> StoryResult<Self> {
        self.node.append("tooltip", params)?;
        Ok(self.clone())
    }

    /// Point the camera at the component.
    pub fn focus(&self, params: Params) -> StoryResult<Self> {
        self.node.append("focus", params)?;
        Ok(self.clone())
    }
}

impl Representation {
    /// Uniform or selector-scoped color.
    pub fn color(&self, params: Params) -> StoryResult<Self> {
        self.node.append("color", params)?;
        Ok(self.clone())
    }

    /// Colors from an annotation file.
    pub fn color_from_uri(&self, params: Params) -> StoryResult<Self> {
        self.node.append("color_from_uri", params)?;
        Ok(self.clone())
    }

    /// Colors from annotations embedded in the source file.
    pub fn color_from_source(&self, params: Params) -> StoryResult<Self> {
        self.node.append("color_from_source", params)?;
        Ok(self.clone())
    }

    /// Representation opacity.
    pub fn opacity(&self, params: Params) -> StoryResult<Self> {
        self.node.append("opacity", params)?;
        Ok(self.clone())
    }
}

impl Volume {
    /// Volume representation; `type` defaults to `isosurface`.
    pub fn representation(&self, params: Params) -> StoryResult<VolumeRepresentation> {
        self.node
            .append(
                "volume_representation",
                with_default(params, "type", "isosurface"),
            )
            .map(VolumeRepresentation::wrap)
    }
}

impl VolumeRepresentation {
    /// Uniform color.
    pub fn color(&self, params: Params) -> StoryResult<Self> {
        self.node.append("color", params)?;
        Ok(self.clone())
    }

    /// Representation opacity.
    pub fn opacity(&self, params: Params) -> StoryResult<Self> {
        self.node.append("opacity", params)?;
        Ok(self.clone())
    }
}

impl Primitives {
    /// Append one primitive through its builder method (`ellipse`, `distance`, `sphere`, ...).
    ///
    /// The method name is lowered to the MVS kind it stands for: `distance` and `angle`
    /// become `distance_measurement` and `angle_measurement`, `sphere` becomes `ellipsoid`.
    pub fn primitive(&self, method: &str, params: Params) -> StoryResult<Self> {
        let Some((kind, required)) = primitive_spec(method) else {
            return Err(StoryError::validation(format!(
                "unknown primitive '{method}'"
            )));
        };
        for name in required {
            if params.get(*name).is_none_or(Value::is_null) {
                return Err(StoryError::validation(format!(
                    "primitive '{method}' requires parameter '{name}'"
                )));
            }
        }
        self.node
            .append("primitive", with_forced(params, "kind", kind))?;
        Ok(self.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mvs/builder.rs"]
mod tests;
