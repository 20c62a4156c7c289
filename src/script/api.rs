//! Builder API exposed to scene scripts.
//!
//! Method names follow the viewer library's JavaScript builder (`modelStructure`,
//! `colorFromUri`, ...), so scripts read like the snippets in its documentation:
//!
//! ```text
//! builder.download(#{ url: "https://www.ebi.ac.uk/pdbe/entry-files/download/1cbs_updated.cif" })
//!     .parse(#{ format: "mmcif" })
//!     .modelStructure()
//!     .component()
//!     .representation()
//!     .color(#{ color: "blue" });
//! ```
//!
//! Every method takes an optional object map of parameters. A method that does not
//! exist on the receiving node kind is a script error.

use std::{cell::RefCell, rc::Rc};

use rhai::{Dynamic, Engine, EvalAltResult, Map};

use crate::{
    foundation::error::{StoryError, StoryResult},
    mvs::builder::{
        Component, Download, MvsBuilder, PRIMITIVE_METHODS, Parse, Primitives, Representation,
        Structure, Volume, VolumeRepresentation,
    },
    mvs::tree::Params,
};

/// Story-wide object map carried from one scene script to the next.
///
/// Scripts reach it as `builder.state`; it starts empty for every generation.
#[derive(Clone, Debug, Default)]
pub struct StoryState(Rc<RefCell<Map>>);

impl StoryState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Dynamic> {
        self.0.borrow().get(key).cloned()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether no script stored anything yet.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// The value bound to `builder` in a script scope.
#[derive(Clone)]
pub(crate) struct ScriptRoot {
    pub(crate) builder: MvsBuilder,
    pub(crate) state: StoryState,
}

fn to_params(map: Map) -> Result<Params, Box<EvalAltResult>> {
    match rhai::serde::from_dynamic::<serde_json::Value>(&Dynamic::from_map(map))? {
        serde_json::Value::Object(params) => Ok(params),
        other => Err(format!("expected an object map of parameters, got {other}").into()),
    }
}

fn to_eval_error(err: StoryError) -> Box<EvalAltResult> {
    match err {
        StoryError::Validation(msg) => msg.into(),
        other => other.to_string().into(),
    }
}

/// Register `$name` on `$recv` twice: with an object map of parameters and without arguments.
macro_rules! method {
    ($engine:expr, $name:expr, $recv:ty => $ret:ty, $f:expr) => {{
        let f = $f;
        let with_params = f.clone();
        $engine.register_fn(
            $name,
            move |this: &mut $recv, params: Map| -> Result<$ret, Box<EvalAltResult>> {
                with_params(&*this, to_params(params)?).map_err(to_eval_error)
            },
        );
        $engine.register_fn(
            $name,
            move |this: &mut $recv| -> Result<$ret, Box<EvalAltResult>> {
                f(&*this, Params::new()).map_err(to_eval_error)
            },
        );
    }};
}

fn root_method(
    engine: &mut Engine,
    name: &str,
    f: fn(&MvsBuilder, Params) -> StoryResult<MvsBuilder>,
) {
    engine.register_fn(
        name,
        move |this: &mut ScriptRoot, params: Map| -> Result<ScriptRoot, Box<EvalAltResult>> {
            f(&this.builder, to_params(params)?).map_err(to_eval_error)?;
            Ok(this.clone())
        },
    );
}

pub(crate) fn register_builder_api(engine: &mut Engine) {
    engine
        .register_type_with_name::<ScriptRoot>("Builder")
        .register_type_with_name::<Download>("Download")
        .register_type_with_name::<Parse>("Parse")
        .register_type_with_name::<Structure>("Structure")
        .register_type_with_name::<Component>("Component")
        .register_type_with_name::<Representation>("Representation")
        .register_type_with_name::<Volume>("Volume")
        .register_type_with_name::<VolumeRepresentation>("VolumeRepresentation")
        .register_type_with_name::<Primitives>("Primitives");

    engine
        .register_get("state", |root: &mut ScriptRoot| -> Map {
            root.state.0.borrow().clone()
        })
        .register_set("state", |root: &mut ScriptRoot, value: Map| {
            *root.state.0.borrow_mut() = value;
        });

    method!(engine, "download", ScriptRoot => Download, |r: &ScriptRoot, p: Params| {
        r.builder.download(p)
    });
    method!(engine, "primitives", ScriptRoot => Primitives, |r: &ScriptRoot, p: Params| {
        r.builder.primitives(p)
    });
    root_method(engine, "primitivesFromUri", MvsBuilder::primitives_from_uri);
    root_method(engine, "camera", MvsBuilder::camera);
    root_method(engine, "canvas", MvsBuilder::canvas);

    method!(engine, "parse", Download => Parse, Download::parse);

    method!(engine, "modelStructure", Parse => Structure, Parse::model_structure);
    method!(engine, "assemblyStructure", Parse => Structure, Parse::assembly_structure);
    method!(engine, "symmetryStructure", Parse => Structure, Parse::symmetry_structure);
    method!(
        engine,
        "symmetryMatesStructure",
        Parse => Structure,
        Parse::symmetry_mates_structure
    );
    method!(engine, "volume", Parse => Volume, Parse::volume);

    method!(engine, "component", Structure => Component, Structure::component);
    method!(engine, "componentFromUri", Structure => Component, Structure::component_from_uri);
    method!(
        engine,
        "componentFromSource",
        Structure => Component,
        Structure::component_from_source
    );
    method!(engine, "transform", Structure => Structure, Structure::transform);
    method!(engine, "labelFromUri", Structure => Structure, Structure::label_from_uri);
    method!(engine, "labelFromSource", Structure => Structure, Structure::label_from_source);
    method!(engine, "tooltipFromUri", Structure => Structure, Structure::tooltip_from_uri);
    method!(engine, "tooltipFromSource", Structure => Structure, Structure::tooltip_from_source);

    method!(engine, "representation", Component => Representation, Component::representation);
    method!(engine, "label", Component => Component, Component::label);
    method!(engine, "tooltip", Component => Component, Component::tooltip);
    method!(engine, "focus", Component => Component, Component::focus);

    method!(engine, "color", Representation => Representation, Representation::color);
    method!(engine, "colorFromUri", Representation => Representation, Representation::color_from_uri);
    method!(
        engine,
        "colorFromSource",
        Representation => Representation,
        Representation::color_from_source
    );
    method!(engine, "opacity", Representation => Representation, Representation::opacity);

    method!(engine, "representation", Volume => VolumeRepresentation, Volume::representation);
    method!(engine, "color", VolumeRepresentation => VolumeRepresentation, VolumeRepresentation::color);
    method!(engine, "opacity", VolumeRepresentation => VolumeRepresentation, VolumeRepresentation::opacity);

    for &method in PRIMITIVE_METHODS {
        engine.register_fn(
            method,
            move |this: &mut Primitives, params: Map| -> Result<Primitives, Box<EvalAltResult>> {
                this.primitive(method, to_params(params)?)
                    .map_err(to_eval_error)
            },
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/api.rs"]
mod tests;
