use rhai::{AST, Engine, Scope, module_resolvers::DummyModuleResolver};

use crate::{
    foundation::error::{StoryError, StoryResult},
    mvs::builder::MvsBuilder,
    script::api::{ScriptRoot, StoryState, register_builder_api},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Resource ceilings applied to every scene script.
pub struct SandboxLimits {
    /// Maximum number of interpreter operations per scene.
    pub max_operations: u64,
    /// Maximum function call nesting.
    pub max_call_levels: usize,
    /// Maximum expression nesting at global level.
    pub max_expr_depth: usize,
    /// Maximum expression nesting inside functions.
    pub max_function_expr_depth: usize,
    /// Maximum string length in bytes.
    pub max_string_size: usize,
    /// Maximum array length.
    pub max_array_size: usize,
    /// Maximum object map size.
    pub max_map_size: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_operations: 5_000_000,
            max_call_levels: 64,
            max_expr_depth: 128,
            max_function_expr_depth: 64,
            max_string_size: 4 * 1024 * 1024,
            max_array_size: 1_000_000,
            max_map_size: 10_000,
        }
    }
}

/// Interpreter configured with the builder API and sandbox limits.
///
/// One engine is built per story generation and reused for every scene.
pub struct ScriptEngine {
    engine: Engine,
}

impl ScriptEngine {
    /// Build an engine with the given limits.
    pub fn new(limits: &SandboxLimits) -> Self {
        let mut engine = Engine::new();

        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_function_expr_depth);
        engine.set_max_call_levels(limits.max_call_levels);
        engine.set_max_operations(limits.max_operations);
        engine.set_max_string_size(limits.max_string_size);
        engine.set_max_array_size(limits.max_array_size);
        engine.set_max_map_size(limits.max_map_size);

        // no `import`: scripts only see the builder
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.disable_symbol("eval");

        engine
            .on_print(|text| tracing::info!(target: "mvs_story::script", "{text}"))
            .on_debug(|text, source, pos| {
                tracing::debug!(target: "mvs_story::script", ?source, %pos, "{text}")
            });

        register_builder_api(&mut engine);

        Self { engine }
    }

    /// Compile the story script followed by the scene script into one unit.
    pub fn compile(
        &self,
        scene_id: &str,
        story_code: &str,
        scene_code: &str,
    ) -> StoryResult<SceneScript> {
        let source = format!("{story_code}\n\n{scene_code}");
        let ast = self
            .engine
            .compile(&source)
            .map_err(|e| StoryError::script(scene_id, e.to_string()))?;
        Ok(SceneScript {
            scene_id: scene_id.to_string(),
            ast,
        })
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new(&SandboxLimits::default())
    }
}

/// A compiled scene unit, ready to run against a builder.
pub struct SceneScript {
    scene_id: String,
    ast: AST,
}

impl SceneScript {
    /// Id of the scene this unit was compiled for.
    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    /// Run the unit with `builder` as its only bound name.
    ///
    /// `state` is visible to the script as `builder.state`; writes to it are kept
    /// for the next scene.
    pub fn run(
        &self,
        engine: &ScriptEngine,
        builder: &MvsBuilder,
        state: &StoryState,
    ) -> StoryResult<()> {
        let _span = tracing::debug_span!("scene_script", scene = %self.scene_id).entered();

        let mut scope = Scope::new();
        scope.push(
            "builder",
            ScriptRoot {
                builder: builder.clone(),
                state: state.clone(),
            },
        );

        engine
            .engine
            .run_ast_with_scope(&mut scope, &self.ast)
            .map_err(|e| StoryError::script(&self.scene_id, e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/sandbox.rs"]
mod tests;
