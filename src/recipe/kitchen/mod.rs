// src/recipe/kitchen/mod.rs

//! Kitchen: where recipes are cooked
//!
//! The Kitchen drives a recipe through its fixed lifecycle:
//! 1. **Configure**: validate settings, resolve dependencies through the provider
//! 2. **Generate**: resolve options, write the generated CMake config
//! 3. **Build**: configure and compile with the external build tool
//! 4. **Package**: install the build output into the package directory
//!
//! Each phase runs only after the previous one succeeded. The first failure
//! stops the cook and is reported together with the phase it happened in.
//! Nothing is rolled back; the generated config from a successful generate
//! phase stays on disk and is rewritten identically on the next run.

mod config;
mod cook;
pub mod emit;
mod phase;
pub mod resolver;
pub mod tool;

pub use config::{default_cache_root, CookResult, KitchenConfig};
pub use cook::{Cook, DEFAULT_BUILD_TYPE};
pub use emit::{CMakeVariable, ConfigLine, GeneratedConfig, ScriptPath};
pub use phase::{Phase, PhaseFailure, RunState};
pub use resolver::{
    ChainProvider, DependencyHandle, DependencyProvider, DependencyResolver, EditableProvider,
    LocalCacheProvider, LookupContext, ResolvedDependency,
};
pub use tool::{BuildTool, CMakeTool, ToolOutput, ToolRequest};

use crate::recipe::format::Recipe;
use crate::recipe::options::OptionValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    provider: Arc<dyn DependencyProvider>,
    tool: Arc<dyn BuildTool>,
}

impl Kitchen {
    /// Create a Kitchen with an explicit provider and build tool
    pub fn new(
        config: KitchenConfig,
        provider: Arc<dyn DependencyProvider>,
        tool: Arc<dyn BuildTool>,
    ) -> Self {
        Self {
            config,
            provider,
            tool,
        }
    }

    /// Create a Kitchen reading the local cache and driving CMake
    pub fn with_defaults(config: KitchenConfig) -> Self {
        let provider = Arc::new(LocalCacheProvider::new(&config.cache_root));
        let tool = Arc::new(CMakeTool::new(&config.cmake));
        Self::new(config, provider, tool)
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Cook a recipe through all phases
    ///
    /// `overrides` are user option values applied on top of the recipe's
    /// defaults during the generate phase.
    pub fn cook(
        &self,
        recipe: &Recipe,
        overrides: &BTreeMap<String, OptionValue>,
    ) -> std::result::Result<CookResult, PhaseFailure> {
        info!(
            "Cooking {} with {} requirement(s)",
            recipe.package.name,
            recipe.requires.len() + recipe.build_requires.len()
        );

        let mut cook = Cook::new(self, recipe, overrides);
        while cook.step()?.is_some() {}

        let result = cook.finish();
        info!(
            "Cooked {}: {}",
            result.package,
            result
                .phases
                .iter()
                .map(Phase::as_str)
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(result)
    }
}
