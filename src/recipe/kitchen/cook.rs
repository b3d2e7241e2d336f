// src/recipe/kitchen/cook.rs

//! Cook: one run of the phase lifecycle for a single recipe

use crate::error::{ConfigurationError, Result};
use crate::recipe::format::{Generator, Recipe, SettingAxis};
use crate::recipe::options::{OptionValue, ResolvedOptions};
use crate::recipe::requirement::RequirementKind;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::config::CookResult;
use super::emit::{emit, write};
use super::phase::{Phase, PhaseFailure, RunState};
use super::resolver::{DependencyResolver, LookupContext, ResolvedDependency};
use super::tool::{ToolOutput, ToolRequest, TOOLCHAIN_FILE};
use super::Kitchen;

/// Build type used when the recipe declares the axis but none was given
pub const DEFAULT_BUILD_TYPE: &str = "Release";

/// A single cook operation
///
/// Phases run strictly in [`Phase::ALL`] order through [`Cook::step`];
/// once a phase fails no further phase runs.
pub struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: &'a Recipe,
    overrides: &'a BTreeMap<String, OptionValue>,
    state: RunState,
    completed: Vec<Phase>,
    settings: BTreeMap<SettingAxis, String>,
    dependencies: Vec<ResolvedDependency>,
    resolved: ResolvedOptions,
    config_path: PathBuf,
    toolchain_file: Option<PathBuf>,
    /// Build log accumulator
    log: String,
    warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    pub fn new(
        kitchen: &'a Kitchen,
        recipe: &'a Recipe,
        overrides: &'a BTreeMap<String, OptionValue>,
    ) -> Self {
        let config_path = kitchen
            .config
            .build_dir
            .join(&recipe.generated.config_file);

        Self {
            kitchen,
            recipe,
            overrides,
            state: RunState::NotStarted,
            completed: Vec::new(),
            settings: BTreeMap::new(),
            dependencies: Vec::new(),
            resolved: ResolvedOptions::default(),
            config_path,
            toolchain_file: None,
            log: String::new(),
            warnings: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Phases that completed, in order
    pub fn completed(&self) -> &[Phase] {
        &self.completed
    }

    /// The phase [`Cook::step`] would run next
    pub fn next_phase(&self) -> Option<Phase> {
        match self.state {
            RunState::NotStarted => Some(Phase::Configure),
            RunState::Running(_) => self.completed.last().and_then(Phase::next),
            RunState::Completed | RunState::Failed(_) => None,
        }
    }

    /// Run the next phase
    ///
    /// Returns the phase that ran, or `None` when the cook is over.
    pub fn step(&mut self) -> std::result::Result<Option<Phase>, PhaseFailure> {
        let Some(phase) = self.next_phase() else {
            return Ok(None);
        };

        self.state = RunState::Running(phase);
        info!("{}: {}", phase, self.recipe.package.name);

        let result = match phase {
            Phase::Configure => self.configure(),
            Phase::Generate => self.generate(),
            Phase::Build => self.build(),
            Phase::Package => self.package(),
        };

        match result {
            Ok(()) => {
                self.completed.push(phase);
                if phase.next().is_none() {
                    self.state = RunState::Completed;
                }
                Ok(Some(phase))
            }
            Err(error) => {
                self.state = RunState::Failed(phase);
                warn!("{} phase failed: {}", phase, error);
                Err(PhaseFailure::new(phase, error))
            }
        }
    }

    /// Configure: check settings and resolve dependencies
    fn configure(&mut self) -> Result<()> {
        for axis in self.kitchen.config.settings.keys() {
            if !self.recipe.declares_setting(*axis) {
                return Err(ConfigurationError::UndeclaredSetting(axis.to_string()).into());
            }
        }

        let mut settings = self.kitchen.config.settings.clone();
        if self.recipe.declares_setting(SettingAxis::BuildType) {
            settings
                .entry(SettingAxis::BuildType)
                .or_insert_with(|| DEFAULT_BUILD_TYPE.to_string());
        }

        let context = LookupContext {
            settings: &settings,
            build_policy: self.recipe.build_policy,
        };
        let requirements = self.recipe.all_requirements();
        let dependencies =
            DependencyResolver::new(self.kitchen.provider.as_ref()).resolve(&requirements, &context)?;

        for dep in &dependencies {
            self.log_line(&format!(
                "Resolved {} -> {} ({})",
                dep.requirement,
                dep.handle.location.display(),
                dep.handle.provider
            ));
        }

        self.settings = settings;
        self.dependencies = dependencies;
        Ok(())
    }

    /// Generate: resolve options and write the config file
    fn generate(&mut self) -> Result<()> {
        let resolved = self.recipe.options.resolve(self.overrides)?;
        let config = emit(&resolved, &self.recipe.generated.include_target)?;

        write(&config, &self.config_path)?;
        self.log_line(&format!("Generated {}", self.config_path.display()));
        for line in config.lines() {
            debug!("  {}", line);
        }

        self.resolved = resolved;
        self.toolchain_file = self.locate_toolchain();
        Ok(())
    }

    /// Toolchain file for the build tool, when `CMakeToolchain` is active
    fn locate_toolchain(&mut self) -> Option<PathBuf> {
        if !self.recipe.has_generator(Generator::CMakeToolchain) {
            return None;
        }

        let path = self.kitchen.config.build_dir.join(TOOLCHAIN_FILE);
        if path.exists() {
            return Some(path);
        }

        let warning = format!(
            "CMakeToolchain generator is active but {} does not exist",
            path.display()
        );
        warn!("{}", warning);
        self.warnings.push(warning);
        None
    }

    /// Build: configure and compile with the external tool
    fn build(&mut self) -> Result<()> {
        let request = self.tool_request();
        let outputs = self.kitchen.tool.build(&request)?;
        self.log_tool_outputs(&outputs);
        Ok(())
    }

    /// Package: install into the package directory
    fn package(&mut self) -> Result<()> {
        let request = self.tool_request();
        let outputs = self.kitchen.tool.package(&request)?;
        self.log_tool_outputs(&outputs);
        info!(
            "Cooked: {} -> {}",
            self.recipe.package.name,
            request.package_dir.display()
        );
        Ok(())
    }

    fn tool_request(&self) -> ToolRequest {
        let config = &self.kitchen.config;

        let (prefix_path, tool_path) = self.dependencies.iter().fold(
            (Vec::new(), Vec::new()),
            |(mut host, mut tool), dep| {
                match dep.requirement.kind {
                    RequirementKind::Host => host.push(dep.handle.location.clone()),
                    RequirementKind::Tool => tool.push(dep.handle.location.clone()),
                }
                (host, tool)
            },
        );

        let cache_variables = self
            .recipe
            .cache_options
            .iter()
            .filter_map(|(name, variable)| {
                self.resolved
                    .get(name)
                    .map(|value| (variable.clone(), cache_value(value)))
            })
            .collect();

        ToolRequest {
            source_dir: config.source_dir.clone(),
            build_dir: config.build_dir.clone(),
            package_dir: config.package_dir.clone(),
            config_file: self.config_path.clone(),
            prefix_path,
            tool_path,
            build_type: self.settings.get(&SettingAxis::BuildType).cloned(),
            cache_variables,
            toolchain_file: self.toolchain_file.clone(),
            jobs: config.jobs,
        }
    }

    /// Consume the cook and build its report
    pub fn finish(self) -> CookResult {
        CookResult {
            package: self.recipe.package.name.clone(),
            options: self.resolved,
            dependencies: self.dependencies,
            settings: self.settings,
            config_path: self.config_path,
            phases: self.completed,
            log: self.log,
            warnings: self.warnings,
        }
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Log tool output with a step header
    fn log_tool_outputs(&mut self, outputs: &[(String, ToolOutput)]) {
        for (step, output) in outputs {
            self.log_line(&format!("=== {} ===", step));
            if !output.stdout.is_empty() {
                self.log.push_str(&output.stdout);
                self.log.push('\n');
            }
            if !output.stderr.is_empty() {
                self.log.push_str(&output.stderr);
                self.log.push('\n');
            }
        }
    }
}

/// CMake cache value for an option: `ON`/`OFF` for booleans
fn cache_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(true) => "ON".to_string(),
        OptionValue::Bool(false) => "OFF".to_string(),
        OptionValue::Text(text) => text.clone(),
    }
}
