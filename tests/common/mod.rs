// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use cookbook::recipe::kitchen::{
    BuildTool, DependencyHandle, DependencyProvider, LookupContext, ToolOutput, ToolRequest,
};
use cookbook::recipe::{parse_recipe, Requirement};
use cookbook::{BaseConfig, Error, ExitIndicator, Kitchen, KitchenConfig, Recipe, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A recipe shaped like the focg project's
pub const FOCG_RECIPE: &str = r#"
name = "focg"
license = "MIT License"
url = "https://github.com/Adnn/focg"
description = "Programs and exercises"
extends = "shred_conan_base/0.0.3@adnn/stable"
settings = ["os", "compiler", "build_type", "arch"]
generators = ["cmake_paths", "CMakeDeps"]
requires = [
    "graphics/abc123@adnn/develop",
    "math/def456@adnn/develop",
]
build_requires = ["ninja/1.11.1"]

[options]
shared = [true, false]
build_tests = [true, false]

[default_options]
shared = false
build_tests = false
"#;

/// Parse and merge a recipe onto the default base
pub fn recipe(content: &str) -> Recipe {
    parse_recipe(content)
        .unwrap()
        .merge(&BaseConfig::default())
        .unwrap()
}

/// Provider that knows a fixed set of package names
pub struct MapProvider {
    known: BTreeMap<String, PathBuf>,
    lookups: Mutex<Vec<String>>,
}

impl MapProvider {
    pub fn new(root: &Path, names: &[&str]) -> Self {
        Self {
            known: names
                .iter()
                .map(|name| (name.to_string(), root.join("deps").join(name)))
                .collect(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl DependencyProvider for MapProvider {
    fn name(&self) -> &str {
        "map"
    }

    fn provide(
        &self,
        requirement: &Requirement,
        _context: &LookupContext<'_>,
    ) -> Result<Option<DependencyHandle>> {
        self.lookups.lock().unwrap().push(requirement.name.clone());
        Ok(self.known.get(&requirement.name).map(|location| DependencyHandle {
            location: location.clone(),
            provider: "map".to_string(),
        }))
    }
}

/// Build tool that records calls instead of running anything
#[derive(Default)]
pub struct RecordingTool {
    calls: Mutex<Vec<&'static str>>,
    requests: Mutex<Vec<ToolRequest>>,
    fail_build: Option<ExitIndicator>,
    fail_package: Option<ExitIndicator>,
}

impl RecordingTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_build(status: ExitIndicator) -> Self {
        Self {
            fail_build: Some(status),
            ..Self::default()
        }
    }

    pub fn failing_package(status: ExitIndicator) -> Self {
        Self {
            fail_package: Some(status),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ToolRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn record(
        &self,
        step: &'static str,
        request: &ToolRequest,
        fail: Option<ExitIndicator>,
    ) -> Result<Vec<(String, ToolOutput)>> {
        self.calls.lock().unwrap().push(step);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(status) = fail {
            return Err(Error::ToolInvocation {
                tool: "cmake".to_string(),
                step: step.to_string(),
                status,
                stdout: format!("{}: error: compiler said no", step),
                stderr: format!("{} exploded", step),
            });
        }

        Ok(vec![(
            step.to_string(),
            ToolOutput {
                stdout: format!("{} ok", step),
                stderr: String::new(),
            },
        )])
    }
}

impl BuildTool for RecordingTool {
    fn name(&self) -> &str {
        "recording"
    }

    fn build(&self, request: &ToolRequest) -> Result<Vec<(String, ToolOutput)>> {
        self.record("build", request, self.fail_build)
    }

    fn package(&self, request: &ToolRequest) -> Result<Vec<(String, ToolOutput)>> {
        self.record("package", request, self.fail_package)
    }
}

/// A scratch project with a kitchen wired to in-memory collaborators
pub struct TestKitchen {
    pub dir: TempDir,
    pub provider: Arc<MapProvider>,
    pub tool: Arc<RecordingTool>,
    pub kitchen: Kitchen,
}

impl TestKitchen {
    pub fn new(known: &[&str], tool: RecordingTool) -> Self {
        Self::with_config(known, tool, |_| {})
    }

    pub fn with_config(
        known: &[&str],
        tool: RecordingTool,
        adjust: impl FnOnce(&mut KitchenConfig),
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = KitchenConfig::for_source(dir.path());
        config.cache_root = dir.path().join("cache");
        config.jobs = 2;
        adjust(&mut config);

        let provider = Arc::new(MapProvider::new(dir.path(), known));
        let tool = Arc::new(tool);
        let kitchen = Kitchen::new(config, provider.clone(), tool.clone());

        Self {
            dir,
            provider,
            tool,
            kitchen,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("build").join("conanuser_config.cmake")
    }
}
