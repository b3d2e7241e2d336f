// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use super::phase::Phase;
use super::resolver::ResolvedDependency;
use crate::recipe::format::SettingAxis;
use crate::recipe::options::ResolvedOptions;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default root of the local dependency cache
///
/// `<user cache dir>/cookbook`, or the system temp dir when the platform
/// has no cache dir.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cookbook")
}

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Project source directory
    pub source_dir: PathBuf,
    /// Build directory; the generated config is written here
    pub build_dir: PathBuf,
    /// Install prefix for the package phase
    pub package_dir: PathBuf,
    /// Root of the local dependency cache
    pub cache_root: PathBuf,
    /// CMake executable (name looked up on `PATH`, or a path)
    pub cmake: PathBuf,
    /// Number of parallel jobs
    pub jobs: u32,
    /// Values for the recipe's settings axes
    pub settings: BTreeMap<SettingAxis, String>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            source_dir: PathBuf::from("."),
            build_dir: PathBuf::from("build"),
            package_dir: PathBuf::from("package"),
            cache_root: default_cache_root(),
            cmake: PathBuf::from("cmake"),
            jobs,
            settings: BTreeMap::new(),
        }
    }
}

impl KitchenConfig {
    /// Configuration for a project checked out at `source_dir`
    ///
    /// Build and package directories are placed inside the source tree.
    pub fn for_source(source_dir: &Path) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            build_dir: source_dir.join("build"),
            package_dir: source_dir.join("package"),
            ..Self::default()
        }
    }

    /// Set a settings axis value
    pub fn with_setting(mut self, axis: SettingAxis, value: impl Into<String>) -> Self {
        self.settings.insert(axis, value.into());
        self
    }
}

/// Result of a completed cook
#[derive(Debug, Clone, Serialize)]
pub struct CookResult {
    /// Recipe name
    pub package: String,
    /// Option values the config was generated from
    pub options: ResolvedOptions,
    /// Dependencies in requirement order
    pub dependencies: Vec<ResolvedDependency>,
    /// Settings as passed to the dependency provider
    pub settings: BTreeMap<SettingAxis, String>,
    /// Path of the generated config
    pub config_path: PathBuf,
    /// Phases that ran, in order
    pub phases: Vec<Phase>,
    /// Build log
    pub log: String,
    /// Warnings generated during the cook
    pub warnings: Vec<String>,
}
