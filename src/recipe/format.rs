// src/recipe/format.rs

//! Recipe file format definitions
//!
//! A recipe is authored as a flat TOML file ([`RecipeFile`]) and merged
//! with a [`BaseConfig`](super::BaseConfig) into an immutable [`Recipe`]
//! that is passed through every phase of a cook.

use super::options::OptionSet;
use super::requirement::{Requirement, RequirementKind};
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A recipe file as authored, before merging with its base
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeFile {
    /// Package name
    pub name: String,

    /// Package version (optional, revisions usually pin consumers instead)
    #[serde(default)]
    pub version: Option<String>,

    /// License text or SPDX identifier
    #[serde(default)]
    pub license: Option<String>,

    /// Project URL
    #[serde(default)]
    pub url: Option<String>,

    /// Free text description
    #[serde(default)]
    pub description: Option<String>,

    /// Base recipe reference (`name/version@user/channel`)
    #[serde(default)]
    pub extends: Option<String>,

    /// Settings axes; the base's axes when omitted
    #[serde(default)]
    pub settings: Option<Vec<String>>,

    /// Generators to activate; the base's generators when omitted
    #[serde(default)]
    pub generators: Option<Vec<String>>,

    /// When missing dependency artifacts may be built
    #[serde(default)]
    pub build_policy: Option<String>,

    /// Linked requirements
    #[serde(default)]
    pub requires: Vec<String>,

    /// Tool-only requirements
    #[serde(default)]
    pub build_requires: Vec<String>,

    /// Option name -> list of legal values
    #[serde(default)]
    pub options: BTreeMap<String, Vec<toml::Value>>,

    /// Option name -> default value
    #[serde(default)]
    pub default_options: BTreeMap<String, toml::Value>,

    /// Option name -> CMake variable, on top of the base's forwards
    #[serde(default)]
    pub forward: BTreeMap<String, String>,
}

/// Package identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: Option<String>,
    pub license: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// Names of the files involved in config generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFiles {
    /// File written by the generate phase, in the build directory
    pub config_file: String,
    /// Path-resolution file produced by an upstream generator, relative to
    /// the generated config file
    pub include_target: String,
}

/// A merged, validated recipe
///
/// Constructed once per invocation and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub package: PackageInfo,
    /// Base this recipe was declared against
    pub extends: Option<Requirement>,
    pub settings: Vec<SettingAxis>,
    pub options: OptionSet,
    pub requires: Vec<Requirement>,
    pub build_requires: Vec<Requirement>,
    pub generators: Vec<Generator>,
    pub build_policy: BuildPolicy,
    /// Option name -> CMake cache variable passed on the configure command line
    pub cache_options: BTreeMap<String, String>,
    pub generated: GeneratedFiles,
}

impl Recipe {
    /// All requirements in resolution order: `requires` then `build_requires`
    pub fn all_requirements(&self) -> Vec<Requirement> {
        let mut all = self.requires.clone();
        all.extend(
            self.build_requires
                .iter()
                .cloned()
                .map(|r| Requirement { kind: RequirementKind::Tool, ..r }),
        );
        all
    }

    pub fn declares_setting(&self, axis: SettingAxis) -> bool {
        self.settings.contains(&axis)
    }

    pub fn has_generator(&self, generator: Generator) -> bool {
        self.generators.contains(&generator)
    }
}

/// A settings axis consumed by dependency providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingAxis {
    Os,
    Compiler,
    BuildType,
    Arch,
}

impl SettingAxis {
    pub const ALL: [SettingAxis; 4] = [Self::Os, Self::Compiler, Self::BuildType, Self::Arch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Os => "os",
            Self::Compiler => "compiler",
            Self::BuildType => "build_type",
            Self::Arch => "arch",
        }
    }
}

impl fmt::Display for SettingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingAxis {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|axis| axis.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownSetting(s.to_string()))
    }
}

/// A build-tool input dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Generator {
    CMakeDeps,
    CMakeToolchain,
    #[serde(rename = "cmake_paths")]
    CMakePaths,
    #[serde(rename = "cmake")]
    CMake,
}

impl Generator {
    pub const ALL: [Generator; 4] = [
        Self::CMakeDeps,
        Self::CMakeToolchain,
        Self::CMakePaths,
        Self::CMake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CMakeDeps => "CMakeDeps",
            Self::CMakeToolchain => "CMakeToolchain",
            Self::CMakePaths => "cmake_paths",
            Self::CMake => "cmake",
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Generator {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownGenerator(s.to_string()))
    }
}

/// When a dependency provider may build an artifact it cannot find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPolicy {
    /// Only use existing artifacts
    #[default]
    Never,
    /// Build artifacts that are missing
    Missing,
    /// Always rebuild
    Always,
}

impl BuildPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Missing => "missing",
            Self::Always => "always",
        }
    }
}

impl fmt::Display for BuildPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildPolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "missing" => Ok(Self::Missing),
            "always" => Ok(Self::Always),
            other => Err(ConfigurationError::UnknownBuildPolicy(other.to_string())),
        }
    }
}
