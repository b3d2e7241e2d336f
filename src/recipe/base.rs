// src/recipe/base.rs

//! Base recipe composition
//!
//! A recipe names the base it builds on with `extends`. The base contributes
//! shared defaults (settings axes, generators, build policy, generated file
//! names and option forwards) and [`merge`] folds an authored
//! [`RecipeFile`] on top of it. Fields set in the recipe file win over the
//! base; nothing is inherited implicitly.

use super::format::{
    BuildPolicy, GeneratedFiles, Generator, PackageInfo, Recipe, RecipeFile, SettingAxis,
};
use super::options::{OptionDomain, OptionSet, OptionValue};
use super::requirement::Requirement;
use crate::error::{ConfigurationError, Result};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// File written by the generate phase
pub const DEFAULT_CONFIG_FILE: &str = "conanuser_config.cmake";

/// Path-resolution file written by the upstream `cmake_paths` generator
pub const DEFAULT_INCLUDE_TARGET: &str = "conan_paths.cmake";

/// Shared defaults a recipe is merged onto
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// Settings axes used when the recipe lists none
    pub settings: Vec<SettingAxis>,
    /// Generators used when the recipe lists none
    pub generators: Vec<Generator>,
    /// Build policy used when the recipe sets none
    pub build_policy: BuildPolicy,
    /// Name of the generated config file
    pub config_file: String,
    /// Upstream path-resolution file included by the generated config
    pub include_target: String,
    /// Option name -> CMake variable, applied when the recipe declares the option
    pub forwards: BTreeMap<String, String>,
    /// Option name -> CMake cache variable, applied when the recipe declares the option
    pub cache_options: BTreeMap<String, String>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        let mut forwards = BTreeMap::new();
        forwards.insert("build_tests".to_string(), "BUILD_tests".to_string());

        let mut cache_options = BTreeMap::new();
        cache_options.insert("shared".to_string(), "BUILD_SHARED_LIBS".to_string());

        Self {
            settings: SettingAxis::ALL.to_vec(),
            generators: vec![Generator::CMakeDeps, Generator::CMakeToolchain],
            build_policy: BuildPolicy::Missing,
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            include_target: DEFAULT_INCLUDE_TARGET.to_string(),
            forwards,
            cache_options,
        }
    }
}

/// Merge an authored recipe onto a base, validating everything on the way
pub fn merge(base: &BaseConfig, file: &RecipeFile) -> Result<Recipe> {
    if file.name.trim().is_empty() {
        return Err(ConfigurationError::EmptyName.into());
    }

    let extends = file
        .extends
        .as_deref()
        .map(parse_requirement)
        .transpose()?;

    let settings = match &file.settings {
        Some(names) => parse_settings(names)?,
        None => base.settings.clone(),
    };

    let generators = match &file.generators {
        Some(names) => parse_generators(names)?,
        None => base.generators.clone(),
    };

    let build_policy = match &file.build_policy {
        Some(policy) => policy.parse()?,
        None => base.build_policy,
    };

    let requires = file
        .requires
        .iter()
        .map(|s| parse_requirement(s))
        .collect::<Result<Vec<_>>>()?;

    let build_requires = file
        .build_requires
        .iter()
        .map(|s| parse_requirement(s).map(Requirement::into_tool))
        .collect::<Result<Vec<_>>>()?;

    let options = declare_options(base, file)?;

    let cache_options = base
        .cache_options
        .iter()
        .filter(|(name, _)| options.contains(name))
        .map(|(name, variable)| (name.clone(), variable.clone()))
        .collect();

    debug!(
        "Merged recipe {}: {} option(s), {} requirement(s), {} build requirement(s)",
        file.name,
        options.len(),
        requires.len(),
        build_requires.len()
    );

    Ok(Recipe {
        package: PackageInfo {
            name: file.name.clone(),
            version: file.version.clone(),
            license: file.license.clone(),
            url: file.url.clone(),
            description: file.description.clone(),
        },
        extends,
        settings,
        options,
        requires,
        build_requires,
        generators,
        build_policy,
        cache_options,
        generated: GeneratedFiles {
            config_file: base.config_file.clone(),
            include_target: base.include_target.clone(),
        },
    })
}

impl RecipeFile {
    /// Merge this file onto `base`
    pub fn merge(&self, base: &BaseConfig) -> Result<Recipe> {
        merge(base, self)
    }
}

fn parse_requirement(s: &str) -> Result<Requirement> {
    Requirement::parse(s).map_err(|e| ConfigurationError::InvalidRequirement(e.to_string()).into())
}

fn parse_settings(names: &[String]) -> Result<Vec<SettingAxis>> {
    let mut seen = HashSet::new();
    let mut settings = Vec::with_capacity(names.len());
    for name in names {
        let axis: SettingAxis = name.parse()?;
        if !seen.insert(axis) {
            return Err(ConfigurationError::DuplicateSetting(name.clone()).into());
        }
        settings.push(axis);
    }
    Ok(settings)
}

fn parse_generators(names: &[String]) -> Result<Vec<Generator>> {
    let mut seen = HashSet::new();
    let mut generators = Vec::with_capacity(names.len());
    for name in names {
        let generator: Generator = name.parse()?;
        if !seen.insert(generator) {
            return Err(ConfigurationError::DuplicateGenerator(name.clone()).into());
        }
        generators.push(generator);
    }
    Ok(generators)
}

fn declare_options(base: &BaseConfig, file: &RecipeFile) -> Result<OptionSet> {
    if let Some(name) = file
        .default_options
        .keys()
        .find(|name| !file.options.contains_key(*name))
    {
        return Err(ConfigurationError::UnknownOption(name.clone()).into());
    }

    let mut options = OptionSet::new();
    for (name, values) in &file.options {
        let domain = OptionDomain::from_values(name, values)?;
        let default = match file.default_options.get(name) {
            Some(raw) => OptionValue::from_toml(raw).ok_or_else(|| {
                ConfigurationError::InvalidDefault {
                    name: name.clone(),
                    value: raw.to_string(),
                    domain: domain.to_string(),
                }
            })?,
            None => domain
                .first()
                .ok_or_else(|| ConfigurationError::InvalidDomain {
                    name: name.clone(),
                    reason: "domain has no values".to_string(),
                })?,
        };
        options.declare(name.clone(), domain, default)?;
    }

    for (name, variable) in &base.forwards {
        if options.contains(name) {
            options.forward(name, variable)?;
        }
    }
    for (name, variable) in &file.forward {
        options.forward(name, variable)?;
    }

    Ok(options)
}
