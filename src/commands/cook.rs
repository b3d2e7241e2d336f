// src/commands/cook.rs

//! Cook command - run a recipe through all phases

use super::{parse_key_value, parse_overrides};
use crate::cli::CookArgs;
use anyhow::{Context, Result};
use cookbook::recipe::kitchen::{
    default_cache_root, ChainProvider, CMakeTool, DependencyProvider, EditableProvider,
    LocalCacheProvider,
};
use cookbook::recipe::{load_recipe, validate_recipe, SettingAxis};
use cookbook::{BaseConfig, Kitchen, KitchenConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Cook a recipe
///
/// A phase failure is returned as a [`PhaseFailure`](cookbook::PhaseFailure)
/// inside the error so the caller can forward the tool's exit code.
pub fn cmd_cook(args: CookArgs) -> Result<()> {
    let recipe_path = args.recipe.as_path();

    println!("Reading recipe: {}", recipe_path.display());
    let recipe = load_recipe(recipe_path, &BaseConfig::default())
        .with_context(|| format!("Failed to load recipe: {}", recipe_path.display()))?;

    for warning in validate_recipe(&recipe) {
        println!("Warning: {}", warning);
    }

    let overrides = parse_overrides(&args.options)?;
    let config = kitchen_config(&args, recipe_path)?;
    let provider = provider_chain(&args.editables, &config.cache_root)?;
    let tool = Arc::new(CMakeTool::new(&config.cmake));

    println!(
        "Cooking {} with {} parallel jobs in {}",
        recipe.package.name,
        config.jobs,
        config.build_dir.display()
    );

    let kitchen = Kitchen::new(config, provider, tool);
    let result = kitchen.cook(&recipe, &overrides)?;

    for dep in &result.dependencies {
        println!(
            "  {} -> {}",
            dep.requirement,
            dep.handle.location.display()
        );
    }
    for warning in &result.warnings {
        println!("Warning: {}", warning);
    }
    println!("Generated config: {}", result.config_path.display());
    println!(
        "[COMPLETE] {} packaged into {}",
        result.package,
        kitchen.config().package_dir.display()
    );
    info!("Cook log:\n{}", result.log);

    Ok(())
}

fn kitchen_config(args: &CookArgs, recipe_path: &Path) -> Result<KitchenConfig> {
    let source_dir = match &args.source_dir {
        Some(dir) => dir.clone(),
        None => recipe_source_dir(recipe_path),
    };

    let mut config = KitchenConfig::for_source(&source_dir);
    if let Some(dir) = &args.build_dir {
        config.build_dir = dir.clone();
    }
    if let Some(dir) = &args.package_dir {
        config.package_dir = dir.clone();
    }
    config.cache_root = args.cache.clone().unwrap_or_else(default_cache_root);
    config.cmake = args.cmake.clone();
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }

    for arg in &args.settings {
        let (axis, value) = parse_key_value(arg)?;
        let axis: SettingAxis = axis
            .parse()
            .with_context(|| format!("Invalid setting: {}", arg))?;
        config.settings.insert(axis, value);
    }

    Ok(config)
}

/// Directory a recipe builds from when none is given
///
/// Recipes conventionally live in a `conan/` directory next to the
/// project's top-level CMakeLists.txt.
fn recipe_source_dir(recipe_path: &Path) -> PathBuf {
    let dir = match recipe_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if dir.file_name().is_some_and(|name| name == "conan")
        && !dir.join("CMakeLists.txt").exists()
        && let Some(parent) = dir.parent()
    {
        if parent.as_os_str().is_empty() {
            return PathBuf::from(".");
        }
        return parent.to_path_buf();
    }
    dir
}

fn provider_chain(editables: &[String], cache_root: &Path) -> Result<Arc<dyn DependencyProvider>> {
    let mut editable = EditableProvider::new();
    for arg in editables {
        let (name, path) = parse_key_value(arg)?;
        editable.insert(name, path);
    }

    let mut chain = ChainProvider::new();
    if !editable.is_empty() {
        chain.push(Arc::new(editable));
    }
    chain.push(Arc::new(LocalCacheProvider::new(cache_root)));
    Ok(Arc::new(chain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        let conan = dir.path().join("conan");
        std::fs::create_dir_all(&conan).unwrap();
        assert_eq!(recipe_source_dir(&conan.join("recipe.toml")), dir.path());

        std::fs::write(conan.join("CMakeLists.txt"), "").unwrap();
        assert_eq!(recipe_source_dir(&conan.join("recipe.toml")), conan);

        assert_eq!(recipe_source_dir(Path::new("recipe.toml")), PathBuf::from("."));
    }
}
