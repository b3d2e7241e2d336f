// src/commands/validate.rs

//! Validate command - check a recipe without running any phase

use super::parse_overrides;
use anyhow::{Context, Result};
use cookbook::recipe::kitchen::emit::emit;
use cookbook::recipe::{load_recipe, validate_recipe};
use cookbook::{BaseConfig, Recipe, ResolvedOptions};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ValidateReport<'a> {
    recipe: &'a Recipe,
    options: ResolvedOptions,
    generated_config: Vec<String>,
    warnings: Vec<String>,
}

/// Parse, merge and resolve a recipe, then print what a cook would generate
pub fn cmd_validate(recipe_path: &Path, options: &[String], json: bool) -> Result<()> {
    let recipe = load_recipe(recipe_path, &BaseConfig::default())
        .with_context(|| format!("Failed to load recipe: {}", recipe_path.display()))?;

    let overrides = parse_overrides(options)?;
    let resolved = recipe
        .options
        .resolve(&overrides)
        .context("Invalid option override")?;
    let config = emit(&resolved, &recipe.generated.include_target)
        .context("Failed to generate config")?;

    let report = ValidateReport {
        recipe: &recipe,
        options: resolved,
        generated_config: config.text_lines(),
        warnings: validate_recipe(&recipe),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Recipe: {}", recipe.package.name);
    if let Some(base) = &recipe.extends {
        println!("Extends: {}", base);
    }
    println!(
        "Settings: {}",
        recipe
            .settings
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Build policy: {}", recipe.build_policy);

    println!("Options:");
    for (name, value) in report.options.values() {
        println!("  {} = {}", name, value);
    }

    println!("Requirements:");
    for requirement in recipe.all_requirements() {
        println!("  {} ({:?})", requirement, requirement.kind);
    }

    println!("{}:", recipe.generated.config_file);
    for line in &report.generated_config {
        println!("  {}", line);
    }

    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
    if report.warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", report.warnings.len());
    }

    Ok(())
}
