// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::recipe::base::{merge, BaseConfig};
use crate::recipe::format::{Recipe, RecipeFile};
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<RecipeFile> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<RecipeFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::IoError(format!("Failed to read recipe file {}: {}", path.display(), e))
    })?;

    parse_recipe(&content)
}

/// Parse a recipe file and merge it onto a base
pub fn load_recipe(path: &Path, base: &BaseConfig) -> Result<Recipe> {
    let file = parse_recipe_file(path)?;
    merge(base, &file)
}

/// Check a merged recipe for things that are legal but probably unintended
pub fn validate_recipe(recipe: &Recipe) -> Vec<String> {
    let mut warnings = Vec::new();

    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if recipe.package.url.is_none() {
        warnings.push("Missing package url".to_string());
    }
    if recipe.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }
    if recipe.generators.is_empty() {
        warnings.push("No generators activated".to_string());
    }

    for (name, variable) in &recipe.cache_options {
        if recipe.options.get(name).is_some_and(|decl| decl.forward.is_some()) {
            warnings.push(format!(
                "Option {} is both forwarded and passed as cache variable {}",
                name, variable
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_recipe() {
        let content = r#"
name = "test"
requires = ["math/96fbbb3dcc@adnn/develop"]

[options]
shared = [true, false]
"#;

        let recipe = parse_recipe(content).unwrap();
        assert_eq!(recipe.name, "test");
        assert_eq!(recipe.requires.len(), 1);
        assert_eq!(recipe.options["shared"].len(), 2);
    }

    #[test]
    fn test_parse_invalid_recipe() {
        let content = "this is not valid toml at all {}";
        assert!(matches!(parse_recipe(content), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_parse_unknown_field() {
        let content = "name = \"test\"\ntopics = [\"graphics\"]\n";
        assert!(matches!(parse_recipe(content), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_parse_recipe_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_recipe_file(&dir.path().join("recipe.toml")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_load_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.toml");
        std::fs::write(&path, "name = \"test\"\nlicense = \"MIT\"\n").unwrap();

        let recipe = load_recipe(&path, &BaseConfig::default()).unwrap();
        assert_eq!(recipe.package.name, "test");
    }

    #[test]
    fn test_validate_warnings() {
        let file = parse_recipe("name = \"test\"\ngenerators = []\n").unwrap();
        let recipe = merge(&BaseConfig::default(), &file).unwrap();
        let warnings = validate_recipe(&recipe);
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("url")));
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("generators")));
    }

    #[test]
    fn test_validate_forward_and_cache_overlap() {
        let file = parse_recipe(
            r#"
name = "test"
license = "MIT"
url = "https://example.com"
description = "x"

[options]
shared = [true, false]

[forward]
shared = "SHARED"
"#,
        )
        .unwrap();
        let recipe = merge(&BaseConfig::default(), &file).unwrap();
        let warnings = validate_recipe(&recipe);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("BUILD_SHARED_LIBS"));
    }
}
