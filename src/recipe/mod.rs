// src/recipe/mod.rs

//! Recipe system: the static description of a package
//!
//! Recipes declare:
//! - Package identity (name, license, url, description)
//! - Settings axes consumed by dependency providers
//! - Options with explicit value domains and defaults
//! - Pinned requirements (`name/revision@user/channel`)
//! - Generators selecting which build-tool input to produce
//!
//! # Example Recipe
//!
//! ```toml
//! name = "focg"
//! license = "MIT License"
//! extends = "shred_conan_base/0.0.3@adnn/stable"
//! requires = [
//!     "graphics/5bf5ee7f2c@adnn/develop",
//!     "math/96fbbb3dcc@adnn/develop",
//!     "catch2/3.1.0",
//! ]
//!
//! [options]
//! shared = [true, false]
//! build_tests = [true, false]
//!
//! [default_options]
//! shared = false
//! build_tests = false
//! ```
//!
//! A parsed [`RecipeFile`] is merged onto a [`BaseConfig`] to obtain the
//! immutable [`Recipe`] that the kitchen cooks.

mod base;
mod format;
pub mod kitchen;
pub mod options;
pub mod parser;
pub mod requirement;

pub use base::{merge, BaseConfig, DEFAULT_CONFIG_FILE, DEFAULT_INCLUDE_TARGET};
pub use format::{
    BuildPolicy, GeneratedFiles, Generator, PackageInfo, Recipe, RecipeFile, SettingAxis,
};
pub use kitchen::{CookResult, Kitchen, KitchenConfig, Phase, PhaseFailure};
pub use options::{OptionDecl, OptionDomain, OptionSet, OptionValue, ResolvedOptions};
pub use parser::{load_recipe, parse_recipe, parse_recipe_file, validate_recipe};
pub use requirement::{Channel, Requirement, RequirementKind, RequirementParseError};
