// src/lib.rs

//! Cookbook: declarative build recipes for CMake projects
//!
//! A recipe describes a package statically: identity, settings axes,
//! options with finite value domains, pinned requirements and the
//! generators to activate. Cooking a recipe runs a fixed lifecycle:
//!
//! - **Configure**: settings are checked and every requirement is resolved
//!   to a handle by a [`DependencyProvider`](recipe::kitchen::DependencyProvider)
//! - **Generate**: user overrides are applied to the option defaults and a
//!   CMake config is written atomically to the build directory
//! - **Build** / **Package**: the external build tool runs with the
//!   generated inputs, its exit status surfaced unchanged
//!
//! Recipes compose explicitly: a [`RecipeFile`] is merged onto a
//! [`BaseConfig`] into an immutable [`Recipe`].

mod error;
pub mod recipe;

pub use error::{
    ConfigurationError, DependencyError, Error, ErrorKind, ExitIndicator, Result,
};
pub use recipe::{
    merge, parse_recipe, parse_recipe_file, validate_recipe, BaseConfig, CookResult, Kitchen,
    KitchenConfig, OptionDomain, OptionSet, OptionValue, Phase, PhaseFailure, Recipe, RecipeFile,
    Requirement, ResolvedOptions,
};
