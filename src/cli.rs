// src/cli.rs
//! CLI definitions for cookbook
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cookbook")]
#[command(author = "Cookbook Contributors")]
#[command(version)]
#[command(about = "Declarative build-recipe orchestrator for CMake projects", long_about = None)]
pub struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a recipe through configure, generate, build and package
    Cook(CookArgs),

    /// Check a recipe and preview its generated config without running any phase
    Validate {
        /// Path to the recipe file
        recipe: PathBuf,

        /// Option override (repeatable)
        #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
        options: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct CookArgs {
    /// Path to the recipe file
    pub recipe: PathBuf,

    /// Option override (repeatable)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Settings axis value, e.g. build_type=Debug (repeatable)
    #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE")]
    pub settings: Vec<String>,

    /// Use a local checkout for a dependency (repeatable)
    #[arg(long = "editable", value_name = "NAME=PATH")]
    pub editables: Vec<String>,

    /// Project source directory (default: the recipe's directory)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Build directory (default: <source>/build)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Package install prefix (default: <source>/package)
    #[arg(long)]
    pub package_dir: Option<PathBuf>,

    /// Dependency cache root
    #[arg(long, env = "COOKBOOK_CACHE")]
    pub cache: Option<PathBuf>,

    /// CMake executable
    #[arg(long, default_value = "cmake")]
    pub cmake: PathBuf,

    /// Number of parallel build jobs (default: available CPUs)
    #[arg(short, long)]
    pub jobs: Option<u32>,
}
