// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe file
fn recipe_arg() -> Arg {
    Arg::new("recipe")
        .required(true)
        .value_name("RECIPE")
        .help("Path to the recipe file")
}

/// Common argument: option override
fn option_arg() -> Arg {
    Arg::new("option")
        .short('o')
        .long("option")
        .value_name("NAME=VALUE")
        .action(ArgAction::Append)
        .help("Option override (repeatable)")
}

fn build_cli() -> Command {
    Command::new("cookbook")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Cookbook Contributors")
        .about("Declarative build-recipe orchestrator for CMake projects")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output (RUST_LOG takes precedence)"),
        )
        .subcommand(
            Command::new("cook")
                .about("Run a recipe through configure, generate, build and package")
                .arg(recipe_arg())
                .arg(option_arg())
                .arg(
                    Arg::new("setting")
                        .short('s')
                        .long("setting")
                        .value_name("AXIS=VALUE")
                        .action(ArgAction::Append)
                        .help("Settings axis value, e.g. build_type=Debug (repeatable)"),
                )
                .arg(
                    Arg::new("editable")
                        .long("editable")
                        .value_name("NAME=PATH")
                        .action(ArgAction::Append)
                        .help("Use a local checkout for a dependency (repeatable)"),
                )
                .arg(Arg::new("source_dir").long("source-dir").help("Project source directory"))
                .arg(Arg::new("build_dir").long("build-dir").help("Build directory"))
                .arg(Arg::new("package_dir").long("package-dir").help("Package install prefix"))
                .arg(
                    Arg::new("cache")
                        .long("cache")
                        .env("COOKBOOK_CACHE")
                        .help("Dependency cache root"),
                )
                .arg(
                    Arg::new("cmake")
                        .long("cmake")
                        .default_value("cmake")
                        .help("CMake executable"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Number of parallel build jobs"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a recipe and preview its generated config without running any phase")
                .arg(recipe_arg())
                .arg(option_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("cookbook.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
