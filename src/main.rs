// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cookbook::PhaseFailure;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Cook(args) => commands::cmd_cook(args),
        Commands::Validate {
            recipe,
            options,
            json,
        } => commands::cmd_validate(&recipe, &options, json),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "cookbook",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

/// Exit code for a failed run: the build tool's own code when it failed
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PhaseFailure>())
        .map(PhaseFailure::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookbook::{ConfigurationError, Error, ExitIndicator, Phase};

    #[test]
    fn test_exit_code_forwards_tool_status() {
        let failure = PhaseFailure::new(
            Phase::Build,
            Error::ToolInvocation {
                tool: "cmake".to_string(),
                step: "build".to_string(),
                status: ExitIndicator::Code(3),
                stdout: String::new(),
                stderr: String::new(),
            },
        );
        let err = anyhow::Error::new(failure);
        assert_eq!(exit_code(&err), 3);
        assert_eq!(format!("{:#}", err), "build phase failed (ToolInvocationError): cmake build failed with exit code 3");
    }

    #[test]
    fn test_exit_code_defaults_to_one() {
        let failure = PhaseFailure::new(
            Phase::Generate,
            ConfigurationError::UnknownOption("fast".to_string()).into(),
        );
        assert_eq!(exit_code(&anyhow::Error::new(failure)), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("bad recipe")), 1);
    }
}
