// src/error.rs

//! Error types for recipe loading and the phase lifecycle
//!
//! Every error is fatal to the current invocation. The variants map onto
//! the four failure kinds reported to the user (configuration, dependency
//! resolution, config write, tool invocation) plus the recipe loading
//! errors that happen before any phase starts.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while declaring or resolving recipe configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Option '{0}' is declared more than once")]
    DuplicateOption(String),

    #[error("Default value '{value}' for option '{name}' is not one of {domain}")]
    InvalidDefault {
        name: String,
        value: String,
        domain: String,
    },

    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    #[error("Value '{value}' for option '{name}' is not one of {domain}")]
    InvalidOptionValue {
        name: String,
        value: String,
        domain: String,
    },

    #[error("Invalid domain for option '{name}': {reason}")]
    InvalidDomain { name: String, reason: String },

    #[error("Unknown setting '{0}' (expected os, compiler, build_type or arch)")]
    UnknownSetting(String),

    #[error("Setting '{0}' is declared more than once")]
    DuplicateSetting(String),

    #[error("Setting '{0}' was given a value but the recipe does not declare it")]
    UndeclaredSetting(String),

    #[error("Unknown generator '{0}'")]
    UnknownGenerator(String),

    #[error("Generator '{0}' is listed more than once")]
    DuplicateGenerator(String),

    #[error("Unknown build policy '{0}' (expected never, missing or always)")]
    UnknownBuildPolicy(String),

    #[error("Invalid CMake variable name '{0}'")]
    InvalidVariable(String),

    #[error("Invalid include target '{path}': {reason}")]
    InvalidIncludeTarget { path: String, reason: String },

    #[error("Invalid requirement '{0}'")]
    InvalidRequirement(String),

    #[error("Recipe name cannot be empty")]
    EmptyName,
}

/// Errors raised while mapping requirements to dependency handles
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("Requirement '{0}' appears more than once")]
    DuplicateRequirement(String),

    #[error("Unresolved dependency '{0}'")]
    UnresolvedDependency(String),

    #[error("Dependency provider failed for '{name}': {reason}")]
    ProviderFailed { name: String, reason: String },
}

/// How an external tool ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitIndicator {
    /// The process exited with this status code
    Code(i32),
    /// The process was terminated without an exit code (e.g. by a signal)
    Terminated,
    /// The process could not be started at all
    NotStarted,
}

impl ExitIndicator {
    /// Build from a process exit code as reported by `ExitStatus::code`
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(code) => Self::Code(code),
            None => Self::Terminated,
        }
    }

    /// Exit code to forward from this process, if the tool reported one
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Code(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ExitIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit code {}", code),
            Self::Terminated => write!(f, "termination without exit code"),
            Self::NotStarted => write!(f, "failure to start"),
        }
    }
}

/// The failure kinds surfaced to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    DependencyResolution,
    ConfigWrite,
    ToolInvocation,
    Parse,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "ConfigurationError",
            Self::DependencyResolution => "DependencyResolutionError",
            Self::ConfigWrite => "ConfigWriteError",
            Self::ToolInvocation => "ToolInvocationError",
            Self::Parse => "ParseError",
            Self::Io => "IoError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Library error type
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    DependencyResolution(#[from] DependencyError),

    #[error("Failed to write generated config {path}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{tool} {step} failed with {status}{}", output_suffix(.stdout, .stderr))]
    ToolInvocation {
        tool: String,
        step: String,
        status: ExitIndicator,
        /// Captured standard output of the failing step
        stdout: String,
        stderr: String,
    },

    #[error("Failed to parse recipe: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

/// Lines of tool stdout kept in the error message
const STDOUT_TAIL_LINES: usize = 40;

fn output_suffix(stdout: &str, stderr: &str) -> String {
    let mut suffix = String::new();

    let lines: Vec<&str> = stdout.trim().lines().collect();
    if !lines.is_empty() {
        let tail = &lines[lines.len().saturating_sub(STDOUT_TAIL_LINES)..];
        suffix.push_str("\nstdout: ");
        suffix.push_str(&tail.join("\n"));
    }

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        suffix.push_str("\nstderr: ");
        suffix.push_str(stderr);
    }
    suffix
}

impl Error {
    /// Which failure kind this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::DependencyResolution(_) => ErrorKind::DependencyResolution,
            Self::ConfigWrite { .. } => ErrorKind::ConfigWrite,
            Self::ToolInvocation { .. } => ErrorKind::ToolInvocation,
            Self::ParseError(_) => ErrorKind::Parse,
            Self::IoError(_) => ErrorKind::Io,
        }
    }

    /// Exit indicator of the external tool, when the tool is the failing party
    pub fn tool_exit(&self) -> Option<ExitIndicator> {
        match self {
            Self::ToolInvocation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Create a config write error
    pub fn config_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ConfigWrite {
            path: path.into(),
            source,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}
