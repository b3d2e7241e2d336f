// src/recipe/kitchen/phase.rs

//! The fixed cooking lifecycle

use crate::error::Error;
use serde::Serialize;
use std::fmt;

/// One step of the lifecycle, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Resolve dependencies and validate settings
    Configure,
    /// Resolve options and write the generated config
    Generate,
    /// Configure and compile with the external build tool
    Build,
    /// Install the build output into the package directory
    Package,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Self::Configure, Self::Generate, Self::Build, Self::Package];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Generate => "generate",
            Self::Build => "build",
            Self::Package => "package",
        }
    }

    /// The phase that runs after this one
    pub fn next(&self) -> Option<Phase> {
        match self {
            Self::Configure => Some(Self::Generate),
            Self::Generate => Some(Self::Build),
            Self::Build => Some(Self::Package),
            Self::Package => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a cook is in the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running(Phase),
    Completed,
    Failed(Phase),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// A cook that stopped at `phase`
///
/// The display names the phase and failure kind; the underlying error is
/// the [`source`](std::error::Error::source).
#[derive(Debug, thiserror::Error)]
#[error("{phase} phase failed ({})", .error.kind())]
pub struct PhaseFailure {
    pub phase: Phase,
    #[source]
    pub error: Error,
}

impl PhaseFailure {
    pub fn new(phase: Phase, error: Error) -> Self {
        Self { phase, error }
    }

    /// Process exit code for this failure
    ///
    /// The external tool's own code when it is the failing party, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        self.error
            .tool_exit()
            .and_then(|status| status.code())
            .filter(|code| *code != 0)
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, ExitIndicator};

    #[test]
    fn test_phase_order() {
        let mut walked = vec![Phase::Configure];
        while let Some(next) = walked.last().and_then(Phase::next) {
            walked.push(next);
        }
        assert_eq!(walked, Phase::ALL.to_vec());
        assert!(Phase::Configure < Phase::Package);
    }

    #[test]
    fn test_failure_message() {
        let failure = PhaseFailure::new(
            Phase::Generate,
            ConfigurationError::UnknownOption("fast".to_string()).into(),
        );
        assert_eq!(failure.to_string(), "generate phase failed (ConfigurationError)");
        let source = std::error::Error::source(&failure).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Unknown option 'fast'"));
        assert_eq!(failure.exit_code(), 1);
    }

    #[test]
    fn test_failure_forwards_tool_code() {
        let failure = PhaseFailure::new(
            Phase::Build,
            Error::ToolInvocation {
                tool: "cmake".to_string(),
                step: "build".to_string(),
                status: ExitIndicator::Code(2),
                stdout: String::new(),
                stderr: String::new(),
            },
        );
        assert_eq!(failure.exit_code(), 2);

        let failure = PhaseFailure::new(
            Phase::Package,
            Error::ToolInvocation {
                tool: "cmake".to_string(),
                step: "install".to_string(),
                status: ExitIndicator::Terminated,
                stdout: String::new(),
                stderr: String::new(),
            },
        );
        assert_eq!(failure.exit_code(), 1);
    }

    #[test]
    fn test_run_state_terminal() {
        assert!(!RunState::NotStarted.is_terminal());
        assert!(!RunState::Running(Phase::Build).is_terminal());
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed(Phase::Configure).is_terminal());
    }
}
