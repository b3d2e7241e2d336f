// src/recipe/kitchen/tool.rs

//! External build tool invocation

use crate::error::{Error, ExitIndicator, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Name of the toolchain file written by the `CMakeToolchain` generator
pub const TOOLCHAIN_FILE: &str = "conan_toolchain.cmake";

/// Everything the build tool needs for one cook
#[derive(Debug, Clone, Default)]
pub struct ToolRequest {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    /// Install prefix for the package phase
    pub package_dir: PathBuf,
    /// The generated config, injected into the project
    pub config_file: PathBuf,
    /// Roots of linked dependencies
    pub prefix_path: Vec<PathBuf>,
    /// Roots of tool dependencies, prepended to `PATH`
    pub tool_path: Vec<PathBuf>,
    pub build_type: Option<String>,
    /// Cache variables passed as `-D<name>=<value>`
    pub cache_variables: Vec<(String, String)>,
    pub toolchain_file: Option<PathBuf>,
    pub jobs: u32,
}

/// Captured output of a successful step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Trait for the external build/install toolchain
///
/// A failed step is reported as [`Error::ToolInvocation`] carrying the
/// tool's exit indicator untouched.
pub trait BuildTool: Send + Sync {
    fn name(&self) -> &str;

    /// Configure and compile
    fn build(&self, request: &ToolRequest) -> Result<Vec<(String, ToolOutput)>>;

    /// Install into `request.package_dir`
    fn package(&self, request: &ToolRequest) -> Result<Vec<(String, ToolOutput)>>;
}

/// Join paths for a CMake list, with forward slashes
pub fn cmake_path_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect::<Vec<_>>()
        .join(";")
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// CMake driven directly through its command line
#[derive(Debug, Clone)]
pub struct CMakeTool {
    program: PathBuf,
}

impl CMakeTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for the configure step
    pub fn configure_args(&self, request: &ToolRequest) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            forward_slashes(&request.source_dir),
            "-B".to_string(),
            forward_slashes(&request.build_dir),
            format!("-DCMAKE_PROJECT_INCLUDE={}", forward_slashes(&request.config_file)),
        ];

        if !request.prefix_path.is_empty() {
            args.push(format!(
                "-DCMAKE_PREFIX_PATH={}",
                cmake_path_list(&request.prefix_path)
            ));
        }
        if let Some(build_type) = &request.build_type {
            args.push(format!("-DCMAKE_BUILD_TYPE={}", build_type));
        }
        if let Some(toolchain) = &request.toolchain_file {
            args.push(format!(
                "-DCMAKE_TOOLCHAIN_FILE={}",
                forward_slashes(toolchain)
            ));
        }
        for (name, value) in &request.cache_variables {
            args.push(format!("-D{}={}", name, value));
        }

        args
    }

    /// Arguments for the compile step
    pub fn build_args(&self, request: &ToolRequest) -> Vec<String> {
        let mut args = vec!["--build".to_string(), forward_slashes(&request.build_dir)];
        if let Some(build_type) = &request.build_type {
            args.push("--config".to_string());
            args.push(build_type.clone());
        }
        args.push("--parallel".to_string());
        args.push(request.jobs.max(1).to_string());
        args
    }

    /// Arguments for the install step
    pub fn install_args(&self, request: &ToolRequest) -> Vec<String> {
        let mut args = vec![
            "--install".to_string(),
            forward_slashes(&request.build_dir),
            "--prefix".to_string(),
            forward_slashes(&request.package_dir),
        ];
        if let Some(build_type) = &request.build_type {
            args.push("--config".to_string());
            args.push(build_type.clone());
        }
        args
    }

    fn run(&self, step: &str, args: &[String], request: &ToolRequest) -> Result<ToolOutput> {
        let not_started = |reason: String| Error::ToolInvocation {
            tool: "cmake".to_string(),
            step: step.to_string(),
            status: ExitIndicator::NotStarted,
            stdout: String::new(),
            stderr: reason,
        };

        let program = which::which(&self.program).map_err(|e| not_started(e.to_string()))?;

        info!("Running cmake {} step", step);
        debug!("Command: {} {}", program.display(), args.join(" "));

        let mut command = Command::new(&program);
        command.args(args);
        if !request.tool_path.is_empty() {
            command.env("PATH", tool_search_path(&request.tool_path));
        }

        let output = command
            .output()
            .map_err(|e| not_started(format!("Failed to run {}: {}", program.display(), e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        log_step_output(step, &stdout, &stderr);

        if !output.status.success() {
            return Err(Error::ToolInvocation {
                tool: "cmake".to_string(),
                step: step.to_string(),
                status: ExitIndicator::from_code(output.status.code()),
                stdout,
                stderr,
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}

fn log_step_output(step: &str, stdout: &str, stderr: &str) {
    for line in stdout.lines() {
        info!("[cmake {}] {}", step, line);
    }
    for line in stderr.lines() {
        warn!("[cmake {}] {}", step, line);
    }
}

/// `PATH` with tool dependency roots (and their `bin` dirs) first
fn tool_search_path(tool_path: &[PathBuf]) -> OsString {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for root in tool_path {
        dirs.push(root.join("bin"));
        dirs.push(root.clone());
    }
    if let Some(existing) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(dirs).unwrap_or_default()
}

impl BuildTool for CMakeTool {
    fn name(&self) -> &str {
        "cmake"
    }

    fn build(&self, request: &ToolRequest) -> Result<Vec<(String, ToolOutput)>> {
        let configure = self.run("configure", &self.configure_args(request), request)?;
        let compile = self.run("build", &self.build_args(request), request)?;
        Ok(vec![
            ("configure".to_string(), configure),
            ("build".to_string(), compile),
        ])
    }

    fn package(&self, request: &ToolRequest) -> Result<Vec<(String, ToolOutput)>> {
        let install = self.run("install", &self.install_args(request), request)?;
        Ok(vec![("install".to_string(), install)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ToolRequest {
        ToolRequest {
            source_dir: PathBuf::from("/src/focg"),
            build_dir: PathBuf::from("/src/focg/build"),
            package_dir: PathBuf::from("/src/focg/package"),
            config_file: PathBuf::from("/src/focg/build/conanuser_config.cmake"),
            prefix_path: vec![
                PathBuf::from("/cache/graphics/abc123/adnn/develop"),
                PathBuf::from("/cache/math/def456/adnn/develop"),
            ],
            tool_path: Vec::new(),
            build_type: Some("Release".to_string()),
            cache_variables: vec![("BUILD_SHARED_LIBS".to_string(), "OFF".to_string())],
            toolchain_file: None,
            jobs: 8,
        }
    }

    #[test]
    fn test_configure_args() {
        let tool = CMakeTool::new("cmake");
        let args = tool.configure_args(&request());
        assert_eq!(
            args,
            vec![
                "-S",
                "/src/focg",
                "-B",
                "/src/focg/build",
                "-DCMAKE_PROJECT_INCLUDE=/src/focg/build/conanuser_config.cmake",
                "-DCMAKE_PREFIX_PATH=/cache/graphics/abc123/adnn/develop;/cache/math/def456/adnn/develop",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DBUILD_SHARED_LIBS=OFF",
            ]
        );
    }

    #[test]
    fn test_toolchain_arg() {
        let tool = CMakeTool::new("cmake");
        let mut req = request();
        req.toolchain_file = Some(PathBuf::from("/src/focg/build").join(TOOLCHAIN_FILE));
        let args = tool.configure_args(&req);
        assert!(args.contains(
            &"-DCMAKE_TOOLCHAIN_FILE=/src/focg/build/conan_toolchain.cmake".to_string()
        ));
    }

    #[test]
    fn test_build_and_install_args() {
        let tool = CMakeTool::new("cmake");
        let req = request();
        assert_eq!(
            tool.build_args(&req),
            vec!["--build", "/src/focg/build", "--config", "Release", "--parallel", "8"]
        );
        assert_eq!(
            tool.install_args(&req),
            vec![
                "--install",
                "/src/focg/build",
                "--prefix",
                "/src/focg/package",
                "--config",
                "Release"
            ]
        );
    }

    #[test]
    fn test_path_list_uses_forward_slashes() {
        let paths = vec![PathBuf::from("C:\\deps\\math"), PathBuf::from("/deps/graphics")];
        assert_eq!(cmake_path_list(&paths), "C:/deps/math;/deps/graphics");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_step_keeps_stdout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("fake-cmake");
        std::fs::write(
            &program,
            "#!/bin/sh\necho 'main.cpp:3:1: error: expected ;'\necho 'ninja: build stopped' >&2\nexit 2\n",
        )
        .unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let tool = CMakeTool::new(&program);
        let err = tool.build(&request()).unwrap_err();
        match &err {
            Error::ToolInvocation {
                step,
                status,
                stdout,
                stderr,
                ..
            } => {
                assert_eq!(step, "configure");
                assert_eq!(*status, ExitIndicator::Code(2));
                assert!(stdout.contains("error: expected ;"));
                assert!(stderr.contains("build stopped"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().contains("stdout: main.cpp:3:1: error: expected ;"));
    }

    #[test]
    fn test_missing_program_not_started() {
        let tool = CMakeTool::new("/nonexistent/cookbook/cmake");
        let err = tool.build(&request()).unwrap_err();
        assert_eq!(err.tool_exit(), Some(ExitIndicator::NotStarted));
        assert_eq!(err.kind().as_str(), "ToolInvocationError");
    }
}
