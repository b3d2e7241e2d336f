// src/recipe/kitchen/emit.rs

//! Generated CMake config
//!
//! The generate phase writes a small CMake script that includes the
//! upstream path-resolution file and sets one variable per forwarded
//! option. Output depends only on the resolved options and the include
//! target, so the same inputs give the same bytes on every host.

use crate::error::{ConfigurationError, Error, Result};
use crate::recipe::options::{is_cmake_identifier, OptionValue, ResolvedOptions};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// A relative script path, always with forward slashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPath(String);

impl ScriptPath {
    pub fn new(raw: &str) -> std::result::Result<Self, ConfigurationError> {
        let normalized = raw.trim().replace('\\', "/");
        let invalid = |reason: &str| ConfigurationError::InvalidIncludeTarget {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if normalized.is_empty() {
            return Err(invalid("empty path"));
        }
        if normalized.starts_with('/') || has_drive_prefix(&normalized) {
            return Err(invalid("must be relative to the generated config"));
        }
        if normalized.contains('"') {
            return Err(invalid("contains a double quote"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl fmt::Display for ScriptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A CMake variable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeVariable(String);

impl CMakeVariable {
    pub fn new(name: &str) -> std::result::Result<Self, ConfigurationError> {
        if !is_cmake_identifier(name) {
            return Err(ConfigurationError::InvalidVariable(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CMakeVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of generated CMake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLine {
    /// `include("${CMAKE_CURRENT_LIST_DIR}/<path>")`
    Include(ScriptPath),
    /// `set(<variable> <value>)`
    Set(CMakeVariable, String),
}

impl fmt::Display for ConfigLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include(path) => write!(f, "include(\"${{CMAKE_CURRENT_LIST_DIR}}/{}\")", path),
            Self::Set(variable, value) => write!(f, "set({} {})", variable, value),
        }
    }
}

/// Render an option value as a CMake argument
///
/// Booleans become `True`/`False`. Text is quoted when CMake would
/// otherwise split or reinterpret it.
pub fn cmake_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(true) => "True".to_string(),
        OptionValue::Bool(false) => "False".to_string(),
        OptionValue::Text(text) => {
            let plain = !text.is_empty()
                && text
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '+'));
            if plain {
                text.clone()
            } else {
                let escaped = text
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"")
                    .replace('$', "\\$");
                format!("\"{}\"", escaped)
            }
        }
    }
}

/// An ordered list of generated lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedConfig {
    lines: Vec<ConfigLine>,
}

impl GeneratedConfig {
    pub fn lines(&self) -> &[ConfigLine] {
        &self.lines
    }

    /// Rendered lines without terminators
    pub fn text_lines(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// File content, every line ending with `\n`
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}

/// Build the config for `resolved`, including `include_target` first
pub fn emit(
    resolved: &ResolvedOptions,
    include_target: &str,
) -> std::result::Result<GeneratedConfig, ConfigurationError> {
    let mut lines = vec![ConfigLine::Include(ScriptPath::new(include_target)?)];
    for (variable, value) in resolved.forwarded() {
        lines.push(ConfigLine::Set(CMakeVariable::new(variable)?, cmake_value(value)));
    }
    Ok(GeneratedConfig { lines })
}

/// Replace `destination` with the rendered config
///
/// Content goes to a temporary sibling that is renamed over the
/// destination, so readers see either the old file or the complete new
/// one. The temporary file is removed on every error path.
pub fn write(config: &GeneratedConfig, destination: &Path) -> Result<()> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(parent).map_err(|e| Error::config_write(destination, e))?;

    let mut temp =
        NamedTempFile::new_in(parent).map_err(|e| Error::config_write(destination, e))?;
    temp.write_all(config.render().as_bytes())
        .map_err(|e| Error::config_write(destination, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::config_write(destination, e))?;
    temp.persist(destination)
        .map_err(|e| Error::config_write(destination, e.error))?;

    debug!(
        "Wrote {} line(s) to {}",
        config.lines.len(),
        destination.display()
    );
    Ok(())
}
