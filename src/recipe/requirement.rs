// src/recipe/requirement.rs

//! Pinned dependency references
//!
//! Requirements use the format `name/revision@user/channel`, where the
//! channel part is optional:
//! - `graphics/5bf5ee7f2c@adnn/develop` - a revision on a maintainer branch
//! - `catch2/3.1.0` - a plain released version, no channel
//!
//! A requirement identifies exactly one dependency artifact. How that
//! artifact is found is up to the dependency provider.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Whether a requirement is linked into the artifact or only used to build it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    /// Linked into the artifact (`requires`)
    #[default]
    Host,
    /// Only needed as a tool while building (`build_requires`)
    Tool,
}

/// A channel qualifier: `user/channel`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    pub user: String,
    pub channel: Option<String>,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.channel {
            Some(channel) => write!(f, "{}/{}", self.user, channel),
            None => f.write_str(&self.user),
        }
    }
}

/// A pinned reference to a dependency package
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    /// Package name
    pub name: String,
    /// Revision hash or version
    pub revision: String,
    /// Optional channel qualifier
    pub channel: Option<Channel>,
    pub kind: RequirementKind,
}

impl Requirement {
    /// Create a host requirement
    pub fn new(name: impl Into<String>, revision: impl Into<String>, channel: Option<Channel>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
            channel,
            kind: RequirementKind::Host,
        }
    }

    /// Parse a requirement from `name/revision[@user[/channel]]`
    pub fn parse(s: &str) -> Result<Self, RequirementParseError> {
        let s = s.trim();
        let (reference, channel) = match s.split_once('@') {
            Some((reference, channel)) => (reference, Some(channel)),
            None => (s, None),
        };

        let (name, revision) = reference
            .split_once('/')
            .ok_or_else(|| RequirementParseError::MissingRevision(s.to_string()))?;

        if name.is_empty() {
            return Err(RequirementParseError::EmptyName(s.to_string()));
        }
        if revision.is_empty() {
            return Err(RequirementParseError::MissingRevision(s.to_string()));
        }

        // each part becomes a path component in dependency caches
        let valid_part = |part: &str| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && part
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'))
        };

        if !valid_part(name) {
            return Err(RequirementParseError::InvalidName(name.to_string()));
        }
        if !valid_part(revision) {
            return Err(RequirementParseError::InvalidRevision(revision.to_string()));
        }

        let channel = match channel {
            Some(raw) => {
                let (user, channel) = match raw.split_once('/') {
                    Some((user, channel)) => (user, Some(channel)),
                    None => (raw, None),
                };
                if !valid_part(user) || !channel.is_none_or(valid_part) {
                    return Err(RequirementParseError::InvalidChannel(raw.to_string()));
                }
                Some(Channel {
                    user: user.to_string(),
                    channel: channel.map(str::to_string),
                })
            }
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            revision: revision.to_string(),
            channel,
            kind: RequirementKind::Host,
        })
    }

    /// Mark this requirement as tool-only
    pub fn into_tool(mut self) -> Self {
        self.kind = RequirementKind::Tool;
        self
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.revision)?;
        if let Some(channel) = &self.channel {
            write!(f, "@{}", channel)?;
        }
        Ok(())
    }
}

impl FromStr for Requirement {
    type Err = RequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors that can occur when parsing a requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementParseError {
    /// No `/revision` part
    MissingRevision(String),
    /// Empty package name
    EmptyName(String),
    /// Invalid characters in the package name
    InvalidName(String),
    /// Invalid characters in the revision
    InvalidRevision(String),
    /// Malformed `user/channel` part
    InvalidChannel(String),
}

impl fmt::Display for RequirementParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRevision(s) => write!(f, "Missing '/revision' in requirement: {}", s),
            Self::EmptyName(s) => write!(f, "Empty package name in requirement: {}", s),
            Self::InvalidName(s) => write!(f, "Invalid package name: {}", s),
            Self::InvalidRevision(s) => write!(f, "Invalid revision: {}", s),
            Self::InvalidChannel(s) => write!(f, "Invalid channel: {}", s),
        }
    }
}

impl std::error::Error for RequirementParseError {}
