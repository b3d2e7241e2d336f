// src/recipe/kitchen/resolver.rs

//! Dependency resolution for recipe builds
//!
//! The kitchen never fetches or builds dependency artifacts itself. It asks
//! a [`DependencyProvider`] for a handle per requirement and keeps the
//! answers in requirement order.

use crate::error::{DependencyError, Error, Result};
use crate::recipe::format::{BuildPolicy, SettingAxis};
use crate::recipe::requirement::Requirement;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// What a provider knows about the build asking for a dependency
#[derive(Debug, Clone, Copy)]
pub struct LookupContext<'a> {
    pub settings: &'a BTreeMap<SettingAxis, String>,
    pub build_policy: BuildPolicy,
}

/// Opaque location of a dependency artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyHandle {
    /// Root directory of the artifact
    pub location: PathBuf,
    /// Name of the provider that produced the handle
    pub provider: String,
}

/// A requirement paired with the handle its provider returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    pub requirement: Requirement,
    pub handle: DependencyHandle,
}

/// Trait for looking up dependency artifacts
///
/// Implementations may block for as long as they need. Returning `Ok(None)`
/// means the provider does not know the requirement; `Err` means the lookup
/// itself broke.
pub trait DependencyProvider: Send + Sync {
    /// Name used in logs and handles
    fn name(&self) -> &str;

    /// Look up one requirement
    fn provide(
        &self,
        requirement: &Requirement,
        context: &LookupContext<'_>,
    ) -> Result<Option<DependencyHandle>>;
}

/// Maps requirements onto handles through a provider
pub struct DependencyResolver<'a> {
    provider: &'a dyn DependencyProvider,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(provider: &'a dyn DependencyProvider) -> Self {
        Self { provider }
    }

    /// Resolve every requirement, preserving input order
    ///
    /// Duplicate package names are rejected before the provider is asked
    /// anything.
    pub fn resolve(
        &self,
        requirements: &[Requirement],
        context: &LookupContext<'_>,
    ) -> Result<Vec<ResolvedDependency>> {
        let mut seen = HashSet::new();
        for requirement in requirements {
            if !seen.insert(requirement.name.as_str()) {
                return Err(DependencyError::DuplicateRequirement(requirement.name.clone()).into());
            }
        }

        let mut resolved = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            debug!("Looking up {} via {}", requirement, self.provider.name());

            let handle = self
                .provider
                .provide(requirement, context)
                .map_err(|e| DependencyError::ProviderFailed {
                    name: requirement.name.clone(),
                    reason: e.to_string(),
                })?
                .ok_or_else(|| DependencyError::UnresolvedDependency(requirement.name.clone()))?;

            info!("Resolved {} -> {}", requirement, handle.location.display());
            resolved.push(ResolvedDependency {
                requirement: requirement.clone(),
                handle,
            });
        }

        Ok(resolved)
    }
}

/// Provider reading a local artifact cache
///
/// Artifacts live at `<root>/<name>/<revision>/<user>/<channel>`, with `_`
/// standing in for a missing user or channel. The cache is only read.
#[derive(Debug, Clone)]
pub struct LocalCacheProvider {
    root: PathBuf,
}

impl LocalCacheProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory an artifact for `requirement` would occupy
    pub fn artifact_dir(&self, requirement: &Requirement) -> PathBuf {
        let (user, channel) = match &requirement.channel {
            Some(c) => (c.user.as_str(), c.channel.as_deref().unwrap_or("_")),
            None => ("_", "_"),
        };
        self.root
            .join(&requirement.name)
            .join(&requirement.revision)
            .join(user)
            .join(channel)
    }
}

impl DependencyProvider for LocalCacheProvider {
    fn name(&self) -> &str {
        "local-cache"
    }

    fn provide(
        &self,
        requirement: &Requirement,
        context: &LookupContext<'_>,
    ) -> Result<Option<DependencyHandle>> {
        let dir = self.artifact_dir(requirement);
        if dir.is_dir() {
            return Ok(Some(DependencyHandle {
                location: dir,
                provider: self.name().to_string(),
            }));
        }

        if context.build_policy != BuildPolicy::Never {
            debug!(
                "{} missing from {} and build policy is {}; local cache cannot build it",
                requirement,
                self.root.display(),
                context.build_policy
            );
        }
        Ok(None)
    }
}

/// Provider for dependencies checked out locally
///
/// Each entry maps a package name to a directory, whatever revision the
/// requirement pins.
#[derive(Debug, Clone, Default)]
pub struct EditableProvider {
    paths: BTreeMap<String, PathBuf>,
}

impl EditableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.paths.insert(name.into(), path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl DependencyProvider for EditableProvider {
    fn name(&self) -> &str {
        "editable"
    }

    fn provide(
        &self,
        requirement: &Requirement,
        _context: &LookupContext<'_>,
    ) -> Result<Option<DependencyHandle>> {
        let Some(path) = self.paths.get(&requirement.name) else {
            return Ok(None);
        };

        if !path.is_dir() {
            return Err(Error::IoError(format!(
                "Editable path for {} is not a directory: {}",
                requirement.name,
                path.display()
            )));
        }

        Ok(Some(DependencyHandle {
            location: path.clone(),
            provider: self.name().to_string(),
        }))
    }
}

/// Asks several providers in order; the first handle wins
#[derive(Clone, Default)]
pub struct ChainProvider {
    providers: Vec<Arc<dyn DependencyProvider>>,
}

impl ChainProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, provider: Arc<dyn DependencyProvider>) {
        self.providers.push(provider);
    }

    pub fn with(mut self, provider: Arc<dyn DependencyProvider>) -> Self {
        self.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl DependencyProvider for ChainProvider {
    fn name(&self) -> &str {
        "chain"
    }

    fn provide(
        &self,
        requirement: &Requirement,
        context: &LookupContext<'_>,
    ) -> Result<Option<DependencyHandle>> {
        for provider in &self.providers {
            if let Some(handle) = provider.provide(requirement, context)? {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }
}
