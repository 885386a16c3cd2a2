//! Installer registry
//!
//! Maps package names to installer factories, one per registered version.
//! Lookups pick the highest version that satisfies the requested constraints.

use crate::error::{StrataError, StrataResult};
use crate::installation::Installer;
use crate::version::ConstraintSet;
use semver::Version;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Creates an installer for a package version bound to a target
pub type InstallerFactory<T> =
    Arc<dyn Fn(&T, &Version) -> StrataResult<Box<dyn Installer<T>>> + Send + Sync>;

struct VersionedFactory<T> {
    version: Version,
    factory: InstallerFactory<T>,
}

/// Registered installers by package name
pub struct Registry<T> {
    installers: BTreeMap<String, Vec<VersionedFactory<T>>>,
}

impl<T> Registry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            installers: BTreeMap::new(),
        }
    }

    /// Register `factory` for version `version` of package `name`
    ///
    /// Registering the same version twice replaces the earlier factory.
    pub fn register<F>(&mut self, name: impl Into<String>, version: Version, factory: F)
    where
        F: Fn(&T, &Version) -> StrataResult<Box<dyn Installer<T>>> + Send + Sync + 'static,
    {
        let name = name.into();
        let versions = self.installers.entry(name.clone()).or_default();
        versions.retain(|v| v.version != version);
        debug!("Registered installer {} {}", name, version);
        versions.push(VersionedFactory {
            version,
            factory: Arc::new(factory),
        });
        // Highest version first
        versions.sort_by(|a, b| b.version.cmp(&a.version));
    }

    /// Factory and version of the highest registered version matching `constraints`
    pub fn get(&self, name: &str, constraints: &ConstraintSet) -> StrataResult<(InstallerFactory<T>, Version)> {
        let versions = self
            .installers
            .get(name)
            .ok_or_else(|| StrataError::PackageNotFound {
                name: name.to_string(),
            })?;

        versions
            .iter()
            .find(|v| constraints.matches(&v.version))
            .map(|v| (Arc::clone(&v.factory), v.version.clone()))
            .ok_or_else(|| StrataError::NoMatchingVersion {
                name: name.to_string(),
                constraints: constraints.to_string(),
            })
    }

    /// Registered package names with their versions, highest first
    pub fn packages(&self) -> Vec<(&str, Vec<&Version>)> {
        self.installers
            .iter()
            .map(|(name, versions)| {
                (
                    name.as_str(),
                    versions.iter().map(|v| &v.version).collect(),
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.installers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installers.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
