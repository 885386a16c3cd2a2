//! Installation records and the installer contract
//!
//! An [`Installation`] is one package deployed on one target. It remembers
//! who asked for it (`requests`, the reference count), what its dependencies
//! answered (`responses`) and which installations it created (`children`).

pub mod helper;

pub use helper::{DependencyBuilder, InstallationHelper};

use crate::error::StrataResult;
use crate::merge::Parameter;
use crate::version::ConstraintSet;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Container image handed to an installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub repo: String,
    pub sha: String,
}

/// Images by name
pub type Images = BTreeMap<String, Image>;

/// A request for a package, made by a caller or by another installer
#[derive(Debug, Clone)]
pub struct InstallationRequest<T> {
    pub pkg_name: String,
    pub constraints: VersionReq,
    /// Defaults to the requesting installation's target
    pub target: Option<T>,
    pub parameter: Option<Parameter>,
}

impl<T> InstallationRequest<T> {
    pub fn new(pkg_name: impl Into<String>, constraints: VersionReq) -> Self {
        Self {
            pkg_name: pkg_name.into(),
            constraints,
            target: None,
            parameter: None,
        }
    }

    /// Same constraints and parameter
    pub fn same_as(&self, other: &Self) -> bool {
        self.constraints == other.constraints && self.parameter == other.parameter
    }
}

/// A secret an installer needs, fetched by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRequest {
    pub name: String,
}

/// Something an installer cannot complete without
#[derive(Debug, Clone)]
pub enum DependencyRequest<T> {
    Installation(InstallationRequest<T>),
    Secret(SecretRequest),
}

/// Unmet dependencies of one apply attempt, by local name
#[derive(Debug, Clone)]
pub struct DependenciesMissing<T> {
    pub requests: BTreeMap<String, DependencyRequest<T>>,
}

impl<T> DependenciesMissing<T> {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl<T> fmt::Display for DependenciesMissing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing dependencies:")?;
        for (i, (name, request)) in self.requests.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            match request {
                DependencyRequest::Installation(r) => write!(f, "{}{} ({})", sep, name, r.pkg_name)?,
                DependencyRequest::Secret(s) => write!(f, "{}{} (secret {})", sep, name, s.name)?,
            }
        }
        Ok(())
    }
}

/// Result of one call to [`Installer::apply`]
#[derive(Debug, Clone)]
pub enum ApplyOutcome<T> {
    /// Installed; carries the installation's response
    Complete(Value),

    /// Call again once these are resolved
    NeedsMore(DependenciesMissing<T>),
}

/// Installs and removes one package kind
pub trait Installer<T> {
    /// Install or update the package under the resource name `name`
    fn apply(
        &self,
        name: &str,
        images: &Images,
        helper: InstallationHelper<'_, T>,
    ) -> StrataResult<ApplyOutcome<T>>;

    /// Remove the package installed under `name`
    fn delete(&self, name: &str) -> StrataResult<()>;
}

/// One package deployed on one target
#[derive(Debug, Clone)]
pub struct Installation<T> {
    pub digest: String,
    pub pkg_name: String,
    pub version: Version,
    pub target: T,
    pub requests: BTreeMap<String, InstallationRequest<T>>,
    pub responses: BTreeMap<String, Value>,
    /// Digests of installations created by this one, in creation order
    pub children: Vec<String>,
    pub response: Value,
    pub(crate) target_digest: Vec<u8>,
    /// Backend already deleted while children are still being released
    pub(crate) torn_down: bool,
}

impl<T: Clone> Installation<T> {
    pub(crate) fn new(digest: String, pkg_name: &str, version: Version, target: T, target_digest: Vec<u8>) -> Self {
        Self {
            digest,
            pkg_name: pkg_name.to_string(),
            version,
            target,
            requests: BTreeMap::new(),
            responses: BTreeMap::new(),
            children: Vec::new(),
            response: Value::Null,
            target_digest,
            torn_down: false,
        }
    }

    /// Intersection of every requester's constraints
    pub fn intersected_constraints(&self) -> ConstraintSet {
        self.requests.values().map(|r| r.constraints.clone()).collect()
    }

    /// Non-null parameters of all requesters
    pub fn parameters(&self) -> Vec<Parameter> {
        self.requests
            .values()
            .filter_map(|r| r.parameter.clone())
            .filter(|p| !p.is_null())
            .collect()
    }

    /// Distinct parameters, the effective input of the installer
    pub(crate) fn distinct_parameters(&self) -> BTreeSet<String> {
        self.parameters().iter().map(|p| p.to_string()).collect()
    }

    /// Record `child` unless it is already known
    pub(crate) fn adopt(&mut self, child: &str) {
        if !self.children.iter().any(|c| c == child) {
            self.children.push(child.to_string());
        }
    }

    /// Whether the installation was created for `target_digest` and `pkg_name`
    pub(crate) fn is_for(&self, target_digest: &[u8], pkg_name: &str) -> bool {
        self.target_digest == target_digest && self.pkg_name == pkg_name
    }

    pub fn is_live(&self) -> bool {
        !self.requests.is_empty()
    }
}
