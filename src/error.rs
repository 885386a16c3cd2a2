//! Error types for strata
//!
//! All modules use `StrataResult<T>` as their return type. Missing
//! dependencies are not errors: installers report them through
//! [`crate::installation::ApplyOutcome::NeedsMore`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for strata operations
pub type StrataResult<T> = Result<T, StrataError>;

/// All errors that can occur in strata
#[derive(Error, Debug)]
pub enum StrataError {
    // Resolution errors
    #[error("Installer for package {name} not found")]
    PackageNotFound { name: String },

    #[error("Installer for package {name} with constraints {constraints} not found")]
    NoMatchingVersion { name: String, constraints: String },

    #[error("Invalid version constraint '{constraint}': {source}")]
    InvalidConstraint {
        constraint: String,
        #[source]
        source: semver::Error,
    },

    #[error("Resolving {package} on target {target} failed: {source}")]
    Resolve {
        package: String,
        target: String,
        #[source]
        source: Box<StrataError>,
    },

    #[error("Dependency cycle detected: {chain}")]
    DependencyCycle { chain: String },

    #[error("Installer for {package} requested more dependencies without naming any")]
    Stalled { package: String },

    #[error("Digest {digest} of {package} collides with installation of {existing}")]
    DigestCollision {
        digest: String,
        package: String,
        existing: String,
    },

    // Installation errors
    #[error("Apply of {package}:{constraints} on target {target} failed: {source}")]
    Apply {
        package: String,
        constraints: String,
        target: String,
        #[source]
        source: Box<StrataError>,
    },

    #[error("Delete of {package} on target {target} failed: {source}")]
    Delete {
        package: String,
        target: String,
        #[source]
        source: Box<StrataError>,
    },

    #[error("Installation {package} not found in target {target}")]
    InstallationNotFound { package: String, target: String },

    #[error("Missing environment variable {name}")]
    SecretMissing { name: String },

    #[error("Environment variable {name} is not valid UTF-8")]
    SecretNotUnicode { name: String },

    #[error("Installer for {package} requires a {expected} target, got {actual}")]
    TargetMismatch {
        package: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Backend command failed: {command}: {reason}")]
    Backend { command: String, reason: String },

    // Merge errors
    #[error("Incompatible jsons at {path}: '{left}' '{right}'")]
    MergeConflict {
        path: String,
        left: String,
        right: String,
    },

    #[error("Incompatible json types at {path}: '{left}' '{right}'")]
    IncompatibleTypes {
        path: String,
        left: String,
        right: String,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl StrataError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a backend failure for a command
    pub fn backend(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Create a merge conflict at a json path
    pub fn conflict(path: &str, left: &serde_json::Value, right: &serde_json::Value) -> Self {
        Self::MergeConflict {
            path: path.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// Innermost error, skipping context wrappers
    pub fn root_cause(&self) -> &StrataError {
        match self {
            Self::Resolve { source, .. } | Self::Apply { source, .. } | Self::Delete { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self.root_cause() {
            Self::SecretMissing { .. } => Some("Export the named environment variable and retry"),
            Self::PackageNotFound { .. } => Some("Run: strata packages"),
            Self::NoMatchingVersion { .. } => {
                Some("The combined constraints of all requesters exclude every registered version")
            }
            Self::DependencyCycle { .. } => Some("Break the cycle between the listed packages"),
            _ => None,
        }
    }
}
