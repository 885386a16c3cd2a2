//! Configuration schema for strata
//!
//! Configuration is stored at `~/.config/strata/config.toml`. Every section
//! and key is optional.

use crate::landscape::DEFAULT_KUBERNETES_URL;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cluster packages are applied to
    pub kubernetes: KubernetesSettings,

    /// Secret lookup
    pub secrets: SecretsConfig,
}

impl Config {
    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), String> {
        match self.general.log_format.as_str() {
            "text" | "json" => {}
            other => return Err(format!("unknown log_format '{}', expected text or json", other)),
        }
        if self.kubernetes.url.trim().is_empty() {
            return Err("kubernetes.url must not be empty".to_string());
        }
        if self.kubernetes.namespace.trim().is_empty() {
            return Err("kubernetes.namespace must not be empty".to_string());
        }
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Append apply/delete events to the audit log
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: false,
        }
    }
}

/// Kubernetes defaults for the apply command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesSettings {
    /// API endpoint of the cluster
    pub url: String,

    /// Namespace used when none is given on the command line
    pub namespace: String,
}

impl Default for KubernetesSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_KUBERNETES_URL.to_string(),
            namespace: "default".to_string(),
        }
    }
}

/// Secret settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Prefix of the environment variables secrets are read from
    pub env_prefix: String,
}
