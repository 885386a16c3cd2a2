//! Audit trail of applied and deleted packages
//!
//! Appends one JSON line per event to the state directory's `audit.log`.
//! Off unless `general.audit_log` is set.

use crate::config::{schema::Config, ConfigManager};
use crate::installation::Installation;
use crate::target::Target;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Append-only JSON lines log
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    pub fn with_path(enabled: bool, path: PathBuf) -> Self {
        Self { enabled, path }
    }

    /// Record a completed apply of `installation`
    pub async fn applied<T: Target>(&self, installation: &Installation<T>) {
        self.log(
            "package.applied",
            &json!({
                "package": installation.pkg_name,
                "version": installation.version.to_string(),
                "target": installation.target.to_string(),
                "digest": installation.digest,
                "children": installation.children.len(),
            }),
        )
        .await;
    }

    /// Record a released package
    pub async fn deleted(&self, package: &str, target: &str) {
        self.log("package.deleted", &json!({"package": package, "target": target}))
            .await;
    }

    /// Log an event
    ///
    /// IO failures are logged and dropped; they never fail the command.
    pub async fn log(&self, event: &str, data: &Value) {
        if !self.enabled {
            return;
        }

        let entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
