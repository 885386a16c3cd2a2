//! Packages command - list installable packages

use crate::config::Config;
use crate::error::StrataResult;
use crate::landscape::{self, RecordingTargetFactory};
use crate::ui::{self, UiContext};
use std::sync::Arc;

/// Execute the packages command
pub async fn execute(_config: &Config) -> StrataResult<()> {
    let ctx = UiContext::detect();
    let registry = landscape::catalog(Arc::new(RecordingTargetFactory::new(|_| {})));

    ui::intro(&ctx, "Packages");
    for (name, versions) in registry.packages() {
        let versions: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        ui::key_value(&ctx, name, &versions.join(", "));
    }
    ui::step_info(&ctx, &format!("{} packages", registry.len()));

    Ok(())
}
