//! Apply command - install a package and its dependencies
//!
//! Backends are dry runs: every helm, kapp and cf command an installation
//! would run is printed instead.

use crate::audit::AuditLog;
use crate::cli::args::ApplyArgs;
use crate::config::Config;
use crate::error::StrataResult;
use crate::landscape::{self, KubernetesConfig, Landscape, RecordingTargetFactory, TargetFactory};
use crate::manager::PackageManager;
use crate::secrets::EnvSecrets;
use crate::ui::{self, UiContext};
use crate::version;
use std::sync::Arc;
use tracing::debug;

/// Execute the apply command
pub async fn execute(args: ApplyArgs, config: &Config) -> StrataResult<()> {
    let ctx = UiContext::detect();
    let package = landscape::package_name(&args.package);
    let constraints = version::parse_constraint(&args.constraint)?;

    let sink = ctx.clone();
    let factory = Arc::new(RecordingTargetFactory::new(move |command| {
        ui::command(&sink, &command)
    }));
    let secrets = EnvSecrets::with_prefix(config.secrets.env_prefix.clone());
    let mut manager = PackageManager::with_secrets(landscape::catalog(factory.clone()), secrets);

    let cluster = KubernetesConfig {
        url: args.url.unwrap_or_else(|| config.kubernetes.url.clone()),
    };
    let namespace = args
        .namespace
        .unwrap_or_else(|| config.kubernetes.namespace.clone());
    let target = Landscape::Kubernetes(factory.kubernetes(&namespace, &cluster));
    debug!("Target: {}", target);

    let audit = AuditLog::new(config);

    ui::intro(&ctx, &format!("Applying {} ({})", package, constraints));
    let installation = manager.apply(&target, &package, &constraints, args.parameter)?;
    ui::step_ok_detail(
        &ctx,
        &format!("Applied {} {}", installation.pkg_name, installation.version),
        &installation.digest,
    );
    if !installation.response.is_null() {
        ui::key_value(&ctx, "response", &installation.response.to_string());
    }
    audit.applied(installation).await;
    ui::key_value(&ctx, "installations", &manager.len().to_string());

    if args.teardown {
        ui::intro(&ctx, &format!("Deleting {}", package));
        manager.delete(&target, &package)?;
        audit.deleted(&package, &target.to_string()).await;
        ui::step_ok(&ctx, &format!("Deleted {}", package));
        if !manager.is_empty() {
            ui::step_warn_hint(
                &ctx,
                &format!("{} installations still cached", manager.len()),
                "Another requester still holds them",
            );
        }
    }

    Ok(())
}
