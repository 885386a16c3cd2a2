//! Landscape packages
//!
//! Concrete targets (Kubernetes namespaces, Cloud Foundry installations and
//! bridges between them), their deployment backends and the installers for
//! the packages strata ships with.
//!
//! Backends are dry runs: [`RecordingTargetFactory`] reports the helm, kapp
//! and cf commands an installation would run.

pub mod plugins;
pub mod recording;
pub mod target;

pub use plugins::catalog;
pub use recording::RecordingTargetFactory;
pub use target::{
    BasicAuthorization, CloudFoundryConfig, CloudFoundryTarget, Credentials, Helm, Kapp,
    KubernetesConfig, KubernetesTarget, Landscape, TargetFactory,
};

/// Cluster used when no other is configured
pub const DEFAULT_KUBERNETES_URL: &str = "https://gardener.canary.hana-ondemand.com";

/// Prefix of all package names
pub const PACKAGE_PREFIX: &str = "docker.io/pkgs/";

/// Full package name for a short one such as `istio`
pub fn package_name(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{}{}", PACKAGE_PREFIX, name)
    }
}
