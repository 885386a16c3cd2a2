//! Complete Cloud Foundry environment
//!
//! Provisions a fresh cluster, runs Cloud Foundry on it and sets up a tenant:
//! an organization plus the service manager agent. The package itself
//! deploys nothing.

use super::cloud_foundry::{self, CloudFoundryResponse};
use super::cluster::{self, ClusterResponse};
use super::{organization, service_manager_agent};
use crate::error::StrataResult;
use crate::installation::{ApplyOutcome, Images, InstallationHelper, Installer};
use crate::landscape::target::{CloudFoundryConfig, KubernetesConfig, Landscape, TargetFactory};
use crate::registry::Registry;
use semver::Version;
use serde_json::json;
use std::sync::Arc;

pub const PACKAGE: &str = "docker.io/pkgs/cloud-foundry-environment";

/// Namespace of the service manager agent
pub const AGENT_NAMESPACE: &str = "service-agent-manager";

pub struct CloudFoundryEnvironmentInstaller {
    factory: Arc<dyn TargetFactory>,
}

impl Installer<Landscape> for CloudFoundryEnvironmentInstaller {
    fn apply(&self, _name: &str, _images: &Images, mut helper: InstallationHelper<'_, Landscape>) -> StrataResult<ApplyOutcome<Landscape>> {
        let cluster: Option<ClusterResponse> = helper
            .installation("cluster", cluster::PACKAGE, ">= 1.0")
            .response();

        if let Some(cluster) = cluster {
            let runtime = self.factory.kubernetes(cloud_foundry::NAMESPACE, &cluster);
            let cf: Option<CloudFoundryResponse> = helper
                .installation("cloud-foundry", cloud_foundry::PACKAGE, ">= 2.0")
                .target(Landscape::Kubernetes(runtime))
                .response();
            if let Some(cf) = cf {
                request_tenant(&mut helper, self.factory.as_ref(), &cluster, &cf);
            }
        }

        helper.apply(|| Ok(json!({})))
    }

    fn delete(&self, _name: &str) -> StrataResult<()> {
        Ok(())
    }
}

/// Organization and service manager agent for a Cloud Foundry installation
pub(super) fn request_tenant(
    helper: &mut InstallationHelper<'_, Landscape>,
    factory: &dyn TargetFactory,
    cluster: &KubernetesConfig,
    cf: &CloudFoundryConfig,
) {
    helper
        .installation("organization", organization::PACKAGE, ">= 1.0")
        .target(Landscape::CloudFoundry(factory.cloud_foundry(cf)))
        .request();
    helper
        .installation("service-manager-agent", service_manager_agent::PACKAGE, ">= 0.1")
        .target(Landscape::Bridge(
            factory.kubernetes(AGENT_NAMESPACE, cluster),
            factory.cloud_foundry(cf),
        ))
        .request();
}

pub fn register(registry: &mut Registry<Landscape>, factory: Arc<dyn TargetFactory>) {
    registry.register(PACKAGE, Version::new(1, 0, 0), move |target: &Landscape, _: &Version| {
        target.kubernetes(PACKAGE)?;
        Ok(Box::new(CloudFoundryEnvironmentInstaller {
            factory: Arc::clone(&factory),
        }) as Box<dyn Installer<Landscape>>)
    });
}
