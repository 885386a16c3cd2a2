//! Cloud Foundry environment on an existing cluster

use super::cloud_foundry::{self, CloudFoundryResponse};
use super::cloud_foundry_environment::request_tenant;
use crate::error::StrataResult;
use crate::installation::{ApplyOutcome, Images, InstallationHelper, Installer};
use crate::landscape::target::{KubernetesTarget, Landscape, TargetFactory};
use crate::registry::Registry;
use semver::Version;
use std::sync::Arc;

pub const PACKAGE: &str = "docker.io/pkgs/extended-cloud-foundry";

pub struct ExtendedCloudFoundryInstaller {
    factory: Arc<dyn TargetFactory>,
    target: Arc<dyn KubernetesTarget>,
}

impl Installer<Landscape> for ExtendedCloudFoundryInstaller {
    fn apply(&self, _name: &str, _images: &Images, mut helper: InstallationHelper<'_, Landscape>) -> StrataResult<ApplyOutcome<Landscape>> {
        let cf: Option<CloudFoundryResponse> = helper
            .installation("cloud-foundry", cloud_foundry::PACKAGE, ">= 2.0")
            .response();
        if let Some(cf) = &cf {
            request_tenant(&mut helper, self.factory.as_ref(), self.target.config(), cf);
        }

        // The runtime's credentials are this package's response
        helper.apply(|| Ok(cf))
    }

    fn delete(&self, _name: &str) -> StrataResult<()> {
        Ok(())
    }
}

pub fn register(registry: &mut Registry<Landscape>, factory: Arc<dyn TargetFactory>) {
    registry.register(PACKAGE, Version::new(2, 0, 0), move |target: &Landscape, _: &Version| {
        Ok(Box::new(ExtendedCloudFoundryInstaller {
            factory: Arc::clone(&factory),
            target: target.kubernetes(PACKAGE)?,
        }) as Box<dyn Installer<Landscape>>)
    });
}
