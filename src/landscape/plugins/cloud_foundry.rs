//! Cloud Foundry runtime on Kubernetes

use super::istio::{self, IstioParameter};
use crate::error::StrataResult;
use crate::installation::{ApplyOutcome, Images, InstallationHelper, Installer};
use crate::landscape::target::{
    BasicAuthorization, CloudFoundryConfig, Credentials, KubernetesTarget, Landscape, TargetFactory,
};
use crate::merge::RejectConflicts;
use crate::registry::Registry;
use semver::Version;
use std::sync::Arc;

pub const PACKAGE: &str = "docker.io/pkgs/cloud-foundry";

/// Namespace the runtime is deployed into by the environment packages
pub const NAMESPACE: &str = "cf-system";

/// Credentials of the new installation
pub type CloudFoundryResponse = CloudFoundryConfig;

pub struct CloudFoundryInstaller {
    factory: Arc<dyn TargetFactory>,
    target: Arc<dyn KubernetesTarget>,
    version: Version,
}

impl Installer<Landscape> for CloudFoundryInstaller {
    fn apply(&self, name: &str, _images: &Images, mut helper: InstallationHelper<'_, Landscape>) -> StrataResult<ApplyOutcome<Landscape>> {
        let istio_target = self.factory.kubernetes(istio::NAMESPACE, self.target.config());
        helper
            .installation("istio", istio::PACKAGE, ">= 1.6")
            .target(Landscape::Kubernetes(istio_target))
            .json_parameter(&IstioParameter::with_instances(1))
            .request();

        let parameter = helper.merged_json(&RejectConflicts);
        helper.apply(|| {
            self.target
                .kapp()
                .apply(name, "cf-for-k8s-scp", &self.version, parameter.as_ref())?;
            Ok(CloudFoundryResponse {
                cf: credentials("https://api.example.com"),
                uaa: credentials("https://uaa.example.com"),
            })
        })
    }

    fn delete(&self, name: &str) -> StrataResult<()> {
        self.target.kapp().delete(name)
    }
}

fn credentials(url: &str) -> Credentials {
    Credentials {
        url: url.to_string(),
        basic: BasicAuthorization {
            username: "username".to_string(),
            password: "password".to_string(),
        },
    }
}

pub fn register(registry: &mut Registry<Landscape>, factory: Arc<dyn TargetFactory>) {
    registry.register(PACKAGE, Version::new(2, 0, 0), move |target: &Landscape, version: &Version| {
        Ok(Box::new(CloudFoundryInstaller {
            factory: Arc::clone(&factory),
            target: target.kubernetes(PACKAGE)?,
            version: version.clone(),
        }) as Box<dyn Installer<Landscape>>)
    });
}
