//! Kubernetes cluster provisioning

use crate::error::StrataResult;
use crate::installation::{ApplyOutcome, Images, InstallationHelper, Installer};
use crate::landscape::target::{KubernetesConfig, KubernetesTarget, Landscape};
use crate::merge::RejectConflicts;
use crate::registry::Registry;
use semver::Version;
use std::sync::Arc;

pub const PACKAGE: &str = "docker.io/pkgs/cluster";

/// The cluster's response is the config of the new cluster
pub type ClusterResponse = KubernetesConfig;

pub struct ClusterInstaller {
    target: Arc<dyn KubernetesTarget>,
    version: Version,
}

impl Installer<Landscape> for ClusterInstaller {
    fn apply(&self, name: &str, _images: &Images, mut helper: InstallationHelper<'_, Landscape>) -> StrataResult<ApplyOutcome<Landscape>> {
        let parameter = helper.merged_json(&RejectConflicts);
        helper.apply(|| {
            self.target
                .helm()
                .apply(name, "cluster", &self.version, parameter.as_ref())?;
            Ok(ClusterResponse {
                url: format!("https://{}.cluster.hana-ondemand.com", name),
            })
        })
    }

    fn delete(&self, name: &str) -> StrataResult<()> {
        self.target.helm().delete(name)
    }
}

pub fn register(registry: &mut Registry<Landscape>) {
    registry.register(PACKAGE, Version::new(1, 0, 1), |target: &Landscape, version: &Version| {
        Ok(Box::new(ClusterInstaller {
            target: target.kubernetes(PACKAGE)?,
            version: version.clone(),
        }) as Box<dyn Installer<Landscape>>)
    });
}
