//! Istio service mesh
//!
//! Shared by several packages on the same cluster. Requesters may ask for
//! different pilot sizes; the largest one wins.

use crate::error::StrataResult;
use crate::installation::{ApplyOutcome, Images, InstallationHelper, Installer};
use crate::landscape::target::{KubernetesTarget, Landscape};
use crate::merge::{Maximum, PathResolvers};
use crate::registry::Registry;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub const PACKAGE: &str = "docker.io/pkgs/istio";

/// Namespace istio is installed into
pub const NAMESPACE: &str = "istio-system";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    pub instances: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IstioParameter {
    pub pilot: Pilot,
}

impl IstioParameter {
    pub fn with_instances(instances: u32) -> Self {
        Self {
            pilot: Pilot { instances },
        }
    }
}

pub struct IstioInstaller {
    target: Arc<dyn KubernetesTarget>,
    version: Version,
}

impl Installer<Landscape> for IstioInstaller {
    fn apply(&self, name: &str, _images: &Images, mut helper: InstallationHelper<'_, Landscape>) -> StrataResult<ApplyOutcome<Landscape>> {
        let resolvers = PathResolvers::new().at(".pilot.instances", Maximum);
        let parameter = helper.merged_json(&resolvers);
        helper.apply(|| {
            self.target
                .helm()
                .apply(name, "istio", &self.version, parameter.as_ref())?;
            Ok(json!({}))
        })
    }

    fn delete(&self, name: &str) -> StrataResult<()> {
        self.target.helm().delete(name)
    }
}

pub fn register(registry: &mut Registry<Landscape>) {
    registry.register(PACKAGE, Version::new(1, 7, 0), |target: &Landscape, version: &Version| {
        Ok(Box::new(IstioInstaller {
            target: target.kubernetes(PACKAGE)?,
            version: version.clone(),
        }) as Box<dyn Installer<Landscape>>)
    });
}
