//! Kyma runtime, on top of a large istio

use super::istio::{self, IstioParameter};
use crate::error::StrataResult;
use crate::installation::{ApplyOutcome, Images, InstallationHelper, Installer};
use crate::landscape::target::{KubernetesTarget, Landscape, TargetFactory};
use crate::merge::RejectConflicts;
use crate::registry::Registry;
use semver::Version;
use serde_json::json;
use std::sync::Arc;

pub const PACKAGE: &str = "docker.io/pkgs/kyma";

pub struct KymaInstaller {
    factory: Arc<dyn TargetFactory>,
    target: Arc<dyn KubernetesTarget>,
    version: Version,
}

impl Installer<Landscape> for KymaInstaller {
    fn apply(&self, name: &str, _images: &Images, mut helper: InstallationHelper<'_, Landscape>) -> StrataResult<ApplyOutcome<Landscape>> {
        let istio_target = self.factory.kubernetes(istio::NAMESPACE, self.target.config());
        helper
            .installation("istio", istio::PACKAGE, "~1.7")
            .target(Landscape::Kubernetes(istio_target))
            .json_parameter(&IstioParameter::with_instances(3))
            .request();

        let parameter = helper.merged_json(&RejectConflicts);
        helper.apply(|| {
            self.target
                .helm()
                .apply(name, "kyma", &self.version, parameter.as_ref())?;
            Ok(json!({}))
        })
    }

    fn delete(&self, name: &str) -> StrataResult<()> {
        self.target.helm().delete(name)
    }
}

pub fn register(registry: &mut Registry<Landscape>, factory: Arc<dyn TargetFactory>) {
    registry.register(PACKAGE, Version::new(1, 17, 0), move |target: &Landscape, version: &Version| {
        Ok(Box::new(KymaInstaller {
            factory: Arc::clone(&factory),
            target: target.kubernetes(PACKAGE)?,
            version: version.clone(),
        }) as Box<dyn Installer<Landscape>>)
    });
}
