//! Service manager agent
//!
//! Runs on Kubernetes and registers a Cloud Foundry installation with the
//! service manager, so it needs a bridge target. Images are pulled with the
//! `ARTIFACTORY` secret, a JSON object with `repository`, `username` and
//! `password`.

use crate::error::StrataResult;
use crate::installation::{ApplyOutcome, Images, InstallationHelper, Installer};
use crate::landscape::target::{CloudFoundryTarget, Credentials, KubernetesTarget, Landscape};
use crate::registry::Registry;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub const PACKAGE: &str = "docker.io/pkgs/service-manager-agent";

/// Name of the image pull secret
pub const ARTIFACTORY: &str = "ARTIFACTORY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceManagerAgentParameter {
    #[serde(rename = "smCredentials")]
    pub service_manager_credentials: Credentials,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImagePullSecret {
    pub repository: String,
    pub username: String,
    pub password: String,
}

pub struct ServiceManagerAgentInstaller {
    kubernetes: Arc<dyn KubernetesTarget>,
    cloud_foundry: Arc<dyn CloudFoundryTarget>,
    version: Version,
}

impl Installer<Landscape> for ServiceManagerAgentInstaller {
    fn apply(&self, name: &str, _images: &Images, mut helper: InstallationHelper<'_, Landscape>) -> StrataResult<ApplyOutcome<Landscape>> {
        let artifactory: Option<ImagePullSecret> = helper.secret("artifactory", ARTIFACTORY);
        let parameter: ServiceManagerAgentParameter = helper.merged_parameter().unwrap_or_default();

        helper.apply(|| {
            let sm = &parameter.service_manager_credentials.basic;
            let cf = self.cloud_foundry.config();
            let values = json!({
                "SM_USER": sm.username,
                "SM_PASSWORD": sm.password,
                "CF_CLIENT_USERNAME": cf.cf.basic.username,
                "CF_CLIENT_PASSWORD": cf.cf.basic.password,
                "AUTHZ_CLIENT_ID": cf.uaa.basic.username,
                "AUTHZ_CLIENT_SECRET": cf.uaa.basic.password,
                "AUTHZ_CLIENT_ID_SUFFIX": "",
                "IMAGE_REPOSITORY": artifactory.as_ref().map(|a| a.repository.as_str()).unwrap_or_default(),
            });
            self.kubernetes
                .helm()
                .apply(name, "service-manager-agent", &self.version, Some(&values))?;
            Ok(json!({}))
        })
    }

    fn delete(&self, name: &str) -> StrataResult<()> {
        self.kubernetes.helm().delete(name)
    }
}

pub fn register(registry: &mut Registry<Landscape>) {
    registry.register(PACKAGE, Version::new(1, 0, 0), |target: &Landscape, version: &Version| {
        let (kubernetes, cloud_foundry) = target.bridge(PACKAGE)?;
        Ok(Box::new(ServiceManagerAgentInstaller {
            kubernetes,
            cloud_foundry,
            version: version.clone(),
        }) as Box<dyn Installer<Landscape>>)
    });
}
