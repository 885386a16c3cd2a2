//! Cloud Foundry organization

use crate::error::StrataResult;
use crate::installation::{ApplyOutcome, Images, InstallationHelper, Installer};
use crate::landscape::target::{CloudFoundryTarget, Landscape};
use crate::registry::Registry;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub const PACKAGE: &str = "docker.io/pkgs/organization";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationParameter {
    /// Manager of the new organization
    pub username: String,
}

impl Default for OrganizationParameter {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
        }
    }
}

pub struct OrganizationInstaller {
    target: Arc<dyn CloudFoundryTarget>,
}

impl Installer<Landscape> for OrganizationInstaller {
    fn apply(&self, name: &str, _images: &Images, mut helper: InstallationHelper<'_, Landscape>) -> StrataResult<ApplyOutcome<Landscape>> {
        let parameter: OrganizationParameter = helper.merged_parameter().unwrap_or_default();
        helper.apply(|| {
            self.target.create_org(name, &parameter.username)?;
            Ok(json!({}))
        })
    }

    fn delete(&self, name: &str) -> StrataResult<()> {
        self.target.delete_org(name)
    }
}

pub fn register(registry: &mut Registry<Landscape>) {
    registry.register(PACKAGE, Version::new(1, 0, 0), |target: &Landscape, _: &Version| {
        Ok(Box::new(OrganizationInstaller {
            target: target.cloud_foundry(PACKAGE)?,
        }) as Box<dyn Installer<Landscape>>)
    });
}
