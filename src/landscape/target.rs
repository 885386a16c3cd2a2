//! Landscape targets and deployment backends
//!
//! A [`Landscape`] is where a plugin deploys: a Kubernetes namespace, a Cloud
//! Foundry installation, or a bridge that needs both. Plugins get concrete
//! targets from a [`TargetFactory`] handed to them at registration.

use crate::error::{StrataError, StrataResult};
use crate::target::Target;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Connection details of a Kubernetes cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuthorization {
    pub username: String,
    pub password: String,
}

/// Endpoint plus basic auth
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub url: String,
    pub basic: BasicAuthorization,
}

/// API and UAA credentials of a Cloud Foundry installation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFoundryConfig {
    pub cf: Credentials,
    pub uaa: Credentials,
}

/// Chart based deployments
pub trait Helm {
    fn apply(&self, name: &str, chart: &str, version: &Version, parameter: Option<&Value>) -> StrataResult<()>;
    fn delete(&self, name: &str) -> StrataResult<()>;
}

/// Application based deployments
pub trait Kapp {
    fn apply(&self, name: &str, app: &str, version: &Version, parameter: Option<&Value>) -> StrataResult<()>;
    fn delete(&self, name: &str) -> StrataResult<()>;
}

/// A namespace on a Kubernetes cluster
pub trait KubernetesTarget: fmt::Debug + Send + Sync {
    fn namespace(&self) -> &str;
    fn config(&self) -> &KubernetesConfig;
    fn helm(&self) -> &dyn Helm;
    fn kapp(&self) -> &dyn Kapp;

    fn digest(&self) -> Vec<u8> {
        fingerprint(&[self.namespace().as_bytes(), self.config().url.as_bytes()])
    }
}

/// A Cloud Foundry installation
pub trait CloudFoundryTarget: fmt::Debug + Send + Sync {
    fn config(&self) -> &CloudFoundryConfig;
    fn create_org(&self, name: &str, user: &str) -> StrataResult<()>;
    fn delete_org(&self, name: &str) -> StrataResult<()>;

    fn digest(&self) -> Vec<u8> {
        let config = self.config();
        fingerprint(&[config.cf.url.as_bytes(), config.uaa.url.as_bytes()])
    }
}

/// Creates targets for plugins that install onto other targets
pub trait TargetFactory: Send + Sync {
    fn kubernetes(&self, namespace: &str, config: &KubernetesConfig) -> Arc<dyn KubernetesTarget>;
    fn cloud_foundry(&self, config: &CloudFoundryConfig) -> Arc<dyn CloudFoundryTarget>;
}

/// Target of every landscape plugin
#[derive(Debug, Clone)]
pub enum Landscape {
    Kubernetes(Arc<dyn KubernetesTarget>),
    CloudFoundry(Arc<dyn CloudFoundryTarget>),
    /// Kubernetes workload that talks to a Cloud Foundry installation
    Bridge(Arc<dyn KubernetesTarget>, Arc<dyn CloudFoundryTarget>),
}

impl Landscape {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Kubernetes(_) => "kubernetes",
            Self::CloudFoundry(_) => "cloud-foundry",
            Self::Bridge(_, _) => "bridge",
        }
    }

    /// Kubernetes side of the target, for installers of `package`
    pub fn kubernetes(&self, package: &str) -> StrataResult<Arc<dyn KubernetesTarget>> {
        match self {
            Self::Kubernetes(k8s) => Ok(Arc::clone(k8s)),
            other => Err(other.mismatch(package, "kubernetes")),
        }
    }

    pub fn cloud_foundry(&self, package: &str) -> StrataResult<Arc<dyn CloudFoundryTarget>> {
        match self {
            Self::CloudFoundry(cf) => Ok(Arc::clone(cf)),
            other => Err(other.mismatch(package, "cloud-foundry")),
        }
    }

    pub fn bridge(&self, package: &str) -> StrataResult<(Arc<dyn KubernetesTarget>, Arc<dyn CloudFoundryTarget>)> {
        match self {
            Self::Bridge(k8s, cf) => Ok((Arc::clone(k8s), Arc::clone(cf))),
            other => Err(other.mismatch(package, "bridge")),
        }
    }

    fn mismatch(&self, package: &str, expected: &'static str) -> StrataError {
        StrataError::TargetMismatch {
            package: package.to_string(),
            expected,
            actual: self.to_string(),
        }
    }
}

impl Target for Landscape {
    fn digest(&self) -> Vec<u8> {
        match self {
            Self::Kubernetes(k8s) => k8s.digest(),
            Self::CloudFoundry(cf) => cf.digest(),
            Self::Bridge(k8s, cf) => fingerprint(&[k8s.digest().as_slice(), cf.digest().as_slice()]),
        }
    }
}

impl fmt::Display for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kubernetes(k8s) => write!(f, "kubernetes({} at {})", k8s.namespace(), k8s.config().url),
            Self::CloudFoundry(cf) => write!(f, "cloud-foundry({})", cf.config().cf.url),
            Self::Bridge(k8s, cf) => write!(
                f,
                "bridge({} at {}, {})",
                k8s.namespace(),
                k8s.config().url,
                cf.config().cf.url
            ),
        }
    }
}

fn fingerprint(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}
