//! Package manager
//!
//! Entry point of the engine. `apply` installs a package and everything it
//! transitively needs, `delete` releases it again. Installations are cached by
//! content address and reference counted through their requesters, so a
//! dependency shared by several packages is installed once and removed only
//! when its last requester goes away.

use crate::error::{StrataError, StrataResult};
use crate::installation::{
    ApplyOutcome, DependencyRequest, Images, Installation, InstallationHelper, InstallationRequest,
    Installer,
};
use crate::merge::Parameter;
use crate::registry::Registry;
use crate::secrets::{EnvSecrets, SecretSource};
use crate::target::{installation_digest, Target};
use crate::version::{self, ConstraintSet};
use semver::{Version, VersionReq};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Requester identity of callers outside the engine
pub const TOP_LEVEL: &str = "top-level";

/// Installs packages and tracks who needs them
pub struct PackageManager<T> {
    registry: Registry<T>,
    installations: BTreeMap<String, Installation<T>>,
    secrets: Box<dyn SecretSource>,
    /// (digest, package) of resolutions currently running, outermost first
    in_flight: Vec<(String, String)>,
}

impl<T: Target> PackageManager<T> {
    /// Manager reading secrets from the environment
    pub fn new(registry: Registry<T>) -> Self {
        Self::with_secrets(registry, EnvSecrets::new())
    }

    pub fn with_secrets(registry: Registry<T>, secrets: impl SecretSource + 'static) -> Self {
        Self {
            registry,
            installations: BTreeMap::new(),
            secrets: Box::new(secrets),
            in_flight: Vec::new(),
        }
    }

    /// Install `pkg_name` on `target`, with all of its dependencies
    ///
    /// Applying the same package with the same constraints and parameter
    /// again returns the cached installation without calling any installer.
    pub fn apply(
        &mut self,
        target: &T,
        pkg_name: &str,
        constraints: &VersionReq,
        parameter: Option<Parameter>,
    ) -> StrataResult<&Installation<T>> {
        info!("Applying {} ({}) on {}", pkg_name, constraints, target);
        let mut request = InstallationRequest::new(pkg_name, constraints.clone());
        request.target = Some(target.clone());
        request.parameter = parameter;

        let digest = self.resolve(target, TOP_LEVEL, request)?;
        self.installations
            .get(&digest)
            .ok_or_else(|| StrataError::Internal(format!("installation {} missing after apply", digest)))
    }

    /// Release the caller's hold on `pkg_name` on `target`
    ///
    /// The package is only removed once no other installation needs it; its
    /// children are then released in reverse creation order.
    pub fn delete(&mut self, target: &T, pkg_name: &str) -> StrataResult<()> {
        info!("Deleting {} on {}", pkg_name, target);
        let target_digest = target.digest();
        let digest = installation_digest(&target_digest, pkg_name);
        match self.installations.get(&digest) {
            None => {
                return Err(StrataError::InstallationNotFound {
                    package: pkg_name.to_string(),
                    target: target.to_string(),
                })
            }
            Some(existing) if !existing.is_for(&target_digest, pkg_name) => {
                return Err(StrataError::DigestCollision {
                    digest,
                    package: pkg_name.to_string(),
                    existing: existing.pkg_name.clone(),
                })
            }
            Some(_) => {}
        }
        self.release(&digest, TOP_LEVEL)
    }

    /// Cached installation of `pkg_name` on `target`
    pub fn installation(&self, target: &T, pkg_name: &str) -> Option<&Installation<T>> {
        let target_digest = target.digest();
        self.installations
            .get(&installation_digest(&target_digest, pkg_name))
            .filter(|i| i.is_for(&target_digest, pkg_name))
    }

    /// All cached installations, by digest
    pub fn installations(&self) -> impl Iterator<Item = &Installation<T>> {
        self.installations.values()
    }

    pub fn registry(&self) -> &Registry<T> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.installations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installations.is_empty()
    }

    /// Resolve `request` on behalf of `requester`, returning the digest
    fn resolve(&mut self, target: &T, requester: &str, request: InstallationRequest<T>) -> StrataResult<String> {
        let pkg_name = request.pkg_name.clone();
        let target_digest = target.digest();
        let digest = installation_digest(&target_digest, &pkg_name);

        if let Some(pos) = self.in_flight.iter().position(|(d, _)| *d == digest) {
            let chain: Vec<&str> = self.in_flight[pos..]
                .iter()
                .map(|(_, pkg)| pkg.as_str())
                .chain(std::iter::once(pkg_name.as_str()))
                .collect();
            return Err(StrataError::DependencyCycle {
                chain: chain.join(" -> "),
            });
        }

        // Work on a copy; the cache only sees completed resolutions
        let (mut installation, cached) = match self.installations.get(&digest) {
            Some(existing) => {
                if !existing.is_for(&target_digest, &pkg_name) {
                    return Err(StrataError::DigestCollision {
                        digest,
                        package: pkg_name,
                        existing: existing.pkg_name.clone(),
                    });
                }
                if existing.torn_down {
                    // Half deleted; install again from scratch
                    let mut installation = existing.clone();
                    installation.torn_down = false;
                    installation.responses.clear();
                    (installation, false)
                } else if existing
                    .requests
                    .get(requester)
                    .is_some_and(|r| r.same_as(&request))
                {
                    debug!("{} on {} already applied for {}", pkg_name, target, requester);
                    return Ok(digest);
                } else {
                    (existing.clone(), true)
                }
            }
            None => (
                Installation::new(
                    digest.clone(),
                    &pkg_name,
                    Version::new(0, 0, 0),
                    target.clone(),
                    target_digest,
                ),
                false,
            ),
        };

        let previous_version = installation.version.clone();
        let previous_parameters = installation.distinct_parameters();
        installation.requests.insert(requester.to_string(), request);

        let constraints = installation.intersected_constraints();
        let (factory, version) =
            self.registry
                .get(&pkg_name, &constraints)
                .map_err(|e| StrataError::Resolve {
                    package: pkg_name.clone(),
                    target: target.to_string(),
                    source: Box::new(e),
                })?;

        if cached && version == previous_version && installation.distinct_parameters() == previous_parameters {
            debug!(
                "{} {} on {} unchanged, recording requester {}",
                pkg_name, version, target, requester
            );
            self.installations.insert(digest.clone(), installation);
            return Ok(digest);
        }

        info!("Installing {} {} on {}", pkg_name, version, target);
        installation.version = version;
        let wrap = |e: StrataError| StrataError::Apply {
            package: pkg_name.clone(),
            constraints: constraints.to_string(),
            target: target.to_string(),
            source: Box::new(e),
        };
        let installer = factory(target, &installation.version).map_err(wrap)?;

        self.in_flight.push((digest.clone(), pkg_name.clone()));
        let result = self.converge(installer.as_ref(), &mut installation);
        self.in_flight.pop();
        result.map_err(wrap)?;

        self.installations.insert(digest.clone(), installation);
        Ok(digest)
    }

    /// Call the installer until it completes, resolving what it asks for
    fn converge(&mut self, installer: &dyn Installer<T>, installation: &mut Installation<T>) -> StrataResult<()> {
        let images = Images::new();
        loop {
            let parameters = installation.parameters();
            let helper = InstallationHelper::new(&parameters, &installation.responses);
            let missing = match installer.apply(&installation.digest, &images, helper)? {
                ApplyOutcome::Complete(response) => {
                    installation.response = response;
                    return Ok(());
                }
                ApplyOutcome::NeedsMore(missing) => missing,
            };

            // Asking again for something already answered would never end
            if missing
                .requests
                .keys()
                .all(|name| installation.responses.contains_key(name))
            {
                return Err(StrataError::Stalled {
                    package: installation.pkg_name.clone(),
                });
            }
            debug!("{}: {}", installation.pkg_name, missing);

            let requester = format!("{}/{}", installation.pkg_name, installation.digest);
            for (local_name, request) in missing.requests {
                let response = match request {
                    DependencyRequest::Installation(mut request) => {
                        let target = request
                            .target
                            .get_or_insert_with(|| installation.target.clone())
                            .clone();
                        let child = self.resolve(&target, &requester, request)?;
                        installation.adopt(&child);
                        self.installations
                            .get(&child)
                            .map(|c| c.response.clone())
                            .ok_or_else(|| StrataError::Internal(format!("installation {} missing", child)))?
                    }
                    DependencyRequest::Secret(secret) => self.secrets.fetch(&secret.name)?,
                };
                installation.responses.insert(local_name, response);
            }
        }
    }

    /// Drop `requester` from the installation, tearing it down when unused
    fn release(&mut self, digest: &str, requester: &str) -> StrataResult<()> {
        let Some(installation) = self.installations.get_mut(digest) else {
            warn!("Installation {} already removed", digest);
            return Ok(());
        };

        let removed = installation.requests.remove(requester);
        if installation.is_live() {
            debug!(
                "{} on {} still requested by {} others",
                installation.pkg_name,
                installation.target,
                installation.requests.len()
            );
            return Ok(());
        }

        let pkg_name = installation.pkg_name.clone();
        let version = installation.version.clone();
        let target = installation.target.clone();
        let torn_down = installation.torn_down;

        // A teardown interrupted by a failing child has already removed the backend
        if !torn_down {
            if let Err(e) = self.uninstall(digest, &pkg_name, &version, &target) {
                if let (Some(request), Some(installation)) = (removed, self.installations.get_mut(digest)) {
                    installation.requests.insert(requester.to_string(), request);
                }
                return Err(StrataError::Delete {
                    package: pkg_name,
                    target: target.to_string(),
                    source: Box::new(e),
                });
            }
        }

        let children = match self.installations.get_mut(digest) {
            Some(installation) => {
                installation.torn_down = true;
                installation.children.clone()
            }
            None => Vec::new(),
        };

        // The record stays cached until every child is released
        let child_requester = format!("{}/{}", pkg_name, digest);
        for child in children.iter().rev() {
            if let Err(e) = self.release(child, &child_requester) {
                if let (Some(request), Some(installation)) = (removed, self.installations.get_mut(digest)) {
                    installation.requests.insert(requester.to_string(), request);
                }
                return Err(e);
            }
            if let Some(installation) = self.installations.get_mut(digest) {
                installation.children.retain(|c| c != child);
            }
        }

        self.installations.remove(digest);
        info!("Deleted {} {} on {}", pkg_name, version, target);
        Ok(())
    }

    fn uninstall(&self, digest: &str, pkg_name: &str, version: &Version, target: &T) -> StrataResult<()> {
        let constraints = ConstraintSet::from(version::exact(version));
        let (factory, _) = self.registry.get(pkg_name, &constraints)?;
        let installer = factory(target, version)?;
        installer.delete(digest)
    }
}
