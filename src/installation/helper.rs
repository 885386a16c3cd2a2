//! Dependency declaration for installers
//!
//! An installer receives an [`InstallationHelper`] on every apply attempt.
//! Each declared dependency either yields its cached response right away or
//! is recorded as missing; [`InstallationHelper::apply`] then either runs the
//! actual install or hands all missing dependencies back to the manager in a
//! single batch.
//!
//! ```ignore
//! let cluster: Option<ClusterResponse> = helper
//!     .installation("cluster", "docker.io/pkgs/cluster", ">= 1.0")
//!     .response();
//! helper.apply(|| deploy(cluster))
//! ```
//!
//! The first error (bad constraint, undecodable response) sticks: later
//! declarations are ignored and `apply` returns it.

use crate::error::{StrataError, StrataResult};
use crate::installation::{
    ApplyOutcome, DependenciesMissing, DependencyRequest, InstallationRequest, SecretRequest,
};
use crate::merge::{self, ConflictResolver, Parameter, RejectConflicts};
use crate::version::parse_constraint;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-attempt view an installer uses to declare what it needs
pub struct InstallationHelper<'a, T> {
    parameters: &'a [Parameter],
    responses: &'a BTreeMap<String, Value>,
    missing: BTreeMap<String, DependencyRequest<T>>,
    error: Option<StrataError>,
}

impl<'a, T> InstallationHelper<'a, T> {
    /// Helper over the requesters' parameters and the cached responses
    pub fn new(parameters: &'a [Parameter], responses: &'a BTreeMap<String, Value>) -> Self {
        Self {
            parameters,
            responses,
            missing: BTreeMap::new(),
            error: None,
        }
    }

    /// Declare a dependency on `pkg_name`, known locally as `local_name`
    pub fn installation<'h>(
        &'h mut self,
        local_name: &str,
        pkg_name: &str,
        constraints: &str,
    ) -> DependencyBuilder<'h, 'a, T> {
        DependencyBuilder {
            helper: self,
            local_name: local_name.to_string(),
            pkg_name: pkg_name.to_string(),
            constraints: constraints.to_string(),
            target: None,
            parameter: None,
            error: None,
        }
    }

    /// Declare a secret, known locally as `local_name`
    ///
    /// Returns the decoded secret once the manager has fetched it.
    pub fn secret<S: DeserializeOwned>(&mut self, local_name: &str, secret_name: &str) -> Option<S> {
        if self.error.is_some() {
            return None;
        }
        let responses = self.responses;
        match responses.get(local_name) {
            Some(value) => self.decode(value),
            None => {
                self.missing.insert(
                    local_name.to_string(),
                    DependencyRequest::Secret(SecretRequest {
                        name: secret_name.to_string(),
                    }),
                );
                None
            }
        }
    }

    /// Merge all requester parameters, failing on any conflict
    pub fn merged_parameter<P: DeserializeOwned>(&mut self) -> Option<P> {
        self.merged_parameter_with(&RejectConflicts)
    }

    /// Merge all requester parameters, reconciling conflicts with `resolver`
    ///
    /// `None` when no requester passed a parameter or when merging failed.
    pub fn merged_parameter_with<P: DeserializeOwned>(&mut self, resolver: &dyn ConflictResolver) -> Option<P> {
        let merged = self.merged_json(resolver)?;
        self.decode(&merged)
    }

    /// Merged requester parameters as raw JSON
    pub fn merged_json(&mut self, resolver: &dyn ConflictResolver) -> Option<Parameter> {
        if self.error.is_some() {
            return None;
        }
        match merge::merge(self.parameters, resolver) {
            Ok(merged) => merged,
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    /// Whether every declared dependency was available so far
    pub fn is_satisfied(&self) -> bool {
        self.error.is_none() && self.missing.is_empty()
    }

    /// Finish the attempt
    ///
    /// Runs `install` only if nothing is missing and no error occurred; its
    /// return value becomes the installation's response.
    pub fn apply<R, F>(self, install: F) -> StrataResult<ApplyOutcome<T>>
    where
        R: Serialize,
        F: FnOnce() -> StrataResult<R>,
    {
        if let Some(e) = self.error {
            return Err(e);
        }
        if !self.missing.is_empty() {
            return Ok(ApplyOutcome::NeedsMore(DependenciesMissing {
                requests: self.missing,
            }));
        }
        let response = install()?;
        Ok(ApplyOutcome::Complete(serde_json::to_value(response)?))
    }

    fn decode<R: DeserializeOwned>(&mut self, value: &Value) -> Option<R> {
        match R::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                self.error = Some(StrataError::Json(e));
                None
            }
        }
    }

    fn record(&mut self, local_name: String, request: InstallationRequest<T>) {
        self.missing
            .insert(local_name, DependencyRequest::Installation(request));
    }
}

/// Options of one declared installation dependency
pub struct DependencyBuilder<'h, 'a, T> {
    helper: &'h mut InstallationHelper<'a, T>,
    local_name: String,
    pkg_name: String,
    constraints: String,
    target: Option<T>,
    parameter: Option<Parameter>,
    error: Option<StrataError>,
}

impl<'h, 'a, T> DependencyBuilder<'h, 'a, T> {
    /// Install on `target` instead of the requester's own target
    pub fn target(mut self, target: T) -> Self {
        self.target = Some(target);
        self
    }

    /// Pass a raw JSON parameter
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameter = Some(parameter);
        self
    }

    /// Pass a serializable parameter
    pub fn json_parameter<S: Serialize>(mut self, parameter: &S) -> Self {
        match serde_json::to_value(parameter) {
            Ok(value) => self.parameter = Some(value),
            Err(e) => self.error = Some(StrataError::Json(e)),
        }
        self
    }

    /// Declare the dependency and return its decoded response if available
    pub fn response<R: DeserializeOwned>(self) -> Option<R> {
        let Self {
            helper,
            local_name,
            pkg_name,
            constraints,
            target,
            parameter,
            error,
        } = self;

        if helper.error.is_some() {
            return None;
        }
        if let Some(e) = error {
            helper.error = Some(e);
            return None;
        }
        let responses = helper.responses;
        if let Some(value) = responses.get(&local_name) {
            return helper.decode(value);
        }

        match parse_constraint(&constraints) {
            Ok(constraints) => {
                let mut request = InstallationRequest::new(pkg_name, constraints);
                request.target = target;
                request.parameter = parameter;
                helper.record(local_name, request);
            }
            Err(e) => helper.error = Some(e),
        }
        None
    }

    /// Declare the dependency without looking at its response
    pub fn request(self) {
        let _: Option<Value> = self.response();
    }
}
