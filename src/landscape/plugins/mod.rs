//! Installers for the landscape packages
//!
//! | Package | Version | Target | Backend |
//! |---------|---------|--------|---------|
//! | cluster | 1.0.1 | kubernetes | helm `cluster` |
//! | istio | 1.7.0 | kubernetes | helm `istio` |
//! | kyma | 1.17.0 | kubernetes | helm `kyma` |
//! | cloud-foundry | 2.0.0 | kubernetes | kapp `cf-for-k8s-scp` |
//! | cloud-foundry-environment | 1.0.0 | kubernetes | none |
//! | extended-cloud-foundry | 2.0.0 | kubernetes | none |
//! | organization | 1.0.0 | cloud-foundry | `cf create org` |
//! | service-manager-agent | 1.0.0 | bridge | helm `service-manager-agent` |

pub mod cloud_foundry;
pub mod cloud_foundry_environment;
pub mod cluster;
pub mod extended_cloud_foundry;
pub mod istio;
pub mod kyma;
pub mod organization;
pub mod service_manager_agent;

use super::target::{Landscape, TargetFactory};
use crate::registry::Registry;
use std::sync::Arc;

/// Registry with every landscape package
///
/// Plugins that install onto targets of their own create them with `factory`.
pub fn catalog(factory: Arc<dyn TargetFactory>) -> Registry<Landscape> {
    let mut registry = Registry::new();
    cluster::register(&mut registry);
    istio::register(&mut registry);
    kyma::register(&mut registry, Arc::clone(&factory));
    cloud_foundry::register(&mut registry, Arc::clone(&factory));
    cloud_foundry_environment::register(&mut registry, Arc::clone(&factory));
    extended_cloud_foundry::register(&mut registry, factory);
    organization::register(&mut registry);
    service_manager_agent::register(&mut registry);
    registry
}
