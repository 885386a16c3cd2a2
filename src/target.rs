//! Install targets
//!
//! The engine never talks to a target; it only needs a stable fingerprint to
//! address installations. What a target can do (deploy charts, create
//! organizations) is up to the installers, see [`crate::landscape`].

use sha2::{Digest, Sha256};
use std::fmt;

/// Where a package gets installed
pub trait Target: Clone + fmt::Display {
    /// Stable content fingerprint of the target
    fn digest(&self) -> Vec<u8>;
}

/// Content address of the installation of `pkg_name` on a target
///
/// Both parts are length-prefixed so that no two (target, package) pairs
/// feed the same byte stream into the hash.
pub fn installation_digest(target_digest: &[u8], pkg_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((target_digest.len() as u64).to_be_bytes());
    hasher.update(target_digest);
    hasher.update((pkg_name.len() as u64).to_be_bytes());
    hasher.update(pkg_name.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = installation_digest(b"default", "docker.io/pkgs/cluster");
        let b = installation_digest(b"default", "docker.io/pkgs/cluster");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn digest_separates_target_and_name() {
        let a = installation_digest(b"ab", "c");
        let b = installation_digest(b"a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn digest_changes_with_package() {
        let a = installation_digest(b"default", "docker.io/pkgs/istio");
        let b = installation_digest(b"default", "docker.io/pkgs/kyma");
        assert_ne!(a, b);
    }
}
