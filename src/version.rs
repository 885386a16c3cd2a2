//! Version constraints
//!
//! An installation can be requested by several requesters, each with its own
//! range constraint. The installed version has to satisfy all of them, so
//! constraints are combined into a [`ConstraintSet`] (their intersection).

use crate::error::{StrataError, StrataResult};
use semver::{Comparator, Op, Version, VersionReq};
use std::fmt;

/// Parse a constraint string such as `">= 1.0"` or `"~1.7"`
pub fn parse_constraint(constraint: &str) -> StrataResult<VersionReq> {
    VersionReq::parse(constraint).map_err(|e| StrataError::InvalidConstraint {
        constraint: constraint.to_string(),
        source: e,
    })
}

/// Constraint matching exactly `version`, pre-release included
pub fn exact(version: &Version) -> VersionReq {
    VersionReq {
        comparators: vec![Comparator {
            op: Op::Exact,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: version.pre.clone(),
        }],
    }
}

/// Intersection of several version requirements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    requirements: Vec<VersionReq>,
}

impl ConstraintSet {
    /// Create an empty set, which matches every version
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requirement to the intersection
    pub fn push(&mut self, requirement: VersionReq) {
        self.requirements.push(requirement);
    }

    /// Check whether `version` satisfies every requirement
    pub fn matches(&self, version: &Version) -> bool {
        self.requirements.iter().all(|r| r.matches(version))
    }

    /// Pick the highest version satisfying the set
    pub fn highest<'a, I>(&self, versions: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        versions.into_iter().filter(|v| self.matches(v)).max()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl From<VersionReq> for ConstraintSet {
    fn from(requirement: VersionReq) -> Self {
        Self {
            requirements: vec![requirement],
        }
    }
}

impl FromIterator<VersionReq> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = VersionReq>>(iter: I) -> Self {
        Self {
            requirements: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.requirements.is_empty() {
            return write!(f, "*");
        }
        for (i, requirement) in self.requirements.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{}", requirement)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<Version> {
        list.iter().map(|v| Version::parse(v).unwrap()).collect()
    }

    #[test]
    fn parses_spaced_operators() {
        let req = parse_constraint(">= 1.0").unwrap();
        assert!(req.matches(&Version::new(1, 7, 0)));
        assert!(!req.matches(&Version::new(0, 9, 0)));
    }

    #[test]
    fn rejects_garbage_constraint() {
        let err = parse_constraint("not a version").unwrap_err();
        assert!(err.to_string().contains("not a version"));
    }

    #[test]
    fn intersection_requires_all() {
        let set: ConstraintSet = [
            parse_constraint(">=1.0").unwrap(),
            parse_constraint(">=1.7, <2.0").unwrap(),
        ]
        .into_iter()
        .collect();

        assert!(set.matches(&Version::new(1, 7, 3)));
        assert!(!set.matches(&Version::new(1, 5, 0)));
        assert!(!set.matches(&Version::new(2, 1, 0)));
    }

    #[test]
    fn highest_picks_maximum_match() {
        let available = versions(&["1.0.1", "1.7.0", "1.9.2", "2.0.0"]);
        let set = ConstraintSet::from(parse_constraint("~1.7").unwrap());
        assert_eq!(set.highest(&available), Some(&Version::new(1, 7, 0)));

        let set = ConstraintSet::from(parse_constraint(">=1.0, <2.0").unwrap());
        assert_eq!(set.highest(&available), Some(&Version::new(1, 9, 2)));
    }

    #[test]
    fn highest_none_when_disjoint() {
        let available = versions(&["1.5.0", "2.1.0"]);
        let set: ConstraintSet = [
            parse_constraint(">=1.0").unwrap(),
            parse_constraint(">=1.7, <2.0").unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.highest(&available), None);
    }

    #[test]
    fn exact_matches_only_itself() {
        let version = Version::parse("1.0.0-rc.1").unwrap();
        let req = exact(&version);
        assert!(req.matches(&version));
        assert!(!req.matches(&Version::new(1, 0, 0)));
    }

    #[test]
    fn display_joins_with_and() {
        let set: ConstraintSet = [
            parse_constraint(">=1.0").unwrap(),
            parse_constraint("<2.0").unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.to_string(), ">=1.0 and <2.0");
        assert_eq!(ConstraintSet::new().to_string(), "*");
    }
}
