//! Structural JSON merge
//!
//! Every requester of an installation may pass its own parameter. Before an
//! installer sees them they are merged into one document: objects are merged
//! key by key, anything else has to be equal or is handed to a
//! [`ConflictResolver`] together with its path (`.pilot.instances`).

use crate::error::{StrataError, StrataResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Opaque JSON payload passed between requesters and installers
pub type Parameter = Value;

/// Reconciles two diverging values found at `path`
pub trait ConflictResolver {
    fn resolve(&self, path: &str, left: &Value, right: &Value) -> StrataResult<Value>;
}

impl<F> ConflictResolver for F
where
    F: Fn(&str, &Value, &Value) -> StrataResult<Value>,
{
    fn resolve(&self, path: &str, left: &Value, right: &Value) -> StrataResult<Value> {
        self(path, left, right)
    }
}

/// Default resolver: every divergence is a conflict
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectConflicts;

impl ConflictResolver for RejectConflicts {
    fn resolve(&self, path: &str, left: &Value, right: &Value) -> StrataResult<Value> {
        Err(StrataError::conflict(path, left, right))
    }
}

/// Keeps the numerically larger value
#[derive(Debug, Clone, Copy, Default)]
pub struct Maximum;

impl ConflictResolver for Maximum {
    fn resolve(&self, path: &str, left: &Value, right: &Value) -> StrataResult<Value> {
        if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
            return Ok(Value::from(l.max(r)));
        }
        if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
            return Ok(Value::from(l.max(r)));
        }
        match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => Ok(Value::from(l.max(r))),
            _ => Err(StrataError::conflict(path, left, right)),
        }
    }
}

/// Routes conflicts to resolvers registered for exact paths
///
/// Paths without a registered resolver fail like [`RejectConflicts`].
#[derive(Default)]
pub struct PathResolvers {
    by_path: BTreeMap<String, Box<dyn ConflictResolver>>,
}

impl PathResolvers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resolver` for conflicts at `path`
    pub fn at(mut self, path: impl Into<String>, resolver: impl ConflictResolver + 'static) -> Self {
        self.by_path.insert(path.into(), Box::new(resolver));
        self
    }
}

impl ConflictResolver for PathResolvers {
    fn resolve(&self, path: &str, left: &Value, right: &Value) -> StrataResult<Value> {
        match self.by_path.get(path) {
            Some(resolver) => resolver.resolve(path, left, right),
            None => RejectConflicts.resolve(path, left, right),
        }
    }
}

/// Merge `fragments` into one document
///
/// Returns `None` for no fragments and the fragment itself for one.
pub fn merge(fragments: &[Parameter], resolver: &dyn ConflictResolver) -> StrataResult<Option<Parameter>> {
    let refs: Vec<&Value> = fragments.iter().collect();
    merge_at(&refs, "", resolver)
}

fn merge_at(values: &[&Value], path: &str, resolver: &dyn ConflictResolver) -> StrataResult<Option<Value>> {
    match values {
        [] => return Ok(None),
        [single] => return Ok(Some((*single).clone())),
        _ => {}
    }

    for pair in values.windows(2) {
        if pair[0].is_object() != pair[1].is_object() {
            return Err(StrataError::IncompatibleTypes {
                path: display_path(path),
                left: pair[0].to_string(),
                right: pair[1].to_string(),
            });
        }
    }

    if values[0].is_object() {
        let mut by_key: BTreeMap<&str, Vec<&Value>> = BTreeMap::new();
        for object in values.iter().filter_map(|v| v.as_object()) {
            for (key, value) in object {
                by_key.entry(key.as_str()).or_default().push(value);
            }
        }

        let mut merged = Map::new();
        for (key, group) in by_key {
            let child_path = format!("{}.{}", path, key);
            if let Some(value) = merge_at(&group, &child_path, resolver)? {
                merged.insert(key.to_string(), value);
            }
        }
        return Ok(Some(Value::Object(merged)));
    }

    let mut result = values[0].clone();
    for value in &values[1..] {
        if result != **value {
            result = resolver.resolve(path, &result, value)?;
        }
    }
    Ok(Some(result))
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        ".".to_string()
    } else {
        path.to_string()
    }
}
