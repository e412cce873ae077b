//! Dot-path addressing over `SiteSettings`
//!
//! Paths use the serialized (camelCase) key names. Numeric segments index
//! into arrays, e.g. `marketingSEO.redirects.rules.0.to`.

use crate::contract::{SettingsError, SiteSettings};
use serde_json::Value;

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => items.get(index),
            Err(_) => None,
        },
        _ => None,
    }
}

fn step_mut<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match current {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => items.get_mut(index),
            Err(_) => None,
        },
        _ => None,
    }
}

/// Resolve `path` inside an arbitrary JSON value
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.')
        .try_fold(root, |current, segment| step(current, segment))
}

/// Read the leaf or sub-tree at `path`
///
/// Missing keys anywhere along the path yield `None`.
pub fn get_setting_by_path(settings: &SiteSettings, path: &str) -> Option<Value> {
    let json = serde_json::to_value(settings).ok()?;
    lookup(&json, path).cloned()
}

/// Return a copy of `settings` with the value at `path` replaced
///
/// The input is never modified. The path must address an existing key and
/// the new value must fit the schema at that position.
pub fn set_setting_by_path(
    settings: &SiteSettings,
    path: &str,
    value: Value,
) -> Result<SiteSettings, SettingsError> {
    let invalid = || SettingsError::InvalidPath {
        path: path.to_string(),
    };

    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(invalid());
    }

    let mut json = serde_json::to_value(settings).map_err(|_| SettingsError::Internal)?;
    let slot = path
        .split('.')
        .try_fold(&mut json, |current, segment| step_mut(current, segment))
        .ok_or_else(invalid)?;
    *slot = value;

    serde_json::from_value(json).map_err(|e| SettingsError::TypeMismatch {
        path: path.to_string(),
        details: e.to_string(),
    })
}

/// List every leaf path with its value, sorted by path
pub fn setting_paths(settings: &SiteSettings) -> Vec<(String, Value)> {
    let mut results = Vec::new();
    if let Ok(json) = serde_json::to_value(settings) {
        collect_leaves(&json, String::new(), &mut results);
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

fn collect_leaves(value: &Value, prefix: String, out: &mut Vec<(String, Value)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaves(child, join(key), out);
            }
        }
        // Arrays of records are walked per element; arrays of scalars are leaves
        Value::Array(items) if items.iter().any(Value::is_object) => {
            for (index, child) in items.iter().enumerate() {
                collect_leaves(child, join(&index.to_string()), out);
            }
        }
        _ => out.push((prefix, value.clone())),
    }
}
