//! Flattening nested maps into path-addressed leaves and back.

use super::{Map, Value};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Leaf values keyed by the sequence of map keys leading to them.
///
/// Ordered by path, so option enumeration is deterministic.
pub type FlatMap = BTreeMap<Vec<String>, Value>;

/// Collect every leaf of `tree` under its key path.
///
/// Anything that is not a map (sequences and pairs included) is a leaf and is
/// stored whole. A non-map root yields a single entry under the empty path;
/// an empty nested map contributes nothing.
pub fn flatten(tree: &Value) -> FlatMap {
    let mut flat = FlatMap::new();
    let mut prefix = Vec::new();
    collect(&mut prefix, tree, &mut flat);
    flat
}

fn collect(prefix: &mut Vec<String>, node: &Value, flat: &mut FlatMap) {
    match node {
        Value::Map(map) => {
            for (key, child) in map {
                prefix.push(key.clone());
                collect(prefix, child, flat);
                prefix.pop();
            }
        }
        leaf => {
            flat.insert(prefix.clone(), leaf.clone());
        }
    }
}

/// Rebuild the nested tree from flat leaves.
///
/// Fails when a path is empty or when two paths disagree about whether a key
/// holds a map or a leaf (`a` and `a.b` both present).
pub fn unflatten(flat: FlatMap) -> Result<Value> {
    let mut root = Map::new();
    for (path, value) in flat {
        if path.is_empty() {
            return Err(Error::ArgumentWithoutName);
        }
        insert(&mut root, &path, 0, value)?;
    }
    Ok(Value::Map(root))
}

fn insert(node: &mut Map, path: &[String], depth: usize, value: Value) -> Result<()> {
    let key = &path[depth];
    if depth + 1 == path.len() {
        if node.contains_key(key) {
            return Err(Error::PathConflict(path.join(".")));
        }
        node.insert(key.clone(), value);
        return Ok(());
    }

    let child = node.entry(key.clone()).or_insert_with(|| Value::Map(Map::new()));
    match child {
        Value::Map(inner) => insert(inner, path, depth + 1, value),
        _ => Err(Error::PathConflict(path[..=depth].join("."))),
    }
}
