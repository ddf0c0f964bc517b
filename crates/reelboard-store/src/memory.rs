//! In-process [`DocumentStore`] used for development and tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{normalize, DocPath, DocumentStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    root: RwLock<Option<Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `tree` (normalized first).
    #[must_use]
    pub fn with_tree(tree: Value) -> Self {
        Self {
            root: RwLock::new(normalize(tree)),
        }
    }

    #[cfg(test)]
    async fn snapshot(&self) -> Option<Value> {
        self.root.read().await.clone()
    }
}

fn lookup<'a>(node: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(node, |current, key| match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .filter(|v| !v.is_null())
}

/// Writes `value` at `segments` below `node`, creating objects on the way.
/// Arrays are descended by index and padded with `null`; a non-index key
/// turns the array into an object keyed by position, as the database does.
/// Other non-container intermediates are replaced.
fn write(node: &mut Value, segments: &[String], value: Value) {
    let Some((key, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if let Value::Array(items) = node {
        if let Ok(index) = key.parse::<usize>() {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            write(&mut items[index], rest, value);
            return;
        }
        *node = array_to_object(std::mem::take(items));
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(key.clone()).or_insert(Value::Null);
        write(child, rest, value);
    }
}

fn array_to_object(items: Vec<Value>) -> Value {
    Value::Object(
        items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
    )
}

/// Removes the node at `segments`; returns `true` when `node` itself became
/// empty and should be pruned by its parent.
fn delete(node: &mut Value, segments: &[String]) -> bool {
    let Some((key, rest)) = segments.split_first() else {
        return true;
    };
    match node {
        Value::Object(map) => {
            let prune_child = match map.get_mut(key) {
                Some(child) => rest.is_empty() || delete(child, rest),
                None => false,
            };
            if prune_child {
                map.remove(key);
            }
            map.is_empty()
        }
        Value::Array(items) => {
            let Some(child) = key.parse::<usize>().ok().and_then(|i| items.get_mut(i)) else {
                return false;
            };
            if rest.is_empty() || delete(child, rest) {
                *child = Value::Null;
            }
            while items.last().is_some_and(Value::is_null) {
                items.pop();
            }
            items.is_empty()
        }
        _ => false,
    }
}

fn apply(root: &mut Option<Value>, path: &DocPath, value: Value) {
    match normalize(value) {
        None => {
            if let Some(tree) = root.as_mut() {
                if delete(tree, path.segments()) {
                    *root = None;
                }
            }
        }
        Some(value) => {
            let tree = root.get_or_insert(Value::Object(Map::new()));
            write(tree, path.segments(), value);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        let root = self.root.read().await;
        Ok(root
            .as_ref()
            .and_then(|tree| lookup(tree, path.segments()))
            .cloned())
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        apply(&mut root, path, value);
        Ok(())
    }

    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<(), StoreError> {
        // Validate every field before touching the tree so a bad key
        // leaves the update unapplied.
        let targets = fields
            .into_iter()
            .map(|(key, value)| Ok((path.join(&DocPath::parse(&key)?), value)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        let mut root = self.root.write().await;
        for (target, value) in targets {
            apply(&mut root, &target, value);
        }
        Ok(())
    }

    async fn remove(&self, path: &DocPath) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        apply(&mut root, path, Value::Null);
        Ok(())
    }

    async fn child_keys(&self, path: &DocPath) -> Result<Vec<String>, StoreError> {
        let root = self.root.read().await;
        let keys = match root.as_ref().and_then(|tree| lookup(tree, path.segments())) {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, _)| i.to_string())
                .collect(),
            _ => Vec::new(),
        };
        Ok(keys)
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
