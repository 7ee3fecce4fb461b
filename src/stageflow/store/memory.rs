// SPDX-License-Identifier: MIT

//! Namespaced key-value store for long-term agent memories

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreItem {
    pub namespace: Vec<String>,
    pub key: String,
    pub value: Value,
}

/// Shared handle to a namespaced in-memory store.
///
/// Namespaces are tuples such as `["memories", "user-1"]`. Items keep their
/// insertion order within a namespace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<BTreeMap<Vec<String>, Vec<StoreItem>>>>,
}

fn owned(namespace: &[&str]) -> Vec<String> {
    namespace.iter().map(|s| s.to_string()).collect()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key` in `namespace`
    pub async fn put(&self, namespace: &[&str], key: &str, value: Value) {
        let namespace = owned(namespace);
        let mut items = self.items.write().await;
        let bucket = items.entry(namespace.clone()).or_default();
        match bucket.iter_mut().find(|item| item.key == key) {
            Some(existing) => existing.value = value,
            None => bucket.push(StoreItem {
                namespace,
                key: key.to_string(),
                value,
            }),
        }
    }

    /// Insert `value` under a fresh `{prefix}_{n}` key and return the key.
    ///
    /// `n` starts at the namespace's current size; the key is picked and
    /// written under one write lock.
    pub async fn append(&self, namespace: &[&str], prefix: &str, value: Value) -> String {
        let namespace = owned(namespace);
        let mut items = self.items.write().await;
        let bucket = items.entry(namespace.clone()).or_default();

        let mut n = bucket.len();
        let mut key = format!("{}_{}", prefix, n);
        while bucket.iter().any(|item| item.key == key) {
            n += 1;
            key = format!("{}_{}", prefix, n);
        }
        bucket.push(StoreItem {
            namespace,
            key: key.clone(),
            value,
        });
        key
    }

    pub async fn get(&self, namespace: &[&str], key: &str) -> Option<StoreItem> {
        let items = self.items.read().await;
        items
            .get(&owned(namespace))?
            .iter()
            .find(|item| item.key == key)
            .cloned()
    }

    /// All items whose namespace starts with `prefix`
    pub async fn search(&self, prefix: &[&str]) -> Vec<StoreItem> {
        let items = self.items.read().await;
        items
            .iter()
            .filter(|(namespace, _)| {
                namespace.len() >= prefix.len()
                    && namespace.iter().zip(prefix).all(|(a, b)| a == b)
            })
            .flat_map(|(_, bucket)| bucket.iter().cloned())
            .collect()
    }

    /// Remove `key`; returns whether it existed
    pub async fn delete(&self, namespace: &[&str], key: &str) -> bool {
        let mut items = self.items.write().await;
        match items.get_mut(&owned(namespace)) {
            Some(bucket) => {
                let before = bucket.len();
                bucket.retain(|item| item.key != key);
                before != bucket.len()
            }
            None => false,
        }
    }
}
