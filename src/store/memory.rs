// src/store/memory.rs
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError};

/// In-memory backend for tests and for running without Redis. BTreeSet
/// keeps index listings in a stable order.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, String>>,
    sets: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        if docs.contains_key(key) {
            return Ok(false);
        }
        docs.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        match docs.get(key) {
            Some(current) if current == expected => {
                docs.insert(key.to_string(), value.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        Ok(docs.remove(key).is_some())
    }

    async fn delete_if(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        match docs.get(key) {
            Some(current) if current == expected => {
                docs.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut sets = self.sets.write().await;
        sets.entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut sets = self.sets.write().await;
        if let Some(set) = sets.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let sets = self.sets.read().await;
        Ok(sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_if_absent() {
        let store = MemoryStore::new();
        assert!(store.put_if_absent("k", "v1").await.unwrap());
        assert!(!store.put_if_absent("k", "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("v1".to_string()));
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let store = MemoryStore::new();
        store.put("k", "v1").await.unwrap();

        // Stale expectation loses
        assert!(!store.compare_and_swap("k", "stale", "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("v1".to_string()));

        // Matching expectation wins
        assert!(store.compare_and_swap("k", "v1", "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));

        // Missing key never swaps
        assert!(!store.compare_and_swap("missing", "v1", "v2").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_if() {
        let store = MemoryStore::new();
        store.put("k", "v1").await.unwrap();

        assert!(!store.delete_if("k", "other").await.unwrap());
        assert!(store.delete_if("k", "v1").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_index_sets() {
        let store = MemoryStore::new();
        store.sadd("s", "b").await.unwrap();
        store.sadd("s", "a").await.unwrap();
        store.sadd("s", "a").await.unwrap();

        assert_eq!(store.smembers("s").await.unwrap(), vec!["a", "b"]);

        store.srem("s", "a").await.unwrap();
        assert_eq!(store.smembers("s").await.unwrap(), vec!["b"]);
        assert!(store.smembers("empty").await.unwrap().is_empty());
    }
}
