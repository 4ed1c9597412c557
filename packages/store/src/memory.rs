use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::kv::KvStore;

/// In-memory KvStore for testing and server-side rendering.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    async fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    async fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.is_none());

        store.set("k", "v1".to_string()).await;
        store.set("k", "v2".to_string()).await;
        assert_eq!(store.get("k").await.as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").await;
        assert!(store.get("k").await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("shared", "yes".to_string()).await;
        assert_eq!(other.get("shared").await.as_deref(), Some("yes"));
    }
}
