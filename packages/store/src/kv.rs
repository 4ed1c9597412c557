//! # Key/value persistence: the storage seam for all local client state
//!
//! Every piece of state the client keeps between reloads (the session blob, UI
//! preferences, editor drafts, recent searches) is stored as one JSON document
//! under its own namespaced key. Backends only need to move strings around,
//! which keeps them trivial to implement on every platform:
//!
//! | Backend | Platform |
//! |---------|----------|
//! | [`crate::MemoryStore`] | tests, server-side rendering |
//! | [`crate::FileStore`] | desktop / native builds (one file per key) |
//! | `IdbStore` | web (IndexedDB, `web` feature) |
//!
//! Backends never fail loudly: a read that cannot be served is `None`, a write
//! that cannot be persisted is logged and dropped. Local state is a convenience
//! copy; the remote API stays the source of truth.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Async string key/value storage.
pub trait KvStore {
    fn get(&self, key: &str) -> impl Future<Output = Option<String>>;
    fn set(&self, key: &str, value: String) -> impl Future<Output = ()>;
    fn remove(&self, key: &str) -> impl Future<Output = ()>;
}

/// The namespaced keys the client persists under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Session,
    UiPreferences,
    Drafts,
    RecentSearches,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::Session,
        StorageKey::UiPreferences,
        StorageKey::Drafts,
        StorageKey::RecentSearches,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Session => "tessera.session",
            StorageKey::UiPreferences => "tessera.ui",
            StorageKey::Drafts => "tessera.drafts",
            StorageKey::RecentSearches => "tessera.recent_searches",
        }
    }
}

/// Read and decode the document stored under `key`.
///
/// Unreadable documents are treated as absent so that a schema change or a
/// corrupted entry degrades to "no local data".
pub async fn load_json<S, T>(store: &S, key: StorageKey) -> Option<T>
where
    S: KvStore,
    T: DeserializeOwned,
{
    let raw = store.get(key.as_str()).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key = key.as_str(), "discarding unreadable local entry: {e}");
            None
        }
    }
}

/// Encode `value` and store it under `key`.
pub async fn save_json<S, T>(store: &S, key: StorageKey, value: &T)
where
    S: KvStore,
    T: Serialize + ?Sized,
{
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key.as_str(), raw).await,
        Err(e) => tracing::warn!(key = key.as_str(), "failed to encode local entry: {e}"),
    }
}

/// Remove the document stored under `key`.
pub async fn clear<S: KvStore>(store: &S, key: StorageKey) {
    store.remove(key.as_str()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_keys_are_distinct() {
        let mut names: Vec<&str> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), StorageKey::ALL.len());
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_absent() {
        let store = MemoryStore::new();
        store.set(StorageKey::Drafts.as_str(), "{not json".to_string()).await;

        let loaded: Option<Vec<String>> = load_json(&store, StorageKey::Drafts).await;
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_clear_leaves_other_keys() {
        let store = MemoryStore::new();
        save_json(&store, StorageKey::Drafts, &vec!["a"]).await;
        save_json(&store, StorageKey::RecentSearches, &vec!["b"]).await;

        clear(&store, StorageKey::Drafts).await;

        let drafts: Option<Vec<String>> = load_json(&store, StorageKey::Drafts).await;
        let recent: Option<Vec<String>> = load_json(&store, StorageKey::RecentSearches).await;
        assert!(drafts.is_none());
        assert_eq!(recent, Some(vec!["b".to_string()]));
    }
}
