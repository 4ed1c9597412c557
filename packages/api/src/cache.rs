//! # Query cache: keyed read cache with declared invalidation
//!
//! Every read the client performs is tagged with a [`QueryKey`] (resource plus
//! parameters). [`QueryCache::get_or_fetch`] serves a fresh entry when it has
//! one and otherwise runs the fetch, holding a per-key async lock so that
//! concurrent reads of the same key share one request.
//!
//! Writes do not touch cached data directly. Each mutation declares which keys
//! or key families it affects as [`Invalidation`]s; invalidated entries are
//! marked stale and re-fetched on their next read. Stale data stays available
//! through [`QueryCache::peek`] so a view can keep rendering it until the new
//! response lands.
//!
//! A fetch that was already running when an invalidation hit its key stores its
//! result as stale: data read before a mutation is never served as fresh after
//! it.
//!
//! Entries also go stale with age (`stale_after`) and are dropped once they
//! are older than `gc_after`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::PageQuery;

/// Identifies one cacheable read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Pages(PageQuery),
    Page(String),
    Comments(String),
    Profile(String),
    Me,
    Search(String),
    Tags,
    AdminPending,
    AdminUsers { page: u32 },
    AdminStats,
    AdminLogs { page: u32 },
}

/// A [`QueryKey`] with its parameters erased.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    Pages,
    Page,
    Comments,
    Profile,
    Me,
    Search,
    Tags,
    AdminPending,
    AdminUsers,
    AdminStats,
    AdminLogs,
}

impl QueryKey {
    pub fn family(&self) -> QueryFamily {
        match self {
            QueryKey::Pages(_) => QueryFamily::Pages,
            QueryKey::Page(_) => QueryFamily::Page,
            QueryKey::Comments(_) => QueryFamily::Comments,
            QueryKey::Profile(_) => QueryFamily::Profile,
            QueryKey::Me => QueryFamily::Me,
            QueryKey::Search(_) => QueryFamily::Search,
            QueryKey::Tags => QueryFamily::Tags,
            QueryKey::AdminPending => QueryFamily::AdminPending,
            QueryKey::AdminUsers { .. } => QueryFamily::AdminUsers,
            QueryKey::AdminStats => QueryFamily::AdminStats,
            QueryKey::AdminLogs { .. } => QueryFamily::AdminLogs,
        }
    }
}

/// What a mutation marks stale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invalidation {
    Key(QueryKey),
    Family(QueryFamily),
}

impl Invalidation {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Invalidation::Key(k) => k == key,
            Invalidation::Family(family) => key.family() == *family,
        }
    }
}

impl From<QueryKey> for Invalidation {
    fn from(key: QueryKey) -> Self {
        Invalidation::Key(key)
    }
}

impl From<QueryFamily> for Invalidation {
    fn from(family: QueryFamily) -> Self {
        Invalidation::Family(family)
    }
}

#[derive(Clone, Debug)]
struct Entry {
    data: Value,
    fetched_at: DateTime<Utc>,
    stale: bool,
}

/// Saved state of one key, for rolling back an optimistic write.
#[derive(Clone, Debug)]
pub struct Snapshot {
    key: QueryKey,
    entry: Option<Entry>,
}

// Bounded log of recent invalidations, consulted by fetches that were in flight.
const INVALIDATION_LOG_LEN: usize = 64;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    locks: HashMap<QueryKey, Arc<tokio::sync::Mutex<()>>>,
    generation: u64,
    invalidations: Vec<(u64, Invalidation)>,
}

impl Inner {
    fn invalidated_since(&self, generation: u64, key: &QueryKey) -> bool {
        let oldest_logged = self.invalidations.first().map_or(self.generation, |(g, _)| *g);
        if generation + 1 < oldest_logged {
            // The log rolled over while the fetch ran; assume the worst.
            return true;
        }
        self.invalidations
            .iter()
            .any(|(g, inv)| *g > generation && inv.matches(key))
    }
}

#[derive(Clone, Debug)]
pub struct QueryCache {
    inner: Arc<Mutex<Inner>>,
    stale_after: Duration,
    gc_after: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

impl QueryCache {
    pub fn new(stale_after: Duration, gc_after: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            stale_after,
            gc_after: gc_after.max(stale_after),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            Duration::seconds(config.stale_after_secs),
            Duration::seconds(config.gc_after_secs),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached data for `key` that is neither invalidated nor too old.
    pub fn fresh(&self, key: &QueryKey) -> Option<Value> {
        let now = Utc::now();
        let mut inner = self.lock();
        self.collect_garbage(&mut inner, key, now);
        inner
            .entries
            .get(key)
            .filter(|e| !e.stale && now - e.fetched_at < self.stale_after)
            .map(|e| e.data.clone())
    }

    /// Cached data for `key`, stale or not.
    pub fn peek(&self, key: &QueryKey) -> Option<Value> {
        let now = Utc::now();
        let mut inner = self.lock();
        self.collect_garbage(&mut inner, key, now);
        inner.entries.get(key).map(|e| e.data.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.fresh(key).is_none()
    }

    fn collect_garbage(&self, inner: &mut Inner, key: &QueryKey, now: DateTime<Utc>) {
        let expired = inner
            .entries
            .get(key)
            .is_some_and(|e| now - e.fetched_at >= self.gc_after);
        if expired {
            inner.entries.remove(key);
        }
    }

    /// Store a fresh value for `key`.
    pub fn insert(&self, key: QueryKey, data: Value) {
        self.lock().entries.insert(
            key,
            Entry {
                data,
                fetched_at: Utc::now(),
                stale: false,
            },
        );
    }

    fn insert_fetched(&self, key: QueryKey, data: Value, started: u64) {
        let mut inner = self.lock();
        let stale = inner.invalidated_since(started, &key);
        if stale {
            tracing::debug!(?key, "result raced an invalidation, storing as stale");
        }
        inner.entries.insert(
            key,
            Entry {
                data,
                fetched_at: Utc::now(),
                stale,
            },
        );
    }

    /// Mark every entry matched by `invalidations` stale; returns how many were.
    pub fn invalidate(&self, invalidations: &[Invalidation]) -> usize {
        if invalidations.is_empty() {
            return 0;
        }
        let mut inner = self.lock();
        inner.generation += 1;
        let generation = inner.generation;
        for inv in invalidations {
            inner.invalidations.push((generation, inv.clone()));
        }
        let overflow = inner.invalidations.len().saturating_sub(INVALIDATION_LOG_LEN);
        inner.invalidations.drain(..overflow);

        let mut marked = 0;
        for (key, entry) in inner.entries.iter_mut() {
            if invalidations.iter().any(|inv| inv.matches(key)) {
                entry.stale = true;
                marked += 1;
            }
        }
        tracing::debug!(marked, "cache invalidated");
        marked
    }

    pub fn remove(&self, key: &QueryKey) {
        self.lock().entries.remove(key);
    }

    /// Drop everything, e.g. when the signed-in user changes.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.locks.clear();
        inner.generation += 1;
        let generation = inner.generation;
        inner.invalidations.clear();
        for family in ALL_FAMILIES {
            inner
                .invalidations
                .push((generation, Invalidation::Family(family)));
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `update` to the cached value of `key`, if there is one, and return
    /// a snapshot that restores the previous state.
    pub fn update_optimistic(&self, key: &QueryKey, update: impl FnOnce(&mut Value)) -> Snapshot {
        let mut inner = self.lock();
        let previous = inner.entries.get(key).cloned();
        if let Some(entry) = inner.entries.get_mut(key) {
            update(&mut entry.data);
        }
        Snapshot {
            key: key.clone(),
            entry: previous,
        }
    }

    /// Put a key back to the state captured in `snapshot`.
    pub fn rollback(&self, snapshot: Snapshot) {
        let mut inner = self.lock();
        match snapshot.entry {
            Some(entry) => {
                inner.entries.insert(snapshot.key, entry);
            }
            None => {
                inner.entries.remove(&snapshot.key);
            }
        }
    }

    fn key_lock(&self, key: &QueryKey) -> KeyLease<'_> {
        let lock = self
            .lock()
            .locks
            .entry(key.clone())
            .or_default()
            .clone();
        KeyLease {
            cache: self,
            key: key.clone(),
            lock,
        }
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.lock().locks.len()
    }

    /// Serve `key` from the cache, or run `fetch` and cache its result.
    ///
    /// Failed fetches leave any previously cached value untouched.
    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>>,
    {
        if let Some(data) = self.fresh(&key) {
            tracing::debug!(?key, "cache hit");
            return Ok(data);
        }

        let lease = self.key_lock(&key);
        let _in_flight = lease.lock.lock().await;

        // Another reader may have filled the entry while we waited.
        if let Some(data) = self.fresh(&key) {
            tracing::debug!(?key, "cache hit after wait");
            return Ok(data);
        }

        let started = self.lock().generation;
        tracing::debug!(?key, "cache miss, fetching");
        let data = fetch().await?;
        self.insert_fetched(key, data.clone(), started);
        Ok(data)
    }
}

/// A reader's claim on the per-key fetch lock. The last reader out removes
/// the lock from the map so keys that are read once do not pile up.
struct KeyLease<'a> {
    cache: &'a QueryCache,
    key: QueryKey,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for KeyLease<'_> {
    fn drop(&mut self) {
        let mut inner = self.cache.lock();
        let ours = inner
            .locks
            .get(&self.key)
            .is_some_and(|held| Arc::ptr_eq(held, &self.lock));
        // One reference in the map, one here: nobody else is waiting.
        if ours && Arc::strong_count(&self.lock) == 2 {
            inner.locks.remove(&self.key);
        }
    }
}

const ALL_FAMILIES: [QueryFamily; 11] = [
    QueryFamily::Pages,
    QueryFamily::Page,
    QueryFamily::Comments,
    QueryFamily::Profile,
    QueryFamily::Me,
    QueryFamily::Search,
    QueryFamily::Tags,
    QueryFamily::AdminPending,
    QueryFamily::AdminUsers,
    QueryFamily::AdminStats,
    QueryFamily::AdminLogs,
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::seconds(60), Duration::seconds(300))
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = cache();
        let calls = Cell::new(0);
        let calls = &calls;
        let fetch = || async move {
            calls.set(calls.get() + 1);
            Ok(json!(["a"]))
        };

        cache.get_or_fetch(QueryKey::Tags, fetch).await.unwrap();
        cache.get_or_fetch(QueryKey::Tags, fetch).await.unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_invalidated_key_is_refetched() {
        let cache = cache();
        cache.insert(QueryKey::Comments("p1".into()), json!([1]));
        cache.insert(QueryKey::Comments("p2".into()), json!([2]));

        let marked = cache.invalidate(&[QueryKey::Comments("p1".into()).into()]);
        assert_eq!(marked, 1);
        assert!(cache.is_stale(&QueryKey::Comments("p1".into())));
        assert!(!cache.is_stale(&QueryKey::Comments("p2".into())));

        // Stale data is still readable while the re-fetch runs.
        assert_eq!(cache.peek(&QueryKey::Comments("p1".into())), Some(json!([1])));

        let data = cache
            .get_or_fetch(QueryKey::Comments("p1".into()), || async { Ok(json!([1, 3])) })
            .await
            .unwrap();
        assert_eq!(data, json!([1, 3]));
        assert!(!cache.is_stale(&QueryKey::Comments("p1".into())));
    }

    #[tokio::test]
    async fn test_family_invalidation() {
        let cache = cache();
        cache.insert(QueryKey::AdminUsers { page: 1 }, json!([]));
        cache.insert(QueryKey::AdminUsers { page: 2 }, json!([]));
        cache.insert(QueryKey::AdminStats, json!({}));

        assert_eq!(cache.invalidate(&[QueryFamily::AdminUsers.into()]), 2);
        assert!(!cache.is_stale(&QueryKey::AdminStats));
    }

    #[tokio::test]
    async fn test_fetch_racing_invalidation_is_stored_stale() {
        let cache = cache();
        let key = QueryKey::Page("p1".into());

        let data = cache
            .get_or_fetch(key.clone(), || async {
                // A mutation lands while this read is on the wire.
                cache.invalidate(&[QueryKey::Page("p1".into()).into()]);
                Ok(json!({"title": "old"}))
            })
            .await
            .unwrap();

        assert_eq!(data, json!({"title": "old"}));
        assert!(cache.is_stale(&key));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_value() {
        let cache = cache();
        cache.insert(QueryKey::Tags, json!(["kept"]));
        cache.invalidate(&[QueryKey::Tags.into()]);

        let result = cache
            .get_or_fetch(QueryKey::Tags, || async {
                Err(ApiError::Network("down".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.peek(&QueryKey::Tags), Some(json!(["kept"])));
    }

    #[test]
    fn test_age_makes_entries_stale_then_collected() {
        let cache = QueryCache::new(Duration::zero(), Duration::zero());
        cache.insert(QueryKey::Me, json!({}));
        assert!(cache.fresh(&QueryKey::Me).is_none());
        assert!(cache.peek(&QueryKey::Me).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_optimistic_update_and_rollback() {
        let cache = cache();
        let key = QueryKey::Comments("p1".into());
        cache.insert(key.clone(), json!([{"id": "c1"}, {"id": "c2"}]));

        let snapshot = cache.update_optimistic(&key, |data| {
            if let Some(items) = data.as_array_mut() {
                items.retain(|c| c["id"] != "c1");
            }
        });
        assert_eq!(cache.peek(&key), Some(json!([{"id": "c2"}])));

        cache.rollback(snapshot);
        assert_eq!(cache.peek(&key), Some(json!([{"id": "c1"}, {"id": "c2"}])));
    }

    #[tokio::test]
    async fn test_fetch_locks_are_released() {
        let cache = cache();
        for q in ["rust", "wiki", "dioxus"] {
            cache
                .get_or_fetch(QueryKey::Search(q.into()), || async { Ok(json!([])) })
                .await
                .unwrap();
        }
        let failed = cache
            .get_or_fetch(QueryKey::Tags, || async { Err(ApiError::Network("down".into())) })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.lock_count(), 0);
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn test_waiting_reader_keeps_lock_until_done() {
        let cache = cache();
        let key = QueryKey::Page("1".into());
        let calls = Cell::new(0);
        let calls = &calls;
        let fetch = || async move {
            calls.set(calls.get() + 1);
            tokio::task::yield_now().await;
            Ok(json!({"id": "1"}))
        };
        let (a, b) = tokio::join!(
            cache.get_or_fetch(key.clone(), fetch),
            cache.get_or_fetch(key.clone(), fetch),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.lock_count(), 0);
    }

    #[test]
    fn test_clear_drops_fetch_locks() {
        let cache = cache();
        let lease = cache.key_lock(&QueryKey::Me);
        assert_eq!(cache.lock_count(), 1);
        cache.clear();
        assert_eq!(cache.lock_count(), 0);
        drop(lease);
        assert_eq!(cache.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_marks_in_flight_results_stale() {
        let cache = cache();
        cache
            .get_or_fetch(QueryKey::Me, || async {
                cache.clear();
                Ok(json!({"id": "previous-user"}))
            })
            .await
            .unwrap();
        assert!(cache.is_stale(&QueryKey::Me));
    }
}
