//! Recent search queries, most recent first.

use serde::{Deserialize, Serialize};

use crate::kv::{self, KvStore, StorageKey};

pub const MAX_RECENT_SEARCHES: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    pub async fn load<S: KvStore>(store: &S) -> Self {
        let mut recent: Self = kv::load_json(store, StorageKey::RecentSearches)
            .await
            .unwrap_or_default();
        recent.0.truncate(MAX_RECENT_SEARCHES);
        recent
    }

    pub async fn save<S: KvStore>(&self, store: &S) {
        kv::save_json(store, StorageKey::RecentSearches, self).await;
    }

    pub async fn clear<S: KvStore>(store: &S) {
        kv::clear(store, StorageKey::RecentSearches).await;
    }

    /// Move `query` to the front. Blank queries are ignored; repeats (ignoring
    /// case and surrounding whitespace) are collapsed.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.0.retain(|q| !q.eq_ignore_ascii_case(query));
        self.0.insert(0, query.to_string());
        self.0.truncate(MAX_RECENT_SEARCHES);
    }

    pub fn remove(&mut self, query: &str) {
        self.0.retain(|q| q != query);
    }

    pub fn queries(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_record_dedupes_and_caps() {
        let mut recent = RecentSearches::default();
        recent.record("rust");
        recent.record("  ");
        recent.record("wiki");
        recent.record("Rust ");
        assert_eq!(recent.queries(), ["Rust".to_string(), "wiki".to_string()]);

        for i in 0..20 {
            recent.record(&format!("q{i}"));
        }
        assert_eq!(recent.queries().len(), MAX_RECENT_SEARCHES);
        assert_eq!(recent.queries()[0], "q19");
    }

    #[tokio::test]
    async fn test_persisted_independently() {
        let store = MemoryStore::new();
        let mut recent = RecentSearches::load(&store).await;
        assert!(recent.is_empty());

        recent.record("tags");
        recent.save(&store).await;
        assert_eq!(RecentSearches::load(&store).await.queries(), ["tags".to_string()]);

        RecentSearches::clear(&store).await;
        assert!(RecentSearches::load(&store).await.is_empty());
    }
}
