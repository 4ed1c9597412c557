//! # Draft store: unsaved page edits that survive reloads
//!
//! Drafts protect content the user typed but has not yet saved on the server.
//! Each draft is identified by a [`DraftKey`] that is scoped to its target, so
//! the draft for a brand-new page can never overwrite (or be restored into) the
//! edit form of an existing page:
//!
//! | Key | Storage id |
//! |-----|------------|
//! | [`DraftKey::NewPage`] | `new` |
//! | [`DraftKey::EditPage`]`("42")` | `page:42` |
//!
//! All drafts live in a single JSON map under [`StorageKey::Drafts`]. Saving is
//! an upsert: repeated saves of the same key replace the record and only bump
//! `updated_at`. Every read-modify-write of the map holds the store's write
//! lock, shared by all clones, so overlapping saves and clears apply in the
//! order they were issued.
//!
//! When the editor mounts it asks [`DraftStore::seed`] for its initial fields.
//! A stored draft wins over the server document, so local edits are never
//! silently replaced by a fresh fetch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::kv::{self, KvStore, StorageKey};

/// Identifies what a draft is editing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DraftKey {
    NewPage,
    EditPage(String),
}

impl DraftKey {
    pub fn storage_id(&self) -> String {
        match self {
            DraftKey::NewPage => "new".to_string(),
            DraftKey::EditPage(id) => format!("page:{id}"),
        }
    }

    pub fn from_storage_id(id: &str) -> Option<Self> {
        match id {
            "new" => Some(DraftKey::NewPage),
            _ => id
                .strip_prefix("page:")
                .filter(|page| !page.is_empty())
                .map(|page| DraftKey::EditPage(page.to_string())),
        }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_id())
    }
}

/// The editable fields of a page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftFields {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DraftFields {
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags,
        }
    }

    /// Whether these fields hold changes relative to `baseline`.
    pub fn is_dirty(&self, baseline: &DraftFields) -> bool {
        self != baseline
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty() && self.tags.is_empty()
    }
}

/// A persisted draft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    pub fn fields(&self) -> DraftFields {
        DraftFields::new(self.title.clone(), self.content.clone(), self.tags.clone())
    }
}

/// Initial editor state chosen by [`DraftStore::seed`].
#[derive(Clone, Debug, PartialEq)]
pub struct EditorSeed {
    pub fields: DraftFields,
    /// `Some` when the fields came from a stored draft.
    pub restored_at: Option<DateTime<Utc>>,
}

impl EditorSeed {
    pub fn is_restored(&self) -> bool {
        self.restored_at.is_some()
    }
}

type DraftMap = BTreeMap<String, Draft>;

/// Draft persistence backed by a [`KvStore`].
#[derive(Clone, Debug)]
pub struct DraftStore<S: KvStore> {
    kv: S,
    writes: Arc<Mutex<()>>,
}

impl<S: KvStore> DraftStore<S> {
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            writes: Arc::new(Mutex::new(())),
        }
    }

    async fn read_all(&self) -> DraftMap {
        kv::load_json(&self.kv, StorageKey::Drafts)
            .await
            .unwrap_or_default()
    }

    async fn write_all(&self, drafts: &DraftMap) {
        if drafts.is_empty() {
            kv::clear(&self.kv, StorageKey::Drafts).await;
        } else {
            kv::save_json(&self.kv, StorageKey::Drafts, drafts).await;
        }
    }

    /// Insert or replace the draft for `key` with a fresh timestamp.
    pub async fn save(&self, key: &DraftKey, title: &str, content: &str, tags: &[String]) -> Draft {
        let draft = Draft {
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.to_vec(),
            updated_at: Utc::now(),
        };
        let _guard = self.writes.lock().await;
        let mut drafts = self.read_all().await;
        drafts.insert(key.storage_id(), draft.clone());
        self.write_all(&drafts).await;
        tracing::debug!(draft = %key, "draft saved");
        draft
    }

    pub async fn load(&self, key: &DraftKey) -> Option<Draft> {
        self.read_all().await.remove(&key.storage_id())
    }

    /// Drop the draft for `key`, after a successful save or an explicit discard.
    pub async fn clear(&self, key: &DraftKey) {
        let _guard = self.writes.lock().await;
        let mut drafts = self.read_all().await;
        if drafts.remove(&key.storage_id()).is_some() {
            self.write_all(&drafts).await;
            tracing::debug!(draft = %key, "draft cleared");
        }
    }

    /// Drop every stored draft, including entries this version cannot parse.
    pub async fn clear_all(&self) {
        let _guard = self.writes.lock().await;
        kv::clear(&self.kv, StorageKey::Drafts).await;
        tracing::debug!("all drafts cleared");
    }

    /// All drafts, most recently updated first.
    pub async fn list(&self) -> Vec<(DraftKey, Draft)> {
        let mut drafts: Vec<(DraftKey, Draft)> = self
            .read_all()
            .await
            .into_iter()
            .filter_map(|(id, draft)| DraftKey::from_storage_id(&id).map(|key| (key, draft)))
            .collect();
        drafts.sort_by(|a, b| b.1.updated_at.cmp(&a.1.updated_at));
        drafts
    }

    /// Pick the editor's initial fields: a stored draft for `key` wins over
    /// `server`, the freshly fetched document (or empty fields for a new page).
    pub async fn seed(&self, key: &DraftKey, server: DraftFields) -> EditorSeed {
        match self.load(key).await {
            Some(draft) => EditorSeed {
                fields: draft.fields(),
                restored_at: Some(draft.updated_at),
            },
            None => EditorSeed {
                fields: server,
                restored_at: None,
            },
        }
    }
}
