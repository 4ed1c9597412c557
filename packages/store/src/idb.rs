//! # IndexedDB key/value store: browser-side persistence
//!
//! [`IdbStore`] is the [`KvStore`] implementation used on the **web platform**.
//! It persists each namespaced document into the browser's IndexedDB via the
//! [`rexie`] crate, so the session, drafts and preferences survive reloads.
//!
//! ## Database schema
//!
//! A single IndexedDB database named `"tessera"` (version 1) with one object store:
//!
//! | IndexedDB store | Key | Value |
//! |-----------------|-----|-------|
//! | `"kv"` | namespaced key (e.g. `"tessera.drafts"`) | JSON document string |
//!
//! ## Connection management
//!
//! `IdbStore` opens a fresh [`Rexie`] connection on every operation. `Rexie`
//! does not implement `Clone`, and the browser caches IndexedDB connections
//! internally.
//!
//! ## Error handling
//!
//! Reads that fail return `None` and writes that fail are logged and dropped,
//! so an unavailable IndexedDB degrades to "no local data".

use crate::kv::KvStore;
use rexie::{ObjectStore as RexieObjectStore, Rexie, TransactionMode};
use wasm_bindgen::JsValue;

const DEFAULT_DB_NAME: &str = "tessera";
const DB_VERSION: u32 = 1;
const KV_STORE: &str = "kv";

/// IndexedDB-backed KvStore for web platform.
#[derive(Clone)]
pub struct IdbStore {
    db_name: String,
}

impl Default for IdbStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdbStore {
    pub fn new() -> Self {
        Self {
            db_name: DEFAULT_DB_NAME.to_string(),
        }
    }

    async fn open_db(&self) -> Result<Rexie, rexie::Error> {
        Rexie::builder(&self.db_name)
            .version(DB_VERSION)
            .add_object_store(RexieObjectStore::new(KV_STORE))
            .build()
            .await
    }

    async fn write(&self, key: &str, value: Option<String>) -> Result<(), rexie::Error> {
        let db = self.open_db().await?;
        let tx = db.transaction(&[KV_STORE], TransactionMode::ReadWrite)?;
        let store = tx.store(KV_STORE)?;
        let js_key = JsValue::from_str(key);
        match value {
            Some(value) => {
                let js_value = JsValue::from_str(&value);
                store.put(&js_value, Some(&js_key)).await?;
            }
            None => store.delete(js_key).await?,
        }
        tx.done().await?;
        Ok(())
    }
}

impl KvStore for IdbStore {
    async fn get(&self, key: &str) -> Option<String> {
        let db = self.open_db().await.ok()?;
        let tx = db.transaction(&[KV_STORE], TransactionMode::ReadOnly).ok()?;
        let store = tx.store(KV_STORE).ok()?;

        let value = store.get(JsValue::from_str(key)).await.ok()??;
        serde_wasm_bindgen::from_value(value).ok()
    }

    async fn set(&self, key: &str, value: String) {
        if let Err(e) = self.write(key, Some(value)).await {
            tracing::warn!(key, "IndexedDB write failed: {e}");
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.write(key, None).await {
            tracing::warn!(key, "IndexedDB delete failed: {e}");
        }
    }
}
