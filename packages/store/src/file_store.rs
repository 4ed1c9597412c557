//! # Filesystem-backed key/value store
//!
//! [`FileStore`] is a [`KvStore`] implementation that persists each namespaced
//! key as its own JSON file. It is used on native platforms so that the session,
//! drafts and preferences survive an app restart.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── tessera.session.json
//! ├── tessera.ui.json
//! ├── tessera.drafts.json
//! └── tessera.recent_searches.json
//! ```
//!
//! ## Platform data directories
//!
//! Use [`dirs::data_dir()`] to obtain a platform-appropriate base:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS | `~/Library/Application Support/tessera/` |
//! | Linux | `~/.local/share/tessera/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\tessera\` |

use std::path::PathBuf;

use crate::kv::KvStore;

/// Filesystem-backed KvStore for native persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Keys are fixed identifiers, but never let one escape the base dir.
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' { c } else { '_' })
            .collect();
        self.base.join(format!("{file}.json"))
    }
}

impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.entry_path(key)).ok()
    }

    async fn set(&self, key: &str, value: String) {
        if let Err(e) = std::fs::create_dir_all(&self.base) {
            tracing::warn!(dir = %self.base.display(), "cannot create store dir: {e}");
            return;
        }
        if let Err(e) = std::fs::write(self.entry_path(key), value) {
            tracing::warn!(key, "cannot write local entry: {e}");
        }
    }

    async fn remove(&self, key: &str) {
        let path = self.entry_path(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(key, "cannot remove local entry: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::{DraftKey, DraftStore};

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("tessera_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let drafts = DraftStore::new(FileStore::new(dir.clone()));
        drafts
            .save(&DraftKey::NewPage, "Hello", "From FileStore", &[])
            .await;

        // Re-open from same directory
        let reopened = DraftStore::new(FileStore::new(dir.clone()));
        let draft = reopened.load(&DraftKey::NewPage).await.unwrap();
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.content, "From FileStore");

        reopened.clear(&DraftKey::NewPage).await;
        assert!(reopened.load(&DraftKey::NewPage).await.is_none());

        // Cleanup
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_entry_path_stays_in_base() {
        let store = FileStore::new(PathBuf::from("/tmp/base"));
        let path = store.entry_path("../../etc/passwd");
        assert!(path.starts_with("/tmp/base"));
        assert_eq!(path.parent(), Some(std::path::Path::new("/tmp/base")));
    }
}
