//! Local, persisted client state: session, drafts, preferences and recent
//! searches, over pluggable key/value backends.

pub mod autosave;
pub mod drafts;
pub mod kv;
pub mod models;
pub mod prefs;
pub mod recent;
pub mod session;
pub mod tags;

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod idb;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use idb::IdbStore;

pub use autosave::{AutosavePolicy, AutosaveTracker};
pub use drafts::{Draft, DraftFields, DraftKey, DraftStore, EditorSeed};
pub use kv::{KvStore, StorageKey};
pub use models::{Role, SessionUser, UserPatch};
pub use prefs::{Theme, UiPreferences};
pub use recent::RecentSearches;
pub use session::{Session, SessionState, SessionStore};
pub use tags::{TagError, TagList, MAX_TAGS, MAX_TAG_LEN};
