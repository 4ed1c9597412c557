//! Platform storage backend for the persisted client state.
//!
//! - **Web** (WASM + `web` feature): IndexedDB via [`store::IdbStore`]
//! - **Desktop / native tests**: one JSON file per key via [`store::FileStore`]
//! - **WASM without `web`**: in-memory only

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub type AppStore = store::IdbStore;

#[cfg(not(target_arch = "wasm32"))]
pub type AppStore = store::FileStore;

#[cfg(all(target_arch = "wasm32", not(feature = "web")))]
pub type AppStore = store::MemoryStore;

/// Create the platform-appropriate key/value store.
///
/// On native platforms files live under `<data_dir>/tessera/`.
pub fn make_store() -> AppStore {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::IdbStore::new()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let base = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("tessera");
        store::FileStore::new(base)
    }
    #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
    {
        store::MemoryStore::new()
    }
}

/// Sleep on whichever timer the platform has.
pub async fn sleep(duration: std::time::Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}
