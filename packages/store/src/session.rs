//! # Session store: who is signed in, and do we know yet
//!
//! The session lives in persisted storage so a reload keeps the user signed in.
//! Restoring it is asynchronous, which opens a window where the client simply
//! does not know whether anyone is signed in. [`SessionState`] makes that window
//! explicit:
//!
//! ```text
//!            restore() / login() / logout()
//!  Loading ───────────────────────────────────▶ Ready
//!                                              ├─ Anonymous
//!                                              └─ Authenticated(Session)
//! ```
//!
//! `Loading` is left exactly once per [`SessionStore`] and never re-entered.
//! Consumers must treat `Loading` as "unknown", never as "signed out"; auth-gated
//! redirects wait until the state is ready.
//!
//! `Authenticated` always carries a non-empty token and user id. A login with a
//! blank credential lands in `Anonymous` instead.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::kv::{self, KvStore, StorageKey};
use crate::models::{Role, SessionUser, UserPatch};

/// Credential and profile of the signed-in user; this is the persisted blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    fn is_valid(&self) -> bool {
        !self.token.trim().is_empty() && !self.user.id.trim().is_empty()
    }
}

/// Observable session state.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionState {
    /// Persisted storage has not been read yet.
    #[default]
    Loading,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        !matches!(self, SessionState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.session().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session().map(|s| s.token.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }
}

/// Session state container backed by a [`KvStore`].
///
/// Clones share the same state, so one instance can be handed to the UI
/// context and to background tasks.
#[derive(Clone, Debug)]
pub struct SessionStore<S: KvStore> {
    kv: S,
    state: Arc<Mutex<SessionState>>,
}

impl<S: KvStore> SessionStore<S> {
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            state: Arc::new(Mutex::new(SessionState::Loading)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().is_ready()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token().map(str::to_string)
    }

    /// Read the persisted session and leave `Loading`.
    ///
    /// Completes the transition whatever the outcome (found, absent or
    /// unreadable). If a login or logout already moved the store out of
    /// `Loading`, the persisted blob is ignored.
    pub async fn restore(&self) -> SessionState {
        if self.is_ready() {
            return self.state();
        }
        let persisted: Option<Session> = kv::load_json(&self.kv, StorageKey::Session).await;

        let mut state = self.lock();
        if !state.is_ready() {
            *state = match persisted.filter(Session::is_valid) {
                Some(session) => {
                    tracing::info!(user = %session.user.id, "session restored");
                    SessionState::Authenticated(session)
                }
                None => {
                    tracing::info!("no stored session");
                    SessionState::Anonymous
                }
            };
        }
        state.clone()
    }

    /// Sign in with a token issued by the API.
    pub async fn login(&self, token: impl Into<String>, user: SessionUser) -> SessionState {
        let session = Session {
            token: token.into(),
            user,
        };
        if !session.is_valid() {
            tracing::warn!("login with blank credentials ignored, signing out instead");
            return self.logout().await;
        }

        *self.lock() = SessionState::Authenticated(session.clone());
        kv::save_json(&self.kv, StorageKey::Session, &session).await;
        tracing::info!(user = %session.user.id, role = %session.user.role, "signed in");
        self.state()
    }

    /// Sign out. Calling it again leaves the state unchanged.
    pub async fn logout(&self) -> SessionState {
        let was_authenticated = {
            let mut state = self.lock();
            let was = state.is_authenticated();
            *state = SessionState::Anonymous;
            was
        };
        kv::clear(&self.kv, StorageKey::Session).await;
        if was_authenticated {
            tracing::info!("signed out");
        }
        self.state()
    }

    /// Merge profile changes into the signed-in user; no-op otherwise.
    pub async fn update_user(&self, patch: &UserPatch) -> SessionState {
        let updated = {
            let mut state = self.lock();
            match &mut *state {
                SessionState::Authenticated(session) => {
                    session.user.apply(patch);
                    Some(session.clone())
                }
                _ => None,
            }
        };
        if let Some(session) = updated {
            kv::save_json(&self.kv, StorageKey::Session, &session).await;
        }
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn user(id: &str) -> SessionUser {
        SessionUser {
            id: id.to_string(),
            nickname: "ada".to_string(),
            role: Role::Contributor,
            email: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_starts_loading_and_restores_anonymous() {
        let store = SessionStore::new(MemoryStore::new());
        assert_eq!(store.state(), SessionState::Loading);
        assert!(!store.is_ready());

        let state = store.restore().await;
        assert_eq!(state, SessionState::Anonymous);
        assert!(store.is_ready());
    }

    #[tokio::test]
    async fn test_restore_from_persisted_session() {
        let kv = MemoryStore::new();
        let first = SessionStore::new(kv.clone());
        first.restore().await;
        first.login("tok-1", user("u1")).await;

        // A new process sees the persisted blob.
        let second = SessionStore::new(kv);
        let state = second.restore().await;
        assert!(state.is_authenticated());
        assert_eq!(state.token(), Some("tok-1"));
        assert_eq!(state.user().map(|u| u.id.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn test_ready_never_reverts() {
        let store = SessionStore::new(MemoryStore::new());
        store.restore().await;
        store.login("tok", user("u1")).await;
        store.logout().await;
        store.restore().await;
        assert!(store.is_ready());
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_restore_does_not_override_earlier_login() {
        let kv = MemoryStore::new();
        let store = SessionStore::new(kv);
        store.login("fresh", user("u2")).await;

        let state = store.restore().await;
        assert_eq!(state.token(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let kv = MemoryStore::new();
        let store = SessionStore::new(kv.clone());
        store.login("tok", user("u1")).await;

        let once = store.logout().await;
        let twice = store.logout().await;
        assert_eq!(once, twice);
        assert_eq!(once, SessionState::Anonymous);
        assert!(kv.get(StorageKey::Session.as_str()).await.is_none());
    }

    #[tokio::test]
    async fn test_login_twice_same_result() {
        let store = SessionStore::new(MemoryStore::new());
        let a = store.login("tok", user("u1")).await;
        let b = store.login("tok", user("u1")).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_blank_credentials_never_authenticate() {
        let store = SessionStore::new(MemoryStore::new());
        assert_eq!(store.login("", user("u1")).await, SessionState::Anonymous);
        assert_eq!(store.login("tok", user("  ")).await, SessionState::Anonymous);
        assert!(store.is_ready());
    }

    #[tokio::test]
    async fn test_update_user_merges_and_persists() {
        let kv = MemoryStore::new();
        let store = SessionStore::new(kv.clone());
        store.login("tok", user("u1")).await;

        let state = store
            .update_user(&UserPatch {
                nickname: Some("countess".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(state.user().unwrap().nickname, "countess");

        let reloaded = SessionStore::new(kv).restore().await;
        assert_eq!(reloaded.user().unwrap().nickname, "countess");
    }

    #[tokio::test]
    async fn test_update_user_without_session_is_noop() {
        let store = SessionStore::new(MemoryStore::new());
        store.restore().await;
        let state = store
            .update_user(&UserPatch {
                nickname: Some("ghost".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(state, SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_corrupt_blob_restores_anonymous() {
        let kv = MemoryStore::new();
        kv.set(StorageKey::Session.as_str(), "garbage".to_string()).await;
        let store = SessionStore::new(kv);
        assert_eq!(store.restore().await, SessionState::Anonymous);
    }
}
