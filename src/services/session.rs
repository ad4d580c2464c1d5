//! Session token storage.
//!
//! The token returned by `POST /auth/login` is held in an injected
//! store so tests can swap it out. A 401 from any backend call clears
//! the store and flips the logged-out watch channel; the presentation
//! layer reacts by routing back to login.

use std::sync::RwLock;
use tokio::sync::watch;

/// Abstraction over wherever the session token lives.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: String);
    fn clear(&self);
}

/// In-memory session store. Session-scoped by design; nothing is
/// persisted across process restarts.
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn set_token(&self, token: String) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

/// Watch-channel pair signalling authentication state changes.
/// `true` = authenticated, `false` = logged out (initial state, or after
/// a 401 cleared the session).
pub struct AuthWatch {
    tx: watch::Sender<bool>,
}

impl AuthWatch {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        let _ = self.tx.send(authenticated);
    }

    pub fn is_authenticated(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for AuthWatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.token().is_none());
        store.set_token("abc123".to_string());
        assert_eq!(store.token().as_deref(), Some("abc123"));
        store.clear();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_auth_watch_notifies() {
        let auth = AuthWatch::new();
        let rx = auth.subscribe();
        assert!(!auth.is_authenticated());
        auth.set_authenticated(true);
        assert!(*rx.borrow());
        auth.set_authenticated(false);
        assert!(!*rx.borrow());
    }
}
