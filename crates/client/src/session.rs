//! Session/auth holder.
//!
//! Owns the `kisan_setu.session` slice of the store. The HTTP client reads
//! this before every outgoing request to attach the bearer token, and clears
//! it when the backend rejects the credential.

use std::sync::{Arc, Mutex, PoisonError};

use kisan_setu_core::SessionRecord;

use crate::store::{KeyValueStore, StoreExt, keys};

/// Manages the logged-in user's identity and bearer token.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    current: Arc<Mutex<Option<SessionRecord>>>,
}

impl SessionManager {
    /// Create a manager over `store`, loading any persisted session.
    ///
    /// A corrupt or unreadable stored session reads as logged out.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let current = match store.read_json::<SessionRecord>(keys::SESSION) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable, starting logged out");
                None
            }
        };
        Self {
            store,
            current: Arc::new(Mutex::new(current)),
        }
    }

    /// The current session, if logged in.
    #[must_use]
    pub fn get(&self) -> Option<SessionRecord> {
        self.lock().clone()
    }

    /// Replace the session and persist it.
    pub fn set(&self, record: SessionRecord) {
        if let Err(e) = self.store.write_json(keys::SESSION, &record) {
            tracing::warn!(error = %e, "session not persisted, continuing in memory");
        }
        *self.lock() = Some(record);
    }

    /// Log out: drop the session and remove it from storage.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(keys::SESSION) {
            tracing::warn!(error = %e, "persisted session not removed");
        }
        *self.lock() = None;
    }

    /// Whether a usable credential is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(SessionRecord::is_authenticated)
    }

    /// The bearer token to attach to outgoing requests, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .filter(|s| s.is_authenticated())
            .map(|s| s.access_token.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionRecord>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use kisan_setu_core::{UserId, UserType};

    fn record() -> SessionRecord {
        SessionRecord {
            user_id: UserId::new("u-1"),
            username: "ram".to_owned(),
            full_name: "Ram Singh".to_owned(),
            user_type: UserType::Farmer,
            access_token: "tok-abc".to_owned(),
            token_type: "bearer".to_owned(),
        }
    }

    #[test]
    fn test_set_persists_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionManager::new(store.clone());
        sessions.set(record());

        let fresh = SessionManager::new(store);
        assert_eq!(fresh.get().unwrap().username, "ram");
        assert!(fresh.is_authenticated());
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionManager::new(store.clone());
        sessions.set(record());
        sessions.clear();

        assert!(sessions.get().is_none());
        assert!(sessions.bearer_token().is_none());
        assert!(store.read(keys::SESSION).unwrap().is_none());
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let sessions = SessionManager::new(Arc::new(MemoryStore::new()));
        let mut rec = record();
        rec.access_token = String::new();
        sessions.set(rec);

        assert!(!sessions.is_authenticated());
        assert!(sessions.bearer_token().is_none());
    }

    #[test]
    fn test_corrupt_stored_session_reads_as_logged_out() {
        let store = Arc::new(MemoryStore::new());
        store.write(keys::SESSION, "{oops").unwrap();
        let sessions = SessionManager::new(store);
        assert!(sessions.get().is_none());
    }
}
