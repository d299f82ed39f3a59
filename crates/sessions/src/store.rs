//! Session store abstraction and the in-memory implementation.
//!
//! Sessions are not persisted: they live for the lifetime of the process.

use std::collections::HashMap;

use parking_lot::RwLock;

use ts_domain::trace::TraceEvent;

use crate::session::Session;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Keyed session storage injected into the conversation controller.
///
/// Callers that read-modify-write a session must hold that session's turn
/// lock; the store itself only guarantees atomic single operations.
pub trait SessionStore: Send + Sync {
    /// Look up a session by id.
    fn get(&self, session_id: &str) -> Option<Session>;

    /// Return the session for `session_id`, creating it if absent.
    /// Returns `(session, is_new)`.
    fn get_or_create(&self, session_id: &str) -> (Session, bool);

    /// Replace the stored state of a session.
    fn save(&self, session: Session);

    /// Remove a session. Returns `true` if it existed.
    fn delete(&self, session_id: &str) -> bool;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-lifetime session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh session id.
    pub fn new_session_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().get(session_id).cloned()
    }

    fn get_or_create(&self, session_id: &str) -> (Session, bool) {
        // Fast path: session already exists.
        if let Some(existing) = self.sessions.read().get(session_id) {
            return (existing.clone(), false);
        }

        let mut sessions = self.sessions.write();
        // Another caller may have created it between the two locks.
        if let Some(existing) = sessions.get(session_id) {
            return (existing.clone(), false);
        }
        let session = Session::new(session_id);
        sessions.insert(session_id.to_owned(), session.clone());
        drop(sessions);

        TraceEvent::SessionCreated {
            session_id: session_id.to_owned(),
        }
        .emit();

        (session, true)
    }

    fn save(&self, session: Session) {
        self.sessions
            .write()
            .insert(session.session_id.clone(), session);
    }

    fn delete(&self, session_id: &str) -> bool {
        let existed = self.sessions.write().remove(session_id).is_some();
        TraceEvent::SessionCleared {
            session_id: session_id.to_owned(),
            existed,
        }
        .emit();
        existed
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_domain::tool::Message;

    #[test]
    fn get_or_create_is_lazy_and_stable() {
        let store = InMemorySessionStore::new();
        assert!(store.get("a").is_none());
        let (_, is_new) = store.get_or_create("a");
        assert!(is_new);
        let (_, is_new) = store.get_or_create("a");
        assert!(!is_new);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_replaces_state() {
        let store = InMemorySessionStore::new();
        let (mut session, _) = store.get_or_create("a");
        session.push(Message::user("hello"));
        store.save(session);
        assert_eq!(store.get("a").unwrap().transcript().len(), 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = InMemorySessionStore::new();
        store.get_or_create("a");
        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn new_session_ids_are_unique() {
        assert_ne!(
            InMemorySessionStore::new_session_id(),
            InMemorySessionStore::new_session_id()
        );
    }
}
