//! Per-session turn serialization.
//!
//! Two messages for the same session never interleave: the second waits
//! until the first turn has saved its state. Different sessions run
//! concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Manages per-session turn locks.
///
/// Each session id maps to a `Semaphore(1)`. Holding the permit gives
/// exclusive access to that session's state for one turn.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for SessionLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the turn lock for a session, waiting behind any turn that
    /// is already in flight. The permit releases on drop.
    pub async fn acquire(&self, session_id: &str) -> Result<OwnedSemaphorePermit, SessionBusy> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        if let Ok(permit) = sem.clone().try_acquire_owned() {
            return Ok(permit);
        }
        sem.acquire_owned().await.map_err(|_| SessionBusy)
    }

    /// Number of tracked sessions.
    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop the lock entry for a session that nobody is using.
    ///
    /// Called after a session is cleared. Entries that are held or awaited
    /// stay in place.
    pub fn forget(&self, session_id: &str) {
        let mut locks = self.locks.lock();
        if let Some(sem) = locks.get(session_id) {
            // Permits and waiters hold their own clones.
            if Arc::strong_count(sem) == 1 && sem.available_permits() == 1 {
                locks.remove(session_id);
            }
        }
    }
}

/// Returned when a session's lock was closed while waiting.
#[derive(Debug)]
pub struct SessionBusy;

impl std::fmt::Display for SessionBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session lock is unavailable")
    }
}

impl std::error::Error for SessionBusy {}
