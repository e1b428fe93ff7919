//! Per-session turn locks

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = HashMap<String, Arc<Mutex<()>>>;

/// Serializes turns that share a session id.
///
/// Entries exist only while some turn holds or waits for them. The table
/// itself is only touched in short synchronous sections.
#[derive(Debug, Default)]
pub(crate) struct SessionLocks {
    locks: StdMutex<LockTable>,
}

impl SessionLocks {
    fn table(&self) -> MutexGuard<'_, LockTable> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until no other turn of `session_id` is running.
    ///
    /// The turn ends when the returned guard is dropped, including when the
    /// surrounding future is cancelled.
    pub async fn acquire(&self, session_id: &str) -> SessionTurn<'_> {
        let lock = self
            .table()
            .entry(session_id.to_string())
            .or_default()
            .clone();
        let mut turn = SessionTurn {
            locks: self,
            session_id: session_id.to_string(),
            guard: None,
        };
        turn.guard = Some(lock.lock_owned().await);
        turn
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.table().len()
    }
}

/// Holds a session's turn lock; dropping it drops the table entry if idle
#[derive(Debug)]
pub(crate) struct SessionTurn<'a> {
    locks: &'a SessionLocks,
    session_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionTurn<'_> {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        self.guard.take();
        let idle = table
            .get(&self.session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            table.remove(&self.session_id);
        }
    }
}
