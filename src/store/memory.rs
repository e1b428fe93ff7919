//! In-process session store

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use super::SessionStore;
use crate::aggregate::SessionState;
use crate::config::EngineConfig;
use crate::error::DialogResult;

#[derive(Debug, Clone)]
struct StoredSession {
    state: SessionState,
    touched: Instant,
}

#[derive(Debug)]
struct Sessions {
    entries: HashMap<String, StoredSession>,
    last_sweep: Instant,
}

impl Default for Sessions {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            last_sweep: Instant::now(),
        }
    }
}

/// Session store backed by a map, with optional idle expiry.
///
/// With a TTL, `save` sweeps expired sessions at most once per TTL period,
/// so the map stays bounded by the sessions active within roughly two
/// periods.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<Sessions>,
    ttl: Option<Duration>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions idle for longer than `ttl` are treated as absent
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::default(),
            ttl: Some(ttl),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            sessions: RwLock::default(),
            ttl: config.session_ttl(),
        }
    }

    fn is_expired(&self, stored: &StoredSession) -> bool {
        self.ttl
            .is_some_and(|ttl| stored.touched.elapsed() > ttl)
    }

    /// Number of stored sessions, expired ones included until swept
    pub async fn len(&self) -> usize {
        self.sessions.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.entries.is_empty()
    }

    /// Drop expired sessions, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.sweep(&mut sessions)
    }

    fn sweep(&self, sessions: &mut Sessions) -> usize {
        let before = sessions.entries.len();
        sessions.entries.retain(|_, stored| !self.is_expired(stored));
        sessions.last_sweep = Instant::now();
        let purged = before - sessions.entries.len();
        if purged > 0 {
            debug!(purged, remaining = sessions.entries.len(), "expired sessions purged");
        }
        purged
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> DialogResult<Option<SessionState>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .entries
            .get(session_id)
            .filter(|stored| !self.is_expired(stored))
            .map(|stored| stored.state.clone()))
    }

    async fn save(&self, session_id: &str, state: &SessionState) -> DialogResult<()> {
        let mut sessions = self.sessions.write().await;
        if self
            .ttl
            .is_some_and(|ttl| sessions.last_sweep.elapsed() > ttl)
        {
            self.sweep(&mut sessions);
        }
        sessions.entries.insert(
            session_id.to_string(),
            StoredSession {
                state: state.clone(),
                touched: Instant::now(),
            },
        );
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> DialogResult<()> {
        self.sessions.write().await.entries.remove(session_id);
        Ok(())
    }
}
