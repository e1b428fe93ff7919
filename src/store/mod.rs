//! Session storage
//!
//! The engine only needs an atomic load and save per session id. The store
//! owns expiry; the dispatcher owns turn serialization.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;

use async_trait::async_trait;

use crate::aggregate::SessionState;
use crate::error::DialogResult;

/// Key/value persistence of session state, keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the state saved for `session_id`, if any
    async fn load(&self, session_id: &str) -> DialogResult<Option<SessionState>>;

    /// Save the state for `session_id`, replacing what was there
    async fn save(&self, session_id: &str, state: &SessionState) -> DialogResult<()>;

    /// Forget `session_id`; removing an unknown id is not an error
    async fn remove(&self, session_id: &str) -> DialogResult<()>;
}
