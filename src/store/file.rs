//! Session store writing one JSON document per session
//!
//! Layout:
//! ```text
//! base_dir/
//! ├── 333134313539.json
//! └── 616263.json
//! ```
//! File names are the hex-encoded session id, so arbitrary gateway ids
//! cannot escape the directory.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::SessionStore;
use crate::aggregate::SessionState;
use crate::error::{DialogError, DialogResult};

/// Filesystem-backed session store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    /// Create the store, creating `base_dir` if needed
    pub async fn open(base_dir: impl AsRef<Path>) -> DialogResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&base_dir).await.map_err(|e| {
            DialogError::store(format!(
                "failed to create session directory {}: {}",
                base_dir.display(),
                e
            ))
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        let encoded: String = session_id.bytes().map(|b| format!("{:02x}", b)).collect();
        self.base_dir.join(format!("{}.json", encoded))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, session_id: &str) -> DialogResult<Option<SessionState>> {
        let path = self.session_path(session_id);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DialogError::store(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(session_id, error = %e, "discarding unreadable session");
                Ok(None)
            }
        }
    }

    async fn save(&self, session_id: &str, state: &SessionState) -> DialogResult<()> {
        let path = self.session_path(session_id);
        let json = serde_json::to_string(state)
            .map_err(|e| DialogError::store(format!("failed to serialize session: {}", e)))?;

        // Write to a temporary file first so readers never see half a document
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| DialogError::store(format!("failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| DialogError::store(format!("failed to write {}: {}", path.display(), e)))
    }

    async fn remove(&self, session_id: &str) -> DialogResult<()> {
        let path = self.session_path(session_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DialogError::store(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
