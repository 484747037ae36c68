//! JSON file backend
//!
//! Keeps a JSON object mapping subject IDs to credentials. All writes use an
//! atomic temp-file + rename so a crash never leaves a truncated file. A
//! tokio Mutex serializes writers; the file is only read once, at load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::store::{CredentialStore, StoreFuture};

/// File-backed credential store.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<HashMap<String, Credential>>,
}

impl FileStore {
    /// Load credentials from the given file path.
    ///
    /// If the file doesn't exist, creates it as `{}` (cold start, nobody has
    /// authorized yet).
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading credential file: {e}")))?;
            let credentials: HashMap<String, Credential> = serde_json::from_str(&contents)
                .map_err(|e| Error::CredentialParse(format!("parsing credential file: {e}")))?;
            info!(path = %path.display(), users = credentials.len(), "loaded credentials");
            credentials
        } else {
            info!(path = %path.display(), "credential file not found, starting with empty store");
            let store = HashMap::new();
            write_atomic(&path, &store).await?;
            store
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }
}

impl CredentialStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    fn find<'a>(&'a self, subject_id: &'a str) -> StoreFuture<'a, Option<Credential>> {
        Box::pin(async move { Ok(self.state.lock().await.get(subject_id).cloned()) })
    }

    fn upsert(&self, credential: Credential) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let subject_id = credential.subject_id.clone();
            let previous = state.insert(subject_id.clone(), credential);
            if let Err(e) = write_atomic(&self.path, &state).await {
                // Keep memory consistent with what is on disk
                match previous {
                    Some(prev) => state.insert(subject_id, prev),
                    None => state.remove(&subject_id),
                };
                return Err(e);
            }
            debug!(subject_id, "upserted credential");
            Ok(())
        })
    }

    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move { Ok(self.state.lock().await.len()) })
    }
}

/// Write credentials to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Sets permissions to 0600 since the file holds OAuth tokens.
async fn write_atomic(path: &Path, data: &HashMap<String, Credential>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::CredentialParse(format!("serializing credentials: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".credentials.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

    debug!(path = %path.display(), "persisted credentials");
    Ok(())
}
