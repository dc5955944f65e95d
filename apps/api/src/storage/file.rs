//! File backend. Layout:
//!
//! ```text
//! <root>/resilience-audit-storage/<user_id>.json
//! ```

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::audit::store::AuditStore;
use crate::storage::{validate_key, StateStorage, StorageError, NAMESPACE};

pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the namespace directory under `root` if it doesn't exist.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = root.into().join(NAMESPACE);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, user_id: &str) -> Result<PathBuf, StorageError> {
        validate_key(user_id)?;
        Ok(self.dir.join(format!("{user_id}.json")))
    }
}

#[async_trait]
impl StateStorage for FileStorage {
    async fn load(&self, user_id: &str) -> Result<Option<AuditStore>, StorageError> {
        let path = self.path_for(user_id)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!("Loaded audit state from {}", path.display());
        Ok(Some(AuditStore::from_snapshot(&json)?))
    }

    async fn save(&self, user_id: &str, store: &AuditStore) -> Result<(), StorageError> {
        let path = self.path_for(user_id)?;
        let json = store.to_snapshot()?;
        // Write-then-rename: readers never observe a partial file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
