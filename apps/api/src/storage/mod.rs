//! Whole-state persistence for audit sessions.
//!
//! A user's entire `AuditStore` is written under a fixed namespace after every
//! mutation and read back once, the first time the user is seen. There is no
//! partial write and no schema migration.

pub mod file;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::audit::store::AuditStore;

pub use file::FileStorage;
pub use postgres::PgStorage;

/// Key under which every audit state is stored.
pub const NAMESPACE: &str = "resilience-audit-storage";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

#[async_trait]
pub trait StateStorage: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<AuditStore>, StorageError>;

    async fn save(&self, user_id: &str, store: &AuditStore) -> Result<(), StorageError>;
}

/// User ids end up in file names, so only a conservative alphabet is accepted.
pub fn validate_key(user_id: &str) -> Result<(), StorageError> {
    let valid = !user_id.is_empty()
        && user_id.len() <= 128
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(user_id.to_string()))
    }
}
