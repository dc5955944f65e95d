use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::audit::store::AuditStore;
use crate::storage::{StateStorage, StorageError, NAMESPACE};

/// Postgres backend: one JSONB row per (user, namespace), upserted on save.
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateStorage for PgStorage {
    async fn load(&self, user_id: &str) -> Result<Option<AuditStore>, StorageError> {
        let row: Option<(Json<AuditStore>,)> = sqlx::query_as(
            "SELECT state FROM audit_states WHERE user_id = $1 AND namespace = $2",
        )
        .bind(user_id)
        .bind(NAMESPACE)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(mut store),)| {
            store.normalize();
            store
        }))
    }

    async fn save(&self, user_id: &str, store: &AuditStore) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO audit_states (user_id, namespace, state, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, namespace)
            DO UPDATE SET state = EXCLUDED.state, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(NAMESPACE)
        .bind(Json(store))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
