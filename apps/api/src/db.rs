use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a PostgreSQL connection pool and makes sure the state table exists.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_states (
            user_id    TEXT        NOT NULL,
            namespace  TEXT        NOT NULL,
            state      JSONB       NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, namespace)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
