mod analysis;
mod audit;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod i18n;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{HttpJobAnalyzer, JobAnalyzer, MockJobAnalyzer};
use crate::audit::session::SessionRegistry;
use crate::config::Config;
use crate::db::create_pool;
use crate::i18n::StaticTranslations;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStorage, PgStorage, StateStorage};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resilience API v{}", env!("CARGO_PKG_VERSION"));

    // Persistence: Postgres when DATABASE_URL is set, local files otherwise
    let storage: Arc<dyn StateStorage> = match &config.database_url {
        Some(url) => Arc::new(PgStorage::new(create_pool(url).await?)),
        None => {
            info!("Using file storage under {}", config.storage_dir.display());
            Arc::new(FileStorage::new(&config.storage_dir).await?)
        }
    };

    // Job analyzer: external service when ANALYSIS_URL is set, static mock otherwise
    let analyzer: Arc<dyn JobAnalyzer> = match &config.analysis_url {
        Some(url) => {
            info!(
                "Job analysis forwarded to {url} (timeout: {:?})",
                config.analysis_timeout
            );
            Arc::new(HttpJobAnalyzer::new(url.as_str(), config.analysis_timeout)?)
        }
        None => {
            info!("Job analysis served by the built-in mock");
            Arc::new(MockJobAnalyzer)
        }
    };

    let state = AppState {
        sessions: Arc::new(SessionRegistry::new(storage, config.session_capacity)),
        analyzer,
        translator: Arc::new(StaticTranslations),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
