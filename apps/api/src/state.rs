use std::sync::Arc;

use crate::analysis::JobAnalyzer;
use crate::audit::session::SessionRegistry;
use crate::config::Config;
use crate::i18n::Translator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns every user's audit store and its persistence.
    pub sessions: Arc<SessionRegistry>,
    /// Pluggable analyzer. Default: MockJobAnalyzer. Swap via ANALYSIS_URL.
    pub analyzer: Arc<dyn JobAnalyzer>,
    pub translator: Arc<dyn Translator>,
    pub config: Config,
}
