//! Job analysis collaborators: turn a job description into candidate tasks.
//!
//! Pluggable, trait-based. `AppState` holds an `Arc<dyn JobAnalyzer>`:
//! - `MockJobAnalyzer` (default): static, deterministic data.
//! - `HttpJobAnalyzer`: forwards to an external analysis service.
//!
//! No retries: a failed call surfaces the generic retry prompt and the user
//! re-triggers it.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::models::{AnalyzedTask, Persona, TaskSuggestion};
use crate::i18n::MessageKey;

pub use http::HttpJobAnalyzer;
pub use mock::MockJobAnalyzer;

pub const MIN_DESCRIPTION_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAnalysisRequest {
    pub job_description: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub industry: String,
    pub persona: Option<Persona>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAnalysisResponse {
    pub success: bool,
    #[serde(default)]
    pub tasks: Vec<AnalyzedTask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuggestionRequest {
    pub job_title: String,
    #[serde(default)]
    pub sector: String,
    pub experience: Option<String>,
    pub team_size: Option<u32>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("analysis rejected: {0}")]
    Rejected(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait JobAnalyzer: Send + Sync {
    async fn analyze_job(
        &self,
        request: &JobAnalysisRequest,
    ) -> Result<JobAnalysisResponse, AnalysisError>;

    async fn suggest_tasks(
        &self,
        request: &TaskSuggestionRequest,
    ) -> Result<Vec<TaskSuggestion>, AnalysisError>;

    /// "mock" | "http", for logs.
    fn backend(&self) -> &'static str;
}

/// Checks a job-analysis request before any call goes out.
pub fn validate_analysis_request(request: &JobAnalysisRequest) -> Result<(), MessageKey> {
    if request.job_description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(MessageKey::DescriptionTooShort);
    }
    Ok(())
}

pub fn validate_suggestion_request(request: &TaskSuggestionRequest) -> Result<(), MessageKey> {
    if request.job_title.trim().is_empty() {
        return Err(MessageKey::JobTitleRequired);
    }
    Ok(())
}
