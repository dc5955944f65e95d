use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::{
    AnalysisError, JobAnalysisRequest, JobAnalysisResponse, JobAnalyzer, TaskSuggestionRequest,
};
use crate::audit::models::TaskSuggestion;

const ANALYZE_JOB_PATH: &str = "analyze-job";
const GENERATE_TASKS_PATH: &str = "generate-tasks";

#[derive(Debug, Deserialize)]
struct TaskSuggestionResponse {
    success: bool,
    #[serde(default)]
    tasks: Vec<TaskSuggestion>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for an external job-analysis service.
///
/// The service must answer `POST <base>/analyze-job` and `POST <base>/generate-tasks`.
#[derive(Clone)]
pub struct HttpJobAnalyzer {
    client: Client,
    base_url: String,
}

impl HttpJobAnalyzer {
    /// `timeout` of `None` means requests wait for as long as the service takes.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AnalysisError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("Analysis service returned {status} for {url}");
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Analysis service call succeeded: {url}");
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl JobAnalyzer for HttpJobAnalyzer {
    async fn analyze_job(
        &self,
        request: &JobAnalysisRequest,
    ) -> Result<JobAnalysisResponse, AnalysisError> {
        let response: JobAnalysisResponse = self.post_json(ANALYZE_JOB_PATH, request).await?;
        if !response.success {
            return Err(AnalysisError::Rejected(
                response.error.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        Ok(response)
    }

    async fn suggest_tasks(
        &self,
        request: &TaskSuggestionRequest,
    ) -> Result<Vec<TaskSuggestion>, AnalysisError> {
        let response: TaskSuggestionResponse =
            self.post_json(GENERATE_TASKS_PATH, request).await?;
        if !response.success {
            return Err(AnalysisError::Rejected(
                response.error.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        Ok(response.tasks)
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}
