pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::audit::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session", get(handlers::handle_get_session))
        // Whole audit
        .route(
            "/api/v1/audit",
            get(handlers::handle_get_audit).delete(handlers::handle_reset),
        )
        .route("/api/v1/audit/report", get(handlers::handle_get_report))
        .route("/api/v1/audit/context", patch(handlers::handle_patch_context))
        // Task ledger
        .route(
            "/api/v1/audit/tasks",
            get(handlers::handle_list_tasks).post(handlers::handle_add_task),
        )
        .route(
            "/api/v1/audit/tasks/analyze",
            post(handlers::handle_analyze_tasks),
        )
        .route(
            "/api/v1/audit/tasks/suggestions",
            post(handlers::handle_suggest_tasks),
        )
        .route(
            "/api/v1/audit/tasks/suggestions/accept",
            post(handlers::handle_accept_suggestions),
        )
        .route(
            "/api/v1/audit/tasks/:id",
            patch(handlers::handle_update_task).delete(handlers::handle_remove_task),
        )
        // Talents
        .route(
            "/api/v1/audit/talents/:id/toggle",
            post(handlers::handle_toggle_talent),
        )
        .route(
            "/api/v1/audit/talents/:id/level",
            put(handlers::handle_set_talent_level),
        )
        // Software inventory
        .route("/api/v1/audit/software", post(handlers::handle_add_software))
        .route(
            "/api/v1/audit/software/:id",
            patch(handlers::handle_update_software).delete(handlers::handle_remove_software),
        )
        // Wizard
        .route(
            "/api/v1/audit/wizard/enter",
            post(handlers::handle_enter_wizard),
        )
        .route("/api/v1/audit/wizard/next", post(handlers::handle_wizard_next))
        .route("/api/v1/audit/wizard/prev", post(handlers::handle_wizard_prev))
        .route("/api/v1/audit/wizard/step", put(handlers::handle_set_step))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::{
        AnalysisError, JobAnalysisRequest, JobAnalysisResponse, JobAnalyzer, MockJobAnalyzer,
        TaskSuggestionRequest,
    };
    use crate::audit::models::TaskSuggestion;
    use async_trait::async_trait;
    use tokio::sync::Notify;
    use crate::audit::session::SessionRegistry;
    use crate::config::Config;
    use crate::i18n::{Locale, StaticTranslations};
    use crate::storage::FileStorage;

    const DESCRIPTION: &str =
        "I run the monthly reporting, coordinate suppliers and train two junior analysts.";

    /// Fails every call, as an unreachable analysis service would.
    struct FailingAnalyzer;

    #[async_trait]
    impl JobAnalyzer for FailingAnalyzer {
        async fn analyze_job(
            &self,
            _request: &JobAnalysisRequest,
        ) -> Result<JobAnalysisResponse, AnalysisError> {
            Err(AnalysisError::Rejected("model unavailable".to_string()))
        }

        async fn suggest_tasks(
            &self,
            _request: &TaskSuggestionRequest,
        ) -> Result<Vec<TaskSuggestion>, AnalysisError> {
            Err(AnalysisError::Rejected("model unavailable".to_string()))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    /// Signals `started` once called, then waits for `release` before answering.
    #[derive(Default)]
    struct GatedAnalyzer {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl JobAnalyzer for GatedAnalyzer {
        async fn analyze_job(
            &self,
            request: &JobAnalysisRequest,
        ) -> Result<JobAnalysisResponse, AnalysisError> {
            self.started.notify_one();
            self.release.notified().await;
            MockJobAnalyzer.analyze_job(request).await
        }

        async fn suggest_tasks(
            &self,
            request: &TaskSuggestionRequest,
        ) -> Result<Vec<TaskSuggestion>, AnalysisError> {
            MockJobAnalyzer.suggest_tasks(request).await
        }

        fn backend(&self) -> &'static str {
            "gated"
        }
    }

    async fn test_app() -> (Router, TempDir) {
        test_app_with(Arc::new(MockJobAnalyzer)).await
    }

    async fn test_app_with(analyzer: Arc<dyn JobAnalyzer>) -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        let state = AppState {
            sessions: Arc::new(SessionRegistry::new(Arc::new(storage), 64)),
            analyzer,
            translator: Arc::new(StaticTranslations),
            config: Config {
                port: 0,
                rust_log: "debug".to_string(),
                storage_dir: PathBuf::from(dir.path()),
                database_url: None,
                analysis_url: None,
                analysis_timeout: None,
                default_locale: Locale::Fr,
                session_capacity: 64,
            },
        };
        (build_router(state), dir)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", "tester")
            .header("accept-language", "en-GB,en;q=0.9");
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn talent_ids(app: &Router) -> Vec<String> {
        let (_, audit) = send(app, Method::GET, "/api/v1/audit", None).await;
        audit["talents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_audit_requires_identity() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(Request::get("/api/v1/audit").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_echoes_identity() {
        let (app, _dir) = test_app().await;
        let (status, body) = send(&app, Method::GET, "/api/v1/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "tester");
    }

    #[tokio::test]
    async fn test_full_wizard_flow() {
        let (app, _dir) = test_app().await;

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/v1/audit/context",
            Some(json!({"persona": "employee", "goal": "augmentation", "jobTitle": "Analyst"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Smart skip: persona and goal known, wizard jumps to step 2 once.
        let (_, wizard) = send(&app, Method::POST, "/api/v1/audit/wizard/enter", None).await;
        assert_eq!(wizard["currentStep"], 2);
        send(&app, Method::POST, "/api/v1/audit/wizard/prev", None).await;
        let (_, wizard) = send(&app, Method::POST, "/api/v1/audit/wizard/enter", None).await;
        assert_eq!(wizard["currentStep"], 1);

        let (_, wizard) = send(&app, Method::PUT, "/api/v1/audit/wizard/step", Some(json!({"step": 3}))).await;
        assert_eq!(wizard["currentStep"], 3);

        let (status, body) = send(&app, Method::POST, "/api/v1/audit/wizard/next", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "STEP_BLOCKED");
        assert_eq!(body["error"]["message"], "Add at least one task to continue.");

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks",
            Some(json!({
                "name": "Data entry",
                "hoursPerWeek": 10,
                "resilience": {"data": 20, "decision": 20, "relational": 20, "creativity": 20, "execution": 20}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["audit"]["report"]["protection"], 20);
        assert_eq!(created["audit"]["report"]["vulnerability"], 80);

        let (_, wizard) = send(&app, Method::POST, "/api/v1/audit/wizard/next", None).await;
        assert_eq!(wizard["currentStep"], 4);

        let ids = talent_ids(&app).await;
        for id in ids.iter().take(6) {
            send(&app, Method::POST, &format!("/api/v1/audit/talents/{id}/toggle"), None).await;
        }
        let (_, audit) = send(&app, Method::GET, "/api/v1/audit", None).await;
        let selected = audit["talents"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|t| t["selected"] == true)
            .count();
        assert_eq!(selected, 5);

        let (_, wizard) = send(&app, Method::POST, "/api/v1/audit/wizard/next", None).await;
        assert_eq!(wizard["currentStep"], 5);

        let (status, _) = send(&app, Method::POST, "/api/v1/audit/wizard/next", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        send(
            &app,
            Method::POST,
            "/api/v1/audit/software",
            Some(json!({"name": "Excel", "level": "advanced"})),
        )
        .await;
        for expected in [6, 7, 8, 8] {
            let (_, wizard) = send(&app, Method::POST, "/api/v1/audit/wizard/next", None).await;
            assert_eq!(wizard["currentStep"], expected);
        }

        let (_, report) = send(&app, Method::GET, "/api/v1/audit/report", None).await;
        assert_eq!(report["diagnosticComplete"], true);
        // 5 talents at default level 3: 15 / 25 = 60; overall = 20*0.6 + 60*0.4 = 36
        assert_eq!(report["signature"], 60);
        assert_eq!(report["overall"], 36);
        assert_eq!(report["verdict"], "exposed");
        assert_eq!(report["verdictLabel"], "Exposed profile");
    }

    #[tokio::test]
    async fn test_analysis_validates_then_imports() {
        let (app, _dir) = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks/analyze",
            Some(json!({"jobDescription": "too short"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "The job description is too short (at least 50 characters)."
        );

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks/analyze",
            Some(json!({"jobDescription": DESCRIPTION, "persona": "leader"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imported"].as_array().unwrap().len(), 6);
        assert_eq!(body["audit"]["context"]["jobDescription"], DESCRIPTION);

        // A second import keeps duplicates by name.
        let (_, body) = send(&app, Method::POST, "/api/v1/audit/tasks/analyze", Some(json!({}))).await;
        assert_eq!(body["audit"]["tasks"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_suggestions_accepted_as_mid_range_tasks() {
        let (app, _dir) = test_app().await;
        let (status, stubs) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks/suggestions",
            Some(json!({"jobTitle": "Store manager", "sector": "Retail", "teamSize": 8})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let picked: Vec<Value> = stubs.as_array().unwrap().iter().take(2).cloned().collect();

        let (_, audit) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks/suggestions/accept",
            Some(json!({"suggestions": picked})),
        )
        .await;
        let tasks = audit["tasks"].as_array().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0]["resilience"]["data"], 50);
        assert_eq!(audit["report"]["protection"], 50);
    }

    #[tokio::test]
    async fn test_removals_of_unknown_ids_are_noops() {
        let (app, _dir) = test_app().await;
        let unknown = uuid::Uuid::new_v4();
        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/audit/tasks/{unknown}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/audit/software/{unknown}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/api/v1/audit/tasks/{unknown}"),
            Some(json!({"name": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_task_list_uses_weighted_summary() {
        let (app, _dir) = test_app().await;
        send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks",
            Some(json!({"name": "Filing", "hoursPerWeek": 15, "resilience": {"data": 20, "decision": 20, "relational": 20, "creativity": 20, "execution": 20}})),
        )
        .await;
        send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks",
            Some(json!({"name": "Mentoring", "hoursPerWeek": 5, "resilience": {"data": 100, "decision": 100, "relational": 100, "creativity": 100, "execution": 100}})),
        )
        .await;

        let (status, list) = send(&app, Method::GET, "/api/v1/audit/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["tasks"].as_array().unwrap().len(), 2);
        assert_eq!(list["totalHours"], 20.0);
        assert_eq!(list["weightedProtection"], 40);

        // The headline score stays the simple mean.
        let (_, report) = send(&app, Method::GET, "/api/v1/audit/report", None).await;
        assert_eq!(report["protection"], 60);
    }

    #[tokio::test]
    async fn test_fourth_software_ignored() {
        let (app, _dir) = test_app().await;
        for name in ["Excel", "Figma", "Notion"] {
            let (_, body) = send(&app, Method::POST, "/api/v1/audit/software", Some(json!({"name": name}))).await;
            assert!(body["id"].is_string());
        }
        let (_, body) = send(&app, Method::POST, "/api/v1/audit/software", Some(json!({"name": "Jira"}))).await;
        assert!(body["id"].is_null());
        assert_eq!(body["audit"]["software"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let (app, _dir) = test_app().await;
        send(
            &app,
            Method::PATCH,
            "/api/v1/audit/context",
            Some(json!({"persona": "freelancer", "goal": "pivot"})),
        )
        .await;
        send(&app, Method::POST, "/api/v1/audit/tasks", Some(json!({"name": "Invoicing"}))).await;
        send(&app, Method::PUT, "/api/v1/audit/wizard/step", Some(json!({"step": 5}))).await;

        let (status, audit) = send(&app, Method::DELETE, "/api/v1/audit", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(audit["context"]["persona"].is_null());
        assert!(audit["tasks"].as_array().unwrap().is_empty());
        assert!(audit["software"].as_array().unwrap().is_empty());
        assert_eq!(audit["wizard"]["currentStep"], 1);
        assert_eq!(audit["phase"], "diagnostic");
    }

    #[tokio::test]
    async fn test_default_locale_used_without_header() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(
                Request::post("/api/v1/audit/wizard/next")
                    .header("x-user-id", "francophone")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["error"]["message"],
            "Choisissez votre profil et votre objectif pour continuer."
        );
    }

    #[tokio::test]
    async fn test_out_of_range_numbers_clamped() {
        let (app, _dir) = test_app().await;

        let (status, wizard) = send(&app, Method::PUT, "/api/v1/audit/wizard/step", Some(json!({"step": 300}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(wizard["currentStep"], 8);
        let (_, wizard) = send(&app, Method::PUT, "/api/v1/audit/wizard/step", Some(json!({"step": -3}))).await;
        assert_eq!(wizard["currentStep"], 1);

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks",
            Some(json!({
                "name": "Audit",
                "resilience": {"data": 300, "decision": -5, "relational": 100, "creativity": 100, "execution": 100}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let resilience = &created["audit"]["tasks"][0]["resilience"];
        assert_eq!(resilience["data"], 100);
        assert_eq!(resilience["decision"], 0);

        let task_id = created["id"].as_str().unwrap().to_string();
        let (status, audit) = send(
            &app,
            Method::PATCH,
            &format!("/api/v1/audit/tasks/{task_id}"),
            Some(json!({"resilience": {"creativity": 1000}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audit["tasks"][0]["resilience"]["creativity"], 100);

        let ids = talent_ids(&app).await;
        let (status, audit) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/audit/talents/{}/level", ids[0]),
            Some(json!({"level": 500})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audit["talents"][0]["level"], 5);
    }

    #[tokio::test]
    async fn test_malformed_requests_use_error_body() {
        let (app, _dir) = test_app().await;

        let (status, body) = send(&app, Method::PUT, "/api/v1/audit/wizard/step", Some(json!({"step": "four"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/audit/tasks/not-a-uuid",
            Some(json!({"name": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        // Missing content type is rejected the same way.
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/v1/audit/tasks")
                    .header("x-user-id", "tester")
                    .body(Body::from(r#"{"name":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_failed_analysis_returns_retry_prompt() {
        let (app, _dir) = test_app_with(Arc::new(FailingAnalyzer)).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks/analyze",
            Some(json!({"jobDescription": DESCRIPTION})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ANALYSIS_FAILED");
        assert_eq!(body["error"]["message"], "The analysis failed. Please try again.");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks/suggestions",
            Some(json!({"jobTitle": "Buyer"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ANALYSIS_FAILED");

        // Nothing was imported and the next attempt is not refused as concurrent.
        let (status, list) = send(&app, Method::GET, "/api/v1/audit/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(list["tasks"].as_array().unwrap().is_empty());
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/audit/tasks/analyze",
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_concurrent_analysis_refused() {
        let analyzer = Arc::new(GatedAnalyzer::default());
        let (app, _dir) = test_app_with(analyzer.clone()).await;
        let body = json!({"jobDescription": DESCRIPTION});

        let first = {
            let app = app.clone();
            let body = body.clone();
            tokio::spawn(async move {
                send(&app, Method::POST, "/api/v1/audit/tasks/analyze", Some(body)).await
            })
        };
        analyzer.started.notified().await;

        let (status, second) = send(&app, Method::POST, "/api/v1/audit/tasks/analyze", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(second["error"]["message"], "An analysis is already running.");

        analyzer.release.notify_one();
        let (status, imported) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(imported["imported"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_reset_rearms_smart_skip() {
        let (app, _dir) = test_app().await;
        let profile = json!({"persona": "leader", "goal": "reclassement"});

        send(&app, Method::PATCH, "/api/v1/audit/context", Some(profile.clone())).await;
        let (_, wizard) = send(&app, Method::POST, "/api/v1/audit/wizard/enter", None).await;
        assert_eq!(wizard["currentStep"], 2);

        send(&app, Method::DELETE, "/api/v1/audit", None).await;
        send(&app, Method::PATCH, "/api/v1/audit/context", Some(profile)).await;
        let (_, wizard) = send(&app, Method::POST, "/api/v1/audit/wizard/enter", None).await;
        assert_eq!(wizard["currentStep"], 2);
    }
}
