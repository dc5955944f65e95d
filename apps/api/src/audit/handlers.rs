//! Axum route handlers for the audit wizard.
//!
//! Handlers are the calling surface for the wizard: they evaluate gating
//! before moving forward and turn blockers into localized messages.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{
    validate_analysis_request, validate_suggestion_request, JobAnalysisRequest,
    TaskSuggestionRequest,
};
use crate::audit::models::{
    ContextPatch, SoftwareLevel, SoftwarePatch, Task, TaskDraft, TaskPatch, TaskSuggestion,
};
use crate::audit::report::{build_report, AuditReport};
use crate::audit::scoring::weighted_resilience_score;
use crate::audit::store::AuditStore;
use crate::audit::wizard::{diagnostic_complete, Phase};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::i18n::{Locale, MessageKey, RequestLocale};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Whole state plus derived scores, returned after most mutations.
#[derive(Debug, Serialize)]
pub struct AuditView {
    #[serde(flatten)]
    pub state: AuditStore,
    pub phase: Phase,
    pub report: AuditReport,
}

impl AuditView {
    fn build(store: &AuditStore, app: &AppState, locale: Locale) -> Self {
        AuditView {
            state: store.clone(),
            phase: store.wizard.phase(),
            report: build_report(store, app.translator.as_ref(), locale),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    /// `None` when the entity was refused (e.g. a fourth software entry).
    pub id: Option<Uuid>,
    pub audit: AuditView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub current_step: u8,
    pub phase: Phase,
    pub diagnostic_complete: bool,
}

impl WizardView {
    fn of(store: &AuditStore) -> Self {
        WizardView {
            current_step: store.wizard.current_step,
            phase: store.wizard.phase(),
            diagnostic_complete: diagnostic_complete(store),
        }
    }
}

/// Task list as displayed on the ledger step: newest first, with the
/// hours-weighted summary score.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListView {
    pub tasks: Vec<Task>,
    pub total_hours: f64,
    pub weighted_protection: u32,
}

#[derive(Debug, Serialize)]
pub struct AnalysisImportResponse {
    pub summary: Option<String>,
    pub imported: Vec<Uuid>,
    pub audit: AuditView,
}

#[derive(Debug, Deserialize)]
pub struct LevelRequest {
    pub level: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewSoftware {
    pub name: String,
    #[serde(default)]
    pub level: SoftwareLevel,
}

#[derive(Debug, Deserialize)]
pub struct AcceptSuggestionsRequest {
    pub suggestions: Vec<TaskSuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct SetStepRequest {
    pub step: i64,
}

fn localized(state: &AppState, locale: Locale, key: MessageKey) -> String {
    state.translator.translate(key, locale).to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Session / whole state
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/session
pub async fn handle_get_session(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}

/// GET /api/v1/audit
pub async fn handle_get_audit(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
) -> Result<Json<AuditView>, AppError> {
    let view = state
        .sessions
        .read(&user.id, |store| AuditView::build(store, &state, locale))
        .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/audit
///
/// Global reset: every entity back to its initial state, step 1.
pub async fn handle_reset(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
) -> Result<Json<AuditView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.reset();
            AuditView::build(&s.store, &state, locale)
        })
        .await?;
    info!("Audit reset for user {}", user.id);
    Ok(Json(view))
}

/// GET /api/v1/audit/report
pub async fn handle_get_report(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
) -> Result<Json<AuditReport>, AppError> {
    let report = state
        .sessions
        .read(&user.id, |store| {
            build_report(store, state.translator.as_ref(), locale)
        })
        .await?;
    Ok(Json(report))
}

/// PATCH /api/v1/audit/context
pub async fn handle_patch_context(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppJson(patch): AppJson<ContextPatch>,
) -> Result<Json<AuditView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.store.update_context(patch);
            AuditView::build(&s.store, &state, locale)
        })
        .await?;
    Ok(Json(view))
}

// ────────────────────────────────────────────────────────────────────────────
// Tasks
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/audit/tasks
pub async fn handle_list_tasks(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<TaskListView>, AppError> {
    let view = state
        .sessions
        .read(&user.id, |store| TaskListView {
            tasks: store.tasks_by_recency().into_iter().cloned().collect(),
            total_hours: store.tasks.iter().map(|t| t.hours_per_week).sum(),
            weighted_protection: weighted_resilience_score(&store.tasks),
        })
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/audit/tasks
pub async fn handle_add_task(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppJson(draft): AppJson<TaskDraft>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    if draft.name.trim().is_empty() {
        return Err(AppError::Validation(localized(
            &state,
            locale,
            MessageKey::TaskNameRequired,
        )));
    }
    let response = state
        .sessions
        .update(&user.id, |s| {
            let id = s.store.add_task(draft);
            CreatedResponse {
                id: Some(id),
                audit: AuditView::build(&s.store, &state, locale),
            }
        })
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PATCH /api/v1/audit/tasks/:id
pub async fn handle_update_task(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<TaskPatch>,
) -> Result<Json<AuditView>, AppError> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation(localized(
            &state,
            locale,
            MessageKey::TaskNameRequired,
        )));
    }
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.store
                .update_task(id, patch)
                .then(|| AuditView::build(&s.store, &state, locale))
        })
        .await?;
    view.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Task {id} not found")))
}

/// DELETE /api/v1/audit/tasks/:id
///
/// Removing an unknown task is a no-op and still answers 204.
pub async fn handle_remove_task(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .update(&user.id, |s| s.store.remove_task(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/audit/tasks/analyze
///
/// Merges the body into the context, sends the context to the job analyzer,
/// and appends every returned task to the ledger.
pub async fn handle_analyze_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppJson(patch): AppJson<ContextPatch>,
) -> Result<Json<AnalysisImportResponse>, AppError> {
    let request = state
        .sessions
        .update(&user.id, |s| {
            s.store.update_context(patch);
            let ctx = &s.store.context;
            JobAnalysisRequest {
                job_description: ctx.job_description.clone(),
                job_title: ctx.job_title.clone(),
                industry: ctx.industry.clone(),
                persona: ctx.persona,
            }
        })
        .await?;

    validate_analysis_request(&request)
        .map_err(|key| AppError::Validation(localized(&state, locale, key)))?;

    let _pending = state.sessions.begin_analysis(&user.id).ok_or_else(|| {
        AppError::Conflict(localized(&state, locale, MessageKey::AnalysisInProgress))
    })?;

    info!(
        "Running job analysis for user {} (backend: {})",
        user.id,
        state.analyzer.backend()
    );
    let response = state.analyzer.analyze_job(&request).await.map_err(|e| {
        warn!("Job analysis failed for user {}: {e}", user.id);
        AppError::Upstream(localized(&state, locale, MessageKey::AnalysisFailed))
    })?;

    let summary = response.summary;
    let tasks = response.tasks;
    let (imported, audit) = state
        .sessions
        .update(&user.id, |s| {
            let ids = s.store.add_tasks_from_ai(tasks);
            (ids, AuditView::build(&s.store, &state, locale))
        })
        .await?;

    Ok(Json(AnalysisImportResponse {
        summary,
        imported,
        audit,
    }))
}

/// POST /api/v1/audit/tasks/suggestions
///
/// Returns task stubs for the user to pick from. Nothing is stored yet.
pub async fn handle_suggest_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppJson(request): AppJson<TaskSuggestionRequest>,
) -> Result<Json<Vec<TaskSuggestion>>, AppError> {
    validate_suggestion_request(&request)
        .map_err(|key| AppError::Validation(localized(&state, locale, key)))?;

    let _pending = state.sessions.begin_analysis(&user.id).ok_or_else(|| {
        AppError::Conflict(localized(&state, locale, MessageKey::AnalysisInProgress))
    })?;

    let suggestions = state.analyzer.suggest_tasks(&request).await.map_err(|e| {
        warn!("Task generation failed for user {}: {e}", user.id);
        AppError::Upstream(localized(&state, locale, MessageKey::AnalysisFailed))
    })?;
    Ok(Json(suggestions))
}

/// POST /api/v1/audit/tasks/suggestions/accept
pub async fn handle_accept_suggestions(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppJson(request): AppJson<AcceptSuggestionsRequest>,
) -> Result<Json<AuditView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.store.add_tasks_from_suggestions(request.suggestions);
            AuditView::build(&s.store, &state, locale)
        })
        .await?;
    Ok(Json(view))
}

// ────────────────────────────────────────────────────────────────────────────
// Talents
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/audit/talents/:id/toggle
///
/// Selecting a sixth talent is silently refused; the unchanged state is returned.
pub async fn handle_toggle_talent(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppPath(id): AppPath<String>,
) -> Result<Json<AuditView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            if !s.store.talents.iter().any(|t| t.id == id) {
                return None;
            }
            s.store.toggle_talent(&id);
            Some(AuditView::build(&s.store, &state, locale))
        })
        .await?;
    view.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Talent {id} not found")))
}

/// PUT /api/v1/audit/talents/:id/level
pub async fn handle_set_talent_level(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<LevelRequest>,
) -> Result<Json<AuditView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.store
                .set_talent_level(&id, req.level)
                .then(|| AuditView::build(&s.store, &state, locale))
        })
        .await?;
    view.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Talent {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Software
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/audit/software
///
/// A fourth entry is ignored: the response carries `id: null`.
pub async fn handle_add_software(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppJson(req): AppJson<NewSoftware>,
) -> Result<Json<CreatedResponse>, AppError> {
    let response = state
        .sessions
        .update(&user.id, |s| {
            let id = s.store.add_software(req.name, req.level);
            CreatedResponse {
                id,
                audit: AuditView::build(&s.store, &state, locale),
            }
        })
        .await?;
    Ok(Json(response))
}

/// PATCH /api/v1/audit/software/:id
pub async fn handle_update_software(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<SoftwarePatch>,
) -> Result<Json<AuditView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.store
                .update_software(id, patch)
                .then(|| AuditView::build(&s.store, &state, locale))
        })
        .await?;
    view.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Software {id} not found")))
}

/// DELETE /api/v1/audit/software/:id
pub async fn handle_remove_software(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .update(&user.id, |s| s.store.remove_software(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Wizard
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/audit/wizard/enter
///
/// Initializes talents if needed and applies the once-per-session smart skip.
pub async fn handle_enter_wizard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<WizardView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.store.enter_wizard(&mut s.smart_skip);
            WizardView::of(&s.store)
        })
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/audit/wizard/next
pub async fn handle_wizard_next(
    State(state): State<AppState>,
    user: AuthUser,
    RequestLocale(locale): RequestLocale,
) -> Result<Json<WizardView>, AppError> {
    let outcome = state
        .sessions
        .update(&user.id, |s| {
            let from = s.store.wizard.current_step;
            s.store
                .advance()
                .map(|_| WizardView::of(&s.store))
                .map_err(|blocker| (from, blocker))
        })
        .await?;

    outcome.map(Json).map_err(|(step, blocker)| {
        info!("Wizard blocked at step {step} for user {}: {blocker:?}", user.id);
        AppError::Blocked {
            step,
            message: localized(&state, locale, blocker.message_key()),
        }
    })
}

/// POST /api/v1/audit/wizard/prev
pub async fn handle_wizard_prev(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<WizardView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.store.wizard.prev();
            WizardView::of(&s.store)
        })
        .await?;
    Ok(Json(view))
}

/// PUT /api/v1/audit/wizard/step
///
/// Direct jump used by cross-page navigation. Clamped to 1..=8, not gated.
pub async fn handle_set_step(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<SetStepRequest>,
) -> Result<Json<WizardView>, AppError> {
    let view = state
        .sessions
        .update(&user.id, |s| {
            s.store.wizard.set_step(req.step);
            WizardView::of(&s.store)
        })
        .await?;
    Ok(Json(view))
}
