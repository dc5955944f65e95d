use async_trait::async_trait;

use crate::analysis::{
    AnalysisError, JobAnalysisRequest, JobAnalysisResponse, JobAnalyzer, TaskSuggestionRequest,
};
use crate::audit::models::{AnalyzedTask, Persona, ResilienceProfile, TaskSuggestion, Temporality};

// name, [data, decision, relational, creativity, execution], hours, temporality
type TaskRow = (&'static str, [u8; 5], f64, Temporality);

const COMMON_TASKS: &[TaskRow] = &[
    ("Reporting and data consolidation", [20, 35, 15, 20, 25], 6.0, Temporality::Weekly),
    ("Email and calendar management", [15, 20, 30, 10, 20], 5.0, Temporality::Daily),
    ("Stakeholder meetings", [60, 65, 90, 55, 60], 4.0, Temporality::Weekly),
    ("Process improvement", [55, 75, 50, 80, 60], 3.0, Temporality::Monthly),
];

const EMPLOYEE_TASKS: &[TaskRow] = &[
    ("Document drafting", [30, 30, 25, 45, 35], 4.0, Temporality::Weekly),
];

const FREELANCER_TASKS: &[TaskRow] = &[
    ("Business development", [45, 70, 85, 65, 55], 4.0, Temporality::Weekly),
    ("Invoicing and admin", [10, 15, 10, 5, 20], 2.0, Temporality::Monthly),
];

const LEADER_TASKS: &[TaskRow] = &[
    ("Team coordination", [45, 70, 85, 50, 65], 5.0, Temporality::Weekly),
    ("Strategic planning", [60, 90, 70, 80, 55], 2.0, Temporality::Strategic),
];

const SUGGESTIONS: &[(&str, &str)] = &[
    ("Operational follow-up", "Day-to-day tracking of ongoing work"),
    ("Reporting", "Preparing recurring reports and dashboards"),
    ("Internal meetings", "Coordination meetings with colleagues"),
    ("Client relations", "Exchanges with clients or partners"),
    ("Quality control", "Reviewing deliverables before release"),
    ("Continuous improvement", "Proposing and testing better ways of working"),
];

/// Static, deterministic analyzer used when no external service is configured.
pub struct MockJobAnalyzer;

fn to_analyzed(rows: &[TaskRow]) -> impl Iterator<Item = AnalyzedTask> + '_ {
    rows.iter().map(|(name, d, hours, temporality)| AnalyzedTask {
        name: (*name).to_string(),
        resilience: ResilienceProfile {
            data: d[0],
            decision: d[1],
            relational: d[2],
            creativity: d[3],
            execution: d[4],
        },
        hours_per_week: *hours,
        temporality: *temporality,
    })
}

#[async_trait]
impl JobAnalyzer for MockJobAnalyzer {
    async fn analyze_job(
        &self,
        request: &JobAnalysisRequest,
    ) -> Result<JobAnalysisResponse, AnalysisError> {
        let persona_rows = match request.persona {
            Some(Persona::Freelancer) => FREELANCER_TASKS,
            Some(Persona::Leader) => LEADER_TASKS,
            Some(Persona::Employee) | None => EMPLOYEE_TASKS,
        };
        let tasks: Vec<AnalyzedTask> = to_analyzed(COMMON_TASKS)
            .chain(to_analyzed(persona_rows))
            .collect();

        let title = match request.job_title.trim() {
            "" => "this role",
            t => t,
        };
        Ok(JobAnalysisResponse {
            success: true,
            summary: Some(format!("{} tasks identified for {}", tasks.len(), title)),
            tasks,
            error: None,
        })
    }

    async fn suggest_tasks(
        &self,
        request: &TaskSuggestionRequest,
    ) -> Result<Vec<TaskSuggestion>, AnalysisError> {
        let sector = request.sector.trim();
        Ok(SUGGESTIONS
            .iter()
            .enumerate()
            .map(|(i, (name, description))| TaskSuggestion {
                id: format!("suggestion-{}", i + 1),
                name: (*name).to_string(),
                description: if sector.is_empty() {
                    (*description).to_string()
                } else {
                    format!("{description} ({sector})")
                },
            })
            .collect())
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}
