use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const MIN_HOURS_PER_WEEK: f64 = 0.5;
pub const MAX_HOURS_PER_WEEK: f64 = 20.0;
pub const MIN_TALENT_LEVEL: u8 = 1;
pub const MAX_TALENT_LEVEL: u8 = 5;
pub const DEFAULT_TALENT_LEVEL: u8 = 3;
pub const DEFAULT_RESILIENCE: u8 = 50;

// ────────────────────────────────────────────────────────────────────────────
// Context
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Employee,
    Freelancer,
    Leader,
}

/// Strategic objective. `Reclassement` is an organization-led redeployment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Augmentation,
    Pivot,
    Reclassement,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditContext {
    pub persona: Option<Persona>,
    pub goal: Option<Goal>,
    pub job_title: String,
    pub industry: String,
    pub job_description: String,
}

impl AuditContext {
    pub fn has_persona_and_goal(&self) -> bool {
        self.persona.is_some() && self.goal.is_some()
    }
}

/// Partial context update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPatch {
    pub persona: Option<Persona>,
    pub goal: Option<Goal>,
    pub job_title: Option<String>,
    pub industry: Option<String>,
    pub job_description: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tasks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Temporality {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Strategic,
}

/// Five-axis rating of how well a task resists automation. Each axis is 0–100.
/// Out-of-range input is clamped while deserializing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResilienceProfile {
    #[serde(deserialize_with = "deserialize_axis")]
    pub data: u8,
    #[serde(deserialize_with = "deserialize_axis")]
    pub decision: u8,
    #[serde(deserialize_with = "deserialize_axis")]
    pub relational: u8,
    #[serde(deserialize_with = "deserialize_axis")]
    pub creativity: u8,
    #[serde(deserialize_with = "deserialize_axis")]
    pub execution: u8,
}

pub fn clamp_axis(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

fn deserialize_axis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    i64::deserialize(deserializer).map(clamp_axis)
}

impl ResilienceProfile {
    pub fn uniform(value: u8) -> Self {
        let v = value.min(100);
        Self {
            data: v,
            decision: v,
            relational: v,
            creativity: v,
            execution: v,
        }
    }

    pub fn dimensions(&self) -> [u8; 5] {
        [
            self.data,
            self.decision,
            self.relational,
            self.creativity,
            self.execution,
        ]
    }

    /// Returns a copy with every axis clamped into [0, 100].
    pub fn clamped(self) -> Self {
        Self {
            data: self.data.min(100),
            decision: self.decision.min(100),
            relational: self.relational.min(100),
            creativity: self.creativity.min(100),
            execution: self.execution.min(100),
        }
    }
}

impl Default for ResilienceProfile {
    fn default() -> Self {
        Self::uniform(DEFAULT_RESILIENCE)
    }
}

/// Per-axis partial update for a resilience profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResiliencePatch {
    pub data: Option<i64>,
    pub decision: Option<i64>,
    pub relational: Option<i64>,
    pub creativity: Option<i64>,
    pub execution: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub temporality: Temporality,
    pub hours_per_week: f64,
    pub resilience: ResilienceProfile,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when a user adds a task by hand.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub name: String,
    #[serde(default)]
    pub temporality: Temporality,
    #[serde(default = "default_hours")]
    pub hours_per_week: f64,
    #[serde(default)]
    pub resilience: ResilienceProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub name: Option<String>,
    pub temporality: Option<Temporality>,
    pub hours_per_week: Option<f64>,
    pub resilience: Option<ResiliencePatch>,
}

/// A task descriptor produced by the job-analysis collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedTask {
    pub name: String,
    pub resilience: ResilienceProfile,
    #[serde(default = "default_hours")]
    pub hours_per_week: f64,
    #[serde(default)]
    pub temporality: Temporality,
}

/// A lightweight task stub produced by the task-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSuggestion {
    pub id: String,
    pub name: String,
    pub description: String,
}

fn default_hours() -> f64 {
    1.0
}

pub fn clamp_hours(hours: f64) -> f64 {
    if hours.is_nan() {
        return MIN_HOURS_PER_WEEK;
    }
    hours.clamp(MIN_HOURS_PER_WEEK, MAX_HOURS_PER_WEEK)
}

// ────────────────────────────────────────────────────────────────────────────
// Talents
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TalentCategory {
    Analytical,
    Relational,
    Creative,
    Operational,
    Technical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Talent {
    pub id: String,
    pub name: String,
    pub category: TalentCategory,
    pub level: u8,
    pub selected: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Software
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareLevel {
    #[default]
    Beginner,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Software {
    pub id: Uuid,
    pub name: String,
    pub level: SoftwareLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoftwarePatch {
    pub name: Option<String>,
    pub level: Option<SoftwareLevel>,
}
