//! The audit state container and its entity managers.
//!
//! One `AuditStore` holds everything a user has entered. Every mutation is a
//! plain `&mut self` method, so callers decide how exclusivity is enforced.
//! Rule violations such as a sixth talent, a fourth tool, or an unknown id are
//! silent no-ops.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::catalog::{initial_talents, SIGNATURE_SIZE};
use crate::audit::models::{
    clamp_axis, clamp_hours, AnalyzedTask, AuditContext, ContextPatch, ResilienceProfile, Software,
    SoftwareLevel, SoftwarePatch, Talent, Task, TaskDraft, TaskPatch, TaskSuggestion,
    Temporality, MAX_TALENT_LEVEL, MIN_TALENT_LEVEL,
};
use crate::audit::wizard::{self, Blocker, SmartSkip, WizardState, DIAGNOSTIC_LAST_STEP};

pub const MAX_SOFTWARE: usize = 3;

fn clamp_level(level: i64) -> u8 {
    level.clamp(i64::from(MIN_TALENT_LEVEL), i64::from(MAX_TALENT_LEVEL)) as u8
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditStore {
    pub context: AuditContext,
    pub tasks: Vec<Task>,
    pub talents: Vec<Talent>,
    pub software: Vec<Software>,
    pub wizard: WizardState,
}

impl Default for AuditStore {
    fn default() -> Self {
        Self {
            context: AuditContext::default(),
            tasks: Vec::new(),
            talents: initial_talents(),
            software: Vec::new(),
            wizard: WizardState::default(),
        }
    }
}

impl AuditStore {
    // ── Serialization boundary ──

    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_snapshot(json: &str) -> Result<Self, serde_json::Error> {
        let mut store: Self = serde_json::from_str(json)?;
        store.normalize();
        Ok(store)
    }

    /// Re-applies the entity limits to state that bypassed the managers,
    /// such as a hand-edited or older snapshot.
    pub fn normalize(&mut self) {
        self.init_talents();
        let mut selected = 0;
        for talent in &mut self.talents {
            talent.level = clamp_level(i64::from(talent.level));
            if talent.selected {
                if selected < SIGNATURE_SIZE {
                    selected += 1;
                } else {
                    talent.selected = false;
                }
            }
        }
        for task in &mut self.tasks {
            task.hours_per_week = clamp_hours(task.hours_per_week);
            task.resilience = task.resilience.clamped();
        }
        self.software.truncate(MAX_SOFTWARE);
        self.wizard.set_step(i64::from(self.wizard.current_step));
    }

    /// Returns every entity to its initial state in a single assignment.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ── Context ──

    pub fn update_context(&mut self, patch: ContextPatch) {
        let ctx = &mut self.context;
        if let Some(persona) = patch.persona {
            ctx.persona = Some(persona);
        }
        if let Some(goal) = patch.goal {
            ctx.goal = Some(goal);
        }
        if let Some(title) = patch.job_title {
            ctx.job_title = title;
        }
        if let Some(industry) = patch.industry {
            ctx.industry = industry;
        }
        if let Some(description) = patch.job_description {
            ctx.job_description = description;
        }
    }

    // ── Tasks ──

    pub fn add_task(&mut self, draft: TaskDraft) -> Uuid {
        self.push_task(
            draft.name,
            draft.temporality,
            draft.hours_per_week,
            draft.resilience,
        )
    }

    /// Appends a batch from the job-analysis collaborator. Duplicate names are kept.
    pub fn add_tasks_from_ai(&mut self, analyzed: Vec<AnalyzedTask>) -> Vec<Uuid> {
        analyzed
            .into_iter()
            .map(|t| self.push_task(t.name, t.temporality, t.hours_per_week, t.resilience))
            .collect()
    }

    /// Converts generated stubs into full tasks with mid-range scores.
    pub fn add_tasks_from_suggestions(&mut self, suggestions: Vec<TaskSuggestion>) -> Vec<Uuid> {
        suggestions
            .into_iter()
            .map(|s| {
                self.push_task(
                    s.name,
                    Temporality::Weekly,
                    1.0,
                    ResilienceProfile::default(),
                )
            })
            .collect()
    }

    fn push_task(
        &mut self,
        name: String,
        temporality: Temporality,
        hours_per_week: f64,
        resilience: ResilienceProfile,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.tasks.push(Task {
            id,
            name,
            temporality,
            hours_per_week: clamp_hours(hours_per_week),
            resilience: resilience.clamped(),
            created_at: Utc::now(),
        });
        id
    }

    /// Merges the given fields into the task. Returns false if the id is unknown.
    pub fn update_task(&mut self, id: Uuid, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(name) = patch.name {
            task.name = name;
        }
        if let Some(temporality) = patch.temporality {
            task.temporality = temporality;
        }
        if let Some(hours) = patch.hours_per_week {
            task.hours_per_week = clamp_hours(hours);
        }
        if let Some(r) = patch.resilience {
            let p = &mut task.resilience;
            p.data = r.data.map_or(p.data, clamp_axis);
            p.decision = r.decision.map_or(p.decision, clamp_axis);
            p.relational = r.relational.map_or(p.relational, clamp_axis);
            p.creativity = r.creativity.map_or(p.creativity, clamp_axis);
            p.execution = r.execution.map_or(p.execution, clamp_axis);
        }
        true
    }

    pub fn remove_task(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Newest first. Tasks created in the same instant keep insertion order.
    pub fn tasks_by_recency(&self) -> Vec<&Task> {
        let mut sorted: Vec<&Task> = self.tasks.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }

    // ── Talents ──

    /// Fills the talent list from the catalog if it has never been initialized.
    pub fn init_talents(&mut self) {
        if self.talents.is_empty() {
            self.talents = initial_talents();
        }
    }

    pub fn selected_talents(&self) -> impl Iterator<Item = &Talent> {
        self.talents.iter().filter(|t| t.selected)
    }

    pub fn selected_talent_count(&self) -> usize {
        self.selected_talents().count()
    }

    /// Flips selection. Selecting beyond the signature size is refused.
    /// Returns whether anything changed.
    pub fn toggle_talent(&mut self, id: &str) -> bool {
        let full = self.selected_talent_count() >= SIGNATURE_SIZE;
        let Some(talent) = self.talents.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if !talent.selected && full {
            return false;
        }
        talent.selected = !talent.selected;
        true
    }

    pub fn set_talent_level(&mut self, id: &str, level: i64) -> bool {
        match self.talents.iter_mut().find(|t| t.id == id) {
            Some(talent) => {
                talent.level = clamp_level(level);
                true
            }
            None => false,
        }
    }

    // ── Software ──

    /// Adds a tool unless the inventory is already full.
    pub fn add_software(&mut self, name: impl Into<String>, level: SoftwareLevel) -> Option<Uuid> {
        if self.software.len() >= MAX_SOFTWARE {
            return None;
        }
        let id = Uuid::new_v4();
        self.software.push(Software {
            id,
            name: name.into(),
            level,
        });
        Some(id)
    }

    pub fn update_software(&mut self, id: Uuid, patch: SoftwarePatch) -> bool {
        let Some(entry) = self.software.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(level) = patch.level {
            entry.level = level;
        }
        true
    }

    pub fn remove_software(&mut self, id: Uuid) -> bool {
        let before = self.software.len();
        self.software.retain(|s| s.id != id);
        self.software.len() != before
    }

    pub fn has_named_software(&self) -> bool {
        self.software.iter().any(|s| !s.name.trim().is_empty())
    }

    // ── Wizard ──

    /// Called when the user (re)opens the wizard.
    pub fn enter_wizard(&mut self, skip: &mut SmartSkip) -> u8 {
        self.init_talents();
        skip.apply(self);
        self.wizard.current_step
    }

    /// Gated forward move. At the end of the diagnostic phase this crosses into strategy.
    pub fn advance(&mut self) -> Result<u8, Blocker> {
        let current = self.wizard.current_step;
        wizard::check_step(current, self)?;
        if current == DIAGNOSTIC_LAST_STEP {
            Ok(self.wizard.enter_strategy())
        } else {
            Ok(self.wizard.next())
        }
    }
}
