use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::models::Task;
use crate::audit::scoring::{
    overall_score, resilience_score, resilient_zones, talent_score, task_score, vulnerability,
    vulnerable_zones, weighted_resilience_score,
};
use crate::audit::store::AuditStore;
use crate::audit::wizard::diagnostic_complete;
use crate::i18n::{Locale, MessageKey, Translator};

const RESILIENT_THRESHOLD: u32 = 70;
const TRANSITION_THRESHOLD: u32 = 40;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Resilient,
    Transition,
    Exposed,
}

impl Verdict {
    pub fn from_overall(overall: u32) -> Self {
        match overall {
            s if s >= RESILIENT_THRESHOLD => Verdict::Resilient,
            s if s >= TRANSITION_THRESHOLD => Verdict::Transition,
            _ => Verdict::Exposed,
        }
    }

    pub fn message_key(&self) -> MessageKey {
        match self {
            Verdict::Resilient => MessageKey::VerdictResilient,
            Verdict::Transition => MessageKey::VerdictTransition,
            Verdict::Exposed => MessageKey::VerdictExposed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneEntry {
    pub task_id: Uuid,
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// Headline "Protection" score (simple mean).
    pub protection: u32,
    /// Task-list summary score (hours-weighted mean).
    pub weighted_protection: u32,
    /// "Signature" talent score.
    pub signature: u32,
    pub overall: u32,
    pub vulnerability: u32,
    pub vulnerable_zones: Vec<ZoneEntry>,
    pub resilient_zones: Vec<ZoneEntry>,
    pub verdict: Verdict,
    pub verdict_label: String,
    pub diagnostic_complete: bool,
}

/// Computes the report on demand. Nothing is cached between calls.
pub fn build_report(
    store: &AuditStore,
    translator: &dyn Translator,
    locale: Locale,
) -> AuditReport {
    let protection = resilience_score(&store.tasks);
    let signature = talent_score(store.selected_talents());
    let overall = overall_score(protection, signature);
    let verdict = Verdict::from_overall(overall);

    AuditReport {
        protection,
        weighted_protection: weighted_resilience_score(&store.tasks),
        signature,
        overall,
        vulnerability: vulnerability(protection),
        vulnerable_zones: to_zone(vulnerable_zones(&store.tasks)),
        resilient_zones: to_zone(resilient_zones(&store.tasks)),
        verdict,
        verdict_label: translator.translate(verdict.message_key(), locale).to_string(),
        diagnostic_complete: diagnostic_complete(store),
    }
}

fn to_zone(tasks: Vec<&Task>) -> Vec<ZoneEntry> {
    tasks
        .into_iter()
        .map(|t| ZoneEntry {
            task_id: t.id,
            name: t.name.clone(),
            score: task_score(t),
        })
        .collect()
}
