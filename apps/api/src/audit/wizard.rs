//! Wizard Controller: linear step position across the diagnostic and strategy phases.
//!
//! The controller itself never checks data completeness. Callers evaluate
//! [`check_step`] before asking it to move forward.

use serde::{Deserialize, Serialize};

use crate::audit::catalog::SIGNATURE_SIZE;
use crate::audit::store::AuditStore;
use crate::i18n::MessageKey;

pub const FIRST_STEP: u8 = 1;
pub const DIAGNOSTIC_LAST_STEP: u8 = 6;
pub const LAST_STEP: u8 = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Diagnostic,
    Strategy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub current_step: u8,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: FIRST_STEP,
        }
    }
}

impl WizardState {
    pub fn phase(&self) -> Phase {
        if self.current_step <= DIAGNOSTIC_LAST_STEP {
            Phase::Diagnostic
        } else {
            Phase::Strategy
        }
    }

    /// Moves one step forward. Step 6 is the ceiling of the diagnostic phase;
    /// crossing into strategy goes through [`WizardState::enter_strategy`].
    pub fn next(&mut self) -> u8 {
        self.current_step = match self.current_step {
            s if s < DIAGNOSTIC_LAST_STEP => s + 1,
            DIAGNOSTIC_LAST_STEP => DIAGNOSTIC_LAST_STEP,
            s => (s + 1).min(LAST_STEP),
        };
        self.current_step
    }

    pub fn prev(&mut self) -> u8 {
        self.current_step = self.current_step.saturating_sub(1).max(FIRST_STEP);
        self.current_step
    }

    /// Direct jump, clamped into 1..=8. Not gated.
    pub fn set_step(&mut self, step: i64) -> u8 {
        self.current_step = step.clamp(i64::from(FIRST_STEP), i64::from(LAST_STEP)) as u8;
        self.current_step
    }

    /// Crosses from the last diagnostic step into the strategy phase.
    pub fn enter_strategy(&mut self) -> u8 {
        if self.current_step == DIAGNOSTIC_LAST_STEP {
            self.current_step = DIAGNOSTIC_LAST_STEP + 1;
        }
        self.current_step
    }
}

/// Session-scoped latch for the step 1 → 2 auto-advance.
#[derive(Debug, Clone, Default)]
pub struct SmartSkip {
    fired: bool,
}

impl SmartSkip {
    /// Advances to step 2 when persona and goal are already known and the
    /// wizard sits on step 1. Fires at most once per session.
    pub fn apply(&mut self, store: &mut AuditStore) -> bool {
        if self.fired
            || store.wizard.current_step != FIRST_STEP
            || !store.context.has_persona_and_goal()
        {
            return false;
        }
        store.wizard.current_step = FIRST_STEP + 1;
        self.fired = true;
        true
    }
}

/// Why the wizard cannot leave its current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    MissingPersonaOrGoal,
    NoTasks,
    TalentSelection,
    NoSoftware,
    DiagnosticIncomplete,
}

impl Blocker {
    pub fn message_key(&self) -> MessageKey {
        match self {
            Blocker::MissingPersonaOrGoal => MessageKey::PersonaAndGoalRequired,
            Blocker::NoTasks => MessageKey::TaskRequired,
            Blocker::TalentSelection => MessageKey::FiveTalentsRequired,
            Blocker::NoSoftware => MessageKey::SoftwareRequired,
            Blocker::DiagnosticIncomplete => MessageKey::DiagnosticIncomplete,
        }
    }
}

/// Gating predicate for leaving `step` forward.
pub fn check_step(step: u8, store: &AuditStore) -> Result<(), Blocker> {
    match step {
        1 if !store.context.has_persona_and_goal() => Err(Blocker::MissingPersonaOrGoal),
        3 if store.tasks.is_empty() => Err(Blocker::NoTasks),
        4 if store.selected_talent_count() != SIGNATURE_SIZE => Err(Blocker::TalentSelection),
        5 if !store.has_named_software() => Err(Blocker::NoSoftware),
        s if s >= DIAGNOSTIC_LAST_STEP && !diagnostic_complete(store) => {
            Err(Blocker::DiagnosticIncomplete)
        }
        _ => Ok(()),
    }
}

/// True when the gating for steps 1, 3, 4 and 5 all still hold.
pub fn diagnostic_complete(store: &AuditStore) -> bool {
    [1, 3, 4, 5].iter().all(|&s| check_step(s, store).is_ok())
}
