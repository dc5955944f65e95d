//! Scoring Engine: pure derivations over the task ledger and talent selection.
//!
//! Every function is total. Empty inputs score 0 instead of dividing by zero.
//!
//! Resilience is aggregated two ways, and both are kept on purpose:
//! - `resilience_score` (simple mean) feeds the headline "Protection" score and the verdict.
//! - `weighted_resilience_score` (hours-weighted mean) feeds the task-list summary.

use crate::audit::models::{Talent, Task};

/// Number of tasks reported in each of the vulnerable / resilient zones.
pub const ZONE_SIZE: usize = 3;

const RESILIENCE_WEIGHT: f64 = 0.6;
const TALENT_WEIGHT: f64 = 0.4;

/// Rounded mean of the five resilience dimensions.
pub fn task_score(task: &Task) -> u32 {
    let dims = task.resilience.dimensions();
    let sum: u32 = dims.iter().map(|&d| u32::from(d)).sum();
    (f64::from(sum) / dims.len() as f64).round() as u32
}

/// Unweighted mean of `task_score` across the ledger (headline Protection score).
pub fn resilience_score(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let sum: u32 = tasks.iter().map(task_score).sum();
    (f64::from(sum) / tasks.len() as f64).round() as u32
}

/// `Σ task_score × hours / Σ hours`, used by the task-list summary.
pub fn weighted_resilience_score(tasks: &[Task]) -> u32 {
    let total_hours: f64 = tasks.iter().map(|t| t.hours_per_week).sum();
    if total_hours <= 0.0 {
        return 0;
    }
    let weighted: f64 = tasks
        .iter()
        .map(|t| f64::from(task_score(t)) * t.hours_per_week)
        .sum();
    (weighted / total_hours).round() as u32
}

/// `round(Σ level / (count × 5) × 100)` over the given talents.
///
/// Tolerates any count: the canonical "Signature" reading uses exactly five.
pub fn talent_score<'a>(selected: impl IntoIterator<Item = &'a Talent>) -> u32 {
    let (count, level_sum) = selected
        .into_iter()
        .fold((0u32, 0u32), |(n, s), t| (n + 1, s + u32::from(t.level)));
    if count == 0 {
        return 0;
    }
    (f64::from(level_sum) / f64::from(count * 5) * 100.0).round() as u32
}

pub fn overall_score(resilience: u32, talent: u32) -> u32 {
    (f64::from(resilience) * RESILIENCE_WEIGHT + f64::from(talent) * TALENT_WEIGHT).round() as u32
}

pub fn vulnerability(resilience: u32) -> u32 {
    100u32.saturating_sub(resilience)
}

/// Tasks sorted ascending by score. The sort is stable, so ties keep insertion order.
pub fn rank_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut ranked: Vec<&Task> = tasks.iter().collect();
    ranked.sort_by_key(|t| task_score(t));
    ranked
}

/// The lowest-scoring tasks, weakest first.
pub fn vulnerable_zones(tasks: &[Task]) -> Vec<&Task> {
    rank_tasks(tasks).into_iter().take(ZONE_SIZE).collect()
}

/// The highest-scoring tasks, strongest first.
pub fn resilient_zones(tasks: &[Task]) -> Vec<&Task> {
    rank_tasks(tasks).into_iter().rev().take(ZONE_SIZE).collect()
}
