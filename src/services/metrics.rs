use serde::Serialize;

use crate::services::ledger::Ledger;

/// Calories credited per kilogram of lifted volume.
const CALORIES_PER_KG_VOLUME: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionMetrics {
    pub volume: u64,
    pub total_sets: u32,
}

impl SessionMetrics {
    pub fn estimated_calories(&self) -> i32 {
        (self.volume as f64 * CALORIES_PER_KG_VOLUME).floor() as i32
    }
}

/// Recompute volume and completed-set count from scratch. Only completed
/// sets count. Sums saturate rather than wrap.
pub fn compute_metrics(ledger: &Ledger) -> SessionMetrics {
    ledger
        .exercises()
        .iter()
        .flat_map(|e| e.sets.iter())
        .filter(|s| s.completed)
        .fold(SessionMetrics::default(), |acc, s| SessionMetrics {
            volume: acc
                .volume
                .saturating_add((s.weight as u64).saturating_mul(s.reps as u64)),
            total_sets: acc.total_sets.saturating_add(1),
        })
}
