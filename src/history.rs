// ============================================================================
// history.rs — Biosfera
// Append-only population time series and lifespan records. Written once per
// tick by the step loop, read in full by the parameter fitter and exporters.
// ============================================================================

use serde::Serialize;

/// Per-run recording. Counts are appended exactly once per tick; lifespans
/// are appended whenever a creature dies of starvation or old age (predation
/// victims are not lifespan samples).
#[derive(Clone, Debug, Default, Serialize)]
pub struct HistoryRecorder {
    pub prey_counts: Vec<u32>,
    pub predator_counts: Vec<u32>,
    pub prey_lifespans: Vec<u32>,
    pub predator_lifespans: Vec<u32>,
}

impl HistoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_counts(&mut self, prey: u32, predators: u32) {
        self.prey_counts.push(prey);
        self.predator_counts.push(predators);
    }

    pub fn record_prey_lifespan(&mut self, age: u32) {
        self.prey_lifespans.push(age);
    }

    pub fn record_predator_lifespan(&mut self, age: u32) {
        self.predator_lifespans.push(age);
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> usize {
        self.prey_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prey_counts.is_empty()
    }

    /// Mean age at death of prey, or None if nothing has died yet. The
    /// fitter needs this as its characteristic time and must fail loudly
    /// rather than divide by zero, so absence is explicit.
    pub fn mean_prey_lifespan(&self) -> Option<f64> {
        mean(&self.prey_lifespans)
    }

    pub fn mean_predator_lifespan(&self) -> Option<f64> {
        mean(&self.predator_lifespans)
    }
}

fn mean(samples: &[u32]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|&v| v as f64).sum::<f64>() / samples.len() as f64)
}
