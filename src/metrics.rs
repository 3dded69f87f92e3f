// ============================================================================
// metrics.rs — Biosfera
// Per-tick ecosystem diagnostics: population, energy, age structure, and
// event state, with structured INFO-level reporting.
// ============================================================================

use crate::world::WorldState;

/// Complete diagnostics snapshot for one tick.
#[derive(Clone, Debug)]
pub struct SimDiagnostics {
    // Population
    pub prey_count: usize,
    pub predator_count: usize,
    pub resource_count: usize,

    // Energy
    pub avg_prey_energy: f64,
    pub avg_predator_energy: f64,
    /// Fraction of creatures (both kinds) with energy at or below one prey
    /// directed-move cost.
    pub starving_fraction: f64,

    // Age structure
    pub avg_prey_age: f64,
    pub avg_predator_age: f64,
    pub mean_prey_lifespan: Option<f64>,
    pub mean_predator_lifespan: Option<f64>,

    // Events
    pub glaciation_active: bool,
    pub meteorite_count: usize,
}

impl SimDiagnostics {
    pub fn from_world(world: &WorldState) -> Self {
        let prey = world.prey();
        let predators = world.predators();

        let avg = |values: &mut dyn Iterator<Item = f64>, count: usize| -> f64 {
            if count == 0 {
                0.0
            } else {
                values.sum::<f64>() / count as f64
            }
        };

        let live = prey.len() + predators.len();
        let starving_margin = world.config().prey.directed_cost;
        let starving = prey
            .iter()
            .chain(predators)
            .filter(|c| c.energy <= starving_margin)
            .count();

        Self {
            prey_count: prey.len(),
            predator_count: predators.len(),
            resource_count: world.resources().len(),
            avg_prey_energy: avg(&mut prey.iter().map(|c| c.energy), prey.len()),
            avg_predator_energy: avg(&mut predators.iter().map(|c| c.energy), predators.len()),
            starving_fraction: if live == 0 {
                0.0
            } else {
                starving as f64 / live as f64
            },
            avg_prey_age: avg(&mut prey.iter().map(|c| c.age as f64), prey.len()),
            avg_predator_age: avg(&mut predators.iter().map(|c| c.age as f64), predators.len()),
            mean_prey_lifespan: world.history().mean_prey_lifespan(),
            mean_predator_lifespan: world.history().mean_predator_lifespan(),
            glaciation_active: world.glaciation_active(),
            meteorite_count: world.event_log().meteorite_ticks.len(),
        }
    }

    /// Log all diagnostics at INFO level.
    pub fn log(&self, tick: u64) {
        log::info!("══════════════ Tick {} Diagnostics ══════════════", tick);
        log::info!(
            "POPULATION: prey={} | predators={} | resources={}",
            self.prey_count,
            self.predator_count,
            self.resource_count,
        );
        log::info!(
            "ENERGY: avg_prey={:.2} | avg_predator={:.2} | starving={:.1}%",
            self.avg_prey_energy,
            self.avg_predator_energy,
            self.starving_fraction * 100.0,
        );
        log::info!(
            "AGE: avg_prey={:.0} | avg_predator={:.0} | lifespan_prey={} | lifespan_predator={}",
            self.avg_prey_age,
            self.avg_predator_age,
            self.mean_prey_lifespan
                .map_or_else(|| "n/a".into(), |v| format!("{v:.1}")),
            self.mean_predator_lifespan
                .map_or_else(|| "n/a".into(), |v| format!("{v:.1}")),
        );
        log::info!(
            "EVENTS: glaciation={} | meteorites={}",
            if self.glaciation_active { "active" } else { "off" },
            self.meteorite_count,
        );
    }
}
