// ============================================================================
// config.rs — Biosfera
// Simulation parameters: world bounds, per-kind lifecycle ranges, resource
// spawning, and environmental event tuning.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{BiosferaError, BiosferaResult};

/// Prey ("organism") tuning. Ranges are sampled once per creature at
/// creation; costs and gains apply per tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreyConfig {
    pub initial_energy: f64,
    pub reproduction_threshold: f64,
    pub radius: f64,
    /// Sampled uniformly per creature.
    pub speed_range: (f64, f64),
    /// Probability of a random walk instead of directed foraging.
    pub exploration_range: (f64, f64),
    /// Repulsion threshold, sampled per creature (integer pixels).
    pub separation_range: (u32, u32),
    pub max_age_range: (u32, u32),
    /// Energy gained per consumed resource.
    pub forage_gain: f64,
    pub directed_cost: f64,
    pub walk_cost: f64,
    pub repulsion_cost: f64,
}

impl Default for PreyConfig {
    fn default() -> Self {
        Self {
            initial_energy: 100.0,
            reproduction_threshold: 120.0,
            radius: 10.0,
            speed_range: (1.5, 2.5),
            exploration_range: (0.3, 0.5),
            separation_range: (30, 100),
            max_age_range: (600, 700),
            forage_gain: 30.0,
            directed_cost: 0.2,
            walk_cost: 0.1,
            repulsion_cost: 0.1,
        }
    }
}

/// Predator tuning. Perception and separation are fixed rather than sampled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredatorConfig {
    pub initial_energy: f64,
    pub reproduction_threshold: f64,
    pub radius: f64,
    pub speed_range: (f64, f64),
    /// Radius within which prey are visible.
    pub perception_range: f64,
    pub separation_distance: f64,
    pub max_age_range: (u32, u32),
    /// Energy gained per caught prey.
    pub hunt_gain: f64,
    pub directed_cost: f64,
    pub walk_cost: f64,
    pub repulsion_cost: f64,
}

impl Default for PredatorConfig {
    fn default() -> Self {
        Self {
            initial_energy: 120.0,
            reproduction_threshold: 160.0,
            radius: 12.0,
            speed_range: (2.0, 3.0),
            perception_range: 60.0,
            separation_distance: 50.0,
            max_age_range: (600, 700),
            hunt_gain: 40.0,
            directed_cost: 0.2,
            walk_cost: 0.1,
            repulsion_cost: 0.1,
        }
    }
}

/// Resource spawning. One resource appears each time the spawn timer reaches
/// the active interval; glaciation switches to the slower interval.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub radius: f64,
    pub spawn_interval: u32,
    pub spawn_interval_glaciation: u32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            spawn_interval: 2,
            spawn_interval_glaciation: 30,
        }
    }
}

/// Glaciation event tuning. Effective speeds become nominal / slowdown while
/// the event is active.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlaciationConfig {
    pub duration: u32,
    pub slowdown: f64,
}

impl Default for GlaciationConfig {
    fn default() -> Self {
        Self {
            duration: 400,
            slowdown: 4.0 / 3.0,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub world_width: f64,
    pub world_height: f64,
    pub seed: u64,
    pub initial_prey: usize,
    pub initial_predators: usize,
    pub initial_resources: usize,
    /// Random-walk displacement per axis, drawn from -walk_step..=walk_step.
    pub walk_step: i32,
    /// Offspring placement jitter per axis, drawn from -jitter..=jitter.
    pub reproduction_jitter: i32,
    pub prey: PreyConfig,
    pub predator: PredatorConfig,
    pub resource: ResourceConfig,
    pub glaciation: GlaciationConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_width: 1200.0,
            world_height: 700.0,
            seed: 0,
            initial_prey: 40,
            initial_predators: 10,
            initial_resources: 0,
            walk_step: 3,
            reproduction_jitter: 20,
            prey: PreyConfig::default(),
            predator: PredatorConfig::default(),
            resource: ResourceConfig::default(),
            glaciation: GlaciationConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Reject empty/inverted ranges and non-positive rates before a run
    /// starts; entity constructors assume validated ranges.
    pub fn validate(&self) -> BiosferaResult<()> {
        // f64 ranges are sampled half-open, so equal endpoints are empty too.
        fn check_f64(name: &str, range: (f64, f64)) -> BiosferaResult<()> {
            if range.0 >= range.1 || !range.0.is_finite() || !range.1.is_finite() {
                return Err(BiosferaError::InvalidConfiguration(format!(
                    "{name} range {range:?} is empty or inverted"
                )));
            }
            Ok(())
        }
        fn check_u32(name: &str, range: (u32, u32)) -> BiosferaResult<()> {
            if range.0 > range.1 {
                return Err(BiosferaError::InvalidConfiguration(format!(
                    "{name} range {range:?} is empty or inverted"
                )));
            }
            Ok(())
        }

        if self.world_width <= 0.0 || self.world_height <= 0.0 {
            return Err(BiosferaError::InvalidConfiguration(format!(
                "world bounds {}x{} must be positive",
                self.world_width, self.world_height
            )));
        }
        check_f64("prey speed", self.prey.speed_range)?;
        check_f64("prey exploration", self.prey.exploration_range)?;
        check_u32("prey separation", self.prey.separation_range)?;
        check_u32("prey max_age", self.prey.max_age_range)?;
        check_f64("predator speed", self.predator.speed_range)?;
        check_u32("predator max_age", self.predator.max_age_range)?;
        if self.resource.spawn_interval == 0 || self.resource.spawn_interval_glaciation == 0 {
            return Err(BiosferaError::InvalidConfiguration(
                "resource spawn intervals must be at least 1 tick".into(),
            ));
        }
        if self.glaciation.slowdown <= 1.0 {
            return Err(BiosferaError::InvalidConfiguration(format!(
                "glaciation slowdown {} must exceed 1.0",
                self.glaciation.slowdown
            )));
        }
        if self.glaciation.duration == 0 {
            return Err(BiosferaError::InvalidConfiguration(
                "glaciation duration must be at least 1 tick".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_speed_range_is_rejected() {
        let mut cfg = SimulationConfig::default();
        cfg.prey.speed_range = (2.5, 1.5);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, BiosferaError::InvalidConfiguration(_)));
    }

    #[test]
    fn equal_endpoint_f64_range_is_rejected() {
        // Equal endpoints would panic inside the half-open sampler at world
        // construction; validation must catch them first.
        let mut cfg = SimulationConfig::default();
        cfg.prey.speed_range = (2.0, 2.0);
        assert!(cfg.validate().is_err());

        let mut cfg = SimulationConfig::default();
        cfg.prey.exploration_range = (0.4, 0.4);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_spawn_interval_is_rejected() {
        let mut cfg = SimulationConfig::default();
        cfg.resource.spawn_interval = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unity_slowdown_is_rejected() {
        let mut cfg = SimulationConfig::default();
        cfg.glaciation.slowdown = 1.0;
        assert!(cfg.validate().is_err());
    }
}
