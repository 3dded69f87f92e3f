// ============================================================================
// events.rs — Biosfera
// Environmental event controller: glaciation state machine and instantaneous
// meteorite culls, plus the event log consumed by plotting sinks.
// ============================================================================

use serde::Serialize;

use crate::config::GlaciationConfig;
use crate::entity::{Creature, Resource};

/// External perturbation requests, delivered between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventTrigger {
    Glaciation,
    Meteorite,
}

/// Tick indices of past events. Glaciation is stored as [start, end)
/// intervals; a re-trigger while active extends the open interval.
#[derive(Clone, Debug, Default, Serialize)]
pub struct EventLog {
    pub meteorite_ticks: Vec<u64>,
    pub glaciation_intervals: Vec<(u64, u64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Normal,
    GlaciationActive { remaining: u32 },
}

/// Owns the glaciation state machine. Speed changes always assign from each
/// creature's `nominal_speed`, so entering, re-triggering, and exiting can
/// never compound the scaling, and creatures born mid-event restore
/// correctly.
#[derive(Clone, Debug)]
pub struct EventController {
    cfg: GlaciationConfig,
    phase: Phase,
    log: EventLog,
}

impl EventController {
    pub fn new(cfg: GlaciationConfig) -> Self {
        Self {
            cfg,
            phase: Phase::Normal,
            log: EventLog::default(),
        }
    }

    pub fn glaciation_active(&self) -> bool {
        matches!(self.phase, Phase::GlaciationActive { .. })
    }

    pub fn glaciation_remaining(&self) -> u32 {
        match self.phase {
            Phase::GlaciationActive { remaining } => remaining,
            Phase::Normal => 0,
        }
    }

    /// Factor applied to nominal speed right now; newly spawned creatures
    /// use this too.
    pub fn speed_scale(&self) -> f64 {
        if self.glaciation_active() {
            1.0 / self.cfg.slowdown
        } else {
            1.0
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Start (or refresh) a glaciation at `tick`. A trigger while already
    /// active resets the countdown and pushes the recorded interval's end
    /// out; speeds are left alone since they are already throttled.
    pub fn trigger_glaciation(
        &mut self,
        tick: u64,
        prey: &mut [Creature],
        predators: &mut [Creature],
    ) {
        let duration = self.cfg.duration;
        match self.phase {
            Phase::GlaciationActive { .. } => {
                self.phase = Phase::GlaciationActive {
                    remaining: duration,
                };
                if let Some(interval) = self.log.glaciation_intervals.last_mut() {
                    interval.1 = tick + duration as u64;
                }
                log::info!("Glaciation re-triggered at tick {tick}; countdown reset");
            }
            Phase::Normal => {
                self.phase = Phase::GlaciationActive {
                    remaining: duration,
                };
                self.log
                    .glaciation_intervals
                    .push((tick, tick + duration as u64));
                let scale = 1.0 / self.cfg.slowdown;
                for creature in prey.iter_mut().chain(predators.iter_mut()) {
                    creature.speed = creature.nominal_speed * scale;
                }
                log::info!(
                    "Glaciation started at tick {tick} for {duration} ticks (slowdown {:.3})",
                    self.cfg.slowdown
                );
            }
        }
    }

    /// Instantly cull the populations: prey and predators keep their first
    /// half, resources their first quarter. Glaciation state is unaffected.
    pub fn trigger_meteorite(
        &mut self,
        tick: u64,
        prey: &mut Vec<Creature>,
        predators: &mut Vec<Creature>,
        resources: &mut Vec<Resource>,
    ) {
        prey.truncate(prey.len() / 2);
        predators.truncate(predators.len() / 2);
        resources.truncate(resources.len() / 4);
        self.log.meteorite_ticks.push(tick);
        log::info!(
            "Meteorite impact at tick {tick}: populations now {} prey / {} predators / {} resources",
            prey.len(),
            predators.len(),
            resources.len()
        );
    }

    /// Advance the countdown at the end of a tick; on expiry every survivor
    /// is restored to its nominal speed.
    pub fn advance(&mut self, tick: u64, prey: &mut [Creature], predators: &mut [Creature]) {
        if let Phase::GlaciationActive { remaining } = self.phase {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                self.phase = Phase::Normal;
                for creature in prey.iter_mut().chain(predators.iter_mut()) {
                    creature.speed = creature.nominal_speed;
                }
                log::info!("Glaciation ended at tick {tick}; speeds restored");
            } else {
                self.phase = Phase::GlaciationActive { remaining };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::entity::{Kind, Vec2};
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn population(kind: Kind, count: usize, cfg: &SimulationConfig) -> Vec<Creature> {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        (0..count)
            .map(|_| Creature::spawn_random(kind, cfg, 1.0, &mut rng))
            .collect()
    }

    #[test]
    fn glaciation_throttles_then_restores_exactly() {
        let cfg = SimulationConfig::default();
        let mut controller = EventController::new(cfg.glaciation.clone());
        let mut prey = population(Kind::Prey, 5, &cfg);
        let mut predators = population(Kind::Predator, 3, &cfg);
        let before: Vec<f64> = prey.iter().map(|c| c.speed).collect();

        controller.trigger_glaciation(10, &mut prey, &mut predators);
        for (c, &b) in prey.iter().zip(&before) {
            assert!((c.speed - b / cfg.glaciation.slowdown).abs() < 1e-12);
        }

        for tick in 0..cfg.glaciation.duration as u64 {
            controller.advance(10 + tick, &mut prey, &mut predators);
        }
        assert!(!controller.glaciation_active());
        for (c, &b) in prey.iter().zip(&before) {
            assert_eq!(c.speed, b, "restore must be exact, not recomputed");
        }
    }

    #[test]
    fn retrigger_never_compounds_scaling() {
        let cfg = SimulationConfig::default();
        let mut controller = EventController::new(cfg.glaciation.clone());
        let mut prey = population(Kind::Prey, 4, &cfg);
        let mut predators = Vec::new();

        controller.trigger_glaciation(0, &mut prey, &mut predators);
        let throttled: Vec<f64> = prey.iter().map(|c| c.speed).collect();
        controller.trigger_glaciation(5, &mut prey, &mut predators);
        controller.trigger_glaciation(6, &mut prey, &mut predators);
        let after: Vec<f64> = prey.iter().map(|c| c.speed).collect();
        assert_eq!(throttled, after);
        assert_eq!(controller.glaciation_remaining(), cfg.glaciation.duration);
    }

    #[test]
    fn retrigger_extends_recorded_interval() {
        let cfg = SimulationConfig::default();
        let mut controller = EventController::new(cfg.glaciation.clone());
        let mut prey = Vec::new();
        let mut predators = Vec::new();
        controller.trigger_glaciation(100, &mut prey, &mut predators);
        controller.trigger_glaciation(150, &mut prey, &mut predators);
        let intervals = &controller.log().glaciation_intervals;
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0], (100, 150 + cfg.glaciation.duration as u64));
    }

    #[test]
    fn creature_born_mid_glaciation_keeps_nominal_after_exit() {
        let cfg = SimulationConfig::default();
        let mut controller = EventController::new(cfg.glaciation.clone());
        let mut prey = population(Kind::Prey, 2, &cfg);
        let mut predators = Vec::new();
        controller.trigger_glaciation(0, &mut prey, &mut predators);

        let mut rng = ChaCha12Rng::seed_from_u64(21);
        let newborn = Creature::spawn(
            Kind::Prey,
            Vec2::new(10.0, 10.0),
            &cfg,
            controller.speed_scale(),
            &mut rng,
        );
        assert!(newborn.speed < newborn.nominal_speed);
        prey.push(newborn);

        for tick in 0..cfg.glaciation.duration as u64 {
            controller.advance(tick, &mut prey, &mut predators);
        }
        let restored = prey.last().unwrap();
        assert_eq!(restored.speed, restored.nominal_speed);
    }

    #[test]
    fn meteorite_cull_is_exact_floor_division() {
        let cfg = SimulationConfig::default();
        let mut controller = EventController::new(cfg.glaciation.clone());
        let mut prey = population(Kind::Prey, 10, &cfg);
        let mut predators = population(Kind::Predator, 4, &cfg);
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let mut resources: Vec<Resource> =
            (0..8).map(|_| Resource::spawn(&cfg, &mut rng)).collect();

        let survivors: Vec<Vec2> = prey.iter().take(5).map(|c| c.pos).collect();
        controller.trigger_meteorite(100, &mut prey, &mut predators, &mut resources);

        assert_eq!(prey.len(), 5);
        assert_eq!(predators.len(), 2);
        assert_eq!(resources.len(), 2);
        // Keeps the first half by current iteration order.
        for (c, &pos) in prey.iter().zip(&survivors) {
            assert_eq!(c.pos, pos);
        }
        assert_eq!(controller.log().meteorite_ticks, vec![100]);
    }

    #[test]
    fn meteorite_leaves_glaciation_state_alone() {
        let cfg = SimulationConfig::default();
        let mut controller = EventController::new(cfg.glaciation.clone());
        let mut prey = population(Kind::Prey, 6, &cfg);
        let mut predators = Vec::new();
        let mut resources = Vec::new();
        controller.trigger_glaciation(0, &mut prey, &mut predators);
        let remaining = controller.glaciation_remaining();
        controller.trigger_meteorite(1, &mut prey, &mut predators, &mut resources);
        assert!(controller.glaciation_active());
        assert_eq!(controller.glaciation_remaining(), remaining);
    }

    #[test]
    fn odd_populations_floor_on_cull() {
        let cfg = SimulationConfig::default();
        let mut controller = EventController::new(cfg.glaciation.clone());
        let mut prey = population(Kind::Prey, 7, &cfg);
        let mut predators = population(Kind::Predator, 1, &cfg);
        let mut resources = Vec::new();
        controller.trigger_meteorite(0, &mut prey, &mut predators, &mut resources);
        assert_eq!(prey.len(), 3);
        assert_eq!(predators.len(), 0);
        assert_eq!(resources.len(), 0);
    }
}
