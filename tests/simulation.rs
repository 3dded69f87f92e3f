// End-to-end scenarios: long-horizon determinism, exact event arithmetic
// through the public API, and glaciation speed restoration on a live world.

use biosfera::config::SimulationConfig;
use biosfera::events::EventTrigger;
use biosfera::world::WorldState;

/// A world so sparse that no collision, forage, or predation can occur
/// within the test horizon: populations only change through events.
fn frozen_config() -> SimulationConfig {
    let mut cfg = SimulationConfig {
        world_width: 1_000_000.0,
        world_height: 1_000_000.0,
        seed: 99,
        initial_prey: 10,
        initial_predators: 4,
        initial_resources: 8,
        ..SimulationConfig::default()
    };
    cfg.resource.spawn_interval = 1_000_000;
    cfg.resource.spawn_interval_glaciation = 1_000_000;
    cfg
}

#[test]
fn five_thousand_ticks_are_deterministic_and_well_formed() {
    let cfg = SimulationConfig {
        seed: 2024,
        ..SimulationConfig::default()
    };
    let mut a = WorldState::new(cfg.clone()).unwrap();
    let mut b = WorldState::new(cfg).unwrap();
    for _ in 0..5000 {
        a.step();
        b.step();
    }

    assert_eq!(a.history().len(), 5000);
    assert_eq!(a.history().prey_counts, b.history().prey_counts);
    assert_eq!(a.history().predator_counts, b.history().predator_counts);
    assert_eq!(a.history().prey_lifespans, b.history().prey_lifespans);
    // No internal stop condition: the loop survived whatever the
    // populations did, including possible extinctions.
    assert_eq!(a.tick(), 5000);
}

#[test]
fn meteorite_at_tick_100_halves_and_quarters_exactly() {
    let mut world = WorldState::new(frozen_config()).unwrap();
    for _ in 0..100 {
        world.step();
    }
    assert_eq!(world.prey().len(), 10);
    assert_eq!(world.predators().len(), 4);
    assert_eq!(world.resources().len(), 8);

    world.trigger(EventTrigger::Meteorite);
    world.step();

    assert_eq!(world.prey().len(), 5);
    assert_eq!(world.predators().len(), 2);
    assert_eq!(world.resources().len(), 2);
    assert_eq!(world.event_log().meteorite_ticks, vec![100]);
}

#[test]
fn glaciation_throttles_during_and_restores_after() {
    let mut world = WorldState::new(frozen_config()).unwrap();
    let slowdown = world.config().glaciation.slowdown;
    let duration = world.config().glaciation.duration as u64;

    world.trigger(EventTrigger::Glaciation);
    world.step();
    assert!(world.glaciation_active());
    for c in world.prey().iter().chain(world.predators()) {
        assert!((c.speed - c.nominal_speed / slowdown).abs() < 1e-12);
    }

    for _ in 0..duration {
        world.step();
    }
    assert!(!world.glaciation_active());
    for c in world.prey().iter().chain(world.predators()) {
        assert_eq!(
            c.speed, c.nominal_speed,
            "survivors must return to their exact nominal speed"
        );
    }
    assert_eq!(world.event_log().glaciation_intervals, vec![(0, duration)]);
}

#[test]
fn extinct_world_keeps_recording() {
    let cfg = SimulationConfig {
        initial_prey: 0,
        initial_predators: 3,
        seed: 6,
        ..SimulationConfig::default()
    };
    let mut world = WorldState::new(cfg).unwrap();
    // Predators starve without prey; the clock must not care.
    for _ in 0..2000 {
        world.step();
    }
    assert_eq!(world.history().len(), 2000);
    assert_eq!(*world.history().predator_counts.last().unwrap(), 0);
}
