// ============================================================================
// world.rs — Biosfera
// WorldState: owns the three populations, the RNG stream, the event
// controller, and the history recorder, and advances everything by one
// discrete tick at a time.
// ============================================================================

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::behavior;
use crate::config::SimulationConfig;
use crate::entity::{Creature, Kind, Resource, Vec2};
use crate::error::BiosferaResult;
use crate::events::{EventController, EventLog, EventTrigger};
use crate::history::HistoryRecorder;

/// What a rendering sink needs per entity: position, kind, and an
/// energy/age-derived intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderKind {
    Prey,
    Predator,
    Resource,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderEntity {
    pub kind: RenderKind,
    pub pos: Vec2,
    pub intensity: f64,
}

/// The whole simulation. Single-threaded; populations are mutated only
/// inside `step()`, in a fixed phase order. There is no internal stop
/// condition: extinction is a valid state and the loop keeps ticking.
pub struct WorldState {
    cfg: SimulationConfig,
    prey: Vec<Creature>,
    predators: Vec<Creature>,
    resources: Vec<Resource>,
    tick: u64,
    resource_spawn_timer: u32,
    inbox: Vec<EventTrigger>,
    events: EventController,
    history: HistoryRecorder,
    rng: ChaCha12Rng,
}

impl WorldState {
    /// Validate the config and seed the initial populations at random
    /// positions.
    pub fn new(cfg: SimulationConfig) -> BiosferaResult<Self> {
        cfg.validate()?;
        let mut rng = ChaCha12Rng::seed_from_u64(cfg.seed);
        let prey = (0..cfg.initial_prey)
            .map(|_| Creature::spawn_random(Kind::Prey, &cfg, 1.0, &mut rng))
            .collect();
        let predators = (0..cfg.initial_predators)
            .map(|_| Creature::spawn_random(Kind::Predator, &cfg, 1.0, &mut rng))
            .collect();
        let resources = (0..cfg.initial_resources)
            .map(|_| Resource::spawn(&cfg, &mut rng))
            .collect();
        let events = EventController::new(cfg.glaciation.clone());
        Ok(Self {
            cfg,
            prey,
            predators,
            resources,
            tick: 0,
            resource_spawn_timer: 0,
            inbox: Vec::new(),
            events,
            history: HistoryRecorder::new(),
            rng,
        })
    }

    // ---- Accessors ----

    pub fn config(&self) -> &SimulationConfig {
        &self.cfg
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn prey(&self) -> &[Creature] {
        &self.prey
    }

    pub fn predators(&self) -> &[Creature] {
        &self.predators
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn history(&self) -> &HistoryRecorder {
        &self.history
    }

    pub fn event_log(&self) -> &EventLog {
        self.events.log()
    }

    pub fn glaciation_active(&self) -> bool {
        self.events.glaciation_active()
    }

    /// Queue an external perturbation; it takes effect at the start of the
    /// next `step()`.
    pub fn trigger(&mut self, trigger: EventTrigger) {
        self.inbox.push(trigger);
    }

    /// Live entity snapshot for rendering sinks.
    pub fn render_snapshot(&self) -> Vec<RenderEntity> {
        let mut out = Vec::with_capacity(
            self.resources.len() + self.prey.len() + self.predators.len(),
        );
        for r in &self.resources {
            out.push(RenderEntity {
                kind: RenderKind::Resource,
                pos: r.pos,
                intensity: 1.0,
            });
        }
        for c in &self.prey {
            out.push(RenderEntity {
                kind: RenderKind::Prey,
                pos: c.pos,
                intensity: c.visual_intensity(),
            });
        }
        for c in &self.predators {
            out.push(RenderEntity {
                kind: RenderKind::Predator,
                pos: c.pos,
                intensity: c.visual_intensity(),
            });
        }
        out
    }

    // ---- Step loop ----

    /// Advance one tick: drain triggers, maybe spawn a resource, run the
    /// prey phase then the predator phase over defensive snapshots, record
    /// population counts, and advance the glaciation countdown.
    pub fn step(&mut self) {
        for trigger in std::mem::take(&mut self.inbox) {
            match trigger {
                EventTrigger::Glaciation => self.events.trigger_glaciation(
                    self.tick,
                    &mut self.prey,
                    &mut self.predators,
                ),
                EventTrigger::Meteorite => self.events.trigger_meteorite(
                    self.tick,
                    &mut self.prey,
                    &mut self.predators,
                    &mut self.resources,
                ),
            }
        }

        self.spawn_resources();
        self.prey_phase();
        self.predator_phase();

        self.history
            .record_counts(self.prey.len() as u32, self.predators.len() as u32);

        self.events
            .advance(self.tick, &mut self.prey, &mut self.predators);
        self.tick += 1;
    }

    fn spawn_resources(&mut self) {
        self.resource_spawn_timer += 1;
        let interval = if self.events.glaciation_active() {
            self.cfg.resource.spawn_interval_glaciation
        } else {
            self.cfg.resource.spawn_interval
        };
        if self.resource_spawn_timer >= interval {
            self.resources.push(Resource::spawn(&self.cfg, &mut self.rng));
            self.resource_spawn_timer = 0;
        }
    }

    /// Prey: repulsion from peers, then either a random walk (exploration
    /// gate) or a move toward the nearest resource; consume every
    /// overlapping resource; reproduce; die. Removals and births apply
    /// after the snapshot iteration, so newborns act first on the next tick.
    fn prey_phase(&mut self) {
        let Self {
            cfg,
            prey,
            resources,
            history,
            rng,
            events,
            ..
        } = self;
        let scale = events.speed_scale();
        let bounds = (cfg.world_width, cfg.world_height);
        let peer_positions: Vec<Vec2> = prey.iter().map(|c| c.pos).collect();
        let count = prey.len();
        let mut newborns = Vec::new();
        let mut dead = vec![false; count];

        for i in 0..count {
            let c = &mut prey[i];
            c.age += 1;

            let push =
                behavior::separation_vector(c.pos, i, &peer_positions, c.separation_distance);
            behavior::apply_separation(c, push, cfg.prey.repulsion_cost);

            if rng.gen::<f64>() < c.exploration_chance {
                behavior::random_walk(c, cfg.walk_step, bounds, cfg.prey.walk_cost, rng);
            } else if let Some(target) =
                behavior::nearest(c.pos, resources, |r| r.pos, |_, _| true)
            {
                behavior::move_towards(c, resources[target].pos, cfg.prey.directed_cost);
            }

            let mut eaten = 0u32;
            let (pos, radius) = (c.pos, c.radius);
            resources.retain(|r| {
                if pos.distance(r.pos) < radius + r.radius {
                    eaten += 1;
                    false
                } else {
                    true
                }
            });
            c.energy += eaten as f64 * cfg.prey.forage_gain;

            if c.energy >= c.reproduction_threshold {
                newborns.push(c.reproduce(cfg, scale, rng));
            }
            if c.is_dead() {
                dead[i] = true;
                history.record_prey_lifespan(c.age);
            }
        }

        let mut index = 0;
        prey.retain(|_| {
            let keep = !dead[index];
            index += 1;
            keep
        });
        prey.append(&mut newborns);
    }

    /// Predators: repulsion from peers, then pursue the nearest prey within
    /// perception (catching on circle overlap) or fall back to a random
    /// walk. Catches mutate the live prey list immediately, so later
    /// predators this tick see the updated population.
    fn predator_phase(&mut self) {
        let Self {
            cfg,
            prey,
            predators,
            history,
            rng,
            events,
            ..
        } = self;
        let scale = events.speed_scale();
        let bounds = (cfg.world_width, cfg.world_height);
        let peer_positions: Vec<Vec2> = predators.iter().map(|c| c.pos).collect();
        let count = predators.len();
        let mut newborns = Vec::new();
        let mut dead = vec![false; count];

        for i in 0..count {
            let c = &mut predators[i];
            c.age += 1;

            let push =
                behavior::separation_vector(c.pos, i, &peer_positions, c.separation_distance);
            behavior::apply_separation(c, push, cfg.predator.repulsion_cost);

            let range = c.perception_range;
            match behavior::nearest(c.pos, prey, |p| p.pos, |_, dist| dist <= range) {
                Some(target) => {
                    let target_pos = prey[target].pos;
                    let target_radius = prey[target].radius;
                    behavior::move_towards(c, target_pos, cfg.predator.directed_cost);
                    if c.collides_with(target_pos, target_radius) {
                        c.energy += cfg.predator.hunt_gain;
                        prey.remove(target);
                    }
                }
                None => {
                    behavior::random_walk(c, cfg.walk_step, bounds, cfg.predator.walk_cost, rng)
                }
            }

            if c.energy >= c.reproduction_threshold {
                newborns.push(c.reproduce(cfg, scale, rng));
            }
            if c.is_dead() {
                dead[i] = true;
                history.record_predator_lifespan(c.age);
            }
        }

        let mut index = 0;
        predators.retain(|_| {
            let keep = !dead[index];
            index += 1;
            keep
        });
        predators.append(&mut newborns);
    }
}
