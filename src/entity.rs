// ============================================================================
// entity.rs — Biosfera
// Spatial entities: creatures (prey and predators) and resources, plus the
// small 2D vector type everything moves with.
// ============================================================================

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;

// ======================== Vec2 ========================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    /// Unit vector, or zero if the vector has no length.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::ZERO
        }
    }

    pub fn scaled(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ======================== Kinds ========================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    Prey,
    Predator,
}

// ======================== Resource ========================

/// A consumable resource: a fixed circle that disappears when a forager
/// overlaps it.
#[derive(Clone, Debug)]
pub struct Resource {
    pub pos: Vec2,
    pub radius: f64,
}

impl Resource {
    /// Spawn at a uniformly random position inside the world bounds.
    pub fn spawn<R: Rng>(cfg: &SimulationConfig, rng: &mut R) -> Self {
        Self {
            pos: Vec2::new(
                rng.gen_range(0.0..=cfg.world_width),
                rng.gen_range(0.0..=cfg.world_height),
            ),
            radius: cfg.resource.radius,
        }
    }
}

// ======================== Creature ========================

/// A live prey or predator. Behavioral constants are drawn once at creation
/// from the kind's configured ranges and never redrawn.
///
/// `nominal_speed` is the speed as drawn; `speed` is the effective value and
/// is always assigned from nominal by the event controller, so glaciation
/// scaling can never compound.
#[derive(Clone, Debug)]
pub struct Creature {
    pub kind: Kind,
    pub pos: Vec2,
    pub energy: f64,
    pub age: u32,
    pub max_age: u32,
    pub speed: f64,
    pub nominal_speed: f64,
    pub radius: f64,
    pub separation_distance: f64,
    /// Prey only; zero for predators (they never explore by choice).
    pub exploration_chance: f64,
    /// Predators only; zero for prey.
    pub perception_range: f64,
    pub reproduction_threshold: f64,
}

impl Creature {
    /// Create a creature of `kind` at `pos` with freshly sampled constants.
    /// `speed_scale` is 1.0 normally and 1/slowdown during glaciation, so
    /// creatures born mid-event start at the throttled speed.
    pub fn spawn<R: Rng>(
        kind: Kind,
        pos: Vec2,
        cfg: &SimulationConfig,
        speed_scale: f64,
        rng: &mut R,
    ) -> Self {
        match kind {
            Kind::Prey => {
                let p = &cfg.prey;
                let nominal = rng.gen_range(p.speed_range.0..p.speed_range.1);
                Self {
                    kind,
                    pos,
                    energy: p.initial_energy,
                    age: 0,
                    max_age: rng.gen_range(p.max_age_range.0..=p.max_age_range.1),
                    speed: nominal * speed_scale,
                    nominal_speed: nominal,
                    radius: p.radius,
                    separation_distance: rng
                        .gen_range(p.separation_range.0..=p.separation_range.1)
                        as f64,
                    exploration_chance: rng
                        .gen_range(p.exploration_range.0..p.exploration_range.1),
                    perception_range: 0.0,
                    reproduction_threshold: p.reproduction_threshold,
                }
            }
            Kind::Predator => {
                let p = &cfg.predator;
                let nominal = rng.gen_range(p.speed_range.0..p.speed_range.1);
                Self {
                    kind,
                    pos,
                    energy: p.initial_energy,
                    age: 0,
                    max_age: rng.gen_range(p.max_age_range.0..=p.max_age_range.1),
                    speed: nominal * speed_scale,
                    nominal_speed: nominal,
                    radius: p.radius,
                    separation_distance: p.separation_distance,
                    exploration_chance: 0.0,
                    perception_range: p.perception_range,
                    reproduction_threshold: p.reproduction_threshold,
                }
            }
        }
    }

    /// Spawn at a uniformly random position, used for the seed populations.
    pub fn spawn_random<R: Rng>(
        kind: Kind,
        cfg: &SimulationConfig,
        speed_scale: f64,
        rng: &mut R,
    ) -> Self {
        let pos = Vec2::new(
            rng.gen_range(0.0..=cfg.world_width),
            rng.gen_range(0.0..=cfg.world_height),
        );
        Self::spawn(kind, pos, cfg, speed_scale, rng)
    }

    /// Halve this creature's energy and produce an offspring of the same
    /// kind nearby. The offspring inherits the halved energy value; its
    /// speed, age limit, and behavioral constants are drawn independently.
    ///
    /// Callers check `energy >= reproduction_threshold` first.
    pub fn reproduce<R: Rng>(
        &mut self,
        cfg: &SimulationConfig,
        speed_scale: f64,
        rng: &mut R,
    ) -> Creature {
        self.energy /= 2.0;
        let jitter = cfg.reproduction_jitter;
        let pos = Vec2::new(
            self.pos.x + rng.gen_range(-jitter..=jitter) as f64,
            self.pos.y + rng.gen_range(-jitter..=jitter) as f64,
        );
        let mut child = Creature::spawn(self.kind, pos, cfg, speed_scale, rng);
        child.energy = self.energy;
        child
    }

    /// Death check: starved or aged out. Evaluated after the tick's movement
    /// and reproduction, so a creature can act, reproduce, and die in the
    /// same tick.
    pub fn is_dead(&self) -> bool {
        self.energy <= 0.0 || self.age >= self.max_age
    }

    /// Circle-circle overlap test used for foraging and predation.
    pub fn collides_with(&self, other_pos: Vec2, other_radius: f64) -> bool {
        self.pos.distance(other_pos) < self.radius + other_radius
    }

    /// Age-based fade in [0, 1] for rendering sinks: 1.0 newborn, 0.0 at
    /// max_age.
    pub fn visual_intensity(&self) -> f64 {
        (1.0 - self.age as f64 / self.max_age as f64).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn rng() -> ChaCha12Rng {
        ChaCha12Rng::seed_from_u64(7)
    }

    #[test]
    fn sampled_constants_stay_in_configured_ranges() {
        let cfg = SimulationConfig::default();
        let mut rng = rng();
        for _ in 0..100 {
            let prey = Creature::spawn_random(Kind::Prey, &cfg, 1.0, &mut rng);
            assert!(prey.nominal_speed >= 1.5 && prey.nominal_speed < 2.5);
            assert!(prey.exploration_chance >= 0.3 && prey.exploration_chance < 0.5);
            assert!(prey.separation_distance >= 30.0 && prey.separation_distance <= 100.0);
            assert!(prey.max_age >= 600 && prey.max_age <= 700);
            assert_eq!(prey.energy, 100.0);

            let pred = Creature::spawn_random(Kind::Predator, &cfg, 1.0, &mut rng);
            assert!(pred.nominal_speed >= 2.0 && pred.nominal_speed < 3.0);
            assert_eq!(pred.perception_range, 60.0);
            assert_eq!(pred.separation_distance, 50.0);
            assert_eq!(pred.energy, 120.0);
        }
    }

    #[test]
    fn reproduction_halves_parent_and_copies_energy_to_offspring() {
        let cfg = SimulationConfig::default();
        let mut rng = rng();
        let mut parent = Creature::spawn_random(Kind::Prey, &cfg, 1.0, &mut rng);
        parent.energy = 130.0;
        let child = parent.reproduce(&cfg, 1.0, &mut rng);
        assert_eq!(parent.energy, 65.0);
        assert_eq!(child.energy, 65.0);
        assert_eq!(child.kind, Kind::Prey);
        assert_eq!(child.age, 0);
        assert!((child.pos.x - parent.pos.x).abs() <= 20.0);
        assert!((child.pos.y - parent.pos.y).abs() <= 20.0);
    }

    #[test]
    fn offspring_born_during_glaciation_starts_throttled() {
        let cfg = SimulationConfig::default();
        let scale = 1.0 / cfg.glaciation.slowdown;
        let mut rng = rng();
        let mut parent = Creature::spawn_random(Kind::Predator, &cfg, scale, &mut rng);
        parent.energy = 200.0;
        let child = parent.reproduce(&cfg, scale, &mut rng);
        assert!((child.speed - child.nominal_speed * scale).abs() < 1e-12);
        assert!(child.speed < child.nominal_speed);
    }

    #[test]
    fn death_conditions() {
        let cfg = SimulationConfig::default();
        let mut rng = rng();
        let mut c = Creature::spawn_random(Kind::Prey, &cfg, 1.0, &mut rng);
        assert!(!c.is_dead());
        c.energy = 0.0;
        assert!(c.is_dead());
        c.energy = 50.0;
        c.age = c.max_age;
        assert!(c.is_dead());
    }

    #[test]
    fn collision_is_circle_overlap() {
        let cfg = SimulationConfig::default();
        let mut rng = rng();
        let mut c = Creature::spawn_random(Kind::Prey, &cfg, 1.0, &mut rng);
        c.pos = Vec2::new(0.0, 0.0);
        // Prey radius 10 + resource radius 5: overlap below 15.
        assert!(c.collides_with(Vec2::new(14.9, 0.0), 5.0));
        assert!(!c.collides_with(Vec2::new(15.0, 0.0), 5.0));
    }

    #[test]
    fn visual_intensity_fades_with_age() {
        let cfg = SimulationConfig::default();
        let mut rng = rng();
        let mut c = Creature::spawn_random(Kind::Prey, &cfg, 1.0, &mut rng);
        assert_eq!(c.visual_intensity(), 1.0);
        c.age = c.max_age;
        assert_eq!(c.visual_intensity(), 0.0);
    }
}
