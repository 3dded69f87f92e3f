// ============================================================================
// behavior.rs — Biosfera
// Neighbor queries and per-kind movement primitives. All functions here are
// infallible: an empty or fully filtered candidate set yields None, never a
// sentinel. Scans are O(n) per caller; fine at the population scales used
// (tens to low hundreds), and the first-minimum tie-break depends on it.
// ============================================================================

use rand::Rng;

use crate::entity::{Creature, Vec2};

/// Index of the candidate nearest to `origin` among those accepted by
/// `predicate` (called with the candidate and its distance). Ties resolve to
/// the first encountered minimum, so results are deterministic for a fixed
/// candidate order.
pub fn nearest<T>(
    origin: Vec2,
    candidates: &[T],
    position: impl Fn(&T) -> Vec2,
    mut predicate: impl FnMut(&T, f64) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let dist = origin.distance(position(candidate));
        if !predicate(candidate, dist) {
            continue;
        }
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((idx, dist)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Sum of (self − other) over peers closer than `separation_distance`,
/// skipping the creature's own slot. Zero means no crowding.
pub fn separation_vector(
    origin: Vec2,
    self_index: usize,
    peer_positions: &[Vec2],
    separation_distance: f64,
) -> Vec2 {
    let mut push = Vec2::ZERO;
    for (idx, &peer) in peer_positions.iter().enumerate() {
        if idx == self_index {
            continue;
        }
        if origin.distance(peer) < separation_distance {
            push += origin - peer;
        }
    }
    push
}

/// Apply the crowding response: step along the repulsion vector at full
/// speed and pay the repulsion cost. No-op when the vector is zero.
pub fn apply_separation(creature: &mut Creature, push: Vec2, cost: f64) {
    if push == Vec2::ZERO {
        return;
    }
    creature.pos += push.normalized().scaled(creature.speed);
    creature.energy -= cost;
}

/// One step of directed movement toward `target` (unit direction × speed).
/// Standing exactly on the target costs nothing.
pub fn move_towards(creature: &mut Creature, target: Vec2, cost: f64) {
    let direction = target - creature.pos;
    if direction.length() > 0.0 {
        creature.pos += direction.normalized().scaled(creature.speed);
        creature.energy -= cost;
    }
}

/// Small uniform-integer displacement per axis, clamped to the world bounds.
/// Directed movement is deliberately not clamped; only the walk is.
pub fn random_walk<R: Rng>(
    creature: &mut Creature,
    step: i32,
    bounds: (f64, f64),
    cost: f64,
    rng: &mut R,
) {
    creature.pos.x += rng.gen_range(-step..=step) as f64;
    creature.pos.y += rng.gen_range(-step..=step) as f64;
    creature.energy -= cost;
    creature.pos.x = creature.pos.x.clamp(0.0, bounds.0);
    creature.pos.y = creature.pos.y.clamp(0.0, bounds.1);
}
