//! Spawn position resolution within an annulus around the player.

use std::f32::consts::TAU;

use glam::Vec2;
use nova_arena_core::GroundProjection;
use rand::Rng;

use crate::config::SpawnTuning;

/// Picks a walkable spawn point between `min_distance` and roughly
/// `max_distance` from `reference`.
///
/// Each attempt samples a random angle and radius, projects the candidate onto
/// walkable ground, and accepts it only if the projection did not pull it
/// inside the minimum distance. Returns `None` once the attempt budget is
/// spent.
pub fn resolve_spawn_position<G, R>(
    reference: Vec2,
    tuning: &SpawnTuning,
    ground: &G,
    rng: &mut R,
) -> Option<Vec2>
where
    G: GroundProjection + ?Sized,
    R: Rng + ?Sized,
{
    for _ in 0..tuning.max_attempts.max(1) {
        let angle = rng.gen_range(0.0..TAU);
        let radius = if tuning.max_distance > tuning.min_distance {
            rng.gen_range(tuning.min_distance..tuning.max_distance)
        } else {
            tuning.min_distance
        };
        let candidate = reference + Vec2::new(angle.cos(), angle.sin()) * radius;

        let Some(projected) = ground.project(candidate, tuning.sample_tolerance) else {
            continue;
        };
        if projected.distance(reference) >= tuning.min_distance {
            return Some(projected);
        }
    }
    None
}
