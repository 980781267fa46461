use std::time::Duration;

use glam::Vec2;
use nova_arena_core::{ArenaBounds, GroundProjection, GroundView, ObstacleId, ObstacleSnapshot};
use nova_arena_system_stage_timeline::{config::SpawnTuning, placement::resolve_spawn_position};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Ground that drags every sample a fixed fraction of the way to the origin.
struct Sloped {
    pull: f32,
}

impl GroundProjection for Sloped {
    fn project(&self, sample: Vec2, _tolerance: f32) -> Option<Vec2> {
        Some(sample * (1.0 - self.pull))
    }
}

struct Void;

impl GroundProjection for Void {
    fn project(&self, _sample: Vec2, _tolerance: f32) -> Option<Vec2> {
        None
    }
}

#[test]
fn accepted_positions_respect_the_minimum_distance() {
    let tuning = SpawnTuning::default();
    let ground = Sloped { pull: 0.1 };
    let mut accepted = 0;
    let mut rejected = 0;

    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        match resolve_spawn_position(Vec2::ZERO, &tuning, &ground, &mut rng) {
            Some(position) => {
                accepted += 1;
                assert!(
                    position.length() >= tuning.min_distance,
                    "{position:?} is closer than {}",
                    tuning.min_distance
                );
            }
            None => rejected += 1,
        }
    }

    assert!(accepted > 0, "some samples survive a gentle slope");
    assert!(rejected > 0, "some budgets are exhausted by the slope");
}

#[test]
fn exhausted_budget_yields_no_spawn() {
    let tuning = SpawnTuning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    assert_eq!(resolve_spawn_position(Vec2::ZERO, &tuning, &Void, &mut rng), None);

    let collapsing = Sloped { pull: 0.5 };
    assert_eq!(
        resolve_spawn_position(Vec2::ZERO, &tuning, &collapsing, &mut rng),
        None
    );
}

#[test]
fn positions_land_inside_the_annulus_on_open_ground() {
    let tuning = SpawnTuning::default();
    let bounds = ArenaBounds::centered(Vec2::splat(100.0));
    let view = GroundView::new(bounds, &[]);
    let reference = Vec2::new(3.0, -2.0);
    let mut rng = ChaCha8Rng::seed_from_u64(0xfeed);

    for _ in 0..100 {
        let position = resolve_spawn_position(reference, &tuning, &view, &mut rng)
            .expect("open ground always accepts");
        let distance = position.distance(reference);
        assert!(distance >= tuning.min_distance);
        assert!(distance < tuning.max_distance + 1e-3);
    }
}

#[test]
fn obstacle_footprints_are_never_chosen() {
    let tuning = SpawnTuning {
        min_distance: 5.0,
        max_distance: 8.0,
        ..SpawnTuning::default()
    };
    let bounds = ArenaBounds::centered(Vec2::splat(40.0));
    let obstacles = [ObstacleSnapshot {
        id: ObstacleId::new(0),
        center: Vec2::new(6.5, 0.0),
        half_extent: 2.0,
        remaining: Duration::from_secs(12),
    }];
    let view = GroundView::new(bounds, &obstacles);
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    for _ in 0..200 {
        if let Some(position) = resolve_spawn_position(Vec2::ZERO, &tuning, &view, &mut rng) {
            assert!(!obstacles[0].contains(position), "{position:?} inside obstacle");
            assert!(position.length() >= tuning.min_distance);
        }
    }
}

#[test]
fn identical_seeds_pick_identical_positions() {
    let tuning = SpawnTuning::default();
    let view = GroundView::new(ArenaBounds::centered(Vec2::splat(40.0)), &[]);
    let mut first = ChaCha8Rng::seed_from_u64(42);
    let mut second = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..10 {
        assert_eq!(
            resolve_spawn_position(Vec2::ZERO, &tuning, &view, &mut first),
            resolve_spawn_position(Vec2::ZERO, &tuning, &view, &mut second)
        );
    }
}
