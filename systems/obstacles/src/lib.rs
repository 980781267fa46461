#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Obstacle scheduler that raises bursts of temporary obstacles whenever the
//! stage timeline advances.

use std::time::Duration;

use glam::Vec2;
use nova_arena_core::{scaled_delta, Command, Event, GroundProjection, GroundView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Tuning parameters for the obstacle scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Full width and depth of the area, centred on the origin, in which
    /// obstacles may rise.
    pub spawn_area: Vec2,
    /// Fewest obstacles raised by a single burst.
    pub min_obstacles: u32,
    /// Most obstacles raised by a single burst.
    pub max_obstacles: u32,
    /// Shortest wait before each placement.
    pub min_delay: Duration,
    /// Longest wait before each placement.
    pub max_delay: Duration,
    /// Game time an obstacle stays up.
    pub lifetime: Duration,
    /// Smallest footprint edge length.
    pub min_size: f32,
    /// Largest footprint edge length.
    pub max_size: f32,
    /// Maximum distance a candidate may move when projected onto ground.
    pub sample_tolerance: f32,
    /// Candidate points tried per placement before it is skipped.
    pub placement_attempts: u32,
    /// Seed of the placement random number generator.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spawn_area: Vec2::splat(50.0),
            min_obstacles: 3,
            max_obstacles: 10,
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            lifetime: Duration::from_secs(12),
            min_size: 2.0,
            max_size: 7.0,
            sample_tolerance: 2.0,
            placement_attempts: 10,
            rng_seed: 0,
        }
    }
}

impl Config {
    /// Returns the default tuning with the provided seed.
    #[must_use]
    pub fn with_seed(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::default()
        }
    }

    fn sanitized(mut self) -> Self {
        if self.max_obstacles < self.min_obstacles {
            warn!(
                min = self.min_obstacles,
                max = self.max_obstacles,
                "obstacle count range inverted; swapping bounds"
            );
            std::mem::swap(&mut self.min_obstacles, &mut self.max_obstacles);
        }
        if self.max_delay < self.min_delay {
            warn!("obstacle delay range inverted; swapping bounds");
            std::mem::swap(&mut self.min_delay, &mut self.max_delay);
        }
        if !(self.min_size.is_finite() && self.min_size > 0.0) {
            warn!(value = self.min_size, "invalid minimum obstacle size; using 1");
            self.min_size = 1.0;
        }
        if !(self.max_size.is_finite() && self.max_size >= self.min_size) {
            warn!(value = self.max_size, "invalid maximum obstacle size; using minimum");
            self.max_size = self.min_size;
        }
        if !self.spawn_area.is_finite() {
            warn!("invalid obstacle spawn area; using default");
            self.spawn_area = Self::default().spawn_area;
        }
        self.spawn_area = self.spawn_area.abs();
        if !(self.sample_tolerance.is_finite() && self.sample_tolerance >= 0.0) {
            warn!(value = self.sample_tolerance, "invalid ground sample tolerance; using 0");
            self.sample_tolerance = 0.0;
        }
        self
    }
}

/// A running burst of delayed placements.
#[derive(Clone, Copy, Debug)]
struct Burst {
    remaining: u32,
    wait: Duration,
}

/// Pure system that schedules obstacle placements after stage advances.
#[derive(Debug)]
pub struct Obstacles {
    config: Config,
    rng: ChaCha8Rng,
    watermark: Option<usize>,
    bursts: Vec<Burst>,
}

impl Obstacles {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let config = config.sanitized();
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            watermark: None,
            bursts: Vec::new(),
        }
    }

    /// Consumes world events and the timeline cursor to emit placements.
    ///
    /// A burst starts whenever `stage_cursor` grows past the highest value
    /// observed so far, except for the initial cursor of zero. Bursts advance
    /// with scaled game time and run concurrently.
    pub fn handle(
        &mut self,
        events: &[Event],
        stage_cursor: usize,
        ground: &GroundView<'_>,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::SessionReset => self.reset(),
                Event::TimeAdvanced { dt, time_scale } => {
                    if let Some(game_dt) = scaled_delta(*dt, *time_scale) {
                        elapsed = elapsed.saturating_add(game_dt);
                    }
                }
                _ => {}
            }
        }

        if self.watermark.map_or(true, |seen| stage_cursor > seen) {
            if stage_cursor > 0 {
                self.start_burst(stage_cursor);
            }
            self.watermark = Some(stage_cursor);
        }

        if elapsed.is_zero() {
            return;
        }

        let mut placed = Vec::new();
        let mut index = 0;
        while index < self.bursts.len() {
            let burst = &mut self.bursts[index];
            burst.wait = burst.wait.saturating_sub(elapsed);
            if !burst.wait.is_zero() {
                index += 1;
                continue;
            }

            burst.remaining -= 1;
            let finished = burst.remaining == 0;
            if finished {
                let _ = self.bursts.swap_remove(index);
            } else {
                let wait = self.sample_delay();
                self.bursts[index].wait = wait;
                index += 1;
            }

            if let Some((center, half_extent)) = self.try_place(ground, &placed) {
                placed.push((center, half_extent));
                out.push(Command::PlaceObstacle {
                    center,
                    half_extent,
                    lifetime: self.config.lifetime,
                });
            }
        }
    }

    /// Number of bursts that still have placements pending.
    #[must_use]
    pub fn active_bursts(&self) -> usize {
        self.bursts.len()
    }

    /// Tuning in effect after sanitisation.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn reset(&mut self) {
        self.bursts.clear();
        self.watermark = None;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
    }

    fn start_burst(&mut self, stage_cursor: usize) {
        let count = self
            .rng
            .gen_range(self.config.min_obstacles..=self.config.max_obstacles);
        if count == 0 {
            return;
        }
        debug!(stage_cursor, count, "obstacle burst scheduled");
        let wait = self.sample_delay();
        self.bursts.push(Burst {
            remaining: count,
            wait,
        });
    }

    fn sample_delay(&mut self) -> Duration {
        let min = self.config.min_delay.as_secs_f32();
        let max = self.config.max_delay.as_secs_f32();
        if max > min {
            Duration::from_secs_f32(self.rng.gen_range(min..max))
        } else {
            self.config.min_delay
        }
    }

    fn sample_size(&mut self) -> f32 {
        if self.config.max_size > self.config.min_size {
            self.rng.gen_range(self.config.min_size..self.config.max_size)
        } else {
            self.config.min_size
        }
    }

    fn try_place(&mut self, ground: &GroundView<'_>, placed: &[(Vec2, f32)]) -> Option<(Vec2, f32)> {
        let half_area = self.config.spawn_area * 0.5;
        for _ in 0..self.config.placement_attempts {
            let candidate = Vec2::new(
                sample_axis(&mut self.rng, half_area.x),
                sample_axis(&mut self.rng, half_area.y),
            );
            let Some(center) = ground.project(candidate, self.config.sample_tolerance) else {
                continue;
            };

            let half_extent = self.sample_size() * 0.5;
            if !ground.bounds().contains_footprint(center, half_extent) {
                continue;
            }
            let blocked = ground
                .obstacles()
                .iter()
                .any(|obstacle| obstacle.overlaps(center, half_extent))
                || placed
                    .iter()
                    .any(|(other, extent)| footprints_overlap(*other, *extent, center, half_extent));
            if !blocked {
                return Some((center, half_extent));
            }
        }

        debug!(
            attempts = self.config.placement_attempts,
            "no free spot for obstacle; skipping"
        );
        None
    }
}

fn sample_axis(rng: &mut ChaCha8Rng, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..half)
    } else {
        0.0
    }
}

fn footprints_overlap(a: Vec2, a_half: f32, b: Vec2, b_half: f32) -> bool {
    let reach = a_half + b_half;
    let offset = (a - b).abs();
    offset.x < reach && offset.y < reach
}
