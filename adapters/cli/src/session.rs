//! Headless arena session that wires the world to its systems.

use std::time::Duration;

use nova_arena_core::{scaled_delta, Command, Event, SessionSummary};
use nova_arena_system_obstacles::{Config as ObstacleConfig, Obstacles};
use nova_arena_system_stage_timeline::{config::TimelineConfig, StageTimeline};
use nova_arena_world::{self as world, query, World};
use tracing::{debug, info};

/// Owns the arena world and every system that reacts to it.
///
/// The simulated player dashes and unleashes Nova as soon as either is
/// charged.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    timeline: StageTimeline,
    obstacles: Obstacles,
    kill_every: Option<Duration>,
    kill_timer: Duration,
}

impl Session {
    /// Creates a session whose systems are seeded from `seed`.
    pub(crate) fn new(config: TimelineConfig, seed: u64, kill_every: Option<Duration>) -> Self {
        Self {
            world: World::new(),
            timeline: StageTimeline::new(config, seed),
            obstacles: Obstacles::new(ObstacleConfig::with_seed(seed.rotate_left(17))),
            kill_every: kill_every.filter(|interval| !interval.is_zero()),
            kill_timer: Duration::ZERO,
        }
    }

    /// Resets the arena and the systems to a fresh run.
    pub(crate) fn start(&mut self) {
        self.kill_timer = Duration::ZERO;
        self.pump(vec![Command::ResetSession]);
    }

    /// Fires the next pending stage immediately.
    pub(crate) fn force_advance(&mut self) {
        let mut commands = Vec::new();
        self.timeline.force_advance(&mut commands);
        self.pump(commands);
    }

    /// Advances the session by one frame of `dt` real time.
    pub(crate) fn step(&mut self, dt: Duration) {
        self.pump(vec![Command::Tick { dt }]);

        let Some(interval) = self.kill_every else {
            return;
        };
        let Some(game_dt) = scaled_delta(dt, query::time_scale(&self.world)) else {
            return;
        };
        self.kill_timer = self.kill_timer.saturating_add(game_dt);
        while self.kill_timer >= interval {
            self.kill_timer -= interval;
            self.fire_at_oldest();
        }
    }

    /// Game time simulated since the last start.
    pub(crate) fn elapsed(&self) -> Duration {
        query::elapsed(&self.world)
    }

    /// Number of waves begun by the active spawn loop, if any.
    pub(crate) fn active_waves(&self) -> Option<u32> {
        self.timeline.active_waves()
    }

    /// End-of-run report.
    pub(crate) fn summary(&self) -> SessionSummary {
        query::summary(&self.world)
    }

    fn fire_at_oldest(&mut self) {
        let Some(target) = query::actor_view(&self.world).iter().next().copied() else {
            return;
        };
        self.pump(vec![Command::DamageActor {
            actor: target.id,
            amount: target.health,
        }]);
    }

    /// Applies commands and routes the resulting events until quiescent.
    fn pump(&mut self, mut commands: Vec<Command>) {
        let mut events = Vec::new();
        while !commands.is_empty() {
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.dispatch(&events, &mut commands);
            events.clear();
        }
    }

    fn dispatch(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let player = query::player_position(&self.world);
        let ground = query::ground_view(&self.world);
        self.timeline.handle(events, player, &ground, out);
        self.obstacles
            .handle(events, self.timeline.cursor(), &ground, out);

        for event in events {
            match event {
                Event::StageAnnounced { name } => {
                    info!(stage = %name, text = query::stage_text(&self.world), "hud updated");
                }
                Event::NovaReady => out.push(Command::UnleashNova),
                Event::DashReady => out.push(Command::Dash),
                Event::Dashed => debug!(
                    fill = query::dash_fill(&self.world),
                    dashing = query::is_dashing(&self.world),
                    "player dashed"
                ),
                Event::NovaUnleashed { victims } => info!(victims, "nova unleashed"),
                Event::ObstaclePlaced {
                    obstacle,
                    center,
                    half_extent,
                } => debug!(
                    obstacle = obstacle.get(),
                    x = center.x,
                    y = center.y,
                    half_extent,
                    "obstacle raised"
                ),
                Event::ObstaclePlacementRejected { reason, .. } => {
                    debug!(?reason, "obstacle placement rejected");
                }
                Event::GameOver { kills } => info!(kills, "session over"),
                _ => {}
            }
        }
    }
}
