#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative arena state management for Nova Arena.

mod dash;
mod obstacles;
mod tally;

use std::time::Duration;

use glam::Vec2;
use nova_arena_core::{
    scaled_delta, ActorId, ActorKind, ArenaBounds, Command, Event, WELCOME_BANNER,
};
use tracing::{debug, info};

use crate::{dash::DashPhase, obstacles::ObstacleRegistry, tally::Tally};

const HUD_STAGE_PREFIX: &str = "STAGE: ";
const PAUSED_TIME_SCALE: f32 = 0.0;
const NORMAL_TIME_SCALE: f32 = 1.0;

/// Tuning parameters of the arena session.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaConfig {
    /// Half of the arena's width and depth, centred on the origin.
    pub half_extents: Vec2,
    /// Non-Nova kills needed to charge the Nova blast.
    pub nova_kills_threshold: u32,
    /// Radius around the player hit by the Nova blast.
    pub nova_radius: f32,
    /// Damage dealt to every actor caught in the Nova blast.
    pub nova_damage: f32,
    /// Cube kills needed to fill the dash meter.
    pub cube_kills_needed: u32,
    /// Sphere kills needed to fill the dash meter.
    pub sphere_kills_needed: u32,
    /// Game time the player stays untouchable after dashing.
    pub dash_duration: Duration,
    /// Game time after a dash ends before another may start.
    pub dash_cooldown: Duration,
    /// Real time between the game over and the simulation freezing.
    pub game_over_freeze_delay: Duration,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_extents: Vec2::splat(40.0),
            nova_kills_threshold: 30,
            nova_radius: 15.0,
            nova_damage: 9_999.0,
            cube_kills_needed: 10,
            sphere_kills_needed: 2,
            dash_duration: Duration::from_millis(150),
            dash_cooldown: Duration::from_millis(500),
            game_over_freeze_delay: Duration::from_millis(50),
        }
    }
}

#[derive(Clone, Debug)]
struct Actor {
    id: ActorId,
    kind: ActorKind,
    position: Vec2,
    health: f32,
}

/// Represents the authoritative Nova Arena world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: ArenaConfig,
    bounds: ArenaBounds,
    player: Option<Vec2>,
    actors: Vec<Actor>,
    next_actor_id: ActorId,
    obstacles: ObstacleRegistry,
    time_scale: f32,
    paused: bool,
    game_over: bool,
    freeze_countdown: Option<Duration>,
    stage_text: String,
    tally: Tally,
    dash: DashPhase,
    elapsed: Duration,
}

impl World {
    /// Creates a new arena using the default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Creates a new arena using the provided tuning.
    #[must_use]
    pub fn with_config(config: ArenaConfig) -> Self {
        let bounds = ArenaBounds::centered(config.half_extents);
        Self {
            banner: WELCOME_BANNER,
            bounds,
            config,
            player: Some(Vec2::ZERO),
            actors: Vec::new(),
            next_actor_id: ActorId::new(0),
            obstacles: ObstacleRegistry::new(),
            time_scale: NORMAL_TIME_SCALE,
            paused: false,
            game_over: false,
            freeze_countdown: None,
            stage_text: String::new(),
            tally: Tally::default(),
            dash: DashPhase::Idle,
            elapsed: Duration::ZERO,
        }
    }

    fn actor_index(&self, actor: ActorId) -> Option<usize> {
        self.actors.iter().position(|candidate| candidate.id == actor)
    }

    fn allocate_actor_id(&mut self) -> ActorId {
        let id = self.next_actor_id;
        self.next_actor_id = ActorId::new(id.get().saturating_add(1));
        id
    }

    fn kill(&mut self, index: usize, by_nova: bool, out_events: &mut Vec<Event>) {
        let actor = self.actors.remove(index);
        out_events.push(Event::ActorKilled {
            actor: actor.id,
            kind: actor.kind,
            by_nova,
        });
        self.tally
            .record_kill(actor.kind, by_nova, self.game_over, &self.config, out_events);
    }

    fn unleash_nova(&mut self, out_events: &mut Vec<Event>) {
        if !self.tally.take_nova() {
            debug!("nova requested before it was charged");
            return;
        }

        let mut victims = 0;
        if let Some(player) = self.player {
            let radius = self.config.nova_radius;
            let damage = self.config.nova_damage;
            let mut index = 0;
            while index < self.actors.len() {
                let actor = &mut self.actors[index];
                if actor.position.distance(player) <= radius {
                    actor.health -= damage;
                    if actor.health <= 0.0 {
                        self.kill(index, true, out_events);
                        victims += 1;
                        continue;
                    }
                }
                index += 1;
            }
        }

        info!(victims, "nova unleashed");
        out_events.push(Event::NovaUnleashed { victims });
    }

    fn advance_freeze(&mut self, dt: Duration) {
        let Some(remaining) = self.freeze_countdown else {
            return;
        };
        let remaining = remaining.saturating_sub(dt);
        if remaining.is_zero() {
            self.freeze_countdown = None;
            self.time_scale = PAUSED_TIME_SCALE;
        } else {
            self.freeze_countdown = Some(remaining);
        }
    }

    fn reset_session(&mut self) {
        self.actors.clear();
        self.next_actor_id = ActorId::new(0);
        self.obstacles = ObstacleRegistry::new();
        self.time_scale = NORMAL_TIME_SCALE;
        self.paused = false;
        self.game_over = false;
        self.freeze_countdown = None;
        self.stage_text.clear();
        self.tally = Tally::default();
        self.dash = DashPhase::Idle;
        self.elapsed = Duration::ZERO;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.advance_freeze(dt);
            let time_scale = world.time_scale;
            out_events.push(Event::TimeAdvanced { dt, time_scale });

            if let Some(scaled) = scaled_delta(dt, time_scale) {
                world.elapsed = world.elapsed.saturating_add(scaled);
                world.dash = world.dash.advance(scaled, world.config.dash_cooldown);

                let mut expired = Vec::new();
                world.obstacles.age(scaled, &mut expired);
                for obstacle in expired {
                    out_events.push(Event::ObstacleExpired { obstacle });
                }
            }
        }
        Command::SetPlayerPosition { position } => {
            world.player = position.filter(|point| point.is_finite());
        }
        Command::SpawnActor { kind, position } => {
            let id = world.allocate_actor_id();
            world.actors.push(Actor {
                id,
                kind,
                position,
                health: kind.base_health(),
            });
            world.tally.spawned = world.tally.spawned.saturating_add(1);
            out_events.push(Event::ActorSpawned {
                actor: id,
                kind,
                position,
            });
        }
        Command::AnnounceStage { name } => {
            world.stage_text = format!("{HUD_STAGE_PREFIX}{name}");
            out_events.push(Event::StageAnnounced { name });
        }
        Command::DamageActor { actor, amount } => {
            let Some(index) = world.actor_index(actor) else {
                debug!(actor = actor.get(), "damage addressed to unknown actor");
                return;
            };
            world.actors[index].health -= amount;
            if world.actors[index].health <= 0.0 {
                world.kill(index, false, out_events);
            }
        }
        Command::UnleashNova => world.unleash_nova(out_events),
        Command::Dash => {
            if world.game_over {
                return;
            }
            if !world.dash.is_idle() {
                debug!(phase = ?world.dash, "dash requested before the previous one recovered");
                return;
            }
            if world.tally.take_dash(&world.config) {
                world.dash = DashPhase::Dashing {
                    remaining: world.config.dash_duration,
                };
                out_events.push(Event::Dashed);
            }
        }
        Command::TogglePause => {
            if world.game_over {
                return;
            }
            world.paused = !world.paused;
            world.time_scale = if world.paused {
                PAUSED_TIME_SCALE
            } else {
                NORMAL_TIME_SCALE
            };
            out_events.push(Event::PauseChanged {
                paused: world.paused,
            });
        }
        Command::PlayerContact { actor } => {
            if world.game_over || world.actor_index(actor).is_none() {
                return;
            }
            if world.dash.is_dashing() {
                debug!(actor = actor.get(), "contact ignored while dashing");
                return;
            }
            world.game_over = true;
            world.freeze_countdown = Some(world.config.game_over_freeze_delay);
            info!(kills = world.tally.kills, "game over");
            out_events.push(Event::GameOver {
                kills: world.tally.kills,
            });
        }
        Command::PlaceObstacle {
            center,
            half_extent,
            lifetime,
        } => match world
            .obstacles
            .place(&world.bounds, center, half_extent, lifetime)
        {
            Ok(obstacle) => out_events.push(Event::ObstaclePlaced {
                obstacle,
                center,
                half_extent,
            }),
            Err(reason) => out_events.push(Event::ObstaclePlacementRejected {
                center,
                half_extent,
                reason,
            }),
        },
        Command::ResetSession => {
            world.reset_session();
            out_events.push(Event::SessionReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use nova_arena_core::{
        ActorSnapshot, ActorView, ArenaBounds, GroundView, ObstacleSnapshot, SessionSummary,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Walkable bounds of the arena floor.
    #[must_use]
    pub fn bounds(world: &World) -> ArenaBounds {
        world.bounds
    }

    /// Current ground position of the player, if one is present.
    #[must_use]
    pub fn player_position(world: &World) -> Option<Vec2> {
        world.player
    }

    /// Captures a read-only view of the actors inhabiting the arena.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(
            world
                .actors
                .iter()
                .map(|actor| ActorSnapshot {
                    id: actor.id,
                    kind: actor.kind,
                    position: actor.position,
                    health: actor.health,
                })
                .collect(),
        )
    }

    /// Obstacles currently standing in the arena.
    #[must_use]
    pub fn obstacles(world: &World) -> &[ObstacleSnapshot] {
        world.obstacles.snapshots()
    }

    /// Exposes the walkable floor for ground projection queries.
    #[must_use]
    pub fn ground_view(world: &World) -> GroundView<'_> {
        GroundView::new(world.bounds, world.obstacles.snapshots())
    }

    /// Text currently displayed by the stage HUD.
    #[must_use]
    pub fn stage_text(world: &World) -> &str {
        &world.stage_text
    }

    /// Kills credited to the player this session.
    #[must_use]
    pub fn kills(world: &World) -> u32 {
        world.tally.kills
    }

    /// Fill ratio of the Nova meter in `[0, 1]`.
    #[must_use]
    pub fn nova_fill(world: &World) -> f32 {
        world.tally.nova_fill(&world.config)
    }

    /// Reports whether the Nova blast can be released.
    #[must_use]
    pub fn is_nova_ready(world: &World) -> bool {
        world.tally.nova_ready()
    }

    /// Fill ratio of the dash meter in `[0, 1]`.
    #[must_use]
    pub fn dash_fill(world: &World) -> f32 {
        world.tally.dash_fill(&world.config)
    }

    /// Reports whether the dash can be spent.
    #[must_use]
    pub fn is_dash_ready(world: &World) -> bool {
        world.tally.dash_ready(&world.config)
    }

    /// Reports whether the player is mid-dash and cannot be touched.
    #[must_use]
    pub fn is_dashing(world: &World) -> bool {
        world.dash.is_dashing()
    }

    /// Reports whether the session is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Reports whether the session ended.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Rate currently applied to game time.
    #[must_use]
    pub fn time_scale(world: &World) -> f32 {
        world.time_scale
    }

    /// Game time simulated since the session started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures a serializable report of the session.
    #[must_use]
    pub fn summary(world: &World) -> SessionSummary {
        SessionSummary {
            elapsed_secs: world.elapsed.as_secs_f32(),
            kills: world.tally.kills,
            actors_alive: world.actors.len(),
            actors_spawned: world.tally.spawned,
            obstacles_active: world.obstacles.snapshots().len(),
            stage_text: world.stage_text.clone(),
            novas_unleashed: world.tally.novas_unleashed,
            dashes: world.tally.dashes,
            game_over: world.game_over,
        }
    }
}
