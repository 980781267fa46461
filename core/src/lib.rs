#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Nova Arena simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative arena world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`GroundView`], and respond exclusively with new command
//! batches.

use std::time::Duration;

use glam::Vec2;
use serde::Serialize;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Nova Arena.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided real-time delta.
    Tick {
        /// Duration of real time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Moves the player to the provided ground position, or removes it.
    SetPlayerPosition {
        /// Ground position of the player, `None` when no player is present.
        position: Option<Vec2>,
    },
    /// Requests that a hostile actor be instantiated in the arena.
    SpawnActor {
        /// Kind of actor to create.
        kind: ActorKind,
        /// Ground position the actor appears at.
        position: Vec2,
    },
    /// Requests that the HUD display the provided stage name.
    AnnounceStage {
        /// Display name of the stage that became active.
        name: String,
    },
    /// Applies damage to a single actor.
    DamageActor {
        /// Identifier of the actor that was hit.
        actor: ActorId,
        /// Amount of health removed from the actor.
        amount: f32,
    },
    /// Releases the charged Nova blast around the player.
    UnleashNova,
    /// Spends a full dash charge.
    Dash,
    /// Flips the session between paused and running.
    TogglePause,
    /// Reports that an actor touched the player.
    PlayerContact {
        /// Identifier of the actor that reached the player.
        actor: ActorId,
    },
    /// Requests placement of a temporary obstacle.
    PlaceObstacle {
        /// Ground position of the obstacle centre.
        center: Vec2,
        /// Half of the obstacle's square footprint edge.
        half_extent: f32,
        /// Game time the obstacle stays in the arena.
        lifetime: Duration,
    },
    /// Restores the session to its initial state.
    ResetSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of real time that elapsed in the tick.
        dt: Duration,
        /// Rate applied to game time during the tick; zero while frozen.
        time_scale: f32,
    },
    /// Confirms that an actor entered the arena.
    ActorSpawned {
        /// Identifier assigned to the new actor.
        actor: ActorId,
        /// Kind of the new actor.
        kind: ActorKind,
        /// Ground position of the new actor.
        position: Vec2,
    },
    /// Confirms that an actor was destroyed.
    ActorKilled {
        /// Identifier of the destroyed actor.
        actor: ActorId,
        /// Kind of the destroyed actor.
        kind: ActorKind,
        /// Indicates whether the Nova blast caused the kill.
        by_nova: bool,
    },
    /// Announces that the HUD now displays a new stage name.
    StageAnnounced {
        /// Display name of the announced stage.
        name: String,
    },
    /// Announces that the Nova blast finished charging.
    NovaReady,
    /// Confirms that the Nova blast was released.
    NovaUnleashed {
        /// Number of actors destroyed by the blast.
        victims: u32,
    },
    /// Announces that the dash charge is full.
    DashReady,
    /// Confirms that the player spent the dash charge.
    Dashed,
    /// Announces that the session entered or left the paused state.
    PauseChanged {
        /// Whether the session is paused after the change.
        paused: bool,
    },
    /// Announces the end of the session.
    GameOver {
        /// Kills accumulated before the session ended.
        kills: u32,
    },
    /// Confirms that an obstacle rose into the arena.
    ObstaclePlaced {
        /// Identifier assigned to the obstacle.
        obstacle: ObstacleId,
        /// Ground position of the obstacle centre.
        center: Vec2,
        /// Half of the obstacle's square footprint edge.
        half_extent: f32,
    },
    /// Reports that an obstacle placement request was rejected.
    ObstaclePlacementRejected {
        /// Requested obstacle centre.
        center: Vec2,
        /// Requested half extent.
        half_extent: f32,
        /// Specific reason the placement failed.
        reason: ObstacleRejection,
    },
    /// Confirms that an obstacle sank back and left the arena.
    ObstacleExpired {
        /// Identifier of the obstacle that expired.
        obstacle: ObstacleId,
    },
    /// Announces that the session was restored to its initial state.
    SessionReset,
}

/// Reasons an obstacle placement may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleRejection {
    /// The footprint extends beyond the arena bounds.
    OutOfBounds,
    /// The footprint overlaps an existing obstacle.
    Overlapping,
}

/// Hostile actor kinds that can populate the arena.
///
/// Behaviour differences between kinds are expressed as per-kind data rather
/// than through a type hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    /// Melee chaser that wanders erratically around the player.
    Cube,
    /// Ranged shooter that keeps its distance.
    Sphere,
}

impl ActorKind {
    /// Every actor kind in declaration order.
    pub const ALL: [ActorKind; 2] = [ActorKind::Cube, ActorKind::Sphere];

    /// Resolves an actor kind from its configuration name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Configuration name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
        }
    }

    /// Health assigned to freshly spawned actors of this kind.
    #[must_use]
    pub const fn base_health(self) -> f32 {
        match self {
            Self::Cube => 1.0,
            Self::Sphere => 1.0,
        }
    }
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Axis-aligned walkable rectangle of the arena floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaBounds {
    min: Vec2,
    max: Vec2,
}

impl ArenaBounds {
    /// Creates bounds centred on the origin.
    #[must_use]
    pub fn centered(half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: -half,
            max: half,
        }
    }

    /// Reports whether the point lies inside or on the bounds.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Reports whether a square footprint lies fully inside the bounds.
    #[must_use]
    pub fn contains_footprint(&self, center: Vec2, half_extent: f32) -> bool {
        let half = Vec2::splat(half_extent.max(0.0));
        self.contains(center - half) && self.contains(center + half)
    }

    /// Returns the closest point inside the bounds.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

/// Immutable representation of a single actor used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Kind of the actor.
    pub kind: ActorKind,
    /// Ground position of the actor.
    pub position: Vec2,
    /// Remaining health of the actor.
    pub health: f32,
}

/// Read-only snapshot describing all actors in the arena.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single obstacle used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    /// Identifier allocated to the obstacle by the world.
    pub id: ObstacleId,
    /// Ground position of the obstacle centre.
    pub center: Vec2,
    /// Half of the square footprint edge.
    pub half_extent: f32,
    /// Game time left before the obstacle sinks.
    pub remaining: Duration,
}

impl ObstacleSnapshot {
    /// Reports whether the point lies strictly inside the footprint.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x < self.half_extent && offset.y < self.half_extent
    }

    /// Reports whether another square footprint overlaps this one.
    #[must_use]
    pub fn overlaps(&self, center: Vec2, half_extent: f32) -> bool {
        let reach = self.half_extent + half_extent;
        let offset = (center - self.center).abs();
        offset.x < reach && offset.y < reach
    }

    /// Moves a point inside the footprint onto its nearest edge.
    #[must_use]
    pub fn nearest_exit(&self, point: Vec2) -> Vec2 {
        let offset = point - self.center;
        let push_x = self.half_extent - offset.x.abs();
        let push_y = self.half_extent - offset.y.abs();
        if push_x <= push_y {
            let sign = if offset.x < 0.0 { -1.0 } else { 1.0 };
            Vec2::new(self.center.x + sign * self.half_extent, point.y)
        } else {
            let sign = if offset.y < 0.0 { -1.0 } else { 1.0 };
            Vec2::new(point.x, self.center.y + sign * self.half_extent)
        }
    }
}

/// Query service that snaps arbitrary points onto walkable ground.
pub trait GroundProjection {
    /// Projects `sample` onto the nearest walkable ground point no further
    /// than `tolerance` away, or `None` when no such point exists.
    fn project(&self, sample: Vec2, tolerance: f32) -> Option<Vec2>;
}

/// Read-only view of the walkable arena floor.
#[derive(Clone, Copy, Debug)]
pub struct GroundView<'a> {
    bounds: ArenaBounds,
    obstacles: &'a [ObstacleSnapshot],
}

impl<'a> GroundView<'a> {
    /// Captures a new ground view backed by the provided obstacle slice.
    #[must_use]
    pub fn new(bounds: ArenaBounds, obstacles: &'a [ObstacleSnapshot]) -> Self {
        Self { bounds, obstacles }
    }

    /// Walkable bounds of the arena.
    #[must_use]
    pub const fn bounds(&self) -> ArenaBounds {
        self.bounds
    }

    /// Obstacles currently blocking the floor.
    #[must_use]
    pub fn obstacles(&self) -> &'a [ObstacleSnapshot] {
        self.obstacles
    }

    /// Reports whether the point is inside the arena and not blocked.
    #[must_use]
    pub fn is_walkable(&self, point: Vec2) -> bool {
        self.bounds.contains(point) && !self.obstacles.iter().any(|o| o.contains(point))
    }
}

impl GroundProjection for GroundView<'_> {
    fn project(&self, sample: Vec2, tolerance: f32) -> Option<Vec2> {
        if !sample.is_finite() || tolerance.is_nan() || tolerance < 0.0 {
            return None;
        }

        let mut point = self.bounds.clamp(sample);
        for obstacle in self.obstacles {
            if obstacle.contains(point) {
                point = obstacle.nearest_exit(point);
            }
        }

        if !self.is_walkable(point) || point.distance(sample) > tolerance {
            return None;
        }
        Some(point)
    }
}

/// Converts a real frame delta into game time under `time_scale`.
///
/// Returns `None` while game time is frozen, which includes non-finite or
/// non-positive scales. A scale of exactly one yields `dt` unchanged.
#[must_use]
pub fn scaled_delta(dt: Duration, time_scale: f32) -> Option<Duration> {
    if !time_scale.is_finite() || time_scale <= 0.0 {
        return None;
    }
    if time_scale == 1.0 {
        return Some(dt);
    }
    Duration::try_from_secs_f64(dt.as_secs_f64() * f64::from(time_scale)).ok()
}

/// Serializable end-of-session report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Game time simulated while the session was running.
    pub elapsed_secs: f32,
    /// Kills credited to the player.
    pub kills: u32,
    /// Actors still alive in the arena.
    pub actors_alive: usize,
    /// Actors spawned over the whole session.
    pub actors_spawned: u32,
    /// Obstacles currently standing.
    pub obstacles_active: usize,
    /// Text currently displayed by the stage HUD.
    pub stage_text: String,
    /// Number of Nova blasts released.
    pub novas_unleashed: u32,
    /// Number of dashes performed.
    pub dashes: u32,
    /// Whether the session ended in a game over.
    pub game_over: bool,
}
