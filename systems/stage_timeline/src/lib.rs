#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stage timeline system that drives timed enemy waves.
//!
//! The timeline owns an ordered list of stages, each firing once when the
//! game clock crosses its trigger timestamp. Firing a stage announces its name
//! and replaces the single active spawn loop with a new one that spawns the
//! stage's waves, one actor per frame step at most, until it is superseded,
//! paused, or reset.

pub mod config;
pub mod placement;
mod spawn_loop;

use std::time::Duration;

use glam::Vec2;
use nova_arena_core::{scaled_delta, ActorKind, Command, Event, GroundProjection};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::{
    config::{SpawnTuning, StageDefinition, TimelineConfig},
    placement::resolve_spawn_position,
    spawn_loop::{LoopStep, SpawnLoop},
};

/// Stage name announced before the first stage fires.
pub const INITIAL_STAGE_NAME: &str = "Starting";

/// A configured stage together with its per-run state.
#[derive(Clone, Debug)]
pub struct Stage {
    definition: StageDefinition,
    has_fired: bool,
    waves_exhausted: bool,
}

impl Stage {
    /// Immutable configuration of the stage.
    #[must_use]
    pub fn definition(&self) -> &StageDefinition {
        &self.definition
    }

    /// Display name of the stage.
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Clock value at which the stage fires.
    #[must_use]
    pub fn trigger(&self) -> Duration {
        self.definition.trigger()
    }

    /// Reports whether the stage fired during the current run.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.has_fired
    }

    /// Reports whether a non-repeating stage already spawned its only wave.
    #[must_use]
    pub fn waves_exhausted(&self) -> bool {
        self.waves_exhausted
    }
}

/// Pure system that fires timed stages and runs their spawn loops.
#[derive(Debug)]
pub struct StageTimeline {
    stages: Vec<Stage>,
    tuning: SpawnTuning,
    seed: u64,
    rng: ChaCha8Rng,
    clock: Duration,
    cursor: usize,
    paused: bool,
    spawn_loop: Option<SpawnLoop>,
}

impl StageTimeline {
    /// Creates a timeline from the provided configuration.
    ///
    /// Stages are sorted by trigger timestamp; stages sharing a timestamp keep
    /// their load order. `seed` drives spawn position sampling and is restored
    /// on every [`StageTimeline::reset`].
    #[must_use]
    pub fn new(config: TimelineConfig, seed: u64) -> Self {
        let TimelineConfig { mut stages, spawn } = config;
        if stages.is_empty() {
            warn!("no stages configured; timeline will never spawn");
        }

        stages.sort_by_key(StageDefinition::trigger);
        for (index, definition) in stages.iter().enumerate() {
            validate_stage(index, definition);
        }

        Self {
            stages: stages
                .into_iter()
                .map(|definition| Stage {
                    definition,
                    has_fired: false,
                    waves_exhausted: false,
                })
                .collect(),
            tuning: spawn.sanitized(),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: Duration::ZERO,
            cursor: 0,
            paused: false,
            spawn_loop: None,
        }
    }

    /// Consumes world events and emits spawn and announcement commands.
    ///
    /// Each [`Event::TimeAdvanced`] is treated as one frame: the clock is
    /// advanced first, elapsed stages fire next, and the active spawn loop
    /// takes one step last. Stage advancement waits while no player is
    /// present. [`Event::PauseChanged`] pauses or resumes the timeline and
    /// [`Event::SessionReset`] resets it.
    pub fn handle<G>(
        &mut self,
        events: &[Event],
        player: Option<Vec2>,
        ground: &G,
        out: &mut Vec<Command>,
    ) where
        G: GroundProjection + ?Sized,
    {
        for event in events {
            match event {
                Event::TimeAdvanced { dt, time_scale } => {
                    self.advance_frame(*dt, *time_scale, player, ground, out);
                }
                Event::PauseChanged { paused: true } => self.pause(),
                Event::PauseChanged { paused: false } => self.resume(),
                Event::SessionReset => self.reset(out),
                _ => {}
            }
        }
    }

    /// Restores the timeline to its initial state and announces the
    /// placeholder stage name.
    pub fn reset(&mut self, out: &mut Vec<Command>) {
        self.clock = Duration::ZERO;
        self.cursor = 0;
        self.paused = false;
        self.cancel_spawn_loop();
        for stage in &mut self.stages {
            stage.has_fired = false;
            stage.waves_exhausted = false;
        }
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        out.push(Command::AnnounceStage {
            name: INITIAL_STAGE_NAME.to_owned(),
        });
    }

    /// Advances the clock by `dt` scaled by `time_scale`, unless paused or
    /// game time is frozen.
    pub fn tick(&mut self, dt: Duration, time_scale: f32) {
        if self.paused {
            return;
        }
        if let Some(game_dt) = scaled_delta(dt, time_scale) {
            self.clock = self.clock.saturating_add(game_dt);
        }
    }

    /// Fires every stage whose trigger the clock has reached, in order.
    ///
    /// Several stages may fire in a single call when the clock jumped past
    /// more than one trigger; none are skipped.
    pub fn check_advance(&mut self, out: &mut Vec<Command>) {
        if self.paused {
            return;
        }
        while let Some(stage) = self.stages.get(self.cursor) {
            if self.clock < stage.trigger() {
                break;
            }
            let _ = self.fire_stage(self.cursor, out);
            self.cursor += 1;
        }
    }

    /// Fires the stage at `index` if it has not fired yet.
    ///
    /// Returns whether the stage fired. Firing announces the stage and
    /// replaces the active spawn loop.
    pub fn fire_stage(&mut self, index: usize, out: &mut Vec<Command>) -> bool {
        let Some(stage) = self.stages.get_mut(index) else {
            warn!(index, "attempted to fire a stage that does not exist");
            return false;
        };
        if stage.has_fired {
            warn!(stage = %stage.name(), "stage already fired");
            return false;
        }

        stage.has_fired = true;
        info!(
            stage = %stage.name(),
            clock = self.clock.as_secs_f32(),
            "stage fired"
        );
        out.push(Command::AnnounceStage {
            name: stage.name().to_owned(),
        });
        self.start_spawn_loop(index);
        true
    }

    /// Fires the stage at the cursor regardless of the clock.
    pub fn force_advance(&mut self, out: &mut Vec<Command>) {
        if self.cursor >= self.stages.len() {
            debug!("no stage left to force");
            return;
        }
        let _ = self.fire_stage(self.cursor, out);
        self.cursor += 1;
    }

    /// Halts the clock and cancels the active spawn loop.
    pub fn pause(&mut self) {
        self.paused = true;
        self.cancel_spawn_loop();
    }

    /// Unhalts the clock and restarts the most recently fired stage's loop.
    ///
    /// A stage that does not repeat and already finished its wave stays
    /// finished.
    pub fn resume(&mut self) {
        if !self.paused {
            warn!("resume requested while the timeline is running");
            return;
        }
        self.paused = false;

        let Some(index) = self.cursor.checked_sub(1) else {
            return;
        };
        let Some(stage) = self.stages.get(index) else {
            return;
        };
        if stage.waves_exhausted {
            debug!(stage = %stage.name(), "stage has no waves left; not restarting");
        } else if stage.has_fired {
            self.start_spawn_loop(index);
        }
    }

    /// Overrides the clock value; elapsed stages fire on the next check.
    pub fn set_clock(&mut self, clock: Duration) {
        self.clock = clock;
    }

    /// Advances the active spawn loop by `dt` of game time.
    pub fn step_spawn_loop<G>(
        &mut self,
        dt: Duration,
        player: Option<Vec2>,
        ground: &G,
        out: &mut Vec<Command>,
    ) where
        G: GroundProjection + ?Sized,
    {
        let Some(spawn_loop) = self.spawn_loop.as_mut() else {
            return;
        };
        let index = spawn_loop.stage();
        let Some(stage) = self.stages.get(index) else {
            self.spawn_loop = None;
            return;
        };

        match spawn_loop.step(dt, &stage.definition, self.tuning.spawn_delay) {
            LoopStep::Waiting => {}
            LoopStep::Spawn(kind) => self.spawn(kind, player, ground, out),
            LoopStep::Finished => {
                debug!(stage = %stage.name(), "stage does not repeat; spawn loop finished");
                self.spawn_loop = None;
                if let Some(stage) = self.stages.get_mut(index) {
                    stage.waves_exhausted = true;
                }
            }
        }
    }

    /// Current clock value.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Index of the next stage awaiting its trigger.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Reports whether the timeline is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether a spawn loop is active.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        self.spawn_loop.is_some()
    }

    /// Index of the stage owning the active spawn loop.
    #[must_use]
    pub fn active_stage(&self) -> Option<usize> {
        self.spawn_loop.as_ref().map(SpawnLoop::stage)
    }

    /// Number of waves the active spawn loop has begun.
    #[must_use]
    pub fn active_waves(&self) -> Option<u32> {
        self.spawn_loop.as_ref().map(SpawnLoop::waves_started)
    }

    /// Stages in firing order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Sanitized spawn tuning in effect.
    #[must_use]
    pub fn tuning(&self) -> &SpawnTuning {
        &self.tuning
    }

    fn advance_frame<G>(
        &mut self,
        dt: Duration,
        time_scale: f32,
        player: Option<Vec2>,
        ground: &G,
        out: &mut Vec<Command>,
    ) where
        G: GroundProjection + ?Sized,
    {
        self.tick(dt, time_scale);

        if player.is_some() {
            self.check_advance(out);
        }

        if let Some(game_dt) = scaled_delta(dt, time_scale) {
            self.step_spawn_loop(game_dt, player, ground, out);
        }
    }

    fn start_spawn_loop(&mut self, index: usize) {
        if let Some(previous) = self.spawn_loop.replace(SpawnLoop::new(index)) {
            debug!(stage = previous.stage(), "spawn loop superseded");
        }
    }

    fn cancel_spawn_loop(&mut self) {
        if let Some(previous) = self.spawn_loop.take() {
            debug!(stage = previous.stage(), "spawn loop cancelled");
        }
    }

    fn spawn<G>(&mut self, kind: ActorKind, player: Option<Vec2>, ground: &G, out: &mut Vec<Command>)
    where
        G: GroundProjection + ?Sized,
    {
        let Some(reference) = player else {
            warn!(actor = kind.name(), "cannot spawn without a player to spawn around");
            return;
        };

        match resolve_spawn_position(reference, &self.tuning, ground, &mut self.rng) {
            Some(position) => out.push(Command::SpawnActor { kind, position }),
            None => debug!(
                actor = kind.name(),
                attempts = self.tuning.max_attempts,
                "no valid spawn position found; skipping"
            ),
        }
    }
}

fn validate_stage(index: usize, definition: &StageDefinition) {
    if definition.name().trim().is_empty() {
        warn!(index, "stage has no name");
    }
    if definition.groups().is_empty() {
        warn!(index, stage = %definition.name(), "stage has no spawn groups");
        return;
    }
    for group in definition.groups() {
        if group.is_inert() {
            warn!(
                index,
                stage = %definition.name(),
                count = group.count(),
                "spawn group has no actor type or a zero count"
            );
        }
    }
}
