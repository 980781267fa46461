//! Cooperative per-stage spawn loop.

use std::time::Duration;

use nova_arena_core::ActorKind;

use crate::config::{SpawnGroup, StageDefinition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Spawning the unit at `unit` within `group` of the current wave.
    Wave { group: usize, unit: u32 },
    /// Waiting out the stage's repeat interval.
    Interval,
}

/// Outcome of a single loop step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoopStep {
    /// The loop is suspended until its wait elapses.
    Waiting,
    /// One actor of the provided kind should spawn now.
    Spawn(ActorKind),
    /// The stage does not repeat and its only wave is done.
    Finished,
}

/// Resumable spawn task for one fired stage.
///
/// The loop performs at most one action per step. A wait that elapses by more
/// than the step delta does not carry the overshoot into the next wait.
#[derive(Clone, Debug)]
pub(crate) struct SpawnLoop {
    stage: usize,
    phase: Phase,
    wait: Duration,
    waves_started: u32,
}

impl SpawnLoop {
    pub(crate) fn new(stage: usize) -> Self {
        Self {
            stage,
            phase: Phase::Wave { group: 0, unit: 0 },
            wait: Duration::ZERO,
            waves_started: 1,
        }
    }

    /// Index of the stage this loop spawns for.
    pub(crate) fn stage(&self) -> usize {
        self.stage
    }

    /// Number of waves begun, including the one in progress.
    pub(crate) fn waves_started(&self) -> u32 {
        self.waves_started
    }

    pub(crate) fn step(
        &mut self,
        dt: Duration,
        definition: &StageDefinition,
        spawn_delay: Duration,
    ) -> LoopStep {
        if !self.wait.is_zero() {
            self.wait = self.wait.saturating_sub(dt);
            if !self.wait.is_zero() {
                return LoopStep::Waiting;
            }
        }

        if self.phase == Phase::Interval {
            self.phase = Phase::Wave { group: 0, unit: 0 };
            self.waves_started = self.waves_started.saturating_add(1);
        }

        let Phase::Wave { group, unit } = self.phase else {
            return LoopStep::Waiting;
        };

        if let Some((group, unit, kind)) = next_unit(definition.groups(), group, unit) {
            self.phase = Phase::Wave {
                group,
                unit: unit + 1,
            };
            self.wait = spawn_delay;
            return LoopStep::Spawn(kind);
        }

        match definition.repeat_interval() {
            Some(interval) => {
                self.phase = Phase::Interval;
                self.wait = interval;
                LoopStep::Waiting
            }
            None => LoopStep::Finished,
        }
    }
}

/// Locates the next spawnable unit at or after `(group, unit)`, skipping
/// inert groups.
fn next_unit(groups: &[SpawnGroup], mut group: usize, mut unit: u32) -> Option<(usize, u32, ActorKind)> {
    while let Some(candidate) = groups.get(group) {
        if let Some(kind) = candidate.actor() {
            if unit < candidate.count() {
                return Some((group, unit, kind));
            }
        }
        group += 1;
        unit = 0;
    }
    None
}
