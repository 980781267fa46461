//! Kill bookkeeping and the charge meters it feeds.

use nova_arena_core::{ActorKind, Event};

use crate::ArenaConfig;

/// Kill counters and the Nova and dash charge meters.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tally {
    pub(crate) kills: u32,
    pub(crate) spawned: u32,
    pub(crate) novas_unleashed: u32,
    pub(crate) dashes: u32,
    nova_charge: u32,
    nova_ready: bool,
    dash_charge: u32,
}

impl Tally {
    /// Credits a kill, charging the Nova and dash meters as appropriate.
    ///
    /// Kills after game over still feed the dash meter but are no longer
    /// counted toward the score or the Nova.
    pub(crate) fn record_kill(
        &mut self,
        kind: ActorKind,
        by_nova: bool,
        game_over: bool,
        config: &ArenaConfig,
        out_events: &mut Vec<Event>,
    ) {
        self.charge_dash(kind, config, out_events);

        if game_over {
            return;
        }

        self.kills = self.kills.saturating_add(1);
        if self.nova_ready || by_nova {
            return;
        }

        self.nova_charge = self.nova_charge.saturating_add(1);
        if self.nova_charge >= config.nova_kills_threshold {
            self.nova_ready = true;
            out_events.push(Event::NovaReady);
        }
    }

    /// Empties the Nova meter, reporting whether a blast was available.
    pub(crate) fn take_nova(&mut self) -> bool {
        if !self.nova_ready {
            return false;
        }
        self.nova_ready = false;
        self.nova_charge = 0;
        self.novas_unleashed = self.novas_unleashed.saturating_add(1);
        true
    }

    /// Empties the dash meter, reporting whether it was full.
    pub(crate) fn take_dash(&mut self, config: &ArenaConfig) -> bool {
        if !self.dash_ready(config) {
            return false;
        }
        self.dash_charge = 0;
        self.dashes = self.dashes.saturating_add(1);
        true
    }

    pub(crate) fn nova_ready(&self) -> bool {
        self.nova_ready
    }

    pub(crate) fn nova_fill(&self, config: &ArenaConfig) -> f32 {
        fill(self.nova_charge, config.nova_kills_threshold)
    }

    pub(crate) fn dash_ready(&self, config: &ArenaConfig) -> bool {
        self.dash_charge >= config.cube_kills_needed
    }

    pub(crate) fn dash_fill(&self, config: &ArenaConfig) -> f32 {
        fill(self.dash_charge, config.cube_kills_needed)
    }

    fn charge_dash(&mut self, kind: ActorKind, config: &ArenaConfig, out_events: &mut Vec<Event>) {
        let was_ready = self.dash_ready(config);
        let value = dash_value(kind, config);
        self.dash_charge = self
            .dash_charge
            .saturating_add(value)
            .min(config.cube_kills_needed);
        if !was_ready && self.dash_ready(config) {
            out_events.push(Event::DashReady);
        }
    }
}

/// Dash charge granted by destroying an actor of the provided kind.
fn dash_value(kind: ActorKind, config: &ArenaConfig) -> u32 {
    match kind {
        ActorKind::Cube => 1,
        ActorKind::Sphere => config
            .cube_kills_needed
            .checked_div(config.sphere_kills_needed)
            .unwrap_or(0),
    }
}

fn fill(charge: u32, threshold: u32) -> f32 {
    if threshold == 0 {
        return 0.0;
    }
    (charge as f32 / threshold as f32).min(1.0)
}
