//! Dash timing: a short invincible burst followed by a cooldown.

use std::time::Duration;

/// Phase of the player's dash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum DashPhase {
    /// A dash may start once the meter is full.
    #[default]
    Idle,
    /// The player is dashing and cannot be touched.
    Dashing { remaining: Duration },
    /// The dash ended and another may not start yet.
    Cooldown { remaining: Duration },
}

impl DashPhase {
    pub(crate) fn is_idle(self) -> bool {
        self == Self::Idle
    }

    pub(crate) fn is_dashing(self) -> bool {
        matches!(self, Self::Dashing { .. })
    }

    /// Advances the phase by `dt` of game time.
    ///
    /// At most one transition happens per call; leftover time is dropped.
    pub(crate) fn advance(self, dt: Duration, cooldown: Duration) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Dashing { remaining } => {
                let remaining = remaining.saturating_sub(dt);
                if !remaining.is_zero() {
                    Self::Dashing { remaining }
                } else if cooldown.is_zero() {
                    Self::Idle
                } else {
                    Self::Cooldown {
                        remaining: cooldown,
                    }
                }
            }
            Self::Cooldown { remaining } => {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    Self::Idle
                } else {
                    Self::Cooldown { remaining }
                }
            }
        }
    }
}
