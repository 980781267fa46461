//! Stage configuration loading and validation.
//!
//! Stages are described in a TOML document:
//!
//! ```toml
//! [spawn]
//! min_distance = 20.0
//! max_distance = 25.0
//! sample_tolerance = 5.0
//! max_attempts = 3
//! spawn_delay = 0.05
//!
//! [[stages]]
//! name = "Warm-up"
//! trigger = 0.0
//! repeat_interval = 3.0
//! groups = [{ actor = "cube", count = 5 }]
//! ```
//!
//! Only unreadable or malformed documents are errors. Questionable values are
//! logged and degraded so that the affected stage or group becomes inert.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use nova_arena_core::ActorKind;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const DEFAULT_REPEAT_INTERVAL_SECS: f64 = 3.0;

/// Errors raised while loading a stage configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read from disk.
    #[error("failed to read stage configuration at {}", path.display())]
    Io {
        /// Location of the document.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML or does not match the expected shape.
    #[error("failed to parse stage configuration")]
    Parse(#[from] toml::de::Error),
}

/// Numeric knobs controlling where and how quickly actors spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnTuning {
    /// Inner radius of the spawn annulus around the player.
    pub min_distance: f32,
    /// Outer radius of the spawn annulus around the player.
    pub max_distance: f32,
    /// Maximum distance a candidate may move when projected onto ground.
    pub sample_tolerance: f32,
    /// Candidate positions tried per actor before giving up.
    pub max_attempts: u32,
    /// Game time waited after each individual spawn.
    pub spawn_delay: Duration,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            min_distance: 20.0,
            max_distance: 25.0,
            sample_tolerance: 5.0,
            max_attempts: 3,
            spawn_delay: Duration::from_millis(50),
        }
    }
}

impl SpawnTuning {
    /// Returns a copy with every knob forced into a usable range.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut tuning = self.clone();
        if !tuning.min_distance.is_finite() || tuning.min_distance < 0.0 {
            warn!(value = tuning.min_distance, "invalid minimum spawn distance; using 0");
            tuning.min_distance = 0.0;
        }
        if !tuning.max_distance.is_finite() || tuning.max_distance < tuning.min_distance {
            warn!(
                value = tuning.max_distance,
                minimum = tuning.min_distance,
                "maximum spawn distance below minimum; collapsing annulus"
            );
            tuning.max_distance = tuning.min_distance;
        }
        if !tuning.sample_tolerance.is_finite() || tuning.sample_tolerance < 0.0 {
            warn!(value = tuning.sample_tolerance, "invalid ground sample tolerance; using 0");
            tuning.sample_tolerance = 0.0;
        }
        if tuning.max_attempts == 0 {
            warn!("spawn attempt budget of zero; allowing one attempt");
            tuning.max_attempts = 1;
        }
        tuning
    }
}

/// A `(actor type, count)` pair spawned once per wave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnGroup {
    actor: Option<ActorKind>,
    count: u32,
}

impl SpawnGroup {
    /// Creates a spawn group. A missing actor type makes the group inert.
    #[must_use]
    pub const fn new(actor: Option<ActorKind>, count: u32) -> Self {
        Self { actor, count }
    }

    /// Actor type spawned by the group, if one is configured.
    #[must_use]
    pub const fn actor(&self) -> Option<ActorKind> {
        self.actor
    }

    /// Number of actors spawned per wave.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Reports whether the group never spawns anything.
    #[must_use]
    pub const fn is_inert(&self) -> bool {
        self.actor.is_none() || self.count == 0
    }
}

/// Immutable description of a timed stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageDefinition {
    name: String,
    trigger: Duration,
    repeat_interval: Option<Duration>,
    groups: Vec<SpawnGroup>,
}

impl StageDefinition {
    /// Creates a stage definition.
    ///
    /// A `repeat_interval` of `None`, or of zero, means the stage spawns its
    /// first wave only.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        trigger: Duration,
        repeat_interval: Option<Duration>,
        groups: Vec<SpawnGroup>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger,
            repeat_interval: repeat_interval.filter(|interval| !interval.is_zero()),
            groups,
        }
    }

    /// Display name of the stage.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clock value at which the stage fires.
    #[must_use]
    pub const fn trigger(&self) -> Duration {
        self.trigger
    }

    /// Game time between the end of one wave and the start of the next.
    #[must_use]
    pub const fn repeat_interval(&self) -> Option<Duration> {
        self.repeat_interval
    }

    /// Groups spawned, in order, by every wave.
    #[must_use]
    pub fn groups(&self) -> &[SpawnGroup] {
        &self.groups
    }
}

/// Complete configuration of a stage timeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimelineConfig {
    /// Stage definitions in load order.
    pub stages: Vec<StageDefinition>,
    /// Spawn placement and pacing knobs.
    pub spawn: SpawnTuning,
}

impl TimelineConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let document: RawDocument = toml::from_str(contents)?;
        Ok(document.into_config())
    }

    /// Reads and parses a configuration from the provided path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    spawn: RawSpawn,
    #[serde(default)]
    stages: Vec<RawStage>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSpawn {
    min_distance: f32,
    max_distance: f32,
    sample_tolerance: f32,
    max_attempts: u32,
    spawn_delay: Option<f64>,
}

impl Default for RawSpawn {
    fn default() -> Self {
        let tuning = SpawnTuning::default();
        Self {
            min_distance: tuning.min_distance,
            max_distance: tuning.max_distance,
            sample_tolerance: tuning.sample_tolerance,
            max_attempts: tuning.max_attempts,
            spawn_delay: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    trigger: f64,
    #[serde(default = "default_repeat_interval")]
    repeat_interval: f64,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroup {
    #[serde(default)]
    actor: String,
    #[serde(default)]
    count: u32,
}

fn default_repeat_interval() -> f64 {
    DEFAULT_REPEAT_INTERVAL_SECS
}

impl RawDocument {
    fn into_config(self) -> TimelineConfig {
        TimelineConfig {
            stages: self.stages.into_iter().map(RawStage::into_definition).collect(),
            spawn: self.spawn.into_tuning(),
        }
    }
}

impl RawSpawn {
    fn into_tuning(self) -> SpawnTuning {
        let spawn_delay = match self.spawn_delay {
            None => SpawnTuning::default().spawn_delay,
            Some(value) => seconds(value).unwrap_or_else(|| {
                warn!(value, "invalid spawn delay; using 0");
                Duration::ZERO
            }),
        };
        SpawnTuning {
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            sample_tolerance: self.sample_tolerance,
            max_attempts: self.max_attempts,
            spawn_delay,
        }
    }
}

impl RawStage {
    fn into_definition(self) -> StageDefinition {
        let trigger = seconds(self.trigger).unwrap_or_else(|| {
            warn!(stage = %self.name, value = self.trigger, "invalid trigger timestamp; using 0");
            Duration::ZERO
        });

        let repeat_interval = seconds(self.repeat_interval).filter(|interval| !interval.is_zero());
        if repeat_interval.is_none() {
            warn!(
                stage = %self.name,
                value = self.repeat_interval,
                "non-positive repeat interval; stage will spawn a single wave"
            );
        }

        let name = self.name;
        let groups = self
            .groups
            .into_iter()
            .map(|group| {
                let actor = ActorKind::from_name(&group.actor);
                if actor.is_none() {
                    warn!(stage = %name, actor = %group.actor, "unknown actor type; group is inert");
                }
                SpawnGroup::new(actor, group.count)
            })
            .collect();

        StageDefinition::new(name, trigger, repeat_interval, groups)
    }
}

fn seconds(value: f64) -> Option<Duration> {
    if value.is_finite() && value >= 0.0 {
        Duration::try_from_secs_f64(value).ok()
    } else {
        None
    }
}
