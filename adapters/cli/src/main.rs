#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Nova Arena session.

mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use nova_arena_system_stage_timeline::config::TimelineConfig;
use nova_arena_world::{query, World};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::session::Session;

const BUNDLED_STAGES: &str = include_str!("../assets/stages.toml");
const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Headless arena session runner.
#[derive(Debug, Parser)]
#[command(name = "nova-arena", version, about = "Run a headless Nova Arena session")]
struct Args {
    /// Stage timeline document; the bundled timeline is used when omitted.
    #[arg(long, value_name = "PATH")]
    stages: Option<PathBuf>,

    /// Game time to simulate, in seconds.
    #[arg(long, default_value_t = 60.0)]
    duration: f32,

    /// Real time per simulated frame, in milliseconds.
    #[arg(long, default_value_t = 16)]
    step_ms: u64,

    /// Seed shared by the spawn and obstacle generators.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Destroy the oldest actor every this many seconds of game time.
    #[arg(long, value_name = "SECS")]
    kill_every: Option<f32>,

    /// Fire this many stages immediately after the session starts.
    #[arg(long, default_value_t = 0)]
    force_stages: usize,

    /// Print the final summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Nova Arena command-line interface.
fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = load_stages(args.stages.as_ref())?;
    let duration = seconds(args.duration).context("--duration must be a non-negative number")?;
    if args.step_ms == 0 {
        bail!("--step-ms must be positive");
    }
    let step = Duration::from_millis(args.step_ms);
    let kill_every = args
        .kill_every
        .map(|value| seconds(value).context("--kill-every must be a non-negative number"))
        .transpose()?;

    info!("{}", query::welcome_banner(&World::new()));
    info!(
        stages = config.stages.len(),
        seed = args.seed,
        duration = duration.as_secs_f32(),
        "starting session"
    );

    let mut session = Session::new(config, args.seed, kill_every);
    session.start();
    for _ in 0..args.force_stages {
        session.force_advance();
    }

    let mut next_report = PROGRESS_INTERVAL;
    let mut frames: u64 = 0;
    while session.elapsed() < duration {
        session.step(step);
        frames += 1;
        if session.summary().game_over {
            break;
        }
        if session.elapsed() >= next_report {
            next_report = next_report.saturating_add(PROGRESS_INTERVAL);
            let summary = session.summary();
            debug!(
                elapsed = session.elapsed().as_secs_f32(),
                alive = summary.actors_alive,
                kills = summary.kills,
                waves = ?session.active_waves(),
                "progress"
            );
        }
    }

    let summary = session.summary();
    info!(frames, "session finished");
    if args.json {
        let report = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{report}");
    } else {
        println!("{}", summary.stage_text);
        println!("elapsed:        {:.2}s", summary.elapsed_secs);
        println!("actors spawned: {}", summary.actors_spawned);
        println!("actors alive:   {}", summary.actors_alive);
        println!("kills:          {}", summary.kills);
        println!("novas:          {}", summary.novas_unleashed);
        println!("dashes:         {}", summary.dashes);
        println!("obstacles:      {}", summary.obstacles_active);
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_stages(path: Option<&PathBuf>) -> Result<TimelineConfig> {
    match path {
        Some(path) => TimelineConfig::from_path(path)
            .with_context(|| format!("failed to load stages from {}", path.display())),
        None => TimelineConfig::from_toml_str(BUNDLED_STAGES).context("bundled stages are invalid"),
    }
}

fn seconds(value: f32) -> Option<Duration> {
    if value.is_finite() && value >= 0.0 {
        Duration::try_from_secs_f32(value).ok()
    } else {
        None
    }
}
