use std::time::Duration;

use glam::Vec2;
use nova_arena_core::{ActorKind, Command, Event, GroundProjection};
use nova_arena_system_stage_timeline::{
    config::{SpawnGroup, SpawnTuning, StageDefinition, TimelineConfig},
    StageTimeline, INITIAL_STAGE_NAME,
};

const FRAME: Duration = Duration::from_millis(100);

struct OpenField;

impl GroundProjection for OpenField {
    fn project(&self, sample: Vec2, _tolerance: f32) -> Option<Vec2> {
        Some(sample)
    }
}

fn stage(name: &str, trigger_secs: u64, units: u32, interval_secs: u64) -> StageDefinition {
    StageDefinition::new(
        name,
        Duration::from_secs(trigger_secs),
        Some(Duration::from_secs(interval_secs)),
        vec![SpawnGroup::new(Some(ActorKind::Cube), units)],
    )
}

fn timeline(stages: Vec<StageDefinition>) -> StageTimeline {
    StageTimeline::new(
        TimelineConfig {
            stages,
            spawn: SpawnTuning::default(),
        },
        0x5eed_1234,
    )
}

fn frame(timeline: &mut StageTimeline, dt: Duration, commands: &mut Vec<Command>) {
    timeline.handle(
        &[Event::TimeAdvanced { dt, time_scale: 1.0 }],
        Some(Vec2::ZERO),
        &OpenField,
        commands,
    );
}

fn announcements(commands: &[Command]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::AnnounceStage { name } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn spawn_count(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, Command::SpawnActor { .. }))
        .count()
}

#[test]
fn two_stage_scenario_spawns_and_advances() {
    let mut timeline = timeline(vec![stage("First", 0, 3, 5), stage("Second", 10, 3, 5)]);
    let mut commands = Vec::new();

    frame(&mut timeline, Duration::ZERO, &mut commands);
    assert_eq!(announcements(&commands), vec!["First"]);
    assert_eq!(spawn_count(&commands), 1, "first unit spawns on the firing frame");

    frame(&mut timeline, FRAME, &mut commands);
    frame(&mut timeline, FRAME, &mut commands);
    assert_eq!(spawn_count(&commands), 3, "one unit per inter-spawn delay");

    for _ in 3..100 {
        frame(&mut timeline, FRAME, &mut commands);
    }
    assert_eq!(timeline.cursor(), 1);
    assert_eq!(spawn_count(&commands), 6, "first stage repeated its wave");
    assert_eq!(timeline.active_waves(), Some(2));

    frame(&mut timeline, FRAME, &mut commands);
    assert_eq!(timeline.clock(), Duration::from_secs(10));
    assert_eq!(announcements(&commands), vec!["First", "Second"]);
    assert_eq!(timeline.cursor(), 2);
    assert_eq!(timeline.active_stage(), Some(1));
    assert_eq!(spawn_count(&commands), 7);
}

#[test]
fn stages_fire_in_trigger_order_regardless_of_load_order() {
    let mut timeline = timeline(vec![
        stage("Late", 5, 1, 1),
        stage("Early", 1, 1, 1),
        stage("Middle", 3, 1, 1),
    ]);
    let names: Vec<_> = timeline.stages().iter().map(|stage| stage.name()).collect();
    assert_eq!(names, vec!["Early", "Middle", "Late"]);

    let mut commands = Vec::new();
    timeline.set_clock(Duration::from_secs(10));
    timeline.check_advance(&mut commands);
    assert_eq!(announcements(&commands), vec!["Early", "Middle", "Late"]);
}

#[test]
fn stages_sharing_a_trigger_keep_load_order() {
    let timeline = timeline(vec![stage("A", 2, 1, 1), stage("B", 2, 1, 1), stage("C", 1, 1, 1)]);
    let names: Vec<_> = timeline.stages().iter().map(|stage| stage.name()).collect();
    assert_eq!(names, vec!["C", "A", "B"]);
}

#[test]
fn stages_never_fire_before_their_trigger() {
    let mut timeline = timeline(vec![stage("Only", 2, 1, 1)]);
    let mut commands = Vec::new();
    for _ in 0..19 {
        frame(&mut timeline, FRAME, &mut commands);
    }
    assert!(announcements(&commands).is_empty());
    assert!(!timeline.stages()[0].has_fired());

    frame(&mut timeline, FRAME, &mut commands);
    assert_eq!(announcements(&commands), vec!["Only"]);
    assert!(timeline.stages()[0].has_fired());
}

#[test]
fn clock_jump_fires_every_elapsed_stage_in_one_frame() {
    let mut timeline = timeline(vec![
        stage("One", 1, 2, 1),
        stage("Two", 2, 2, 1),
        stage("Three", 3, 2, 1),
        stage("Four", 90, 2, 1),
    ]);
    let mut commands = Vec::new();
    frame(&mut timeline, Duration::from_secs(60), &mut commands);

    assert_eq!(announcements(&commands), vec!["One", "Two", "Three"]);
    assert_eq!(timeline.cursor(), 3);
    assert_eq!(timeline.active_stage(), Some(2), "last fired stage owns the loop");
    assert_eq!(spawn_count(&commands), 1, "one spawn action per frame step");
}

#[test]
fn stages_fire_at_most_once() {
    let mut timeline = timeline(vec![stage("Once", 0, 1, 1)]);
    let mut commands = Vec::new();

    assert!(timeline.fire_stage(0, &mut commands));
    assert!(!timeline.fire_stage(0, &mut commands));
    assert!(!timeline.fire_stage(7, &mut commands));
    assert_eq!(announcements(&commands), vec!["Once"]);
}

#[test]
fn forcing_twice_fires_both_stages_without_touching_the_clock() {
    let mut timeline = timeline(vec![stage("First", 30, 1, 1), stage("Second", 60, 1, 1)]);
    let mut commands = Vec::new();

    timeline.force_advance(&mut commands);
    timeline.force_advance(&mut commands);

    assert_eq!(announcements(&commands), vec!["First", "Second"]);
    assert_eq!(timeline.cursor(), 2);
    assert_eq!(timeline.clock(), Duration::ZERO);

    timeline.force_advance(&mut commands);
    assert_eq!(timeline.cursor(), 2, "forcing past the end is a no-op");
    assert_eq!(announcements(&commands).len(), 2);
}

#[test]
fn forced_stages_are_not_refired_by_the_clock() {
    let mut timeline = timeline(vec![stage("First", 1, 1, 1), stage("Second", 2, 1, 1)]);
    let mut commands = Vec::new();
    timeline.force_advance(&mut commands);
    frame(&mut timeline, Duration::from_secs(5), &mut commands);
    assert_eq!(announcements(&commands), vec!["First", "Second"]);
}

#[test]
fn pause_holds_the_clock_exactly() {
    let mut timeline = timeline(vec![stage("First", 0, 50, 1), stage("Second", 5, 1, 1)]);
    let mut commands = Vec::new();
    for _ in 0..7 {
        frame(&mut timeline, FRAME, &mut commands);
    }
    let before = timeline.clock();
    let spawned = spawn_count(&commands);

    timeline.pause();
    assert!(timeline.is_paused());
    assert!(!timeline.is_spawning());
    for _ in 0..1000 {
        frame(&mut timeline, FRAME, &mut commands);
    }
    assert_eq!(timeline.clock(), before);
    assert_eq!(spawn_count(&commands), spawned);
    assert_eq!(timeline.cursor(), 1);

    timeline.resume();
    assert!(!timeline.is_paused());
    assert_eq!(timeline.active_stage(), Some(0), "resume restarts the last fired stage");
    assert_eq!(timeline.clock(), before);
}

#[test]
fn resume_before_any_stage_fired_starts_no_loop() {
    let mut timeline = timeline(vec![stage("Later", 5, 1, 1)]);
    timeline.pause();
    timeline.resume();
    assert!(!timeline.is_spawning());
}

#[test]
fn resume_while_running_is_ignored() {
    let mut timeline = timeline(vec![stage("First", 0, 5, 1)]);
    let mut commands = Vec::new();
    frame(&mut timeline, Duration::ZERO, &mut commands);
    frame(&mut timeline, FRAME, &mut commands);
    let spawned = spawn_count(&commands);

    timeline.resume();
    frame(&mut timeline, Duration::ZERO, &mut commands);
    assert_eq!(
        spawn_count(&commands),
        spawned,
        "a running loop is not restarted from its first unit"
    );
}

#[test]
fn frozen_time_scale_stops_clock_and_spawning() {
    let mut timeline = timeline(vec![stage("First", 0, 5, 1)]);
    let mut commands = Vec::new();
    frame(&mut timeline, Duration::ZERO, &mut commands);
    let spawned = spawn_count(&commands);

    for _ in 0..10 {
        timeline.handle(
            &[Event::TimeAdvanced {
                dt: FRAME,
                time_scale: 0.0,
            }],
            Some(Vec2::ZERO),
            &OpenField,
            &mut commands,
        );
    }
    assert_eq!(timeline.clock(), Duration::ZERO);
    assert_eq!(spawn_count(&commands), spawned);
}

#[test]
fn missing_player_suspends_stage_advance_and_spawning() {
    let mut timeline = timeline(vec![stage("First", 0, 5, 1)]);
    let mut commands = Vec::new();
    for _ in 0..10 {
        timeline.handle(
            &[Event::TimeAdvanced {
                dt: FRAME,
                time_scale: 1.0,
            }],
            None,
            &OpenField,
            &mut commands,
        );
    }
    assert!(commands.is_empty());
    assert_eq!(timeline.cursor(), 0);
    assert_eq!(timeline.clock(), Duration::from_secs(1));

    frame(&mut timeline, FRAME, &mut commands);
    assert_eq!(announcements(&commands), vec!["First"]);
    assert_eq!(spawn_count(&commands), 1);
}

#[test]
fn single_wave_stage_stops_spawning() {
    let mut timeline = timeline(vec![StageDefinition::new(
        "Burst",
        Duration::ZERO,
        None,
        vec![SpawnGroup::new(Some(ActorKind::Sphere), 2)],
    )]);
    let mut commands = Vec::new();
    for _ in 0..50 {
        frame(&mut timeline, FRAME, &mut commands);
    }
    assert_eq!(spawn_count(&commands), 2);
    assert!(!timeline.is_spawning());
}

#[test]
fn empty_timeline_is_inert() {
    let mut timeline = timeline(Vec::new());
    let mut commands = Vec::new();
    for _ in 0..10 {
        frame(&mut timeline, FRAME, &mut commands);
    }
    timeline.force_advance(&mut commands);
    assert!(commands.is_empty());
}

#[test]
fn session_reset_rewinds_and_replays_identically() {
    let mut timeline = timeline(vec![
        stage("First", 0, 3, 1),
        stage("Second", 2, 2, 1),
        stage("Third", 4, 4, 2),
    ]);

    let run = |timeline: &mut StageTimeline| {
        let mut commands = Vec::new();
        for _ in 0..80 {
            frame(timeline, FRAME, &mut commands);
        }
        commands
    };

    let first = run(&mut timeline);
    assert_eq!(timeline.cursor(), 3);

    let mut reset = Vec::new();
    timeline.handle(&[Event::SessionReset], Some(Vec2::ZERO), &OpenField, &mut reset);
    assert_eq!(
        reset,
        vec![Command::AnnounceStage {
            name: INITIAL_STAGE_NAME.to_owned()
        }]
    );
    assert_eq!(timeline.clock(), Duration::ZERO);
    assert_eq!(timeline.cursor(), 0);
    assert!(!timeline.is_spawning());
    assert!(timeline.stages().iter().all(|stage| !stage.has_fired()));

    let second = run(&mut timeline);
    assert_eq!(first, second);
}

#[test]
fn reset_is_idempotent() {
    let mut timeline = timeline(vec![stage("First", 0, 1, 1)]);
    let mut commands = Vec::new();
    timeline.reset(&mut commands);
    timeline.reset(&mut commands);
    assert_eq!(timeline.clock(), Duration::ZERO);
    assert_eq!(announcements(&commands), vec![INITIAL_STAGE_NAME, INITIAL_STAGE_NAME]);
}

#[test]
fn pause_events_suspend_and_restart_the_last_stage() {
    let mut timeline = timeline(vec![stage("First", 0, 5, 1)]);
    let mut commands = Vec::new();
    frame(&mut timeline, FRAME, &mut commands);
    frame(&mut timeline, FRAME, &mut commands);
    assert_eq!(spawn_count(&commands), 2);

    timeline.handle(
        &[Event::PauseChanged { paused: true }],
        Some(Vec2::ZERO),
        &OpenField,
        &mut commands,
    );
    assert!(timeline.is_paused());
    assert!(!timeline.is_spawning());

    timeline.handle(
        &[Event::PauseChanged { paused: false }],
        Some(Vec2::ZERO),
        &OpenField,
        &mut commands,
    );
    assert!(!timeline.is_paused());
    assert_eq!(timeline.active_waves(), Some(1), "the wave restarts from its first unit");
    frame(&mut timeline, Duration::ZERO, &mut commands);
    assert_eq!(spawn_count(&commands), 3);
}

#[test]
fn decimal_trigger_fires_on_the_frame_that_reaches_it() {
    let config = TimelineConfig::from_toml_str(
        r#"
        [[stages]]
        name = "Tenths"
        trigger = 0.3
        groups = [{ actor = "cube", count = 1 }]
        "#,
    )
    .expect("valid document");
    let mut timeline = StageTimeline::new(config, 3);
    let mut commands = Vec::new();

    frame(&mut timeline, FRAME, &mut commands);
    frame(&mut timeline, FRAME, &mut commands);
    assert_eq!(timeline.cursor(), 0);

    frame(&mut timeline, FRAME, &mut commands);
    assert_eq!(timeline.clock(), Duration::from_millis(300));
    assert_eq!(timeline.cursor(), 1);
    assert_eq!(announcements(&commands), vec!["Tenths"]);
}

#[test]
fn resuming_a_finished_single_wave_stage_spawns_nothing() {
    let mut timeline = timeline(vec![StageDefinition::new(
        "Burst",
        Duration::ZERO,
        None,
        vec![SpawnGroup::new(Some(ActorKind::Sphere), 2)],
    )]);
    let mut commands = Vec::new();
    for _ in 0..20 {
        frame(&mut timeline, FRAME, &mut commands);
    }
    assert_eq!(spawn_count(&commands), 2);
    assert!(timeline.stages()[0].waves_exhausted());

    for _ in 0..3 {
        timeline.pause();
        timeline.resume();
        assert!(!timeline.is_spawning());
        for _ in 0..20 {
            frame(&mut timeline, FRAME, &mut commands);
        }
    }
    assert_eq!(spawn_count(&commands), 2);

    timeline.reset(&mut commands);
    assert!(!timeline.stages()[0].waves_exhausted());
}

#[test]
fn clock_and_spawn_loop_share_scaled_game_time() {
    let mut timeline = timeline(vec![stage("Slow", 1, 3, 1)]);
    let mut commands = Vec::new();
    for _ in 0..10 {
        timeline.handle(
            &[Event::TimeAdvanced {
                dt: FRAME,
                time_scale: 0.5,
            }],
            Some(Vec2::ZERO),
            &OpenField,
            &mut commands,
        );
    }
    assert_eq!(timeline.clock(), Duration::from_millis(500));
    assert!(announcements(&commands).is_empty());
}

#[test]
fn non_finite_time_scales_freeze_instead_of_panicking() {
    let mut timeline = timeline(vec![stage("First", 0, 5, 1)]);
    let mut commands = Vec::new();
    frame(&mut timeline, Duration::ZERO, &mut commands);
    let spawned = spawn_count(&commands);

    for time_scale in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
        timeline.handle(
            &[Event::TimeAdvanced {
                dt: FRAME,
                time_scale,
            }],
            Some(Vec2::ZERO),
            &OpenField,
            &mut commands,
        );
    }
    assert_eq!(timeline.clock(), Duration::ZERO);
    assert_eq!(spawn_count(&commands), spawned);
}
