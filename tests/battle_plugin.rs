//! Headless integration tests for [`SimulationPlugin`].
//!
//! These tests use [`MinimalPlugins`] with a manual 16 ms clock, so every
//! `app.update()` is one deterministic battle frame.
//!
//! Covered scenarios:
//! 1. Startup builds the battle and recorder from the match definition.
//! 2. A named mission replaces the definition.
//! 3. Pausing freezes the battle and the recording; replay then plays back.
//! 4. Battle events surface as `BattleCue` messages.
//! 5. A decided battle is reported once through `MatchEnded`.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use skirmish::battle::{Battle, BattleEvent, BattleOutcome};
use skirmish::config::MatchDefinition;
use skirmish::input::{PilotInputs, ShipInput};
use skirmish::recorder::Recorder;
use skirmish::simulation::{
    BattleCue, MatchEnded, ReplayCommand, ReplayFinished, SelectedMission, SessionCommand,
    SimulationPlugin,
};
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Collected messages, filled by [`collect_messages`].
#[derive(Resource, Default)]
struct Seen {
    cues: Vec<BattleEvent>,
    ended: Vec<BattleOutcome>,
    replays_finished: usize,
}

fn collect_messages(
    mut seen: ResMut<Seen>,
    mut cues: MessageReader<BattleCue>,
    mut ended: MessageReader<MatchEnded>,
    mut finished: MessageReader<ReplayFinished>,
) {
    seen.cues.extend(cues.read().map(|cue| cue.0));
    seen.ended.extend(ended.read().map(|e| e.outcome));
    seen.replays_finished += finished.read().count();
}

/// A small match: one human, one AI on each side, no asteroids.
fn small_match() -> MatchDefinition {
    MatchDefinition {
        human_allies: 1,
        ai_allies: 1,
        ai_enemies: 1,
        asteroid_count: 0,
        ..Default::default()
    }
}

fn app_with(definition: MatchDefinition) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app.insert_resource(definition);
    app.init_resource::<Seen>();
    app.add_plugins(SimulationPlugin);
    app.add_systems(PostUpdate, collect_messages);
    app
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn startup_builds_battle_from_definition() {
    let mut app = app_with(small_match());
    app.update();
    let battle = app.world().resource::<Battle>();
    assert_eq!(battle.ships.capacity(), 3);
    assert_eq!(battle.outcome, BattleOutcome::Ongoing);
    assert!(app.world().get_resource::<Recorder>().is_some());
}

#[test]
fn battle_advances_every_frame() {
    let mut app = app_with(small_match());
    run(&mut app, 20);
    let battle = app.world().resource::<Battle>();
    assert!(battle.clock > 0.0);
    assert!(app.world().resource::<Recorder>().available() > 0, "frames recorded while running");
}

#[test]
fn selected_mission_overrides_definition() {
    let mut app = app_with(small_match());
    app.insert_resource(SelectedMission(Some("Dogfight".into())));
    app.update();
    let battle = app.world().resource::<Battle>();
    assert_eq!(battle.ships.capacity(), 2, "one human and one raider");
}

#[test]
fn unknown_mission_falls_back_to_definition() {
    let mut app = app_with(small_match());
    app.insert_resource(SelectedMission(Some("No such mission".into())));
    app.update();
    assert_eq!(app.world().resource::<Battle>().ships.capacity(), 3);
}

#[test]
fn pause_freezes_battle_and_recording() {
    let mut app = app_with(small_match());
    run(&mut app, 10);
    app.world_mut().write_message(SessionCommand::Pause);
    run(&mut app, 120);

    let clock = app.world().resource::<Battle>().clock;
    let frames = app.world().resource::<Recorder>().available();
    run(&mut app, 10);
    let battle = app.world().resource::<Battle>();
    assert!(battle.is_paused());
    assert_eq!(battle.clock, clock);
    assert_eq!(app.world().resource::<Recorder>().available(), frames);

    app.world_mut().write_message(SessionCommand::Resume);
    run(&mut app, 60);
    assert!(app.world().resource::<Battle>().clock > clock);
    assert!(app.world().resource::<Recorder>().recording);
}

#[test]
fn replay_plays_back_and_reports_completion() {
    let mut app = app_with(small_match());
    run(&mut app, 10);
    app.world_mut().write_message(SessionCommand::Pause);
    run(&mut app, 5);

    let frames = app.world().resource::<Recorder>().available();
    app.world_mut().write_message(ReplayCommand::Playback { speed: 1.0 });
    app.update();
    assert!(app.world().resource::<Recorder>().is_playing());

    run(&mut app, frames + 2);
    assert!(!app.world().resource::<Recorder>().is_playing());
    assert_eq!(app.world().resource::<Seen>().replays_finished, 1);
}

#[test]
fn scrub_restores_oldest_frame() {
    let mut app = app_with(small_match());
    app.update();
    let start = app.world().resource::<Battle>().ships.ships[0].agent.position;
    run(&mut app, 30);
    app.world_mut().write_message(SessionCommand::Pause);
    app.update();

    app.world_mut().write_message(ReplayCommand::Scrub { frame: 0 });
    app.update();
    let battle = app.world().resource::<Battle>();
    let restored = battle.ships.ships[0].agent.position;
    assert!(restored.distance(start) < battle.tuning.max_speed * 2.0);
}

#[test]
fn shooting_emits_shot_cues() {
    let mut app = app_with(small_match());
    app.world_mut()
        .resource_mut::<PilotInputs>()
        .set(0, ShipInput { shooting: true, ..Default::default() });
    run(&mut app, 30);
    let seen = app.world().resource::<Seen>();
    assert!(seen
        .cues
        .iter()
        .any(|cue| matches!(cue, BattleEvent::ShotFired { ship: 0, .. })));
}

#[test]
fn decided_match_is_reported_once() {
    let mut app = app_with(MatchDefinition {
        human_allies: 1,
        ai_allies: 0,
        ai_enemies: 0,
        asteroid_count: 0,
        ..Default::default()
    });
    run(&mut app, 5);
    let seen = app.world().resource::<Seen>();
    assert_eq!(seen.ended, vec![BattleOutcome::Victory]);
}
