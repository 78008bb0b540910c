//! Simulation plugin and systems for Bevy ECS
//!
//! The whole battle lives in one [`Battle`] resource and advances from a
//! single chained system set, so each phase has exactly one writer:
//!
//! 1. copy a changed [`Tuning`] into the running battle
//! 2. tick the battle with the frame's [`PilotInputs`]
//! 3. apply pause/resume commands
//! 4. record or play back a frame
//! 5. apply replay (photo mode) commands
//! 6. forward battle events as [`BattleCue`] messages
//! 7. report the outcome once

use crate::battle::{Battle, BattleEvent, BattleOutcome};
use crate::config::{load_tuning_config, MatchDefinition, Tuning};
use crate::input::PilotInputs;
use crate::missions::{load_mission_catalog, MissionCatalog};
use crate::recorder::{Recorder, RecorderStatus};
use crate::ship::Statistics;
use bevy::prelude::*;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Tuning>()
            .init_resource::<MatchDefinition>()
            .init_resource::<PilotInputs>()
            .init_resource::<MissionCatalog>()
            .init_resource::<SelectedMission>()
            .add_message::<BattleCue>()
            .add_message::<SessionCommand>()
            .add_message::<ReplayCommand>()
            .add_message::<ReplayFinished>()
            .add_message::<MatchEnded>()
            .add_systems(
                Startup,
                (load_tuning_config, load_mission_catalog, start_battle_system).chain(),
            )
            .add_systems(
                Update,
                (
                    sync_tuning_system,
                    battle_tick_system,
                    session_command_system,
                    recorder_tick_system,
                    replay_command_system,
                    battle_cue_system,
                    match_outcome_system,
                )
                    .chain(),
            );
    }
}

/// Mission to start instead of the plain [`MatchDefinition`] resource.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedMission(pub Option<String>);

/// A battle event for audio, camera shake or HUD feedback.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct BattleCue(pub BattleEvent);

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Slow the battle to a stop and freeze the recording for replay.
    Pause,
    Resume,
}

/// Photo-mode controls, honoured while the battle is paused.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum ReplayCommand {
    Playback { speed: f32 },
    Stop,
    /// Show one recorded frame, 0 being the oldest.
    Scrub { frame: usize },
    /// Flip trail visibility for a side bit (1 allies, 2 enemies).
    ToggleTrailSide(u8),
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayFinished;

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct MatchEnded {
    pub outcome: BattleOutcome,
    /// Statistics of the first human pilot, if there was one.
    pub statistics: Option<Statistics>,
    /// Battle time in milliseconds.
    pub clock: f32,
}

/// Build the battle and its recorder from the selected mission, or from the
/// [`MatchDefinition`] resource when no mission is selected or found.
pub fn start_battle_system(
    mut commands: Commands,
    definition: Res<MatchDefinition>,
    tuning: Res<Tuning>,
    catalog: Res<MissionCatalog>,
    selected: Res<SelectedMission>,
) {
    let definition = match selected.0.as_deref() {
        Some(name) => match catalog.find(name) {
            Ok(mission) => {
                info!("Starting mission '{}': {}", mission.name, mission.description);
                mission.definition.clone()
            }
            Err(err) => {
                warn!("{err}; starting the default match");
                definition.clone()
            }
        },
        None => definition.clone(),
    };

    let mut recorder = Recorder::new(tuning.record_frame_count);
    recorder.set_recording(tuning.recorder_active);
    commands.insert_resource(Battle::new(definition, tuning.clone()));
    commands.insert_resource(recorder);
}

pub fn sync_tuning_system(tuning: Res<Tuning>, mut battle: ResMut<Battle>) {
    if tuning.is_changed() && battle.tuning != *tuning {
        battle.tuning = tuning.clone();
        debug!("Tuning updated in the running battle");
    }
}

pub fn battle_tick_system(time: Res<Time>, inputs: Res<PilotInputs>, mut battle: ResMut<Battle>) {
    battle.tick(time.delta_secs() * 1000.0, &inputs);
}

pub fn session_command_system(
    mut commands: MessageReader<SessionCommand>,
    mut battle: ResMut<Battle>,
    mut recorder: ResMut<Recorder>,
) {
    for command in commands.read() {
        match command {
            SessionCommand::Pause => {
                recorder.set_recording(false);
                battle.pause();
                info!("Battle paused with {} recorded frames", recorder.available());
            }
            SessionCommand::Resume => {
                let record = battle.tuning.recorder_active;
                recorder.set_recording(record);
                battle.resume();
                info!("Battle resumed");
            }
        }
    }
}

pub fn recorder_tick_system(
    mut recorder: ResMut<Recorder>,
    mut battle: ResMut<Battle>,
    mut finished: MessageWriter<ReplayFinished>,
) {
    if recorder.tick(&mut battle) == RecorderStatus::Finished {
        finished.write(ReplayFinished);
    }
}

pub fn replay_command_system(
    mut commands: MessageReader<ReplayCommand>,
    mut recorder: ResMut<Recorder>,
    mut battle: ResMut<Battle>,
) {
    for command in commands.read() {
        match *command {
            ReplayCommand::Playback { speed } => recorder.playback(speed, None),
            ReplayCommand::Stop => recorder.stop(),
            ReplayCommand::Scrub { frame } => recorder.apply_frame(&mut battle, frame),
            ReplayCommand::ToggleTrailSide(side) => {
                recorder.toggle_trail_side(side);
                recorder.refresh_frame(&mut battle);
            }
        }
    }
}

pub fn battle_cue_system(mut battle: ResMut<Battle>, mut cues: MessageWriter<BattleCue>) {
    for event in battle.drain_events() {
        cues.write(BattleCue(event));
    }
}

pub fn match_outcome_system(
    battle: Res<Battle>,
    mut ended: MessageWriter<MatchEnded>,
    mut reported: Local<bool>,
) {
    if *reported || battle.outcome == BattleOutcome::Ongoing {
        return;
    }
    *reported = true;
    let statistics = battle
        .ships
        .ships
        .iter()
        .filter(|s| s.is_human())
        .find_map(|s| s.statistics);
    ended.write(MatchEnded {
        outcome: battle.outcome,
        statistics,
        clock: battle.clock,
    });
}
