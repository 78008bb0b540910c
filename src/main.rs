use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use skirmish::simulation::{MatchEnded, SelectedMission, SimulationPlugin};
use std::env;
use std::time::Duration;

/// Log the result and shut down once the battle is decided.
fn exit_on_match_end(mut ended: MessageReader<MatchEnded>, mut exit: MessageWriter<AppExit>) {
    for ended in ended.read() {
        info!(
            "Match over: {:?} after {:.1}s",
            ended.outcome,
            ended.clock / 1000.0
        );
        if let Some(stats) = ended.statistics {
            info!(
                "Pilot: {} kills, {:.0}% accuracy, {} missiles, {:.0} damage dealt, {:.0} taken",
                stats.ships_destroyed,
                stats.accuracy() * 100.0,
                stats.missiles_fired,
                stats.damage_dealt,
                stats.damage_taken
            );
        }
        exit.write(AppExit::Success);
    }
}

fn main() {
    // Pick a mission from assets/missions.toml by name
    let mission = env::var("SKIRMISH_MISSION").ok();

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
            LogPlugin::default(),
        ))
        .insert_resource(SelectedMission(mission))
        .add_plugins(SimulationPlugin)
        .add_systems(Update, exit_on_match_end)
        .run();
}
