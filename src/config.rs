//! Runtime configuration loaded from `assets/tuning.toml`.
//!
//! [`Tuning`] is a Bevy [`Resource`] holding every live-tunable flight, weapon
//! and AI parameter.  At startup, [`load_tuning_config`] reads
//! `assets/tuning.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.  Changing the resource
//! while a battle runs takes effect on the next frame.
//!
//! [`MatchDefinition`] describes one match: fleet sizes, the world seed, lives
//! and damage.  Definitions come from the mission catalog
//! ([`crate::missions`]) or from [`MatchDefinition::default`].
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by both `Default` impls.

use crate::constants::*;
use crate::error::{
    validate_dot_threshold, validate_positive, validate_unit_interval, SimError, SimResult,
};
use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Path of the tuning file, relative to the working directory.
pub const TUNING_PATH: &str = "assets/tuning.toml";

/// Live-tunable flight, weapon and AI parameters.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // ── Flight ────────────────────────────────────────────────────────────────
    pub max_speed: f32,
    pub max_accel: f32,
    pub player_turn_rate: f32,
    pub immelmann_duration: f32,

    // ── Missiles ──────────────────────────────────────────────────────────────
    pub missile_cooldown_time: f32,
    pub time_to_lock_missile: f32,

    // ── AI ────────────────────────────────────────────────────────────────────
    pub ai_perception_cone: f32,
    pub ai_follow_distance: f32,
    pub ai_prediction_range: f32,
    pub ai_turn_rate: f32,
    pub ai_input_randomness: f32,
    pub ai_fire_precision: f32,
    pub ai_friendly_fire_precision: f32,
    pub ai_fire_range: f32,
    pub ai_evade_time: f32,
    pub ai_minimum_speed: f32,
    pub ai_maximum_speed: f32,
    pub ai_break_distance: f32,
    pub ai_burst_distance: f32,
    pub ai_max_targets: usize,
    pub ai_immelmann_probability: f32,

    // ── Recorder ──────────────────────────────────────────────────────────────
    pub record_frame_count: usize,
    pub recorder_active: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            max_accel: MAX_ACCEL,
            player_turn_rate: PLAYER_TURN_RATE,
            immelmann_duration: IMMELMANN_DURATION,

            missile_cooldown_time: MISSILE_COOLDOWN_TIME,
            time_to_lock_missile: TIME_TO_LOCK_MISSILE,

            ai_perception_cone: AI_PERCEPTION_CONE,
            ai_follow_distance: AI_FOLLOW_DISTANCE,
            ai_prediction_range: AI_PREDICTION_RANGE,
            ai_turn_rate: AI_TURN_RATE,
            ai_input_randomness: AI_INPUT_RANDOMNESS,
            ai_fire_precision: AI_FIRE_PRECISION,
            ai_friendly_fire_precision: AI_FRIENDLY_FIRE_PRECISION,
            ai_fire_range: AI_FIRE_RANGE,
            ai_evade_time: AI_EVADE_TIME,
            ai_minimum_speed: AI_MINIMUM_SPEED,
            ai_maximum_speed: AI_MAXIMUM_SPEED,
            ai_break_distance: AI_BREAK_DISTANCE,
            ai_burst_distance: AI_BURST_DISTANCE,
            ai_max_targets: AI_MAX_TARGETS,
            ai_immelmann_probability: AI_IMMELMANN_PROBABILITY,

            record_frame_count: RECORD_FRAME_COUNT,
            recorder_active: true,
        }
    }
}

impl Tuning {
    /// Check the values that would break the simulation if out of range.
    pub fn validate(&self) -> SimResult<()> {
        validate_positive("max_speed", self.max_speed)?;
        validate_positive("max_accel", self.max_accel)?;
        validate_positive("player_turn_rate", self.player_turn_rate)?;
        validate_positive("immelmann_duration", self.immelmann_duration)?;
        validate_dot_threshold("ai_perception_cone", self.ai_perception_cone)?;
        validate_dot_threshold("ai_fire_precision", self.ai_fire_precision)?;
        validate_dot_threshold("ai_friendly_fire_precision", self.ai_friendly_fire_precision)?;
        validate_unit_interval("ai_immelmann_probability", self.ai_immelmann_probability)?;
        validate_positive("record_frame_count", self.record_frame_count as f32)?;
        Ok(())
    }
}

/// Per-match setup: fleets, world seed, lives and damage.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchDefinition {
    // ── Fleets ────────────────────────────────────────────────────────────────
    pub human_allies: usize,
    pub human_enemies: usize,
    pub ai_allies: usize,
    pub ai_enemies: usize,

    // ── World ─────────────────────────────────────────────────────────────────
    pub seed: u64,
    pub asteroid_count: usize,
    pub asteroid_spread: f32,

    // ── Lives & Damage ────────────────────────────────────────────────────────
    pub human_allies_life: f32,
    pub human_enemies_life: f32,
    pub ai_allies_life: f32,
    pub ai_enemies_life: f32,
    pub shot_damage: f32,
    pub missile_damage: f32,

    // ── Rules ─────────────────────────────────────────────────────────────────
    /// Seconds between the deciding event and the reported outcome.
    pub delayed_end: f32,
    pub enemy_boundary_radius: f32,
    pub human_boundary_radius: f32,
}

impl Default for MatchDefinition {
    fn default() -> Self {
        Self {
            human_allies: 1,
            human_enemies: 0,
            ai_allies: 10,
            ai_enemies: 10,

            seed: MATCH_SEED,
            asteroid_count: ASTEROID_COUNT,
            asteroid_spread: ASTEROID_SPREAD,

            human_allies_life: HUMAN_ALLIES_LIFE,
            human_enemies_life: HUMAN_ENEMIES_LIFE,
            ai_allies_life: AI_ALLIES_LIFE,
            ai_enemies_life: AI_ENEMIES_LIFE,
            shot_damage: SHOT_DAMAGE,
            missile_damage: MISSILE_DAMAGE,

            delayed_end: 0.0,
            enemy_boundary_radius: ENEMY_BOUNDARY_RADIUS,
            human_boundary_radius: HUMAN_BOUNDARY_RADIUS,
        }
    }
}

impl MatchDefinition {
    pub fn human_count(&self) -> usize {
        self.human_allies + self.human_enemies
    }

    /// Size of the ship pool for this match.
    pub fn ship_capacity(&self) -> usize {
        self.human_count() + self.ai_allies + self.ai_enemies
    }
}

/// Read and parse a TOML file into `T`.
///
/// Returns `Ok(None)` when the file does not exist, so callers can fall back
/// to defaults without treating a missing file as an error.
pub fn read_toml_file<T: DeserializeOwned>(path: &str) -> SimResult<Option<T>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(SimError::ConfigRead {
                path: path.to_string(),
                reason: err.to_string(),
            })
        }
    };
    toml::from_str::<T>(&contents)
        .map(Some)
        .map_err(|err| SimError::ConfigParse {
            path: path.to_string(),
            reason: err.to_string(),
        })
}

/// Startup system: replace the default [`Tuning`] with `assets/tuning.toml`.
///
/// A missing file keeps the compiled defaults; a malformed or out-of-range
/// file is reported and ignored.
pub fn load_tuning_config(mut tuning: ResMut<Tuning>) {
    match read_toml_file::<Tuning>(TUNING_PATH) {
        Ok(Some(loaded)) => match loaded.validate() {
            Ok(()) => {
                *tuning = loaded;
                info!("Loaded tuning from {TUNING_PATH}");
            }
            Err(err) => warn!("Rejected {TUNING_PATH}: {err}; using defaults"),
        },
        Ok(None) => info!("No {TUNING_PATH} found; using compiled defaults"),
        Err(err) => warn!("{err}; using defaults"),
    }
}
