//! Centralised gameplay constants.
//!
//! Fixed values (pool capacities, projectile ballistics, smoothing factors)
//! are used directly by the simulation.  Values that also appear in
//! [`crate::config::Tuning`] or [`crate::config::MatchDefinition`] are the
//! **authoritative defaults** for those resources; the runtime copy may be
//! overridden from `assets/tuning.toml` or a mission definition.
//!
//! Time values are in milliseconds, distances in world units.  Speeds are in
//! world units per millisecond unless noted otherwise.

use bevy::prelude::*;

// ── Tuning Defaults: Flight ───────────────────────────────────────────────────

/// Velocity a ship converges to at full burst.
pub const MAX_SPEED: f32 = 2.0;

/// Per-tick acceleration scale; multiplied by 8 and the remaining speed headroom.
pub const MAX_ACCEL: f32 = 0.003;

/// Largest yaw/pitch delta a human pilot may request per tick (radians).
pub const PLAYER_TURN_RATE: f32 = 0.04;

/// Length of the immelmann loop maneuver.
pub const IMMELMANN_DURATION: f32 = 1000.0;

// ── Tuning Defaults: Missiles ─────────────────────────────────────────────────

/// Delay after a missile launch before the next one may be fired.
pub const MISSILE_COOLDOWN_TIME: f32 = 10_000.0;

/// Dwell time a target must remain best prey before a missile can lock.
pub const TIME_TO_LOCK_MISSILE: f32 = 2000.0;

// ── Tuning Defaults: AI ───────────────────────────────────────────────────────

/// Minimum forward/direction dot for a ship to be perceived at all.
///
/// -0.5 means anything inside a ±120° cone in front of the pilot.
pub const AI_PERCEPTION_CONE: f32 = -0.5;

/// Offset along the target's forward axis the AI steers toward while chasing.
/// Negative values place the chase point behind the target.
pub const AI_FOLLOW_DISTANCE: f32 = -10.0;

/// Lead multiplier applied to the target's velocity when aiming.
pub const AI_PREDICTION_RANGE: f32 = 2.0;

pub const AI_TURN_RATE: f32 = 0.04;

/// Amplitude of the uniform jitter added to AI steering every tick.
pub const AI_INPUT_RANDOMNESS: f32 = 0.0;

/// Dot between forward and the lead point above which the AI opens fire.
pub const AI_FIRE_PRECISION: f32 = 0.98;

/// The AI holds fire while an ally sits at or above this dot in front of it.
pub const AI_FRIENDLY_FIRE_PRECISION: f32 = 0.97;

pub const AI_FIRE_RANGE: f32 = 550.0;

/// How long an AI pilot keeps evading after taking a hit.
pub const AI_EVADE_TIME: f32 = 3000.0;

pub const AI_MINIMUM_SPEED: f32 = 1.0;
pub const AI_MAXIMUM_SPEED: f32 = 5.0;

/// Closer than this the AI brakes behind its target.
pub const AI_BREAK_DISTANCE: f32 = 30.0;

/// Farther than this the AI bursts toward its target.
pub const AI_BURST_DISTANCE: f32 = 500.0;

/// Soft cap on how many AI pilots may chase the same ship.
pub const AI_MAX_TARGETS: usize = 4;

/// Chance that a hit AI pilot answers with an immelmann dodge.
pub const AI_IMMELMANN_PROBABILITY: f32 = 0.2;

// ── Tuning Defaults: Recorder ─────────────────────────────────────────────────

/// Ring-buffer capacity of the replay recorder (frames).
pub const RECORD_FRAME_COUNT: usize = 2000;

// ── Match Defaults ────────────────────────────────────────────────────────────

pub const MATCH_SEED: u64 = 2022;
pub const ASTEROID_COUNT: usize = 20;

/// Edge length of the cube the asteroid clusters are scattered in.
pub const ASTEROID_SPREAD: f32 = 1000.0;

pub const HUMAN_ALLIES_LIFE: f32 = 100.0;
pub const HUMAN_ENEMIES_LIFE: f32 = 100.0;
pub const AI_ALLIES_LIFE: f32 = 50.0;
pub const AI_ENEMIES_LIFE: f32 = 10.0;
pub const SHOT_DAMAGE: f32 = 1.0;
pub const MISSILE_DAMAGE: f32 = 20.0;

/// AI pilots farther than this from the origin turn back.
pub const ENEMY_BOUNDARY_RADIUS: f32 = 400.0;

/// Human ships are clamped inside this radius.
pub const HUMAN_BOUNDARY_RADIUS: f32 = 800.0;

// ── Match Setup ───────────────────────────────────────────────────────────────

/// Distance of each faction's spawn point from the origin along Z.
pub const FACTION_SPAWN_DISTANCE: f32 = 500.0;

/// Spacing between human ships on the spawn line.
pub const HUMAN_SPAWN_SPACING: f32 = 50.0;

/// AI ships are scattered ±this around their faction spawn point.
pub const AI_SPAWN_SPREAD: f32 = 50.0;

/// Asteroids within this radius of a spawn point are removed before the match.
pub const SPAWN_CLEAR_RADIUS: f32 = 50.0;

/// Missiles carried by faction-0 ships; faction-1 ships have none.
pub const ALLY_MISSILE_LOAD: u32 = 8;

// ── Asteroid Clusters ─────────────────────────────────────────────────────────

/// Uniform scale of a cluster root transform.
pub const ASTEROID_SCALE: f32 = 100.0;

/// Sub-volume count range per cluster (inclusive).
pub const ASTEROID_SUB_VOLUMES_MIN: usize = 4;
pub const ASTEROID_SUB_VOLUMES_MAX: usize = 8;

/// Sub-volume center offsets are drawn in ±this, in cluster-local units.
pub const ASTEROID_SUB_OFFSET_RANGE: f32 = 0.6;

/// Sub-volume radius range, in cluster-local units.
pub const ASTEROID_SUB_RADIUS_MIN: f32 = 0.15;
pub const ASTEROID_SUB_RADIUS_MAX: f32 = 0.45;

/// Multiplier from the farthest sub-volume center to the enclosing radius.
pub const ENCLOSING_RADIUS_SCALE: f32 = 4.0;

/// Fraction of the enclosing / sub-volume radius counted by the hit test.
pub const COLLIDE_RADIUS_FACTOR: f32 = 0.5;

/// Multiple of the enclosing radius inside which pilots start avoiding.
pub const AVOID_RADIUS_FACTOR: f32 = 2.0;

// ── Ship Flight ───────────────────────────────────────────────────────────────

/// The immelmann pitches up while its timer is above this, then rolls out.
pub const IMMELMANN_PITCH_PHASE: f32 = 600.0;
pub const IMMELMANN_PITCH_RATE: f32 = 0.12;
pub const IMMELMANN_ROLL_AMPLITUDE: f32 = 0.2;

pub const ROLL_SMOOTHING: f32 = 0.01;

/// Blend factor from the rendered rotation toward the integrated one.
pub const ORIENTATION_SLERP: f32 = 0.05;

pub const THRUSTER_SMOOTHING: f32 = 0.02;
pub const ACCEL_FACTOR: f32 = 8.0;
pub const BRAKE_DAMPING: f32 = 0.98;

/// Speed ratio a ship settles at when neither bursting nor braking.
pub const CRUISE_SPEED_RATIO: f32 = 0.5;

pub const BURSTING_RATE: f32 = 0.001;
pub const BURSTING_LIMIT: f32 = 2.0;
pub const BURSTING_DECAY: f32 = 0.98;

/// Radius used for ship-vs-asteroid crashes and avoidance checks.
pub const SHIP_RADIUS: f32 = 1.0;

// ── Game Speed ────────────────────────────────────────────────────────────────

pub const GAME_SPEED_SMOOTHING: f32 = 0.1;

/// Below this smoothed game speed the simulation does not tick.
pub const PAUSED_GAME_SPEED: f32 = 0.001;

/// Frames shorter than this neither fire weapons nor lay missile trail samples.
pub const MIN_ACTIVE_DELTA: f32 = 0.001;

/// Cannons across all ships may fire once per this interval.
pub const SHOT_INTERVAL: f32 = 130.0;

// ── AI Behaviour ──────────────────────────────────────────────────────────────

pub const AI_WANDER_FREQUENCY: f32 = 0.002;

/// Turn ratio used by AVOID and RETURN steering.
pub const AI_RECOVERY_TURN_RATIO: f32 = 0.02;

/// Distance to the evade point picked after a hit.
pub const AI_EVADE_DISTANCE: f32 = 1000.0;

/// The AI brakes when its target sits below this dot in front of it.
pub const AI_BRAKE_DOT: f32 = 0.4;

/// The AI bursts only with the target above this dot in front of it.
pub const AI_BURST_DOT: f32 = 0.8;

// ── Shots ─────────────────────────────────────────────────────────────────────

pub const MAX_SHOTS: usize = 200;
pub const SHOT_TTL: f32 = 5000.0;
pub const SHOT_SPEED: f32 = 0.5;
pub const SHOT_ASTEROID_RADIUS: f32 = 6.0;
pub const SHOT_HIT_DISTANCE_SQ: f32 = 36.0;

/// Ship model scale applied to cannon and missile mount offsets.
pub const SHIP_MODEL_SCALE: f32 = 25.0;

/// Forward nudge (model units) added to a cannon offset so shots leave the barrel.
pub const CANNON_MUZZLE_OFFSET: f32 = 0.2;

/// Cannon positions in model units, indexed by faction then cannon.
pub const CANNON_OFFSETS: [[Vec3; 2]; 2] = [
    [Vec3::new(-0.12, -0.01, 0.05), Vec3::new(0.12, -0.01, 0.05)],
    [Vec3::new(-0.09, 0.02, 0.08), Vec3::new(0.09, 0.02, 0.08)],
];

pub const HUMAN_SHOT_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const AI_SHOT_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

// ── Missiles ──────────────────────────────────────────────────────────────────

pub const MAX_MISSILES: usize = 10;
pub const MISSILE_MAX_LIFE: f32 = 10_000.0;
pub const MISSILE_SPEED: f32 = 0.15;
pub const MISSILE_ASTEROID_RADIUS: f32 = 0.5;
pub const MISSILE_HIT_DISTANCE_SQ: f32 = 200.0;

/// Homing strength grows with missile age at this rate, up to the cap below.
pub const MISSILE_TURN_GROWTH: f32 = 1.0 / 100_000.0;
pub const MISSILE_TURN_RATIO_MAX: f32 = 0.05;

/// Missile mount positions in model units for faction-0 ships, consumed from
/// the last one down as missiles are fired.  Faction-1 ships have no mounts.
pub const ALLY_MISSILE_MOUNTS: [Vec3; 8] = [
    Vec3::new(-0.30, -0.04, -0.02),
    Vec3::new(0.30, -0.04, -0.02),
    Vec3::new(-0.24, -0.04, 0.00),
    Vec3::new(0.24, -0.04, 0.00),
    Vec3::new(-0.18, -0.05, 0.02),
    Vec3::new(0.18, -0.05, 0.02),
    Vec3::new(-0.12, -0.05, 0.04),
    Vec3::new(0.12, -0.05, 0.04),
];

// ── Trails ────────────────────────────────────────────────────────────────────

/// Samples kept per trail ring.
pub const TRAIL_LENGTH: usize = 256;

/// Floats per trail sample (x, y, z, w).
pub const TRAIL_STRIDE: usize = 4;

/// Tiny per-sample depth offset so a freshly spawned trail is not degenerate.
pub const TRAIL_SPAWN_EPSILON: f32 = 0.00001;

pub const TRAIL_FADE_RATE: f32 = 0.0003;

/// A trail fainter than this is reusable.
pub const TRAIL_VISIBLE_ALPHA: f32 = 0.001;

/// Trail side bits used by the replay visibility mask.
pub const TRAIL_SIDE_ALLY: u8 = 1;
pub const TRAIL_SIDE_ENEMY: u8 = 2;
pub const TRAIL_SIDE_MISSILE: u8 = 3;

pub const ALLY_TRAIL_COLOR: [f32; 3] = [0.64, 0.42, 0.15];
pub const ENEMY_TRAIL_COLOR: [f32; 3] = [0.12, 0.56, 0.62];
pub const MISSILE_TRAIL_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

// ── Effects ───────────────────────────────────────────────────────────────────

pub const MAX_EXPLOSIONS: usize = 4;
pub const EXPLOSION_TIMEOUT: f32 = 2000.0;
pub const MAX_SPARKS: usize = 30;
pub const SPARKS_TIMEOUT: f32 = 1000.0;

/// Number of interchangeable explosion sound cues.
pub const EXPLOSION_CUE_COUNT: usize = 2;

// ── Ship Camera ───────────────────────────────────────────────────────────────

pub const CAMERA_FOV_Y: f32 = 0.8;
pub const CAMERA_ASPECT: f32 = 16.0 / 9.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 5000.0;

/// Chase-camera eye position relative to the ship, in ship space.
pub const CAMERA_EYE_OFFSET: Vec3 = Vec3::new(0.0, 5.0, -15.0);

/// Half-extent of the NDC window counted as "on screen" by target selection.
pub const CAMERA_ON_SCREEN_EXTENT: f32 = 0.5;
