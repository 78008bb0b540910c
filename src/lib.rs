//! Space-combat simulation library
//!
//! Two factions of ships (human or AI piloted) dogfight among asteroid
//! clusters with cannons and homing missiles.  Every live object sits in a
//! fixed-size pool owned by the [`battle::Battle`] resource, and a frame
//! recorder keeps the last seconds of play for instant replay.

pub mod agent;
pub mod ai;
pub mod battle;
pub mod camera;
mod combat;
pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod input;
pub mod missile;
pub mod missions;
pub mod obstacle;
pub mod recorder;
pub mod ship;
pub mod shot;
pub mod simulation;
pub mod trail;
