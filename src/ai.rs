//! AI pilot decision making.
//!
//! The state is re-derived from scratch every tick in strict priority order
//! (avoid an asteroid, return inside the arena, evade after a hit, chase the
//! best prey, wander), then turned into a [`ShipInput`] for the shared
//! flight step.

use crate::agent::Steer;
use crate::config::Tuning;
use crate::constants::*;
use crate::input::ShipInput;
use crate::obstacle::AsteroidField;
use crate::ship::{Pilot, ShipPool};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    Wander,
    Chase,
    Evade,
    Return,
    Avoid,
}

/// Per-ship AI memory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AiBrain {
    pub state: AiState,
    /// Remaining evade time after a hit.
    pub evade_timer: f32,
    pub evade_to: Vec3,
    /// Set by combat when a hit should be answered with an immelmann.
    pub pending_dodge: bool,
}

/// Read-only world state an AI pilot reasons about.
pub struct AiContext<'a> {
    pub field: &'a AsteroidField,
    pub tuning: &'a Tuning,
    pub enemy_boundary_radius: f32,
    /// Battle clock, drives the wander pattern.
    pub clock: f32,
    pub delta_ms: f32,
}

/// Decide this tick's input for the AI ship at `index`.
///
/// Returns `None` for human ships.
pub fn think(ships: &mut ShipPool, index: usize, ctx: &AiContext, rng: &mut StdRng) -> Option<ShipInput> {
    let Pilot::Ai(mut brain) = ships.ships[index].pilot else {
        return None;
    };
    let tuning = ctx.tuning;
    let position = ships.ships[index].agent.position;

    let avoid = ctx.field.should_avoid(position, SHIP_RADIUS);
    brain.state = if avoid.is_some() {
        AiState::Avoid
    } else if position.length() > ctx.enemy_boundary_radius {
        AiState::Return
    } else if brain.evade_timer > 0.0 {
        brain.evade_timer -= ctx.delta_ms;
        AiState::Evade
    } else if ships.update_best_prey(index, ctx.delta_ms, tuning).is_some() {
        AiState::Chase
    } else {
        AiState::Wander
    };

    // A prey handle can outlive its ship between ticks; chase only what resolves.
    let prey = ships.ships[index]
        .best_prey
        .and_then(|handle| ships.get(handle))
        .map(|enemy| (enemy.agent.position, enemy.agent.forward, enemy.velocity));
    if brain.state == AiState::Chase && prey.is_none() {
        brain.state = AiState::Wander;
    }

    let ship = &mut ships.ships[index];
    ship.input.clear_actions();
    ship.input.immelmann = std::mem::take(&mut brain.pending_dodge);

    match brain.state {
        AiState::Avoid => {
            if let Some(avoid) = avoid {
                ship.go_toward(avoid, position, AI_RECOVERY_TURN_RATIO);
            }
        }
        AiState::Return => {
            ship.go_toward(Vec3::ZERO, position, AI_RECOVERY_TURN_RATIO);
        }
        AiState::Evade => {
            ship.input.burst = true;
            ship.go_toward(brain.evade_to, position, tuning.ai_turn_rate);
        }
        AiState::Chase => {
            if let Some((enemy_position, enemy_forward, enemy_velocity)) = prey {
                let goto = enemy_position + enemy_forward * tuning.ai_follow_distance;
                ship.go_toward(goto, position, tuning.ai_turn_rate);

                let lead = enemy_position + enemy_forward * (tuning.ai_prediction_range * enemy_velocity);
                let fire_dot = ship.dot_to_target(lead);
                let distance = position.distance(enemy_position);

                if (distance < tuning.ai_break_distance || ship.dot_to_enemy < AI_BRAKE_DOT)
                    && ship.velocity > tuning.ai_minimum_speed
                {
                    ship.input.braking = true;
                }
                if distance > tuning.ai_burst_distance
                    && ship.dot_to_enemy > AI_BURST_DOT
                    && ship.velocity < tuning.ai_maximum_speed
                {
                    ship.input.burst = true;
                }
                if fire_dot > tuning.ai_fire_precision
                    && ship.dot_to_ally < tuning.ai_friendly_fire_precision
                    && distance < tuning.ai_fire_range
                {
                    ship.input.shooting = true;
                }
            }
        }
        AiState::Wander => {
            let phase = ctx.clock * AI_WANDER_FREQUENCY;
            ship.input.yaw = phase.cos() * tuning.ai_turn_rate;
            ship.input.pitch = phase.sin() * tuning.ai_turn_rate;
        }
    }

    if tuning.ai_input_randomness > 0.0 {
        ship.input.yaw += rng.gen_range(-1.0..1.0) * tuning.ai_input_randomness;
        ship.input.pitch += rng.gen_range(-1.0..1.0) * tuning.ai_input_randomness;
    }

    ship.pilot = Pilot::Ai(brain);
    Some(ship.input)
}
