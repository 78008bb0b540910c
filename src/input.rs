//! Normalized per-ship control signal.
//!
//! Device handling lives outside the simulation; whatever produces input for
//! a human pilot writes one [`ShipInput`] per player into [`PilotInputs`]
//! each frame.  AI pilots fill the same struct from their state machine.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipInput {
    /// Yaw delta for this tick (radians), positive turns right.
    pub yaw: f32,
    /// Pitch delta for this tick (radians), negative lifts the nose.
    pub pitch: f32,
    pub shooting: bool,
    pub launch_missile: bool,
    pub burst: bool,
    pub braking: bool,
    pub immelmann: bool,
}

impl ShipInput {
    /// Clamp the steering deltas to `±turn_rate`.
    pub fn constrained(mut self, turn_rate: f32) -> Self {
        self.yaw = self.yaw.clamp(-turn_rate, turn_rate);
        self.pitch = self.pitch.clamp(-turn_rate, turn_rate);
        self
    }

    /// Clear the per-tick action flags, keeping steering.
    pub fn clear_actions(&mut self) {
        self.shooting = false;
        self.launch_missile = false;
        self.burst = false;
        self.braking = false;
        self.immelmann = false;
    }
}

/// Control signal for every human player, indexed by player slot.
#[derive(Resource, Debug, Clone, Default)]
pub struct PilotInputs(pub Vec<ShipInput>);

impl PilotInputs {
    /// Input for `player`, or neutral when the slot has no producer.
    pub fn get(&self, player: usize) -> ShipInput {
        self.0.get(player).copied().unwrap_or_default()
    }

    pub fn set(&mut self, player: usize, input: ShipInput) {
        if self.0.len() <= player {
            self.0.resize(player + 1, ShipInput::default());
        }
        self.0[player] = input;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steering_is_clamped_to_turn_rate() {
        let input = ShipInput {
            yaw: 0.5,
            pitch: -0.5,
            ..Default::default()
        }
        .constrained(0.04);
        assert_eq!(input.yaw, 0.04);
        assert_eq!(input.pitch, -0.04);
    }

    #[test]
    fn missing_player_reads_neutral() {
        let mut inputs = PilotInputs::default();
        inputs.set(1, ShipInput { shooting: true, ..Default::default() });
        assert!(!inputs.get(0).shooting);
        assert!(inputs.get(1).shooting);
        assert_eq!(inputs.get(7), ShipInput::default());
    }
}
