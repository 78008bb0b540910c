//! Short-lived visual events: explosions and hit sparks.
//!
//! The simulation only tracks where and when an effect started; a renderer
//! derives particles from the elapsed time.  Both pools are recorded by the
//! replay recorder.

use bevy::prelude::*;

/// One effect slot.  `time` counts up from zero after a spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEffect {
    pub position: Vec3,
    pub orientation: Quat,
    pub time: f32,
}

/// Fixed pool of effects sharing one lifetime.
#[derive(Debug, Clone)]
pub struct EffectPool {
    pub effects: Vec<TimedEffect>,
    pub lifetime: f32,
}

impl EffectPool {
    pub fn new(capacity: usize, lifetime: f32) -> Self {
        let idle = TimedEffect {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            // Anything past the lifetime reads as finished.
            time: lifetime * 2.0,
        };
        Self {
            effects: vec![idle; capacity],
            lifetime,
        }
    }

    pub fn capacity(&self) -> usize {
        self.effects.len()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.effects
            .get(index)
            .is_some_and(|e| e.time >= 0.0 && e.time < self.lifetime)
    }

    /// Restart the first finished slot; nothing happens when all are playing.
    pub fn spawn(&mut self, position: Vec3, orientation: Quat) -> Option<usize> {
        let index = (0..self.effects.len()).find(|&i| !self.is_active(i))?;
        self.effects[index] = TimedEffect {
            position,
            orientation,
            time: 0.0,
        };
        Some(index)
    }

    pub fn tick(&mut self, delta_ms: f32) {
        for effect in &mut self.effects {
            effect.time += delta_ms;
        }
    }

    pub fn active_count(&self) -> usize {
        (0..self.effects.len()).filter(|&i| self.is_active(i)).count()
    }
}
