//! Ribbon trails behind ships and missiles.
//!
//! All trails share one flat `f32` buffer of `capacity × TRAIL_LENGTH × 4`
//! floats so a renderer can upload it as a single texture.  Each trail is a
//! ring of samples; the pool advances one shared write index per tick and
//! every trail carries its newest sample forward into the new slot.

use crate::constants::*;
use bevy::prelude::*;

/// Per-slot trail state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    pub valid: bool,
    pub alpha: f32,
    pub color: [f32; 3],
    /// Side bit tested against the replay visibility mask.
    pub side: u8,
    pub visible: bool,
    /// Ring index the owner's next sample is written to.
    pub current_index: usize,
}

impl Default for Trail {
    fn default() -> Self {
        Self {
            valid: false,
            alpha: 0.0,
            color: [1.0; 3],
            side: 0,
            visible: false,
            current_index: 0,
        }
    }
}

impl Trail {
    /// Still owned, or still fading out.
    pub fn is_alive(&self) -> bool {
        self.valid || self.alpha > TRAIL_VISIBLE_ALPHA
    }
}

/// Fixed pool of trails backed by one shared sample buffer.
#[derive(Debug, Clone)]
pub struct TrailPool {
    pub trails: Vec<Trail>,
    pub data: Vec<f32>,
    /// Shared ring index written this tick.
    pub current_index: usize,
}

impl TrailPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            trails: vec![Trail::default(); capacity],
            data: vec![0.0; capacity * TRAIL_LENGTH * TRAIL_STRIDE],
            current_index: TRAIL_LENGTH - 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.trails.len()
    }

    fn offset(slot: usize, sample: usize) -> usize {
        (slot * TRAIL_LENGTH + sample) * TRAIL_STRIDE
    }

    /// Claim a reusable slot and collapse its whole ring onto `position`.
    ///
    /// Returns `None` when every trail is alive.
    pub fn spawn(&mut self, position: Vec3, side: u8) -> Option<usize> {
        let slot = self.trails.iter().position(|t| !t.is_alive())?;
        for sample in 0..TRAIL_LENGTH {
            let o = Self::offset(slot, sample);
            self.data[o] = position.x;
            self.data[o + 1] = position.y;
            self.data[o + 2] = position.z + (sample as f32 - TRAIL_LENGTH as f32) * TRAIL_SPAWN_EPSILON;
            self.data[o + 3] = 0.0;
        }
        self.trails[slot] = Trail {
            valid: true,
            alpha: 1.0,
            color: [1.0; 3],
            side,
            visible: true,
            current_index: self.current_index,
        };
        Some(slot)
    }

    /// Overwrite the newest sample of `slot`.
    pub fn append(&mut self, slot: usize, position: Vec3) {
        let Some(trail) = self.trails.get(slot) else {
            return;
        };
        let o = Self::offset(slot, trail.current_index);
        self.data[o] = position.x;
        self.data[o + 1] = position.y;
        self.data[o + 2] = position.z;
    }

    /// Release the trail; it fades out before the slot is reused.
    pub fn invalidate(&mut self, slot: usize) {
        if let Some(trail) = self.trails.get_mut(slot) {
            trail.valid = false;
        }
    }

    pub fn set_visible(&mut self, slot: usize, visible: bool) {
        if let Some(trail) = self.trails.get_mut(slot) {
            trail.visible = visible;
        }
    }

    pub fn set_parameters(&mut self, slot: usize, color: [f32; 3], alpha: f32) {
        if let Some(trail) = self.trails.get_mut(slot) {
            trail.color = color;
            trail.alpha = alpha;
        }
    }

    /// Sample `sample` of trail `slot` as (x, y, z, w).
    pub fn sample(&self, slot: usize, sample: usize) -> Vec4 {
        let o = Self::offset(slot, sample);
        Vec4::new(self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3])
    }

    /// Advance the shared ring index, carrying every trail's newest sample
    /// into the new slot, and fade released trails.
    pub fn tick(&mut self, delta_ms: f32) {
        let next = self.current_index;
        for slot in 0..self.trails.len() {
            let from = Self::offset(slot, self.trails[slot].current_index);
            let to = Self::offset(slot, next);
            self.data.copy_within(from..from + TRAIL_STRIDE, to);

            let trail = &mut self.trails[slot];
            trail.current_index = next;
            if !trail.valid {
                trail.alpha = (trail.alpha - delta_ms * TRAIL_FADE_RATE).max(0.0);
            }
        }
        self.current_index = (self.current_index + 1) % TRAIL_LENGTH;
    }
}
