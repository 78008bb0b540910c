//! Cannon shots.
//!
//! Shots are stored as parallel flat buffers (one 4×4 column-major transform
//! and one RGBA colour per slot) so a renderer can draw them instanced
//! straight from the pool.  The pool is split in two contiguous halves, one
//! per faction, so a busy faction cannot starve the other of slots.

use crate::constants::*;
use crate::obstacle::AsteroidField;
use crate::ship::ShipHandle;
use bevy::prelude::*;

/// Floats per shot transform.
pub const MATRIX_STRIDE: usize = 16;
/// Floats per shot colour.
pub const COLOR_STRIDE: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Shot {
    /// Remaining life; the slot is free when this is not positive.
    pub ttl: f32,
    pub fired_by: Option<ShipHandle>,
}

impl Shot {
    pub fn is_active(&self) -> bool {
        self.ttl > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct ShotPool {
    pub shots: Vec<Shot>,
    pub matrices: Vec<f32>,
    pub colors: Vec<f32>,
}

impl Default for ShotPool {
    fn default() -> Self {
        Self::new(MAX_SHOTS)
    }
}

impl ShotPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            shots: vec![Shot::default(); capacity],
            matrices: vec![0.0; capacity * MATRIX_STRIDE],
            colors: vec![0.0; capacity * COLOR_STRIDE],
        }
    }

    pub fn capacity(&self) -> usize {
        self.shots.len()
    }

    /// Slot range reserved for `faction`.
    pub fn faction_range(&self, faction: u8) -> std::ops::Range<usize> {
        let half = self.capacity() / 2;
        if faction == 0 {
            0..half
        } else {
            half..self.capacity()
        }
    }

    pub fn matrix(&self, index: usize) -> Mat4 {
        let o = index * MATRIX_STRIDE;
        let mut cols = [0.0; MATRIX_STRIDE];
        cols.copy_from_slice(&self.matrices[o..o + MATRIX_STRIDE]);
        Mat4::from_cols_array(&cols)
    }

    fn set_matrix(&mut self, index: usize, matrix: Mat4) {
        let o = index * MATRIX_STRIDE;
        self.matrices[o..o + MATRIX_STRIDE].copy_from_slice(&matrix.to_cols_array());
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let o = index * MATRIX_STRIDE + 12;
        Vec3::new(self.matrices[o], self.matrices[o + 1], self.matrices[o + 2])
    }

    /// Spawn a shot from a cannon of the firing ship.
    ///
    /// `world` is the firer's world matrix and `cannon` the cannon position
    /// in model units.  Returns `None` when the faction's half is full.
    pub fn add_shot(
        &mut self,
        fired_by: ShipHandle,
        faction: u8,
        human: bool,
        world: Mat4,
        cannon: Vec3,
    ) -> Option<usize> {
        let index = self
            .faction_range(faction)
            .find(|&i| !self.shots[i].is_active())?;

        let muzzle = (cannon + Vec3::Z * CANNON_MUZZLE_OFFSET) * SHIP_MODEL_SCALE;
        let mut matrix = world;
        matrix.w_axis += world.transform_vector3(muzzle).extend(0.0);
        self.set_matrix(index, matrix);

        let color = if human { HUMAN_SHOT_COLOR } else { AI_SHOT_COLOR };
        let o = index * COLOR_STRIDE;
        self.colors[o..o + COLOR_STRIDE].copy_from_slice(&color);

        self.shots[index] = Shot {
            ttl: SHOT_TTL,
            fired_by: Some(fired_by),
        };
        Some(index)
    }

    /// Advance every live shot along its forward axis and retire the ones
    /// that expired or hit an asteroid.  Free slots are zeroed.
    pub fn tick(&mut self, delta_ms: f32, field: &AsteroidField) {
        for index in 0..self.shots.len() {
            if self.shots[index].is_active() {
                let o = index * MATRIX_STRIDE;
                let forward = Vec3::new(self.matrices[o + 8], self.matrices[o + 9], self.matrices[o + 10]);
                let step = forward * SHOT_SPEED * delta_ms;
                self.matrices[o + 12] += step.x;
                self.matrices[o + 13] += step.y;
                self.matrices[o + 14] += step.z;

                self.shots[index].ttl -= delta_ms;
                if self.shots[index].is_active()
                    && field.collide_with_asteroids(self.position(index), SHOT_ASTEROID_RADIUS)
                {
                    self.shots[index].ttl = -1.0;
                }
            }
            if !self.shots[index].is_active() {
                let o = index * MATRIX_STRIDE;
                self.matrices[o..o + MATRIX_STRIDE].fill(0.0);
            }
        }
    }

    /// Retire a shot after it struck a ship.
    pub fn retire(&mut self, index: usize) {
        if let Some(shot) = self.shots.get_mut(index) {
            shot.ttl = -1.0;
        }
    }

    /// Drop kill credit for shots still in flight from a destroyed ship.
    pub fn forget_owner(&mut self, owner: ShipHandle) {
        for shot in &mut self.shots {
            if shot.fired_by == Some(owner) {
                shot.fired_by = None;
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.shots.iter().filter(|s| s.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::{Asteroid, SubVolume};

    fn owner(index: usize) -> ShipHandle {
        ShipHandle { index, generation: 1 }
    }

    fn rock_at(center: Vec3) -> AsteroidField {
        AsteroidField::from_asteroids(vec![Asteroid::from_sub_volumes(
            center,
            Quat::IDENTITY,
            1.0,
            vec![
                SubVolume { center: center - Vec3::X * 5.0, radius: 10.0 },
                SubVolume { center: center + Vec3::X * 5.0, radius: 10.0 },
            ],
        )])
    }

    #[test]
    fn factions_fill_their_own_half() {
        let mut pool = ShotPool::new(4);
        assert_eq!(pool.add_shot(owner(0), 0, true, Mat4::IDENTITY, Vec3::ZERO), Some(0));
        assert_eq!(pool.add_shot(owner(0), 0, true, Mat4::IDENTITY, Vec3::ZERO), Some(1));
        assert_eq!(pool.add_shot(owner(0), 0, true, Mat4::IDENTITY, Vec3::ZERO), None, "half full");
        assert_eq!(pool.add_shot(owner(1), 1, false, Mat4::IDENTITY, Vec3::ZERO), Some(2));
    }

    #[test]
    fn add_shot_never_overwrites_live_slot() {
        let mut pool = ShotPool::new(MAX_SHOTS);
        let mut seen = std::collections::HashSet::new();
        while let Some(i) = pool.add_shot(owner(0), 0, false, Mat4::IDENTITY, Vec3::ZERO) {
            assert!(seen.insert(i), "slot {i} handed out twice");
        }
        assert_eq!(seen.len(), MAX_SHOTS / 2);
    }

    #[test]
    fn muzzle_offset_follows_firer_rotation() {
        let mut pool = ShotPool::new(2);
        let world = Mat4::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let i = pool.add_shot(owner(0), 0, true, world, Vec3::ZERO).unwrap();
        // Forward (+Z) rotated a quarter turn about Y points along +X.
        assert!((pool.position(i) - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-4);
        assert_eq!(&pool.colors[0..4], &HUMAN_SHOT_COLOR);
    }

    #[test]
    fn tick_moves_along_forward_and_expires() {
        let mut pool = ShotPool::new(2);
        let field = AsteroidField::default();
        let i = pool.add_shot(owner(0), 0, false, Mat4::IDENTITY, Vec3::ZERO).unwrap();
        let start = pool.position(i);
        pool.tick(100.0, &field);
        assert!((pool.position(i) - start - Vec3::Z * 50.0).length() < 1e-4);
        pool.tick(SHOT_TTL, &field);
        assert!(!pool.shots[i].is_active());
        assert!(pool.matrices[..MATRIX_STRIDE].iter().all(|&v| v == 0.0), "freed slot zeroed");
    }

    #[test]
    fn shot_entering_rock_dies_same_tick() {
        let mut pool = ShotPool::new(2);
        let field = rock_at(Vec3::new(0.0, 0.0, 100.0));
        let i = pool.add_shot(owner(0), 0, false, Mat4::IDENTITY, Vec3::ZERO).unwrap();
        // 0.5 u/ms × 190 ms = 95 u, lands inside the front piece.
        pool.tick(190.0, &field);
        assert!(!pool.shots[i].is_active());
    }

    #[test]
    fn forget_owner_clears_credit_only() {
        let mut pool = ShotPool::new(2);
        let i = pool.add_shot(owner(3), 0, false, Mat4::IDENTITY, Vec3::ZERO).unwrap();
        pool.forget_owner(owner(3));
        assert_eq!(pool.shots[i].fired_by, None);
        assert!(pool.shots[i].is_active());
    }
}
