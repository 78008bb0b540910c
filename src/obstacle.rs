//! Asteroid field: static clusters of spheres that ships, shots and missiles
//! collide with and that AI pilots steer around.
//!
//! Every cluster carries a coarse enclosing sphere and a list of fine
//! sub-volume spheres.  Queries are linear scans over clusters; the field is
//! small (tens of clusters) and static, so there is no spatial index.

use crate::constants::*;
use bevy::math::EulerRot;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// One fine collision sphere of a cluster, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubVolume {
    pub center: Vec3,
    pub radius: f32,
}

/// A cluster of rock pieces approximated by spheres.
#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    /// Centroid of the sub-volume centers.
    pub center: Vec3,
    /// Enclosing radius used by the coarse tests.
    pub radius: f32,
    pub sub_volumes: Vec<SubVolume>,
}

impl Asteroid {
    /// Build a cluster from world-space sub-volumes, computing the enclosing
    /// sphere once.
    pub fn from_sub_volumes(position: Vec3, rotation: Quat, scale: f32, sub_volumes: Vec<SubVolume>) -> Self {
        let center = if sub_volumes.is_empty() {
            position
        } else {
            sub_volumes.iter().map(|s| s.center).sum::<Vec3>() / sub_volumes.len() as f32
        };
        let extent = sub_volumes
            .iter()
            .map(|s| s.center.distance(center))
            .fold(0.0_f32, f32::max);

        Self {
            position,
            rotation,
            scale,
            center,
            radius: extent * ENCLOSING_RADIUS_SCALE,
            sub_volumes,
        }
    }

    fn generate(rng: &mut StdRng, spread: f32) -> Self {
        let half = spread * 0.5;
        let position = Vec3::new(
            rng.gen::<f32>() * spread - half,
            rng.gen::<f32>() * spread - half,
            rng.gen::<f32>() * spread - half,
        );
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            rng.gen::<f32>() * TAU,
            rng.gen::<f32>() * TAU,
            rng.gen::<f32>() * TAU,
        );

        let count = rng.gen_range(ASTEROID_SUB_VOLUMES_MIN..=ASTEROID_SUB_VOLUMES_MAX);
        let sub_volumes = (0..count)
            .map(|_| {
                let offset = Vec3::new(
                    rng.gen_range(-ASTEROID_SUB_OFFSET_RANGE..ASTEROID_SUB_OFFSET_RANGE),
                    rng.gen_range(-ASTEROID_SUB_OFFSET_RANGE..ASTEROID_SUB_OFFSET_RANGE),
                    rng.gen_range(-ASTEROID_SUB_OFFSET_RANGE..ASTEROID_SUB_OFFSET_RANGE),
                );
                let radius = rng.gen_range(ASTEROID_SUB_RADIUS_MIN..ASTEROID_SUB_RADIUS_MAX);
                SubVolume {
                    center: position + rotation * (offset * ASTEROID_SCALE),
                    radius: radius * ASTEROID_SCALE,
                }
            })
            .collect();

        Self::from_sub_volumes(position, rotation, ASTEROID_SCALE, sub_volumes)
    }

    /// Coarse test against the enclosing sphere, then fine test per sub-volume.
    fn collides(&self, point: Vec3, radius: f32) -> bool {
        let coarse = point.distance(self.center) - radius - self.radius * COLLIDE_RADIUS_FACTOR;
        if coarse >= 0.0 {
            return false;
        }
        self.sub_volumes
            .iter()
            .any(|s| point.distance(s.center) - radius - s.radius * COLLIDE_RADIUS_FACTOR < 0.0)
    }
}

/// All clusters of a match.
#[derive(Debug, Clone, Default)]
pub struct AsteroidField {
    pub asteroids: Vec<Asteroid>,
}

impl AsteroidField {
    /// Scatter `count` clusters in a cube of edge `spread` centred on the
    /// origin.  The same seed always yields the same field.
    pub fn generate(seed: u64, count: usize, spread: f32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let asteroids = (0..count).map(|_| Asteroid::generate(&mut rng, spread)).collect();
        Self { asteroids }
    }

    pub fn from_asteroids(asteroids: Vec<Asteroid>) -> Self {
        Self { asteroids }
    }

    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }

    /// True when a sphere at `point` with `radius` touches any sub-volume.
    pub fn collide_with_asteroids(&self, point: Vec3, radius: f32) -> bool {
        self.asteroids.iter().any(|a| a.collides(point, radius))
    }

    /// Repulsion target for the first cluster whose avoidance shell contains
    /// the sphere, pushed straight out from the cluster by the penetration.
    pub fn should_avoid(&self, point: Vec3, radius: f32) -> Option<Vec3> {
        self.asteroids.iter().find_map(|a| {
            let penetration = point.distance(a.center) - radius - a.radius * AVOID_RADIUS_FACTOR;
            (penetration < 0.0).then(|| point + (point - a.center).normalize_or_zero() * -penetration)
        })
    }

    /// Remove every cluster whose enclosing sphere overlaps the given sphere.
    pub fn remove_asteroids(&mut self, point: Vec3, radius: f32) {
        let before = self.asteroids.len();
        self.asteroids
            .retain(|a| point.distance(a.center) - radius - a.radius >= 0.0);
        info!(
            "Cleared asteroids around {point}: {before} -> {}",
            self.asteroids.len()
        );
    }
}
