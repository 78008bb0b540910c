//! Homing missiles.
//!
//! A missile chases one ship.  Its turn authority grows with age, so fresh
//! launches fly almost straight and old missiles corner hard.  When the target
//! disappears, the missile touches an asteroid, or its fuel runs out, it is
//! expired in place and an explosion is spawned at its last pose.

use crate::agent::{Agent, Steer};
use crate::constants::*;
use crate::effects::EffectPool;
use crate::obstacle::AsteroidField;
use crate::ship::{ShipHandle, ShipPool};
use crate::trail::TrailPool;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Missile {
    pub agent: Agent,
    /// Time alive; valid while within `[0, MISSILE_MAX_LIFE]`.
    pub time: f32,
    pub target: Option<ShipHandle>,
    pub fired_by: Option<ShipHandle>,
    pub trail: Option<usize>,
    yaw: f32,
    pitch: f32,
}

impl Default for Missile {
    fn default() -> Self {
        Self {
            agent: Agent::default(),
            time: MISSILE_MAX_LIFE + 1.0,
            target: None,
            fired_by: None,
            trail: None,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl Steer for Missile {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn set_steering(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
    }
}

impl Missile {
    pub fn is_valid(&self) -> bool {
        self.time >= 0.0 && self.time <= MISSILE_MAX_LIFE
    }

    /// Force the missile past its life and release its trail.
    pub fn expire(&mut self, trails: &mut TrailPool) {
        self.time = MISSILE_MAX_LIFE + 1.0;
        if let Some(trail) = self.trail.take() {
            trails.invalidate(trail);
        }
    }

    pub fn is_chasing(&self, ship: ShipHandle) -> bool {
        self.is_valid() && self.target == Some(ship)
    }
}

#[derive(Debug, Clone)]
pub struct MissilePool {
    pub missiles: Vec<Missile>,
}

impl Default for MissilePool {
    fn default() -> Self {
        Self::new(MAX_MISSILES)
    }
}

impl MissilePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            missiles: vec![Missile::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.missiles.len()
    }

    /// Launch a missile from `position` toward `target`.
    ///
    /// Returns `None` when every missile slot is in flight.
    pub fn launch(
        &mut self,
        position: Vec3,
        rotation: Quat,
        target: ShipHandle,
        fired_by: ShipHandle,
        trails: &mut TrailPool,
    ) -> Option<usize> {
        let index = self.missiles.iter().position(|m| !m.is_valid())?;
        let trail = trails.spawn(position, TRAIL_SIDE_MISSILE);
        if let Some(slot) = trail {
            trails.set_parameters(slot, MISSILE_TRAIL_COLOR, 1.0);
        }
        self.missiles[index] = Missile {
            agent: Agent::new(position, rotation),
            time: 0.0,
            target: Some(target),
            fired_by: Some(fired_by),
            trail,
            yaw: 0.0,
            pitch: 0.0,
        };
        Some(index)
    }

    /// Indices of live missiles chasing `ship`.
    pub fn chasing(&self, ship: ShipHandle) -> impl Iterator<Item = usize> + '_ {
        self.missiles
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.is_chasing(ship))
            .map(|(i, _)| i)
    }

    /// Expire the first missile chasing `ship`.
    ///
    /// Only one is released; any others keep flying and expire on their next
    /// tick once they notice the target is gone.
    pub fn invalidate_missile_chasing(&mut self, ship: ShipHandle, trails: &mut TrailPool) {
        if let Some(missile) = self.missiles.iter_mut().find(|m| m.is_chasing(ship)) {
            missile.expire(trails);
        }
    }

    pub fn tick(
        &mut self,
        delta_ms: f32,
        ships: &ShipPool,
        field: &AsteroidField,
        trails: &mut TrailPool,
        explosions: &mut EffectPool,
    ) {
        for missile in self.missiles.iter_mut().filter(|m| m.is_valid()) {
            missile.agent.refresh_basis();
            let target = missile
                .target
                .and_then(|handle| ships.get(handle))
                .map(|ship| ship.agent.position);

            let mut keep = target.is_some();
            if field.collide_with_asteroids(missile.agent.position, MISSILE_ASTEROID_RADIUS) {
                keep = false;
            }

            if let (true, Some(aim)) = (keep, target) {
                let turn_ratio = (missile.time * MISSILE_TURN_GROWTH).min(MISSILE_TURN_RATIO_MAX);
                let from = missile.agent.position;
                missile.go_toward(aim, from, turn_ratio);
                missile.agent.integrate(missile.yaw, missile.pitch, 1.0);

                missile.time += delta_ms;
                missile.agent.position += missile.agent.forward * MISSILE_SPEED * delta_ms;
                if let Some(trail) = missile.trail {
                    if delta_ms > MIN_ACTIVE_DELTA {
                        trails.append(trail, missile.agent.position);
                    }
                }
                keep = missile.is_valid();
            }

            if !keep {
                explosions.spawn(missile.agent.position, missile.agent.rotation);
                missile.expire(trails);
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.missiles.iter().filter(|m| m.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchDefinition;
    use crate::ship::Pilot;

    fn setup() -> (ShipPool, TrailPool, EffectPool) {
        (
            ShipPool::new(4),
            TrailPool::new(8),
            EffectPool::new(MAX_EXPLOSIONS, EXPLOSION_TIMEOUT),
        )
    }

    fn spawn(ships: &mut ShipPool, trails: &mut TrailPool, at: Vec3, faction: u8) -> ShipHandle {
        ships
            .spawn_ship(
                at,
                Quat::IDENTITY,
                Pilot::ai(),
                faction,
                &MatchDefinition::default(),
                trails,
            )
            .unwrap()
    }

    #[test]
    fn launch_claims_slot_and_white_trail() {
        let (mut ships, mut trails, _) = setup();
        let a = spawn(&mut ships, &mut trails, Vec3::ZERO, 0);
        let b = spawn(&mut ships, &mut trails, Vec3::Z * 100.0, 1);
        let mut pool = MissilePool::new(1);
        let i = pool.launch(Vec3::ZERO, Quat::IDENTITY, b, a, &mut trails).unwrap();
        let trail = pool.missiles[i].trail.unwrap();
        assert_eq!(trails.trails[trail].side, TRAIL_SIDE_MISSILE);
        assert_eq!(trails.trails[trail].color, MISSILE_TRAIL_COLOR);
        assert!(pool.launch(Vec3::ZERO, Quat::IDENTITY, b, a, &mut trails).is_none(), "pool full");
    }

    #[test]
    fn missile_closes_on_target() {
        let (mut ships, mut trails, mut explosions) = setup();
        let a = spawn(&mut ships, &mut trails, Vec3::ZERO, 0);
        let b = spawn(&mut ships, &mut trails, Vec3::new(30.0, 0.0, 200.0), 1);
        let field = AsteroidField::default();
        let mut pool = MissilePool::default();
        let i = pool.launch(Vec3::ZERO, Quat::IDENTITY, b, a, &mut trails).unwrap();
        let start = pool.missiles[i].agent.position.distance(Vec3::new(30.0, 0.0, 200.0));
        for _ in 0..60 {
            pool.tick(16.0, &ships, &field, &mut trails, &mut explosions);
        }
        let now = pool.missiles[i].agent.position.distance(Vec3::new(30.0, 0.0, 200.0));
        assert!(now < start);
        assert!(pool.missiles[i].agent.forward.x > 0.0, "nose turned toward the target");
    }

    #[test]
    fn lost_target_expires_with_explosion() {
        let (mut ships, mut trails, mut explosions) = setup();
        let a = spawn(&mut ships, &mut trails, Vec3::ZERO, 0);
        let b = spawn(&mut ships, &mut trails, Vec3::Z * 100.0, 1);
        let mut pool = MissilePool::default();
        let i = pool.launch(Vec3::ZERO, Quat::IDENTITY, b, a, &mut trails).unwrap();
        ships.ships[b.index].life = -1.0;
        pool.tick(16.0, &ships, &AsteroidField::default(), &mut trails, &mut explosions);
        assert!(!pool.missiles[i].is_valid());
        assert_eq!(explosions.active_count(), 1);
    }

    #[test]
    fn only_first_chaser_is_invalidated() {
        let (mut ships, mut trails, _) = setup();
        let a = spawn(&mut ships, &mut trails, Vec3::ZERO, 0);
        let b = spawn(&mut ships, &mut trails, Vec3::Z * 100.0, 1);
        let mut pool = MissilePool::default();
        pool.launch(Vec3::ZERO, Quat::IDENTITY, b, a, &mut trails);
        pool.launch(Vec3::ZERO, Quat::IDENTITY, b, a, &mut trails);
        pool.invalidate_missile_chasing(b, &mut trails);
        assert_eq!(pool.chasing(b).count(), 1);
    }

    #[test]
    fn fuel_runs_out() {
        let (mut ships, mut trails, mut explosions) = setup();
        let a = spawn(&mut ships, &mut trails, Vec3::ZERO, 0);
        let b = spawn(&mut ships, &mut trails, Vec3::Z * 100_000.0, 1);
        let mut pool = MissilePool::default();
        let i = pool.launch(Vec3::ZERO, Quat::IDENTITY, b, a, &mut trails).unwrap();
        pool.tick(MISSILE_MAX_LIFE + 1.0, &ships, &AsteroidField::default(), &mut trails, &mut explosions);
        assert!(!pool.missiles[i].is_valid());
        assert!(pool.missiles[i].trail.is_none());
    }
}
