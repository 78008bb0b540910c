//! Ships and the fixed ship pool.
//!
//! A ship is valid while its life is positive.  Slots are recycled by
//! [`ShipPool::spawn_ship`], which bumps the slot generation so handles held
//! by shots, missiles and other pilots go stale instead of pointing at the
//! new occupant.
//!
//! [`Ship::tick_flight`] is the shared per-tick physics step; it runs after
//! the pilot (human or AI) has produced a [`ShipInput`] for the tick.

use crate::agent::{Agent, Steer};
use crate::ai::AiBrain;
use crate::battle::BattleEvent;
use crate::camera::ShipCamera;
use crate::config::{MatchDefinition, Tuning};
use crate::constants::*;
use crate::input::ShipInput;
use crate::missile::MissilePool;
use crate::shot::ShotPool;
use crate::trail::TrailPool;
use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

/// Weak reference to a ship slot.
///
/// Resolves only while the slot still holds the same spawn and is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShipHandle {
    pub index: usize,
    pub generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Maneuver {
    #[default]
    None,
    /// Half loop with a roll out, used to shake off pursuers.
    Immelmann,
}

/// Who produces the ship's input each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pilot {
    Human { player: usize },
    Ai(AiBrain),
}

impl Pilot {
    pub fn human(player: usize) -> Self {
        Pilot::Human { player }
    }

    pub fn ai() -> Self {
        Pilot::Ai(AiBrain::default())
    }
}

/// Per-pilot battle statistics, kept for human ships only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub ships_destroyed: u32,
    /// Milliseconds spent alive in battle.
    pub battle_time: f32,
    pub shots_fired: u32,
    pub shots_hitting: u32,
    pub missiles_fired: u32,
}

impl Statistics {
    /// Fraction of fired shots that hit, 0 when nothing was fired.
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.shots_hitting as f32 / self.shots_fired as f32
        }
    }
}

/// Frame-wide values the flight step needs.
#[derive(Debug, Clone, Copy)]
pub struct FlightFrame {
    pub delta_ms: f32,
    pub game_speed: f32,
    pub target_game_speed: f32,
    /// Global cannon throttle for this frame.
    pub can_shoot: bool,
}

/// Mutable pools a ship may spawn into while flying.
pub struct Armory<'a> {
    pub shots: &'a mut ShotPool,
    pub missiles: &'a mut MissilePool,
    pub trails: &'a mut TrailPool,
    pub events: &'a mut Vec<BattleEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub agent: Agent,
    pub pilot: Pilot,
    /// Last resolved input; AI pilots steer through it.
    pub input: ShipInput,
    pub life: f32,
    pub faction: u8,
    pub generation: u32,

    // ── Flight ────────────────────────────────────────────────────────────────
    pub velocity: f32,
    pub speed_ratio: f32,
    pub roll: f32,
    pub thruster_power: f32,
    /// Burst blend in `[-2, 2]`: positive while bursting, negative while braking.
    pub bursting: f32,
    pub maneuver: Maneuver,
    pub maneuver_timer: f32,

    // ── Weapons ───────────────────────────────────────────────────────────────
    pub cannon_index: usize,
    pub missile_cooldown: f32,
    pub available_missiles: u32,

    // ── Targeting ─────────────────────────────────────────────────────────────
    pub best_prey: Option<ShipHandle>,
    /// How long `best_prey` has stayed selected.
    pub best_prey_time: f32,
    pub dot_to_enemy: f32,
    pub dot_to_ally: f32,

    pub statistics: Option<Statistics>,
    pub trail: Option<usize>,
    pub camera: Option<ShipCamera>,
    /// Whether the ship model is shown; follows validity during play and the
    /// recorded frame during replay.
    pub visible: bool,
    /// Set once end of life has recycled the slot.  Replay never writes it.
    pub torn_down: bool,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            agent: Agent::default(),
            pilot: Pilot::ai(),
            input: ShipInput::default(),
            life: 0.0,
            faction: 0,
            generation: 0,
            velocity: 0.0,
            speed_ratio: 0.0,
            roll: 0.0,
            thruster_power: 0.0,
            bursting: 0.0,
            maneuver: Maneuver::None,
            maneuver_timer: 0.0,
            cannon_index: 0,
            missile_cooldown: 0.0,
            available_missiles: 0,
            best_prey: None,
            best_prey_time: 0.0,
            dot_to_enemy: 0.0,
            dot_to_ally: 0.0,
            statistics: None,
            trail: None,
            camera: None,
            visible: false,
            torn_down: true,
        }
    }
}

impl Steer for Ship {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn set_steering(&mut self, yaw: f32, pitch: f32) {
        self.input.yaw = yaw;
        self.input.pitch = pitch;
    }
}

impl Ship {
    pub fn is_valid(&self) -> bool {
        self.life > 0.0
    }

    pub fn is_human(&self) -> bool {
        matches!(self.pilot, Pilot::Human { .. })
    }

    pub fn handle(&self, index: usize) -> ShipHandle {
        ShipHandle {
            index,
            generation: self.generation,
        }
    }

    /// Forward alignment toward `position`: 1 dead ahead, -1 behind.
    pub fn dot_to_target(&self, position: Vec3) -> f32 {
        (position - self.agent.position)
            .normalize_or_zero()
            .dot(self.agent.forward)
    }

    /// Missile lock progress in `[0, 1]` for the HUD.
    pub fn lock_progress(&self, tuning: &Tuning) -> f32 {
        if self.best_prey.is_none() {
            return 0.0;
        }
        (self.best_prey_time / tuning.time_to_lock_missile).clamp(0.0, 1.0)
    }

    /// Visual roll of the ship model around its forward axis.
    pub fn model_roll(&self) -> f32 {
        self.roll * 30.0
    }

    fn missile_mount(&self) -> Option<Vec3> {
        if self.faction != 0 {
            return None;
        }
        let slot = (self.available_missiles as usize).checked_sub(1)?;
        ALLY_MISSILE_MOUNTS.get(slot).copied()
    }

    /// Launch a missile at `target` from the next loaded mount.
    ///
    /// Nothing is launched (and no missile is used up) when the ship is out
    /// of missiles, has no mount left, or the missile pool is full.
    pub fn fire_missile(
        &mut self,
        handle: ShipHandle,
        target: ShipHandle,
        missiles: &mut MissilePool,
        trails: &mut TrailPool,
    ) -> Option<usize> {
        if self.available_missiles == 0 {
            return None;
        }
        let mount = self.missile_mount()?;
        let position = self
            .agent
            .world_matrix()
            .transform_point3(mount * SHIP_MODEL_SCALE);
        let index = missiles.launch(position, self.agent.rotation, target, handle, trails)?;
        self.available_missiles -= 1;
        Some(index)
    }

    /// One physics step: maneuver, orientation, thrust, motion, weapons.
    pub fn tick_flight(
        &mut self,
        handle: ShipHandle,
        mut input: ShipInput,
        frame: &FlightFrame,
        tuning: &Tuning,
        armory: &mut Armory,
    ) {
        let delta_ms = frame.delta_ms;
        let game_speed = frame.game_speed;

        self.agent.refresh_basis();
        let world = self.agent.world_matrix();

        match self.maneuver {
            Maneuver::None => {
                if input.immelmann {
                    self.maneuver = Maneuver::Immelmann;
                    self.maneuver_timer = tuning.immelmann_duration;
                }
            }
            Maneuver::Immelmann => {
                input.yaw = 0.0;
                if self.maneuver_timer >= IMMELMANN_PITCH_PHASE {
                    input.pitch -= IMMELMANN_PITCH_RATE;
                } else {
                    input.pitch = 0.0;
                }
                self.maneuver_timer -= delta_ms;
                if self.maneuver_timer <= 0.0 {
                    self.maneuver = Maneuver::None;
                }
            }
        }

        // Bursting stiffens the controls.
        let constrain = (1.1 - self.bursting * 0.5).min(1.0) * game_speed;
        input.yaw *= constrain;
        input.pitch *= constrain;

        self.roll += (input.yaw - self.roll) * ROLL_SMOOTHING * game_speed;
        if self.maneuver == Maneuver::Immelmann && self.maneuver_timer < IMMELMANN_PITCH_PHASE {
            self.roll = (self.maneuver_timer / IMMELMANN_PITCH_PHASE * FRAC_PI_2).sin()
                * IMMELMANN_ROLL_AMPLITUDE;
        }

        self.agent.integrate(input.yaw, input.pitch, ORIENTATION_SLERP);

        // ── Thrust ───────────────────────────────────────────────────────────
        self.speed_ratio = (self.velocity / tuning.max_speed).min(1.0);
        let thrust = match self.pilot {
            Pilot::Human { .. } if input.burst => 2.0,
            Pilot::Human { .. } if input.braking => 0.0,
            Pilot::Human { .. } => 1.0,
            Pilot::Ai(_) if self.faction != 0 => 2.0,
            Pilot::Ai(_) => 1.0,
        };
        self.thruster_power += (thrust - self.thruster_power) * THRUSTER_SMOOTHING;

        if input.burst {
            self.velocity += tuning.max_accel * (1.0 - self.speed_ratio) * ACCEL_FACTOR;
        } else if input.braking {
            self.velocity *= BRAKE_DAMPING;
        } else {
            self.velocity += tuning.max_accel * (CRUISE_SPEED_RATIO - self.speed_ratio) * ACCEL_FACTOR;
        }

        self.agent.position += self.agent.forward * self.velocity * game_speed;

        if let Some(trail) = self.trail {
            if frame.target_game_speed == 1.0 {
                armory.trails.append(trail, self.agent.position);
                armory.trails.set_visible(trail, !self.is_human());
            }
        }

        // ── Cannons ──────────────────────────────────────────────────────────
        if frame.can_shoot && input.shooting && delta_ms > MIN_ACTIVE_DELTA {
            let cannon = CANNON_OFFSETS[usize::from(self.faction.min(1))][self.cannon_index];
            let fired = armory
                .shots
                .add_shot(handle, self.faction, self.is_human(), world, cannon);
            if fired.is_some() {
                armory.events.push(BattleEvent::ShotFired {
                    ship: handle.index,
                    cannon: self.cannon_index,
                });
            }
            if let Some(stats) = self.statistics.as_mut() {
                stats.shots_fired += 1;
            }
            self.cannon_index ^= 1;
        }

        // ── Missiles ─────────────────────────────────────────────────────────
        self.missile_cooldown = (self.missile_cooldown - delta_ms).max(0.0);
        if let Some(target) = self.best_prey {
            if self.best_prey_time > tuning.time_to_lock_missile
                && input.launch_missile
                && self.missile_cooldown <= 0.0
            {
                if self
                    .fire_missile(handle, target, armory.missiles, armory.trails)
                    .is_some()
                {
                    if let Some(stats) = self.statistics.as_mut() {
                        stats.missiles_fired += 1;
                    }
                    armory.events.push(BattleEvent::MissileLaunched {
                        ship: handle.index,
                        target: target.index,
                    });
                }
                self.missile_cooldown = tuning.missile_cooldown_time;
            }
        }

        self.bursting = if input.braking {
            (self.bursting - delta_ms * BURSTING_RATE).max(-BURSTING_LIMIT)
        } else if input.burst {
            (self.bursting + delta_ms * BURSTING_RATE).min(BURSTING_LIMIT)
        } else {
            self.bursting * BURSTING_DECAY
        };

        self.input = input;
    }
}

/// Fixed-size pool of ships with stable slot indices.
#[derive(Debug, Clone)]
pub struct ShipPool {
    pub ships: Vec<Ship>,
}

impl ShipPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            ships: vec![Ship::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.ships.len()
    }

    /// Resolve a handle to the ship in its slot, dead or alive, as long as
    /// the slot has not been respawned since.
    pub fn get_any(&self, handle: ShipHandle) -> Option<&Ship> {
        self.ships
            .get(handle.index)
            .filter(|s| s.generation == handle.generation)
    }

    /// Resolve a handle to a live ship.
    pub fn get(&self, handle: ShipHandle) -> Option<&Ship> {
        self.ships
            .get(handle.index)
            .filter(|s| s.generation == handle.generation && s.is_valid())
    }

    pub fn get_mut(&mut self, handle: ShipHandle) -> Option<&mut Ship> {
        self.ships
            .get_mut(handle.index)
            .filter(|s| s.generation == handle.generation && s.is_valid())
    }

    /// Handle of the current occupant of `index`.
    pub fn handle(&self, index: usize) -> ShipHandle {
        ShipHandle {
            index,
            generation: self.ships[index].generation,
        }
    }

    /// Reinitialise the first free slot.  Returns `None` when the pool is full.
    pub fn spawn_ship(
        &mut self,
        position: Vec3,
        rotation: Quat,
        pilot: Pilot,
        faction: u8,
        definition: &MatchDefinition,
        trails: &mut TrailPool,
    ) -> Option<ShipHandle> {
        let index = self.ships.iter().position(|s| !s.is_valid())?;
        let human = matches!(pilot, Pilot::Human { .. });
        let life = match (human, faction) {
            (true, 0) => definition.human_allies_life,
            (true, _) => definition.human_enemies_life,
            (false, 0) => definition.ai_allies_life,
            (false, _) => definition.ai_enemies_life,
        };

        let (side, color) = if faction == 0 {
            (TRAIL_SIDE_ALLY, ALLY_TRAIL_COLOR)
        } else {
            (TRAIL_SIDE_ENEMY, ENEMY_TRAIL_COLOR)
        };
        let trail = trails.spawn(position, side);
        if let Some(slot) = trail {
            trails.set_parameters(slot, color, 1.0);
            trails.set_visible(slot, !human);
        }

        let generation = self.ships[index].generation.wrapping_add(1);
        self.ships[index] = Ship {
            agent: Agent::new(position, rotation),
            pilot,
            life,
            faction,
            generation,
            available_missiles: if faction == 0 { ALLY_MISSILE_LOAD } else { 0 },
            statistics: human.then(Statistics::default),
            trail,
            camera: human.then(ShipCamera::default),
            visible: true,
            torn_down: false,
            ..Default::default()
        };
        Some(self.handle(index))
    }

    /// Tear down a dead ship: drop its shot credit, release its trail and
    /// clear every pilot still targeting it.
    pub fn destroy_ship(&mut self, index: usize, shots: &mut ShotPool, trails: &mut TrailPool) {
        let Some(ship) = self.ships.get_mut(index) else {
            return;
        };
        info!("Destroying ship {index} (faction {})", ship.faction);
        let handle = ship.handle(index);
        if let Some(trail) = ship.trail.take() {
            trails.invalidate(trail);
        }
        ship.visible = false;
        ship.torn_down = true;
        ship.bursting = 0.0;
        shots.forget_owner(handle);

        for other in self.ships.iter_mut().filter(|s| s.is_valid()) {
            if other.best_prey == Some(handle) {
                other.best_prey = None;
                other.best_prey_time = 0.0;
            }
        }
    }

    /// Number of AI pilots other than the target itself that have it as best prey.
    pub fn how_many_targeting(&self, target: usize) -> usize {
        self.ships
            .iter()
            .enumerate()
            .filter(|(i, s)| {
                *i != target && !s.is_human() && s.best_prey.is_some_and(|h| h.index == target)
            })
            .count()
    }

    /// Pick the most aligned enemy inside the perception cone, and record
    /// the best enemy and ally alignment on the ship.
    ///
    /// Ships with a camera only consider what is on screen.  The crowding
    /// cap (`ai_max_targets`) is advisory: a crowded target still wins when
    /// it is the most aligned one.
    pub fn find_best_prey_for(&mut self, index: usize, tuning: &Tuning) -> Option<ShipHandle> {
        let me = &self.ships[index];
        let mut dot_to_enemy = tuning.ai_perception_cone;
        let mut dot_to_ally = tuning.ai_perception_cone;
        let mut best = None;

        for (i, other) in self.ships.iter().enumerate() {
            if i == index || !other.is_valid() {
                continue;
            }
            if let Some(camera) = &me.camera {
                if !camera.is_on_screen(&me.agent, other.agent.position) {
                    continue;
                }
            }
            let dot = me.dot_to_target(other.agent.position);
            if other.faction != me.faction {
                if dot > dot_to_enemy {
                    best = Some(i);
                    dot_to_enemy = dot;
                }
            } else if dot > dot_to_ally {
                dot_to_ally = dot;
            }
        }

        if let Some(i) = best {
            if !me.is_human() && self.how_many_targeting(i) > tuning.ai_max_targets {
                debug!("Ship {index} joins a crowded chase on ship {i}");
            }
        }

        let ship = &mut self.ships[index];
        ship.dot_to_enemy = dot_to_enemy;
        ship.dot_to_ally = dot_to_ally;
        best.map(|i| self.handle(i))
    }

    /// Re-select best prey and accumulate how long it has stayed selected.
    pub fn update_best_prey(&mut self, index: usize, delta_ms: f32, tuning: &Tuning) -> Option<ShipHandle> {
        let prey = self.find_best_prey_for(index, tuning);
        let ship = &mut self.ships[index];
        if prey == ship.best_prey {
            ship.best_prey_time += delta_ms;
        } else {
            ship.best_prey = prey;
            ship.best_prey_time = 0.0;
        }
        prey
    }

    /// Live ships of `faction`.
    pub fn alive_in_faction(&self, faction: u8) -> usize {
        self.ships
            .iter()
            .filter(|s| s.is_valid() && s.faction == faction)
            .count()
    }

    pub fn humans_alive(&self) -> usize {
        self.ships
            .iter()
            .filter(|s| s.is_valid() && s.is_human())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        ships: ShipPool,
        shots: ShotPool,
        missiles: MissilePool,
        trails: TrailPool,
        events: Vec<BattleEvent>,
        definition: MatchDefinition,
        tuning: Tuning,
    }

    impl Fixture {
        fn new(capacity: usize) -> Self {
            Self {
                ships: ShipPool::new(capacity),
                shots: ShotPool::default(),
                missiles: MissilePool::default(),
                trails: TrailPool::new(capacity + MAX_MISSILES),
                events: Vec::new(),
                definition: MatchDefinition::default(),
                tuning: Tuning::default(),
            }
        }

        fn spawn(&mut self, at: Vec3, pilot: Pilot, faction: u8) -> ShipHandle {
            self.ships
                .spawn_ship(at, Quat::IDENTITY, pilot, faction, &self.definition, &mut self.trails)
                .unwrap()
        }

        fn fly(&mut self, handle: ShipHandle, input: ShipInput, delta_ms: f32) {
            let frame = FlightFrame {
                delta_ms,
                game_speed: 1.0,
                target_game_speed: 1.0,
                can_shoot: true,
            };
            let mut armory = Armory {
                shots: &mut self.shots,
                missiles: &mut self.missiles,
                trails: &mut self.trails,
                events: &mut self.events,
            };
            self.ships.ships[handle.index].tick_flight(handle, input, &frame, &self.tuning, &mut armory);
        }
    }

    // ── Pool ─────────────────────────────────────────────────────────────────

    #[test]
    fn spawn_uses_definition_life_and_loadout() {
        let mut f = Fixture::new(4);
        let human = f.spawn(Vec3::ZERO, Pilot::human(0), 0);
        let raider = f.spawn(Vec3::Z, Pilot::ai(), 1);
        let h = &f.ships.ships[human.index];
        assert_eq!(h.life, f.definition.human_allies_life);
        assert_eq!(h.available_missiles, ALLY_MISSILE_LOAD);
        assert!(h.statistics.is_some() && h.camera.is_some());
        let r = &f.ships.ships[raider.index];
        assert_eq!(r.life, f.definition.ai_enemies_life);
        assert_eq!(r.available_missiles, 0);
        assert!(r.statistics.is_none());
    }

    #[test]
    fn full_pool_refuses_spawn() {
        let mut f = Fixture::new(1);
        f.spawn(Vec3::ZERO, Pilot::ai(), 0);
        assert!(f
            .ships
            .spawn_ship(Vec3::ZERO, Quat::IDENTITY, Pilot::ai(), 0, &f.definition, &mut f.trails)
            .is_none());
    }

    #[test]
    fn recycled_slot_invalidates_old_handles() {
        let mut f = Fixture::new(1);
        let first = f.spawn(Vec3::ZERO, Pilot::ai(), 0);
        f.ships.ships[0].life = -1.0;
        f.ships.destroy_ship(0, &mut f.shots, &mut f.trails);
        let second = f.spawn(Vec3::ZERO, Pilot::ai(), 1);
        assert_eq!(first.index, second.index);
        assert!(f.ships.get(first).is_none(), "stale handle must not resolve");
        assert!(f.ships.get(second).is_some());
    }

    #[test]
    fn destroy_clears_targeting_references() {
        let mut f = Fixture::new(3);
        let victim = f.spawn(Vec3::Z * 100.0, Pilot::ai(), 1);
        let hunter = f.spawn(Vec3::ZERO, Pilot::ai(), 0);
        f.ships.ships[hunter.index].best_prey = Some(victim);
        f.ships.ships[hunter.index].best_prey_time = 500.0;
        f.ships.ships[victim.index].life = 0.0;
        f.ships.destroy_ship(victim.index, &mut f.shots, &mut f.trails);
        assert_eq!(f.ships.ships[hunter.index].best_prey, None);
        assert_eq!(f.ships.ships[hunter.index].best_prey_time, 0.0);
        let trail = f.ships.ships[victim.index].trail;
        assert!(trail.is_none());
    }

    // ── Targeting ────────────────────────────────────────────────────────────

    #[test]
    fn best_prey_is_most_aligned_enemy_in_cone() {
        let mut f = Fixture::new(4);
        let me = f.spawn(Vec3::ZERO, Pilot::ai(), 0);
        let _off_axis = f.spawn(Vec3::new(100.0, 0.0, 100.0), Pilot::ai(), 1);
        let ahead = f.spawn(Vec3::new(5.0, 0.0, 100.0), Pilot::ai(), 1);
        let _behind_ally = f.spawn(Vec3::new(0.0, 0.0, 50.0), Pilot::ai(), 0);
        let prey = f.ships.find_best_prey_for(me.index, &f.tuning);
        assert_eq!(prey, Some(ahead));
        assert!(f.ships.ships[me.index].dot_to_enemy > 0.99);
        assert!(f.ships.ships[me.index].dot_to_ally > 0.99);
    }

    #[test]
    fn enemy_behind_cone_is_ignored() {
        let mut f = Fixture::new(2);
        let me = f.spawn(Vec3::ZERO, Pilot::ai(), 0);
        f.spawn(Vec3::new(0.0, 0.0, -100.0), Pilot::ai(), 1);
        assert_eq!(f.ships.find_best_prey_for(me.index, &f.tuning), None);
        assert_eq!(f.ships.ships[me.index].dot_to_enemy, f.tuning.ai_perception_cone);
    }

    #[test]
    fn dwell_time_accumulates_on_same_prey() {
        let mut f = Fixture::new(2);
        let me = f.spawn(Vec3::ZERO, Pilot::ai(), 0);
        f.spawn(Vec3::Z * 100.0, Pilot::ai(), 1);
        f.ships.update_best_prey(me.index, 16.0, &f.tuning);
        assert_eq!(f.ships.ships[me.index].best_prey_time, 0.0, "new prey resets dwell");
        f.ships.update_best_prey(me.index, 16.0, &f.tuning);
        f.ships.update_best_prey(me.index, 16.0, &f.tuning);
        assert_eq!(f.ships.ships[me.index].best_prey_time, 32.0);
    }

    #[test]
    fn how_many_targeting_counts_ai_only() {
        let mut f = Fixture::new(4);
        let target = f.spawn(Vec3::ZERO, Pilot::ai(), 1);
        let a = f.spawn(Vec3::X, Pilot::ai(), 0);
        let b = f.spawn(Vec3::Y, Pilot::human(0), 0);
        f.ships.ships[a.index].best_prey = Some(target);
        f.ships.ships[b.index].best_prey = Some(target);
        assert_eq!(f.ships.how_many_targeting(target.index), 1);
    }

    // ── Flight ───────────────────────────────────────────────────────────────

    #[test]
    fn cruise_settles_toward_half_speed() {
        let mut f = Fixture::new(1);
        let ship = f.spawn(Vec3::ZERO, Pilot::ai(), 0);
        for _ in 0..2000 {
            f.fly(ship, ShipInput::default(), 16.0);
        }
        let s = &f.ships.ships[ship.index];
        assert!((s.velocity - f.tuning.max_speed * 0.5).abs() < 0.01);
        assert!(s.agent.position.z > 0.0, "flies along forward");
    }

    #[test]
    fn burst_and_brake_drive_bursting_blend() {
        let mut f = Fixture::new(1);
        let ship = f.spawn(Vec3::ZERO, Pilot::human(0), 0);
        let burst = ShipInput { burst: true, ..Default::default() };
        for _ in 0..200 {
            f.fly(ship, burst, 16.0);
        }
        assert_eq!(f.ships.ships[ship.index].bursting, BURSTING_LIMIT);
        let brake = ShipInput { braking: true, ..Default::default() };
        for _ in 0..400 {
            f.fly(ship, brake, 16.0);
        }
        assert_eq!(f.ships.ships[ship.index].bursting, -BURSTING_LIMIT);
    }

    #[test]
    fn shooting_alternates_cannons_and_counts() {
        let mut f = Fixture::new(1);
        let ship = f.spawn(Vec3::ZERO, Pilot::human(0), 0);
        let fire = ShipInput { shooting: true, ..Default::default() };
        f.fly(ship, fire, 16.0);
        f.fly(ship, fire, 16.0);
        assert_eq!(f.shots.active_count(), 2);
        assert_eq!(f.ships.ships[ship.index].cannon_index, 0);
        assert_eq!(f.ships.ships[ship.index].statistics.unwrap().shots_fired, 2);
    }

    #[test]
    fn immelmann_runs_its_course() {
        let mut f = Fixture::new(1);
        let ship = f.spawn(Vec3::ZERO, Pilot::ai(), 0);
        f.fly(ship, ShipInput { immelmann: true, ..Default::default() }, 16.0);
        assert_eq!(f.ships.ships[ship.index].maneuver, Maneuver::Immelmann);
        for _ in 0..70 {
            f.fly(ship, ShipInput::default(), 16.0);
        }
        let s = &f.ships.ships[ship.index];
        assert_eq!(s.maneuver, Maneuver::None);
        assert!(s.agent.orientation.angle_between(Quat::IDENTITY) > 1.0, "nose pitched through the loop");
    }

    #[test]
    fn missile_needs_lock_and_ammo() {
        let mut f = Fixture::new(2);
        let me = f.spawn(Vec3::ZERO, Pilot::human(0), 0);
        let prey = f.spawn(Vec3::Z * 200.0, Pilot::ai(), 1);
        let launch = ShipInput { launch_missile: true, ..Default::default() };

        f.ships.ships[me.index].best_prey = Some(prey);
        f.ships.ships[me.index].best_prey_time = 0.0;
        f.fly(me, launch, 16.0);
        assert_eq!(f.missiles.active_count(), 0, "no lock yet");

        f.ships.ships[me.index].best_prey_time = f.tuning.time_to_lock_missile + 1.0;
        f.fly(me, launch, 16.0);
        assert_eq!(f.missiles.active_count(), 1);
        assert_eq!(f.ships.ships[me.index].available_missiles, ALLY_MISSILE_LOAD - 1);
        assert_eq!(f.ships.ships[me.index].missile_cooldown, f.tuning.missile_cooldown_time);
    }

    #[test]
    fn lock_progress_follows_dwell_time() {
        let mut f = Fixture::new(2);
        let me = f.spawn(Vec3::ZERO, Pilot::human(0), 0);
        let prey = f.spawn(Vec3::Z * 200.0, Pilot::ai(), 1);
        let ship = &mut f.ships.ships[me.index];
        assert_eq!(ship.lock_progress(&f.tuning), 0.0);
        ship.best_prey = Some(prey);
        ship.best_prey_time = f.tuning.time_to_lock_missile * 0.5;
        assert!((ship.lock_progress(&f.tuning) - 0.5).abs() < 1e-6);
        ship.best_prey_time = f.tuning.time_to_lock_missile * 3.0;
        assert_eq!(ship.lock_progress(&f.tuning), 1.0);
    }

    #[test]
    fn fire_missile_without_ammo_is_noop() {
        let mut f = Fixture::new(2);
        let raider = f.spawn(Vec3::ZERO, Pilot::ai(), 1);
        let prey = f.spawn(Vec3::Z * 200.0, Pilot::ai(), 0);
        let ship = &mut f.ships.ships[raider.index];
        assert!(ship.fire_missile(raider, prey, &mut f.missiles, &mut f.trails).is_none());
        assert_eq!(f.missiles.active_count(), 0);
    }
}
