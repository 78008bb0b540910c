//! The match context: every pool, the asteroid field, the clocks and the
//! random source of one battle, plus the fixed-order frame tick.
//!
//! A tick runs in this order:
//! 1. pilots: AI decisions and human input, in ship index order
//! 2. flight: the shared physics step for every live ship
//! 3. shots, then missiles
//! 4. combat: shots, missiles and asteroids against every ship
//! 5. human lock-on tracking
//! 6. end of life for ships that died this tick
//! 7. sparks, explosions and trails
//!
//! Nothing ticks while the smoothed game speed is at or below
//! [`PAUSED_GAME_SPEED`].

use crate::ai::{self, AiContext};
use crate::config::{MatchDefinition, Tuning};
use crate::constants::*;
use crate::effects::EffectPool;
use crate::input::PilotInputs;
use crate::missile::MissilePool;
use crate::obstacle::AsteroidField;
use crate::ship::{Armory, FlightFrame, Pilot, ShipPool};
use crate::shot::ShotPool;
use crate::trail::TrailPool;
use bevy::math::EulerRot;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// Something presentation may want to react to (sound, camera shake, HUD).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BattleEvent {
    ShotFired { ship: usize, cannon: usize },
    ShieldHit { ship: usize, position: Vec3 },
    MissileLaunched { ship: usize, target: usize },
    /// `cue` picks one of [`EXPLOSION_CUE_COUNT`] interchangeable sounds.
    Explosion { position: Vec3, cue: usize },
    ShipDestroyed { ship: usize, faction: u8, human: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BattleOutcome {
    #[default]
    Ongoing,
    Victory,
    Defeat,
}

/// Ships lost to asteroids, per faction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrashTally {
    pub allies: u32,
    pub enemies: u32,
}

impl CrashTally {
    pub fn record(&mut self, faction: u8) {
        if faction == 0 {
            self.allies += 1;
        } else {
            self.enemies += 1;
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct Battle {
    pub definition: MatchDefinition,
    pub tuning: Tuning,
    pub field: AsteroidField,
    pub ships: ShipPool,
    pub shots: ShotPool,
    pub missiles: MissilePool,
    pub trails: TrailPool,
    pub explosions: EffectPool,
    pub sparks: EffectPool,
    pub crashes: CrashTally,
    /// Scaled battle time in milliseconds.
    pub clock: f32,
    pub game_speed: f32,
    pub target_game_speed: f32,
    pub outcome: BattleOutcome,
    pub(crate) rng: StdRng,
    pub(crate) events: Vec<BattleEvent>,
    shot_timer: f32,
    /// Seconds the deciding condition has held.
    end_timer: f32,
    human_count: usize,
}

impl Battle {
    /// Build the asteroid field, spawn both fleets and clear the spawn zones.
    pub fn new(definition: MatchDefinition, tuning: Tuning) -> Self {
        let capacity = definition.ship_capacity();
        let field = AsteroidField::generate(
            definition.seed,
            definition.asteroid_count,
            definition.asteroid_spread,
        );
        let mut battle = Self {
            field,
            ships: ShipPool::new(capacity),
            shots: ShotPool::default(),
            missiles: MissilePool::default(),
            trails: TrailPool::new(capacity + MAX_MISSILES),
            explosions: EffectPool::new(MAX_EXPLOSIONS, EXPLOSION_TIMEOUT),
            sparks: EffectPool::new(MAX_SPARKS, SPARKS_TIMEOUT),
            crashes: CrashTally::default(),
            clock: 0.0,
            game_speed: 1.0,
            target_game_speed: 1.0,
            outcome: BattleOutcome::Ongoing,
            rng: StdRng::seed_from_u64(definition.seed.rotate_left(32)),
            events: Vec::new(),
            shot_timer: 0.0,
            end_timer: 0.0,
            human_count: definition.human_count(),
            definition,
            tuning,
        };
        battle.spawn_fleets();
        battle
    }

    fn spawn_fleets(&mut self) {
        let def = self.definition.clone();
        let ally_spawn = Vec3::new(0.0, 0.0, -FACTION_SPAWN_DISTANCE);
        let enemy_spawn = Vec3::new(0.0, 0.0, FACTION_SPAWN_DISTANCE);
        let mut player = 0;

        for i in 0..def.human_allies {
            let at = ally_spawn + Vec3::X * (i as f32 * HUMAN_SPAWN_SPACING);
            self.ships
                .spawn_ship(at, Quat::IDENTITY, Pilot::human(player), 0, &def, &mut self.trails);
            player += 1;
        }
        for i in 0..def.human_enemies {
            let at = enemy_spawn + Vec3::X * (i as f32 * HUMAN_SPAWN_SPACING);
            let facing = Quat::from_rotation_y(PI);
            self.ships
                .spawn_ship(at, facing, Pilot::human(player), 1, &def, &mut self.trails);
            player += 1;
        }
        for (count, faction, around) in [(def.ai_allies, 0, ally_spawn), (def.ai_enemies, 1, enemy_spawn)] {
            for _ in 0..count {
                let at = around + self.random_offset(AI_SPAWN_SPREAD);
                let facing = Quat::from_euler(
                    EulerRot::YXZ,
                    self.rng.gen::<f32>() * TAU,
                    self.rng.gen::<f32>() * TAU,
                    self.rng.gen::<f32>() * TAU,
                );
                self.ships
                    .spawn_ship(at, facing, Pilot::ai(), faction, &def, &mut self.trails);
            }
        }

        self.field.remove_asteroids(ally_spawn, SPAWN_CLEAR_RADIUS);
        self.field.remove_asteroids(enemy_spawn, SPAWN_CLEAR_RADIUS);
        info!(
            "Battle ready: {} ships, {} asteroids, seed {}",
            self.ships.capacity(),
            self.field.len(),
            def.seed
        );
    }

    fn random_offset(&mut self, spread: f32) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(-spread..spread),
            self.rng.gen_range(-spread..spread),
            self.rng.gen_range(-spread..spread),
        )
    }

    pub fn pause(&mut self) {
        self.target_game_speed = 0.0;
    }

    pub fn resume(&mut self) {
        self.target_game_speed = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.game_speed <= PAUSED_GAME_SPEED
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the battle by one engine frame of `engine_delta_ms`.
    pub fn tick(&mut self, engine_delta_ms: f32, inputs: &PilotInputs) {
        self.game_speed += (self.target_game_speed - self.game_speed) * GAME_SPEED_SMOOTHING;
        if !self.is_paused() {
            let delta_ms = engine_delta_ms * self.game_speed;
            self.clock += delta_ms;

            self.shot_timer -= delta_ms;
            let can_shoot = self.shot_timer <= 0.0;
            if can_shoot {
                self.shot_timer = SHOT_INTERVAL;
            }

            self.tick_pilots(delta_ms, inputs);
            self.tick_flight(delta_ms, can_shoot);

            self.shots.tick(delta_ms, &self.field);
            self.missiles.tick(
                delta_ms,
                &self.ships,
                &self.field,
                &mut self.trails,
                &mut self.explosions,
            );

            self.resolve_combat();
            self.track_human_prey(delta_ms);
            self.end_of_life();
            for ship in &mut self.ships.ships {
                ship.visible = ship.is_valid();
            }

            self.sparks.tick(delta_ms);
            self.explosions.tick(delta_ms);
            if self.target_game_speed == 1.0 {
                self.trails.tick(delta_ms);
            }
        }
        self.update_outcome(engine_delta_ms);
    }

    fn tick_pilots(&mut self, delta_ms: f32, inputs: &PilotInputs) {
        let ctx = AiContext {
            field: &self.field,
            tuning: &self.tuning,
            enemy_boundary_radius: self.definition.enemy_boundary_radius,
            clock: self.clock,
            delta_ms,
        };

        for index in 0..self.ships.capacity() {
            let ship = &mut self.ships.ships[index];
            if !ship.is_valid() {
                continue;
            }
            if let Some(stats) = ship.statistics.as_mut() {
                stats.battle_time += delta_ms;
            }

            let pilot = ship.pilot;
            match pilot {
                Pilot::Ai(_) => {
                    ai::think(&mut self.ships, index, &ctx, &mut self.rng);
                }
                Pilot::Human { player } => {
                    let boundary = self.definition.human_boundary_radius;
                    if ship.agent.position.length() > boundary {
                        ship.agent.position = ship.agent.position.normalize() * boundary;
                    }
                    ship.input = inputs.get(player).constrained(self.tuning.player_turn_rate);
                }
            }
        }
    }

    /// Human lock-on: follow the best prey while the missile cooldown is
    /// idle, drop it otherwise.  Runs after flight and combat, so a missile
    /// launched this frame clears the lock immediately.
    fn track_human_prey(&mut self, delta_ms: f32) {
        for index in 0..self.ships.capacity() {
            let ship = &mut self.ships.ships[index];
            if !ship.is_valid() || !ship.is_human() {
                continue;
            }
            if ship.missile_cooldown <= 0.0 {
                self.ships.update_best_prey(index, delta_ms, &self.tuning);
            } else {
                ship.best_prey = None;
                ship.best_prey_time = 0.0;
            }
        }
    }

    fn tick_flight(&mut self, delta_ms: f32, can_shoot: bool) {
        let frame = FlightFrame {
            delta_ms,
            game_speed: self.game_speed,
            target_game_speed: self.target_game_speed,
            can_shoot,
        };
        let mut armory = Armory {
            shots: &mut self.shots,
            missiles: &mut self.missiles,
            trails: &mut self.trails,
            events: &mut self.events,
        };
        for index in 0..self.ships.capacity() {
            let handle = self.ships.handle(index);
            let ship = &mut self.ships.ships[index];
            if ship.is_valid() {
                let input = ship.input;
                ship.tick_flight(handle, input, &frame, &self.tuning, &mut armory);
            }
        }
    }

    fn update_outcome(&mut self, engine_delta_ms: f32) {
        if self.outcome != BattleOutcome::Ongoing {
            return;
        }
        let allies = self.ships.alive_in_faction(0);
        let enemies = self.ships.alive_in_faction(1);
        let decided = if self.human_count > 0 {
            if self.ships.humans_alive() == 0 {
                Some(BattleOutcome::Defeat)
            } else if enemies == 0 {
                Some(BattleOutcome::Victory)
            } else {
                None
            }
        } else if enemies == 0 {
            Some(BattleOutcome::Victory)
        } else if allies == 0 {
            Some(BattleOutcome::Defeat)
        } else {
            None
        };

        match decided {
            Some(outcome) => {
                self.end_timer += engine_delta_ms / 1000.0;
                if self.end_timer >= self.definition.delayed_end {
                    self.outcome = outcome;
                    info!(
                        "Battle decided: {outcome:?} after {:.1}s (crashes: {} allies, {} enemies)",
                        self.clock / 1000.0,
                        self.crashes.allies,
                        self.crashes.enemies
                    );
                }
            }
            None => self.end_timer = 0.0,
        }
    }
}
