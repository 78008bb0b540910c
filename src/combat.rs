//! Hit resolution for the battle tick: shots, missiles and asteroids against
//! every live ship, then end of life for whatever died.

use crate::battle::{Battle, BattleEvent};
use crate::constants::*;
use crate::ship::{Pilot, ShipHandle};
use bevy::prelude::*;
use rand::Rng;

impl Battle {
    pub(crate) fn resolve_combat(&mut self) {
        for index in 0..self.ships.capacity() {
            if self.ships.ships[index].is_valid() {
                self.resolve_shot_hits(index);
            }
            if self.ships.ships[index].is_valid() {
                self.resolve_missile_hits(index);
            }
            if self.ships.ships[index].is_valid() {
                self.resolve_asteroid_crash(index);
            }
        }
    }

    fn resolve_shot_hits(&mut self, index: usize) {
        let victim = self.ships.handle(index);
        let damage = self.definition.shot_damage;

        for shot_index in 0..self.shots.capacity() {
            let shot = self.shots.shots[shot_index];
            if !shot.is_active() || shot.fired_by == Some(victim) {
                continue;
            }
            let hit = self.shots.position(shot_index);
            let (position, rotation, forward) = {
                let ship = &self.ships.ships[index];
                (ship.agent.position, ship.agent.rotation, ship.agent.forward)
            };
            if hit.distance_squared(position) > SHOT_HIT_DISTANCE_SQ {
                continue;
            }

            self.sparks.spawn(position, rotation);
            self.shots.retire(shot_index);

            let firer = shot.fired_by.filter(|h| self.ships.get_any(*h).is_some());
            if let Some(stats) = firer.and_then(|h| self.ships.ships[h.index].statistics.as_mut()) {
                stats.damage_dealt += damage;
                stats.shots_hitting += 1;
            }
            let firer_faction = firer.map(|h| self.ships.ships[h.index].faction);

            let was_alive = self.ships.ships[index].is_valid();
            let dodge = self.rng.gen::<f32>() < self.tuning.ai_immelmann_probability;
            let evade_time = self.tuning.ai_evade_time;
            let ship = &mut self.ships.ships[index];
            if let Some(stats) = ship.statistics.as_mut() {
                stats.damage_taken += damage;
            }
            ship.life -= damage;

            if let Pilot::Ai(brain) = &mut ship.pilot {
                brain.evade_timer = evade_time;
                brain.evade_to =
                    position + (hit - position).normalize_or_zero().cross(forward) * AI_EVADE_DISTANCE;
                brain.pending_dodge |= dodge;
                if firer_faction.is_some_and(|f| f != ship.faction) {
                    ship.best_prey = firer;
                }
            }

            if was_alive && !ship.is_valid() {
                self.explosions.spawn(position, rotation);
                self.credit_kill(firer);
            } else if ship.is_valid() {
                self.events.push(BattleEvent::ShieldHit { ship: index, position: hit });
            }
        }
    }

    fn resolve_missile_hits(&mut self, index: usize) {
        let victim = self.ships.handle(index);
        let damage = self.definition.missile_damage;

        for missile_index in 0..self.missiles.capacity() {
            let missile = &self.missiles.missiles[missile_index];
            let ship = &self.ships.ships[index];
            if !missile.is_chasing(victim)
                || missile.agent.position.distance_squared(ship.agent.position) >= MISSILE_HIT_DISTANCE_SQ
            {
                continue;
            }
            let firer = missile.fired_by.filter(|h| self.ships.get_any(*h).is_some());
            self.missiles.missiles[missile_index].expire(&mut self.trails);

            if let Some(stats) = firer.and_then(|h| self.ships.ships[h.index].statistics.as_mut()) {
                stats.damage_dealt += damage;
            }
            let ship = &mut self.ships.ships[index];
            let was_alive = ship.is_valid();
            if let Some(stats) = ship.statistics.as_mut() {
                stats.damage_taken += damage;
            }
            ship.life -= damage;

            if was_alive && !ship.is_valid() {
                let (position, rotation) = (ship.agent.position, ship.agent.rotation);
                self.explosions.spawn(position, rotation);
                self.credit_kill(firer);
            }
        }
    }

    fn resolve_asteroid_crash(&mut self, index: usize) {
        let ship = &mut self.ships.ships[index];
        if !self.field.collide_with_asteroids(ship.agent.position, SHIP_RADIUS) {
            return;
        }
        ship.life = -1.0;
        self.explosions.spawn(ship.agent.position, ship.agent.rotation);
        self.crashes.record(ship.faction);
        debug!("Ship {index} crashed into an asteroid");
    }

    fn credit_kill(&mut self, firer: Option<ShipHandle>) {
        if let Some(stats) = firer.and_then(|h| self.ships.ships[h.index].statistics.as_mut()) {
            stats.ships_destroyed += 1;
        }
    }

    /// Recycle every ship that died this tick.
    ///
    /// A dead ship not yet marked torn down died since the last pass.
    pub(crate) fn end_of_life(&mut self) {
        for index in 0..self.ships.capacity() {
            let ship = &self.ships.ships[index];
            if ship.is_valid() || ship.torn_down {
                continue;
            }
            let handle = self.ships.handle(index);
            let (position, faction, human) = (ship.agent.position, ship.faction, ship.is_human());

            self.missiles.invalidate_missile_chasing(handle, &mut self.trails);
            let cue = self.rng.gen_range(0..EXPLOSION_CUE_COUNT);
            self.events.push(BattleEvent::Explosion { position, cue });
            self.events.push(BattleEvent::ShipDestroyed { ship: index, faction, human });
            self.ships.destroy_ship(index, &mut self.shots, &mut self.trails);
        }
    }
}
