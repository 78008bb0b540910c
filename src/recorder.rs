//! Frame recorder for instant replay and photo mode.
//!
//! While recording, every tick snapshots the visible battle state into a
//! fixed ring of frames.  Once recording stops, frames can be scrubbed one at
//! a time or played back at any speed; fractional speeds blend neighbouring
//! frames.

use crate::battle::Battle;
use crate::constants::*;
use crate::effects::EffectPool;
use crate::shot::Shot;
use bevy::prelude::*;

/// Called once when a playback runs past the newest frame.
pub type PlaybackDone = Box<dyn FnOnce() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShipFrame {
    pub position: Vec3,
    pub rotation: Quat,
    pub visible: bool,
}

/// Pose and age of a missile or timed effect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseFrame {
    pub position: Vec3,
    pub rotation: Quat,
    pub time: f32,
}

impl PoseFrame {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
            time: self.time + (other.time - self.time) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrailFrame {
    pub color: [f32; 3],
    pub alpha: f32,
    pub side: u8,
}

/// One snapshot of everything replay shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordFrame {
    pub ships: Vec<ShipFrame>,
    pub missiles: Vec<PoseFrame>,
    pub explosions: Vec<PoseFrame>,
    pub sparks: Vec<PoseFrame>,
    pub shots: Vec<Shot>,
    pub shot_matrices: Vec<f32>,
    pub trail_data: Vec<f32>,
    pub trail_index: usize,
    pub trails: Vec<TrailFrame>,
}

fn capture_effects(into: &mut Vec<PoseFrame>, pool: &EffectPool) {
    into.clear();
    into.extend(pool.effects.iter().map(|e| PoseFrame {
        position: e.position,
        rotation: e.orientation,
        time: e.time,
    }));
}

fn restore_effects(from: &[PoseFrame], pool: &mut EffectPool) {
    debug_assert_eq!(from.len(), pool.capacity(), "effect pool resized under the recorder");
    for (effect, frame) in pool.effects.iter_mut().zip(from) {
        effect.position = frame.position;
        effect.orientation = frame.rotation;
        effect.time = frame.time;
    }
}

impl RecordFrame {
    /// Overwrite this frame with the battle's current state, reusing buffers.
    pub fn capture(&mut self, battle: &Battle) {
        self.ships.clear();
        self.ships.extend(battle.ships.ships.iter().map(|s| ShipFrame {
            position: s.agent.position,
            rotation: s.agent.rotation,
            visible: s.visible,
        }));

        self.missiles.clear();
        self.missiles.extend(battle.missiles.missiles.iter().map(|m| PoseFrame {
            position: m.agent.position,
            rotation: m.agent.rotation,
            time: m.time,
        }));
        capture_effects(&mut self.explosions, &battle.explosions);
        capture_effects(&mut self.sparks, &battle.sparks);

        self.shots.clear();
        self.shots.extend_from_slice(&battle.shots.shots);
        self.shot_matrices.clear();
        self.shot_matrices.extend_from_slice(&battle.shots.matrices);

        self.trail_data.clear();
        self.trail_data.extend_from_slice(&battle.trails.data);
        self.trail_index = battle.trails.current_index;
        self.trails.clear();
        self.trails.extend(battle.trails.trails.iter().map(|t| TrailFrame {
            color: t.color,
            alpha: t.alpha,
            side: t.side,
        }));
    }

    fn check_layout(&self, battle: &Battle) {
        debug_assert_eq!(self.ships.len(), battle.ships.capacity(), "ship pool resized under the recorder");
        debug_assert_eq!(self.missiles.len(), battle.missiles.capacity(), "missile pool resized under the recorder");
        debug_assert_eq!(self.shots.len(), battle.shots.capacity(), "shot pool resized under the recorder");
        debug_assert_eq!(self.trails.len(), battle.trails.capacity(), "trail pool resized under the recorder");
    }

    /// Write this frame back into the battle exactly.
    pub fn restore(&self, battle: &mut Battle, trail_mask: u8) {
        self.check_layout(battle);
        for (ship, frame) in battle.ships.ships.iter_mut().zip(&self.ships) {
            ship.agent.position = frame.position;
            ship.agent.rotation = frame.rotation;
            ship.visible = frame.visible;
        }
        for (missile, frame) in battle.missiles.missiles.iter_mut().zip(&self.missiles) {
            missile.agent.position = frame.position;
            missile.agent.rotation = frame.rotation;
            missile.time = frame.time;
        }
        restore_effects(&self.explosions, &mut battle.explosions);
        restore_effects(&self.sparks, &mut battle.sparks);

        battle.shots.shots.copy_from_slice(&self.shots);
        battle.shots.matrices.copy_from_slice(&self.shot_matrices);
        self.restore_trails(battle, trail_mask);
    }

    /// Write the blend of `self` and `next` at `t` into the battle.
    ///
    /// Poses and ages are interpolated; shot slots and trails come from `self`.
    pub fn restore_blended(&self, next: &Self, t: f32, battle: &mut Battle, trail_mask: u8) {
        self.check_layout(battle);
        for ((ship, a), b) in battle.ships.ships.iter_mut().zip(&self.ships).zip(&next.ships) {
            ship.agent.position = a.position.lerp(b.position, t);
            ship.agent.rotation = a.rotation.slerp(b.rotation, t);
            ship.visible = a.visible;
        }
        for ((missile, a), b) in battle.missiles.missiles.iter_mut().zip(&self.missiles).zip(&next.missiles) {
            let pose = a.lerp(b, t);
            missile.agent.position = pose.position;
            missile.agent.rotation = pose.rotation;
            missile.time = pose.time;
        }
        for (pool, a, b) in [
            (&mut battle.explosions, &self.explosions, &next.explosions),
            (&mut battle.sparks, &self.sparks, &next.sparks),
        ] {
            for ((effect, a), b) in pool.effects.iter_mut().zip(a).zip(b) {
                let pose = a.lerp(b, t);
                effect.position = pose.position;
                effect.orientation = pose.rotation;
                effect.time = pose.time;
            }
        }

        battle.shots.shots.copy_from_slice(&self.shots);
        for ((out, a), b) in battle
            .shots
            .matrices
            .iter_mut()
            .zip(&self.shot_matrices)
            .zip(&next.shot_matrices)
        {
            *out = a + (b - a) * t;
        }
        self.restore_trails(battle, trail_mask);
    }

    fn restore_trails(&self, battle: &mut Battle, trail_mask: u8) {
        battle.trails.data.copy_from_slice(&self.trail_data);
        battle.trails.current_index = self.trail_index;
        for (trail, frame) in battle.trails.trails.iter_mut().zip(&self.trails) {
            trail.color = frame.color;
            trail.alpha = frame.alpha;
            trail.side = frame.side;
            trail.visible = frame.side & trail_mask != 0;
        }
    }
}

/// What the recorder did on a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecorderStatus {
    Idle,
    Recorded,
    /// A playback frame was shown; `cursor` is the fractional frame index.
    Playing { cursor: f32 },
    Finished,
}

#[derive(Resource)]
pub struct Recorder {
    frames: Vec<RecordFrame>,
    capacity: usize,
    /// Total frames ever written.
    head: usize,
    available: usize,
    pub recording: bool,
    playing: bool,
    cursor: f32,
    speed: f32,
    on_done: Option<PlaybackDone>,
    last_frame: Option<usize>,
    trail_mask: u8,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(RECORD_FRAME_COUNT)
    }
}

impl Recorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
            head: 0,
            available: 0,
            recording: true,
            playing: false,
            cursor: 0.0,
            speed: 1.0,
            on_done: None,
            last_frame: None,
            trail_mask: TRAIL_SIDE_ALLY | TRAIL_SIDE_ENEMY,
        }
    }

    pub fn available(&self) -> usize {
        self.available
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn trail_mask(&self) -> u8 {
        self.trail_mask
    }

    /// Turning recording on ends any playback.
    pub fn set_recording(&mut self, recording: bool) {
        if recording {
            self.stop();
        }
        self.recording = recording;
    }

    /// Show or hide the trails of one side on the next restore.
    pub fn toggle_trail_side(&mut self, side: u8) {
        self.trail_mask ^= side;
    }

    /// Snapshot the battle into the next ring slot.
    pub fn record(&mut self, battle: &Battle) {
        if self.frames.len() < self.capacity {
            let mut frame = RecordFrame::default();
            frame.capture(battle);
            self.frames.push(frame);
        } else {
            self.frames[self.head % self.capacity].capture(battle);
        }
        self.head += 1;
        self.available = self.head.min(self.capacity);
    }

    fn physical(&self, index: usize) -> usize {
        let tail = self.head.saturating_sub(self.capacity) % self.capacity;
        (tail + index) % self.available
    }

    /// Restore the frame at logical `index`, 0 being the oldest retained.
    pub fn apply_frame(&mut self, battle: &mut Battle, index: usize) {
        if self.recording || self.available == 0 {
            return;
        }
        self.frames[self.physical(index)].restore(battle, self.trail_mask);
        self.last_frame = Some(index);
    }

    /// Re-apply the last scrubbed frame, e.g. after toggling trail sides.
    pub fn refresh_frame(&mut self, battle: &mut Battle) {
        if let Some(index) = self.last_frame {
            self.apply_frame(battle, index);
        }
    }

    /// Play the retained frames from the oldest at `speed` frames per tick.
    pub fn playback(&mut self, speed: f32, on_done: Option<PlaybackDone>) {
        if self.recording || self.available == 0 || !speed.is_finite() || speed <= 0.0 {
            return;
        }
        info!("Replay: {} frames at speed {speed}", self.available);
        self.cursor = 0.0;
        self.speed = speed;
        self.playing = true;
        self.on_done = on_done;
    }

    /// End playback without calling the completion callback.
    pub fn stop(&mut self) {
        self.playing = false;
        self.on_done = None;
    }

    pub fn tick(&mut self, battle: &mut Battle) -> RecorderStatus {
        if self.recording {
            self.record(battle);
            return RecorderStatus::Recorded;
        }
        if !self.playing {
            return RecorderStatus::Idle;
        }
        if self.cursor >= self.available as f32 {
            let done = self.on_done.take();
            self.stop();
            if let Some(done) = done {
                done();
            }
            info!("Replay finished");
            return RecorderStatus::Finished;
        }

        let cursor = self.cursor;
        let index = cursor.floor() as usize;
        if self.speed == 1.0 {
            self.frames[self.physical(index)].restore(battle, self.trail_mask);
        } else {
            let next = (index + 1).min(self.available - 1);
            let (a, b) = (self.physical(index), self.physical(next));
            self.frames[a].restore_blended(&self.frames[b], cursor.fract(), battle, self.trail_mask);
        }
        self.last_frame = Some(index);
        self.cursor += self.speed;
        RecorderStatus::Playing { cursor }
    }
}
