//! Shared orientation and steering state for everything that flies.
//!
//! An [`Agent`] keeps two orientations: the integrated one that steering
//! input accumulates into, and the rendered one that trails it by a slerp.
//! The basis vectors are always derived from the rendered transform; the
//! local frame is +Z forward, +X right, +Y up.

use bevy::prelude::*;

/// Position, orientation and derived basis of a ship or missile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub position: Vec3,
    /// Orientation steering input is integrated into.
    pub orientation: Quat,
    /// Orientation of the rendered transform.
    pub rotation: Quat,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl Agent {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        let mut agent = Self {
            position,
            orientation: rotation,
            rotation,
            forward: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
        };
        agent.refresh_basis();
        agent
    }

    /// Recompute forward/up/right from the rendered rotation.
    pub fn refresh_basis(&mut self) {
        self.right = self.rotation * Vec3::X;
        self.up = self.rotation * Vec3::Y;
        self.forward = self.rotation * Vec3::Z;
    }

    /// World matrix of the rendered transform.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Integrate a yaw then pitch delta into the orientation, and blend the
    /// rendered rotation toward it by `blend` (1.0 snaps).
    pub fn integrate(&mut self, yaw: f32, pitch: f32, blend: f32) {
        let yaw_rotation = Quat::from_axis_angle(Vec3::Y, yaw);
        let pitch_axis = yaw_rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(pitch_axis, pitch);
        self.orientation = (self.orientation * yaw_rotation * pitch_rotation).normalize();
        self.rotation = self.rotation.slerp(self.orientation, blend).normalize();
    }

    /// Steering toward `aim` seen from `from`.
    ///
    /// Returns the forward alignment dot together with the yaw and pitch
    /// deltas that turn the nose toward the aim point.
    pub fn steering_toward(&self, aim: Vec3, from: Vec3, turn_ratio: f32) -> (f32, f32, f32) {
        let direction = (aim - from).normalize_or_zero();
        let yaw = direction.dot(self.right) * turn_ratio;
        let pitch = -direction.dot(self.up) * turn_ratio;
        (direction.dot(self.forward), yaw, pitch)
    }
}

/// Anything that embeds an [`Agent`] and accepts steering deltas.
pub trait Steer {
    fn agent(&self) -> &Agent;

    fn set_steering(&mut self, yaw: f32, pitch: f32);

    /// Point the nose toward `aim`, returning the current forward alignment.
    fn go_toward(&mut self, aim: Vec3, from: Vec3, turn_ratio: f32) -> f32 {
        let (dot, yaw, pitch) = self.agent().steering_toward(aim, from, turn_ratio);
        self.set_steering(yaw, pitch);
        dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::EulerRot;

    struct Dart {
        agent: Agent,
        yaw: f32,
        pitch: f32,
    }

    impl Steer for Dart {
        fn agent(&self) -> &Agent {
            &self.agent
        }

        fn set_steering(&mut self, yaw: f32, pitch: f32) {
            self.yaw = yaw;
            self.pitch = pitch;
        }
    }

    fn dart() -> Dart {
        Dart {
            agent: Agent::default(),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    #[test]
    fn basis_is_orthonormal_after_rotation() {
        let mut agent = Agent::new(Vec3::ZERO, Quat::from_euler(EulerRot::YXZ, 0.3, 1.1, -0.4));
        agent.integrate(0.2, -0.3, 1.0);
        agent.refresh_basis();
        assert!((agent.forward.length() - 1.0).abs() < 1e-5);
        assert!(agent.forward.dot(agent.right).abs() < 1e-5);
        assert!(agent.forward.dot(agent.up).abs() < 1e-5);
        assert!((agent.right.cross(agent.up) - agent.forward).length() < 1e-4);
    }

    #[test]
    fn go_toward_ahead_needs_no_steering() {
        let mut p = dart();
        let dot = p.go_toward(Vec3::Z * 100.0, Vec3::ZERO, 0.04);
        assert!((dot - 1.0).abs() < 1e-6);
        assert!(p.yaw.abs() < 1e-6 && p.pitch.abs() < 1e-6);
    }

    #[test]
    fn go_toward_right_yaws_right() {
        let mut p = dart();
        let dot = p.go_toward(Vec3::X * 100.0, Vec3::ZERO, 0.04);
        assert!(dot.abs() < 1e-6);
        assert!((p.yaw - 0.04).abs() < 1e-6);

        // Applying the delta must bring the nose closer to the aim.
        p.agent.integrate(p.yaw, p.pitch, 1.0);
        p.agent.refresh_basis();
        assert!(p.agent.forward.x > 0.0);
    }

    #[test]
    fn go_toward_above_pitches_up() {
        let mut p = dart();
        p.go_toward(Vec3::Y * 100.0, Vec3::ZERO, 0.04);
        assert!(p.pitch < 0.0);
        p.agent.integrate(p.yaw, p.pitch, 1.0);
        p.agent.refresh_basis();
        assert!(p.agent.forward.y > 0.0, "negative pitch lifts the nose");
    }

    #[test]
    fn partial_blend_lags_behind_orientation() {
        let mut agent = Agent::default();
        agent.integrate(0.5, 0.0, 0.05);
        assert!(agent.rotation.angle_between(Quat::IDENTITY) > 0.0);
        assert!(agent.rotation.angle_between(agent.orientation) > 0.0);
    }
}
