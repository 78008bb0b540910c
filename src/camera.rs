//! Chase camera attached to human ships, reduced to what targeting needs:
//! whether a point is inside the central part of the view.

use crate::agent::Agent;
use crate::constants::*;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipCamera {
    pub fov_y: f32,
    pub aspect: f32,
    /// Eye position in ship space.
    pub eye_offset: Vec3,
}

impl Default for ShipCamera {
    fn default() -> Self {
        Self {
            fov_y: CAMERA_FOV_Y,
            aspect: CAMERA_ASPECT,
            eye_offset: CAMERA_EYE_OFFSET,
        }
    }
}

impl ShipCamera {
    pub fn view_projection(&self, ship: &Agent) -> Mat4 {
        let eye = ship.position + ship.rotation * self.eye_offset;
        let view = Mat4::look_to_rh(eye, ship.forward, ship.up);
        let projection = Mat4::perspective_rh(self.fov_y, self.aspect, CAMERA_NEAR, CAMERA_FAR);
        projection * view
    }

    /// True when `point` projects in front of the camera and within the
    /// central window of the screen.
    pub fn is_on_screen(&self, ship: &Agent, point: Vec3) -> bool {
        let clip = self.view_projection(ship) * point.extend(1.0);
        if clip.w <= 0.0 {
            return false;
        }
        let ndc = clip.truncate() / clip.w;
        ndc.x.abs() < CAMERA_ON_SCREEN_EXTENT && ndc.y.abs() < CAMERA_ON_SCREEN_EXTENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_dead_ahead_is_on_screen() {
        let camera = ShipCamera::default();
        let ship = Agent::default();
        assert!(camera.is_on_screen(&ship, Vec3::Z * 200.0));
    }

    #[test]
    fn point_behind_is_off_screen() {
        let camera = ShipCamera::default();
        let ship = Agent::default();
        assert!(!camera.is_on_screen(&ship, -Vec3::Z * 200.0));
    }

    #[test]
    fn point_far_to_the_side_is_off_screen() {
        let camera = ShipCamera::default();
        let ship = Agent::default();
        assert!(!camera.is_on_screen(&ship, Vec3::new(300.0, 0.0, 50.0)));
    }
}
