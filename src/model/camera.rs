use glam::Vec3;

use super::orientation::{CameraOrientation, PITCH_LIMIT_DEG};
use crate::utils::wrap_degrees;

/// Where the camera should sit this frame and how it is aimed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub aim: CameraAim,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAim {
    /// Explicit angles, used by the orbit rig which owns yaw/pitch itself.
    Euler(CameraOrientation),
    /// Point the camera at a world position.
    LookAt(Vec3),
}

/// Render camera. Angles are degrees; yaw 0 looks down +X and increasing yaw
/// turns left, so yaw 90 looks down -Z.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub fov_y: f32,
}

impl Camera {
    pub fn new(fov_y_deg: f32, eye: Vec3, look_direction: Vec3) -> Self {
        let mut camera = Self {
            eye,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            fov_y: fov_y_deg,
        };
        camera.look_at_position(eye + look_direction);
        camera
    }

    /// Unit vector for the given yaw/pitch in degrees.
    pub fn direction_from_angles(yaw_deg: f32, pitch_deg: f32) -> Vec3 {
        let cy = yaw_deg.to_radians();
        let cp = pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG).to_radians();
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), -cy.sin() * cp.cos()).normalize()
    }

    pub fn look_direction(&self) -> Vec3 {
        Self::direction_from_angles(self.yaw, self.pitch)
    }

    /// Point one meter ahead of the eye along the look direction, for
    /// renderers that build a view matrix from eye and target.
    pub fn target(&self) -> Vec3 {
        let forward = self.look_direction();
        self.eye + forward
    }

    pub fn orientation(&self) -> CameraOrientation {
        CameraOrientation { yaw_deg: self.yaw, pitch_deg: self.pitch, roll_deg: self.roll }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.eye = position;
    }

    pub fn set_euler_angles(&mut self, orientation: CameraOrientation) {
        self.yaw = wrap_degrees(orientation.yaw_deg);
        self.pitch = orientation.pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.roll = orientation.roll_deg;
    }

    /// Aim at `target`. A target on top of the eye leaves the angles alone.
    pub fn look_at_position(&mut self, target: Vec3) {
        let dir = (target - self.eye).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = wrap_degrees((-dir.z).atan2(dir.x).to_degrees());
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    pub fn apply_pose(&mut self, pose: &CameraPose) {
        self.set_position(pose.position);
        match pose.aim {
            CameraAim::Euler(orientation) => self.set_euler_angles(orientation),
            CameraAim::LookAt(target) => self.look_at_position(target),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        // Looking backward (-Z) from just behind the spawn point
        Self::new(75.0, Vec3::new(1.25, 3.0, 10.0), Vec3::NEG_Z)
    }
}
