use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::input::LookInput;
use crate::model::doodad::{FORWARD, UP};
use crate::model::{Camera, CameraAim, CameraOrientation, CameraPose, CameraZoom, Transform};

/// Tuning for the orbiting third-person camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// Degrees of yaw/pitch per mouse count.
    pub sensitivity_deg_per_count: f32,
    /// Meters of zoom per wheel step.
    pub distance_sensitivity: f32,
    pub distance_min: f32,
    pub distance_max: f32,
    pub initial_distance: f32,
    pub initial_orientation: CameraOrientation,
    /// Shifts the camera sideways so the subject sits off-center.
    pub focal_horizontal_offset: f32,
    pub focal_vertical_offset: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            sensitivity_deg_per_count: 0.15,
            distance_sensitivity: 1.0,
            distance_min: 1.0,
            distance_max: 200.0,
            initial_distance: 10.0,
            initial_orientation: CameraOrientation::default(),
            focal_horizontal_offset: 0.0,
            focal_vertical_offset: 1.5,
        }
    }
}

/// Tuning for the rigid chase camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseSettings {
    pub look_ahead: f32,
    pub horizontal_offset: f32,
    pub vertical_offset: f32,
}

impl Default for ChaseSettings {
    fn default() -> Self {
        Self { look_ahead: 5.0, horizontal_offset: 7.5, vertical_offset: 3.5 }
    }
}

/// Camera position for an orbit around `tracked`.
///
/// Pure: identical arguments always produce a bit-identical pose.
pub fn orbit_pose(
    orientation: &CameraOrientation,
    distance: f32,
    tracked: Vec3,
    settings: &OrbitSettings,
) -> CameraPose {
    let look = Camera::direction_from_angles(orientation.yaw_deg, orientation.pitch_deg);
    let mut position = tracked - look * distance;

    let right = look.cross(UP);
    if right.length_squared() > 1e-12 {
        let right = right.normalize();
        let up = right.cross(look).normalize();
        debug_assert!(right.is_normalized(), "orbit right vector not normalized: {right}");
        debug_assert!(up.is_normalized(), "orbit up vector not normalized: {up}");
        position += right * settings.focal_horizontal_offset + up * settings.focal_vertical_offset;
    } else {
        // Unreachable while pitch stays clamped below 90
        warn!(?look, "look direction parallel to world up, skipping focal offset");
    }

    CameraPose { position, aim: CameraAim::Euler(*orientation) }
}

/// Camera behind and above `tracked` along `heading`, aimed ahead of it.
pub fn chase_pose(tracked: Vec3, heading: Vec3, settings: &ChaseSettings) -> CameraPose {
    let position = tracked - heading * settings.horizontal_offset + UP * settings.vertical_offset;
    CameraPose {
        position,
        aim: CameraAim::LookAt(tracked + heading * settings.look_ahead),
    }
}

pub struct OrbitRig {
    pub settings: OrbitSettings,
    pub orientation: CameraOrientation,
    pub zoom: CameraZoom,
}

impl OrbitRig {
    pub fn new(settings: OrbitSettings) -> Self {
        let zoom = CameraZoom::new(settings.initial_distance, settings.distance_min, settings.distance_max);
        let orientation = CameraOrientation::new(
            settings.initial_orientation.yaw_deg,
            settings.initial_orientation.pitch_deg,
            settings.initial_orientation.roll_deg,
        );
        Self { settings, orientation, zoom }
    }

    pub fn update(&mut self, look: &LookInput, tracked: &Transform) -> CameraPose {
        self.orientation.apply_look_delta(look.delta.x, look.delta.y, self.settings.sensitivity_deg_per_count);
        self.zoom.apply_scroll(look.scroll, self.settings.distance_sensitivity);
        orbit_pose(&self.orientation, self.zoom.distance(), tracked.position, &self.settings)
    }

    /// Horizontal direction the camera is looking along.
    pub fn heading(&self) -> Vec3 {
        let yaw = self.orientation.yaw_deg.to_radians();
        Vec3::new(yaw.cos(), 0.0, -yaw.sin())
    }
}

pub struct ChaseRig {
    pub settings: ChaseSettings,
    /// Last non-degenerate horizontal facing of the tracked body.
    heading: Vec3,
}

impl ChaseRig {
    pub fn new(settings: ChaseSettings) -> Self {
        Self { settings, heading: FORWARD }
    }

    pub fn update(&mut self, tracked: &Transform) -> CameraPose {
        let facing = tracked.horizontal_forward();
        if facing == Vec3::ZERO {
            warn!("tracked body faces straight up or down, keeping previous chase heading");
        } else {
            self.heading = facing;
        }
        chase_pose(tracked.position, self.heading, &self.settings)
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RigMode {
    Orbit,
    Chase,
}

/// Both camera variants; `mode` picks which one drives the camera.
pub struct CameraRig {
    mode: RigMode,
    pub orbit: OrbitRig,
    pub chase: ChaseRig,
}

impl CameraRig {
    pub fn new(mode: RigMode, orbit: OrbitSettings, chase: ChaseSettings) -> Self {
        Self { mode, orbit: OrbitRig::new(orbit), chase: ChaseRig::new(chase) }
    }

    pub fn mode(&self) -> RigMode {
        self.mode
    }

    pub fn toggle(&mut self) -> RigMode {
        self.mode = match self.mode {
            RigMode::Orbit => RigMode::Chase,
            RigMode::Chase => RigMode::Orbit,
        };
        debug!(mode = ?self.mode, "camera rig toggled");
        self.mode
    }

    /// Look input is ignored while chasing.
    pub fn update(&mut self, look: &LookInput, tracked: &Transform) -> CameraPose {
        match self.mode {
            RigMode::Orbit => self.orbit.update(look, tracked),
            RigMode::Chase => self.chase.update(tracked),
        }
    }

    /// Horizontal "forward" for camera-relative movement.
    pub fn heading(&self) -> Vec3 {
        match self.mode {
            RigMode::Orbit => self.orbit.heading(),
            RigMode::Chase => self.chase.heading(),
        }
    }
}
