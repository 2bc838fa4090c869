use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::input::DriveInput;
use crate::model::doodad::UP;

/// On-foot locomotion: constant-speed walking relative to a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterMovement {
    pub max_speed_mps: f32,
}

impl Default for CharacterMovement {
    fn default() -> Self {
        Self { max_speed_mps: 7.0 }
    }
}

impl CharacterMovement {
    pub fn new(max_speed_mps: f32) -> Self {
        Self { max_speed_mps }
    }

    /// Velocity for one tick. `heading` must be horizontal; `velocity.y` is kept.
    pub fn step(&self, input: &DriveInput, heading: Vec3, velocity: Vec3) -> Vec3 {
        let right = heading.cross(UP).normalize_or_zero();

        let mut wish = Vec3::ZERO;
        if input.forward {
            wish += heading;
        }
        if input.backward {
            wish -= heading;
        }
        if input.right {
            wish += right;
        }
        if input.left {
            wish -= right;
        }

        let horizontal = wish.normalize_or_zero() * self.max_speed_mps;
        Vec3::new(horizontal.x, velocity.y, horizontal.z)
    }
}
