use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::model::Doodad;

/// Stand-in rigid body integrator: gravity, a flat ground plane and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSystem {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub ground_height: f32,
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsSystem {
    pub fn new() -> Self {
        Self {
            gravity: -9.8,
            max_fall_speed: 20.0,
            ground_height: 0.0,
        }
    }

    /// Advance one doodad by `dt` seconds. Doodads without a rigid body don't move.
    pub fn step(&self, doodad: &mut Doodad, dt: f32) {
        let Some(body) = doodad.rigid_body.as_mut() else {
            return;
        };

        // Apply gravity
        let mut vel = body.linear_velocity;
        vel.y = (vel.y + self.gravity * dt).max(-self.max_fall_speed);

        let transform = &mut doodad.transform;
        transform.position += vel * dt;

        // Ground contact
        if transform.position.y < self.ground_height {
            transform.position.y = self.ground_height;
            if vel.y < 0.0 {
                vel.y = 0.0;
            }
        }

        let spin = body.angular_velocity * dt;
        if spin != Vec3::ZERO {
            transform.rotation = (Quat::from_scaled_axis(spin) * transform.rotation).normalize();
        }

        body.linear_velocity = vel;
    }
}
