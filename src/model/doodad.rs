use glam::{Quat, Vec3};

use crate::error::ControlError;

/// Local axis a doodad treats as "forward" before rotation.
pub const FORWARD: Vec3 = Vec3::X;
/// World up.
pub const UP: Vec3 = Vec3::Y;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, rotation: Quat::IDENTITY }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    /// Facing projected onto the ground plane; zero when pointing straight up/down.
    pub fn horizontal_forward(&self) -> Vec3 {
        let f = self.forward();
        let flat = Vec3::new(f.x, 0.0, f.z);
        if flat.length_squared() < 1e-6 {
            return Vec3::ZERO;
        }
        flat.normalize()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

/// Velocities in meters per second and radians per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RigidBody {
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl RigidBody {
    pub fn linear_velocity_mps(&self) -> Vec3 {
        self.linear_velocity
    }

    pub fn set_linear_velocity_mps(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }
}

/// A scene entity: a transform and, for dynamic objects, a rigid body.
#[derive(Debug, Clone)]
pub struct Doodad {
    pub name: String,
    pub transform: Transform,
    pub rigid_body: Option<RigidBody>,
}

impl Doodad {
    pub fn dynamic(name: impl Into<String>, transform: Transform) -> Self {
        Self { name: name.into(), transform, rigid_body: Some(RigidBody::default()) }
    }

    pub fn fixed(name: impl Into<String>, transform: Transform) -> Self {
        Self { name: name.into(), transform, rigid_body: None }
    }

    /// The rigid body a driving controller needs; its absence is fatal for that controller.
    pub fn require_rigid_body(&self) -> Result<&RigidBody, ControlError> {
        self.rigid_body
            .as_ref()
            .ok_or_else(|| ControlError::MissingRigidBody { doodad: self.name.clone() })
    }

    pub fn require_rigid_body_mut(&mut self) -> Result<&mut RigidBody, ControlError> {
        match self.rigid_body.as_mut() {
            Some(body) => Ok(body),
            None => Err(ControlError::MissingRigidBody { doodad: self.name.clone() }),
        }
    }
}
