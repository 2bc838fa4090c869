//! Controller configuration loaded from `config/pole_position.toml`.
//!
//! Every section is optional; missing fields fall back to the built-in
//! defaults, which reproduce the stock car and third-person setups.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::controller::{
    CameraRig, CharacterMovement, ChaseSettings, DriveTrain, FrameLoopContext, Locomotion, OrbitSettings,
    PhysicsSystem, PlayerController, RigMode,
};
use crate::error::ConfigError;
use crate::model::{Camera, Doodad, Scene};
use crate::utils::TickRate;

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "POLE_POSITION_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub position: Vec3,
    pub look_direction: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            position: Vec3::new(1.25, 3.0, 10.0),
            look_direction: Vec3::NEG_Z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocomotionConfig {
    Vehicle(DriveTrain),
    Character(CharacterMovement),
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        LocomotionConfig::Vehicle(DriveTrain::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub mode: RigMode,
    pub orbit: OrbitSettings,
    pub chase: ChaseSettings,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self { mode: RigMode::Chase, orbit: OrbitSettings::default(), chase: ChaseSettings::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Longest frame delta honored, in seconds; longer frames are clamped.
    pub max_frame_delta: f32,
    pub max_ticks_per_frame: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { max_frame_delta: 0.25, max_ticks_per_frame: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub tick_rate_hz: f32,
    pub camera: CameraConfig,
    pub locomotion: LocomotionConfig,
    pub rig: RigConfig,
    pub physics: PhysicsSystem,
    pub frame: FrameConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            camera: CameraConfig::default(),
            locomotion: LocomotionConfig::default(),
            rig: RigConfig::default(),
            physics: PhysicsSystem::new(),
            frame: FrameConfig::default(),
        }
    }
}

fn config_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config")
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be > 0, got {value}")))
    }
}

impl ControllerConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: ControllerConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// `$POLE_POSITION_CONFIG`, else `config/pole_position.toml`, else defaults;
    /// then env overrides.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var_os(CONFIG_PATH_ENV) {
            // An explicit path has to exist
            Some(path) => Self::load_from_path(Path::new(&path))?,
            None => {
                let path = config_root().join("pole_position.toml");
                if path.is_file() {
                    Self::load_from_path(&path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        info!(tick_rate_hz = cfg.tick_rate_hz, rig = ?cfg.rig.mode, "controller config loaded");
        Ok(cfg)
    }

    /// Env overrides for quick tuning. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_f32("TICK_RATE_HZ") {
            self.tick_rate_hz = v;
        }
        if let Some(v) = env_f32("MOUSE_SENS_DEG") {
            self.rig.orbit.sensitivity_deg_per_count = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tick_rate_hz", self.tick_rate_hz)?;

        let fov = self.camera.fov_y_deg;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(invalid(format!("camera fov must be in (0, 180), got {fov}")));
        }
        if !self.camera.position.is_finite() {
            return Err(invalid("camera position must be finite"));
        }
        let look = self.camera.look_direction;
        if !look.is_finite() || look.length_squared() < 1e-6 {
            return Err(invalid(format!("camera look_direction must be finite and non-zero, got {look}")));
        }

        match &self.locomotion {
            LocomotionConfig::Vehicle(drive_train) => drive_train.validate()?,
            LocomotionConfig::Character(movement) => positive("max_speed_mps", movement.max_speed_mps)?,
        }

        let orbit = &self.rig.orbit;
        positive("orbit.distance_min", orbit.distance_min)?;
        positive("orbit.distance_max", orbit.distance_max)?;
        if orbit.distance_min > orbit.distance_max {
            return Err(invalid(format!(
                "orbit distance range inverted: {} > {}",
                orbit.distance_min, orbit.distance_max
            )));
        }
        positive("orbit.sensitivity_deg_per_count", orbit.sensitivity_deg_per_count)?;
        positive("orbit.initial_distance", orbit.initial_distance)?;
        let initial = &orbit.initial_orientation;
        if ![initial.yaw_deg, initial.pitch_deg, initial.roll_deg].iter().all(|v| v.is_finite()) {
            return Err(invalid(format!("orbit.initial_orientation must be finite, got {initial:?}")));
        }
        if !(orbit.distance_sensitivity.is_finite() && orbit.distance_sensitivity >= 0.0) {
            return Err(invalid(format!(
                "orbit.distance_sensitivity must be >= 0, got {}",
                orbit.distance_sensitivity
            )));
        }
        let chase = &self.rig.chase;
        let offsets = [
            chase.look_ahead,
            chase.horizontal_offset,
            chase.vertical_offset,
            orbit.focal_horizontal_offset,
            orbit.focal_vertical_offset,
        ];
        if !offsets.iter().all(|v| v.is_finite()) {
            return Err(invalid("camera offsets must be finite"));
        }

        positive("physics.max_fall_speed", self.physics.max_fall_speed)?;
        if !(self.physics.gravity.is_finite() && self.physics.ground_height.is_finite()) {
            return Err(invalid(format!(
                "physics gravity and ground_height must be finite, got {} and {}",
                self.physics.gravity, self.physics.ground_height
            )));
        }
        positive("frame.max_frame_delta", self.frame.max_frame_delta)?;
        if self.frame.max_ticks_per_frame == 0 {
            return Err(invalid("frame.max_ticks_per_frame must be at least 1"));
        }
        Ok(())
    }

    pub fn tick_rate(&self) -> Result<TickRate, ConfigError> {
        TickRate::from_ticks_per_second(self.tick_rate_hz).map_err(|e| invalid(e.to_string()))
    }

    pub fn build_controller(&self) -> PlayerController {
        let camera = Camera::new(self.camera.fov_y_deg, self.camera.position, self.camera.look_direction);
        let rig = CameraRig::new(self.rig.mode, self.rig.orbit.clone(), self.rig.chase.clone());
        let locomotion = match &self.locomotion {
            LocomotionConfig::Vehicle(drive_train) => Locomotion::vehicle(drive_train.clone()),
            LocomotionConfig::Character(movement) => Locomotion::Character(movement.clone()),
        };
        PlayerController::new(camera, rig, locomotion)
    }

    /// Assemble a ready-to-awaken loop around `player`.
    pub fn build_frame_loop(&self, scene: Scene, player: Doodad) -> Result<FrameLoopContext, ConfigError> {
        let mut ctx = FrameLoopContext::new(
            scene,
            player,
            self.build_controller(),
            self.physics.clone(),
            self.tick_rate()?,
        );
        ctx.max_frame_delta = self.frame.max_frame_delta;
        ctx.max_ticks_per_frame = self.frame.max_ticks_per_frame;
        Ok(ctx)
    }
}

fn env_f32(name: &str) -> Option<f32> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}
