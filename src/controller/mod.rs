// CONTROLLER: Input, locomotion, camera rigs and the update loop
pub mod actuation;
pub mod camera_rig;
pub mod frame_loop;
pub mod input;
pub mod movement;
pub mod physics;
pub mod player_controller;

pub use actuation::{ActuationModel, ActuationState, ActuationStep, CoastPolicy, DriveTrain, Regime};
pub use camera_rig::{CameraRig, ChaseSettings, OrbitSettings, RigMode};
pub use frame_loop::{FrameLoopContext, FrameStats};
pub use input::{DriveInput, InputEvent, InputProcessor, InputState, KeyBindings, LookInput};
pub use movement::CharacterMovement;
pub use physics::PhysicsSystem;
pub use player_controller::{ControllerPhase, Locomotion, PlayerController, Telemetry};
