use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use tracing::{debug, info, trace, warn};

use super::actuation::{
    actuation_amount, steer_amount, turn_horizontal, ActuationModel, ActuationState, DriveTrain, Regime,
};
use super::camera_rig::{CameraRig, ChaseSettings, OrbitSettings, RigMode};
use super::input::{DriveInput, LookInput};
use super::movement::CharacterMovement;
use crate::error::ControlError;
use crate::model::{Camera, Doodad, Scene};
use crate::utils::TickRate;

/// How fixed ticks turn input into velocity.
pub enum Locomotion {
    /// Gear-based car physics.
    Vehicle { model: ActuationModel, state: ActuationState },
    /// Constant-speed walking relative to the camera.
    Character(CharacterMovement),
}

impl Locomotion {
    pub fn vehicle(drive_train: DriveTrain) -> Self {
        Locomotion::Vehicle { model: ActuationModel::new(drive_train), state: ActuationState::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Uninitialized,
    Active,
}

/// What the last fixed tick did; read by HUDs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Telemetry {
    /// `None` for character locomotion.
    pub gear: Option<usize>,
    pub regime: Option<Regime>,
    pub signed_speed_mps: f32,
}

/// Drives one doodad from player input and keeps a camera on it.
pub struct PlayerController {
    camera: Rc<RefCell<Camera>>,
    rig: CameraRig,
    locomotion: Locomotion,
    phase: ControllerPhase,
    telemetry: Telemetry,
}

impl PlayerController {
    pub fn new(camera: Camera, rig: CameraRig, locomotion: Locomotion) -> Self {
        Self {
            camera: Rc::new(RefCell::new(camera)),
            rig,
            locomotion,
            phase: ControllerPhase::Uninitialized,
            telemetry: Telemetry::default(),
        }
    }

    /// A car with a rigid chase camera.
    pub fn driver(drive_train: DriveTrain) -> Self {
        Self::new(
            Camera::default(),
            CameraRig::new(RigMode::Chase, OrbitSettings::default(), ChaseSettings::default()),
            Locomotion::vehicle(drive_train),
        )
    }

    /// A walking character with an orbit camera.
    pub fn third_person(movement: CharacterMovement) -> Self {
        Self::new(
            Camera::default(),
            CameraRig::new(RigMode::Orbit, OrbitSettings::default(), ChaseSettings::default()),
            Locomotion::Character(movement),
        )
    }

    /// Bind the camera to `scene`. Only the first call has any effect.
    pub fn awaken(&mut self, scene: &mut Scene) {
        if self.phase == ControllerPhase::Active {
            warn!(scene = %scene.name, "controller already awake, ignoring awaken");
            return;
        }
        scene.set_camera(self.camera.clone());
        self.phase = ControllerPhase::Active;
        info!(scene = %scene.name, rig = ?self.rig.mode(), "player controller awake");
    }

    /// Read the body's velocity, run the locomotion model and write it back.
    pub fn fixed_update(
        &mut self,
        input: &DriveInput,
        doodad: &mut Doodad,
        tick_rate: TickRate,
    ) -> Result<(), ControlError> {
        self.ensure_awake()?;

        let facing = doodad.transform.horizontal_forward();
        let heading = match self.rig.mode() {
            RigMode::Orbit => self.rig.orbit.heading(),
            RigMode::Chase if facing != Vec3::ZERO => facing,
            RigMode::Chase => self.rig.chase.heading(),
        };
        let body = doodad.require_rigid_body_mut()?;
        let velocity = body.linear_velocity_mps();

        match &mut self.locomotion {
            Locomotion::Vehicle { model, state } => {
                if input.shift_up && state.shift_up(&model.drive_train().gears) {
                    debug!(gear = state.current_gear, "shifted up");
                }
                if input.shift_down && state.shift_down() {
                    debug!(gear = state.current_gear, "shifted down");
                }

                state.desired_direction = facing;
                state.current_velocity = velocity;
                let actuation = actuation_amount(input.forward, input.backward);
                let step = model.step(state, actuation, tick_rate);

                let signed_speed_mps = step.velocity.dot(facing);
                let yaw_rate = model.yaw_rate(steer_amount(input.left, input.right), signed_speed_mps);
                // Tires grip: velocity turns with the body this tick
                let velocity = turn_horizontal(step.velocity, yaw_rate / tick_rate.ticks_per_second());
                state.current_velocity = velocity;
                body.set_linear_velocity_mps(velocity);
                body.angular_velocity.y = yaw_rate;
                self.telemetry = Telemetry {
                    gear: Some(state.current_gear),
                    regime: Some(step.regime),
                    signed_speed_mps,
                };
            }
            Locomotion::Character(movement) => {
                let new_velocity = movement.step(input, heading, velocity);
                body.set_linear_velocity_mps(new_velocity);
                self.telemetry = Telemetry {
                    gear: None,
                    regime: None,
                    signed_speed_mps: new_velocity.dot(heading),
                };
            }
        }
        Ok(())
    }

    /// Move the camera for this frame.
    pub fn update(&mut self, look: &LookInput, doodad: &Doodad) -> Result<(), ControlError> {
        self.ensure_awake()?;
        let pose = self.rig.update(look, &doodad.transform);
        trace!(position = ?pose.position, "camera pose");
        self.camera.borrow_mut().apply_pose(&pose);
        Ok(())
    }

    pub fn toggle_rig(&mut self) -> RigMode {
        self.rig.toggle()
    }

    fn ensure_awake(&self) -> Result<(), ControlError> {
        match self.phase {
            ControllerPhase::Active => Ok(()),
            ControllerPhase::Uninitialized => Err(ControlError::NotAwake),
        }
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn camera(&self) -> &Rc<RefCell<Camera>> {
        &self.camera
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::camera_rig::orbit_pose;
    use crate::model::{CameraAim, Transform};
    use glam::Vec2;

    fn tick() -> TickRate {
        TickRate::from_ticks_per_second(60.0).unwrap()
    }

    fn awake_driver(scene: &mut Scene) -> PlayerController {
        let mut controller = PlayerController::driver(DriveTrain::default());
        controller.awaken(scene);
        controller
    }

    #[test]
    fn test_callbacks_before_awaken_fail() {
        let mut controller = PlayerController::driver(DriveTrain::default());
        let mut car = Doodad::dynamic("car", Transform::default());
        assert_eq!(
            controller.fixed_update(&DriveInput::default(), &mut car, tick()),
            Err(ControlError::NotAwake)
        );
        assert_eq!(controller.update(&LookInput::default(), &car), Err(ControlError::NotAwake));
    }

    #[test]
    fn test_awaken_binds_camera_once() {
        let mut scene = Scene::new("track");
        let mut controller = awake_driver(&mut scene);
        assert_eq!(controller.phase(), ControllerPhase::Active);
        assert!(Rc::ptr_eq(scene.active_camera().unwrap(), controller.camera()));

        let other = Rc::new(RefCell::new(Camera::default()));
        scene.set_camera(other.clone());
        controller.awaken(&mut scene);
        assert!(Rc::ptr_eq(scene.active_camera().unwrap(), &other), "second awaken must not rebind");
    }

    #[test]
    fn test_missing_rigid_body_is_reported() {
        let mut scene = Scene::new("track");
        let mut controller = awake_driver(&mut scene);
        let mut prop = Doodad::fixed("cone", Transform::default());
        let err = controller.fixed_update(&DriveInput::default(), &mut prop, tick()).unwrap_err();
        assert_eq!(err, ControlError::MissingRigidBody { doodad: "cone".into() });
    }

    #[test]
    fn test_vehicle_accelerates_along_facing() {
        let mut scene = Scene::new("track");
        let mut controller = awake_driver(&mut scene);
        let mut car = Doodad::dynamic("car", Transform::default());
        car.rigid_body.as_mut().unwrap().linear_velocity = Vec3::new(0.0, -2.0, 0.0);

        let input = DriveInput { forward: true, ..Default::default() };
        controller.fixed_update(&input, &mut car, tick()).unwrap();

        let v = car.rigid_body.unwrap().linear_velocity;
        assert!((v.x - 0.7 / 60.0).abs() < 1e-6);
        assert_eq!(v.y, -2.0);
        assert_eq!(v.z, 0.0);

        let telemetry = controller.telemetry();
        assert_eq!(telemetry.gear, Some(0));
        assert_eq!(telemetry.regime, Some(Regime::ForwardAcceleration));
    }

    #[test]
    fn test_steer_keys_write_yaw_rate() {
        let mut scene = Scene::new("track");
        let mut controller = awake_driver(&mut scene);
        let mut car = Doodad::dynamic("car", Transform::default());

        // Parked: holding a steer key does not spin the car
        let right = DriveInput { right: true, ..Default::default() };
        controller.fixed_update(&right, &mut car, tick()).unwrap();
        assert_eq!(car.rigid_body.unwrap().angular_velocity, Vec3::ZERO);

        car.rigid_body.as_mut().unwrap().linear_velocity = Vec3::new(5.0, 0.0, 0.0);
        controller.fixed_update(&right, &mut car, tick()).unwrap();
        let body = car.rigid_body.unwrap();
        assert!(body.angular_velocity.y < 0.0);
        assert!(body.linear_velocity.z > 0.0, "velocity should swing right with the body");
        assert!((body.linear_velocity.length() - 5.0).abs() < 1e-4);

        let left = DriveInput { left: true, ..Default::default() };
        controller.fixed_update(&left, &mut car, tick()).unwrap();
        assert!(car.rigid_body.unwrap().angular_velocity.y > 0.0);

        // Releasing the keys stops the turn
        controller.fixed_update(&DriveInput::default(), &mut car, tick()).unwrap();
        assert_eq!(car.rigid_body.unwrap().angular_velocity.y, 0.0);
    }

    #[test]
    fn test_shift_presses_change_gear() {
        let mut scene = Scene::new("track");
        let mut controller = awake_driver(&mut scene);
        let mut car = Doodad::dynamic("car", Transform::default());
        let up = DriveInput { shift_up: true, ..Default::default() };
        for _ in 0..5 {
            controller.fixed_update(&up, &mut car, tick()).unwrap();
        }
        assert_eq!(controller.telemetry().gear, Some(2));

        let down = DriveInput { shift_down: true, ..Default::default() };
        controller.fixed_update(&down, &mut car, tick()).unwrap();
        assert_eq!(controller.telemetry().gear, Some(1));
    }

    #[test]
    fn test_character_walks_along_orbit_heading() {
        let mut scene = Scene::new("field");
        let mut controller = PlayerController::third_person(CharacterMovement::default());
        controller.awaken(&mut scene);
        let mut hero = Doodad::dynamic("hero", Transform::default());
        hero.rigid_body.as_mut().unwrap().linear_velocity = Vec3::new(0.0, -1.0, 0.0);

        let input = DriveInput { forward: true, ..Default::default() };
        controller.fixed_update(&input, &mut hero, tick()).unwrap();
        let v = hero.rigid_body.unwrap().linear_velocity;
        // Default orbit yaw is 0, looking down +X
        assert!((v - Vec3::new(7.0, -1.0, 0.0)).length() < 1e-5, "got {v}");
        assert_eq!(controller.telemetry().gear, None);
    }

    #[test]
    fn test_update_writes_shared_camera() {
        let mut scene = Scene::new("track");
        let mut controller = awake_driver(&mut scene);
        let car = Doodad::dynamic("car", Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        controller.update(&LookInput::default(), &car).unwrap();

        let camera = scene.active_camera().unwrap().borrow();
        assert_eq!(camera.eye, Vec3::new(2.5, 3.5, 0.0));
        let to_target = (Vec3::new(15.0, 0.0, 0.0) - camera.eye).normalize();
        assert!((camera.look_direction() - to_target).length() < 1e-4);
    }

    #[test]
    fn test_toggled_rig_drives_orbit() {
        let mut scene = Scene::new("track");
        let mut controller = awake_driver(&mut scene);
        assert_eq!(controller.toggle_rig(), RigMode::Orbit);
        let car = Doodad::dynamic("car", Transform::default());
        let look = LookInput { delta: Vec2::new(10.0, 0.0), scroll: 0.0 };
        controller.update(&look, &car).unwrap();

        let orbit = &controller.rig().orbit;
        let expected = orbit_pose(&orbit.orientation, orbit.zoom.distance(), Vec3::ZERO, &orbit.settings);
        assert!(matches!(expected.aim, CameraAim::Euler(_)));
        let camera = controller.camera().borrow();
        assert_eq!(camera.eye, expected.position);
        assert!((camera.yaw - orbit.orientation.yaw_deg).abs() < 1e-4);
    }
}
