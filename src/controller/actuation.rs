//! Gear-based longitudinal actuation.
//!
//! Every fixed tick the model re-reads the body's observed velocity, decides
//! which regime the input puts the vehicle in, and takes a single Euler step:
//! the change that would be realized over one second at the regime's rate,
//! scaled down by the tick rate. Only the component along the desired
//! direction is touched; vertical and sideways velocity pass through as-is.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::ConfigError;
use crate::model::{GearInformation, GearTable};
use crate::utils::TickRate;

/// Net forward/reverse intent for a tick: +1, -1 or 0 when both or neither are held.
pub fn actuation_amount(forward: bool, reverse: bool) -> f32 {
    let mut amount = 0.0;
    if forward {
        amount += 1.0;
    }
    if reverse {
        amount -= 1.0;
    }
    amount
}

/// Net steering intent: +1 for left, -1 for right, 0 when both or neither are held.
pub fn steer_amount(left: bool, right: bool) -> f32 {
    actuation_amount(left, right)
}

/// Rotate the horizontal part of `velocity` about world up by `angle_rad`,
/// the same way the physics step turns the body. Vertical speed is untouched.
pub fn turn_horizontal(velocity: Vec3, angle_rad: f32) -> Vec3 {
    if angle_rad == 0.0 {
        return velocity;
    }
    let (sin, cos) = angle_rad.sin_cos();
    Vec3::new(
        velocity.x * cos + velocity.z * sin,
        velocity.y,
        velocity.z * cos - velocity.x * sin,
    )
}

/// Below this speed the wheels do not turn the body.
const STEER_MIN_SPEED_MPS: f32 = 0.1;

/// Which of the five longitudinal laws applies this tick, from the sign of
/// the current speed and of the actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    ForwardAcceleration,
    ForwardBrake,
    ReverseAcceleration,
    ReverseBrake,
    Coast,
}

impl Regime {
    /// Classify by comparing the sign of the signed speed with the actuation.
    pub fn classify(speed_mps: f32, actuation: f32) -> Self {
        if speed_mps >= 0.0 && actuation > 0.0 {
            Regime::ForwardAcceleration
        } else if speed_mps > 0.0 && actuation < 0.0 {
            Regime::ForwardBrake
        } else if speed_mps <= 0.0 && actuation < 0.0 {
            Regime::ReverseAcceleration
        } else if speed_mps < 0.0 && actuation > 0.0 {
            Regime::ReverseBrake
        } else {
            Regime::Coast
        }
    }
}

/// What happens to longitudinal speed with no net input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoastPolicy {
    /// Speed is left alone; any rolling resistance comes from the physics engine.
    Roll,
    /// Constant deceleration toward rest.
    FixedDeceleration { rate_mps2: f32 },
    /// Speed decays by `exp(-per_second * dt)` each tick.
    ExponentialDrag { per_second: f32 },
}

impl Default for CoastPolicy {
    fn default() -> Self {
        CoastPolicy::Roll
    }
}

/// Everything the model needs to know about the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveTrain {
    pub gears: GearTable,
    pub reverse: GearInformation,
    pub brake_rate_mps2: f32,
    pub coast: CoastPolicy,
    /// Yaw rate while a steer key is held and the car is moving.
    pub steer_rate_deg_per_s: f32,
}

impl Default for DriveTrain {
    fn default() -> Self {
        Self {
            gears: GearTable::default(),
            reverse: GearInformation { acceleration_rate_mps2: 0.5, max_speed_kph: 10.0 },
            brake_rate_mps2: 4.0,
            coast: CoastPolicy::default(),
            steer_rate_deg_per_s: 90.0,
        }
    }
}

impl DriveTrain {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Deserialization already checked the forward table
        self.reverse.validate()?;
        if !(self.brake_rate_mps2.is_finite() && self.brake_rate_mps2 > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "brake rate must be > 0, got {}",
                self.brake_rate_mps2
            )));
        }
        let coast_rate = match self.coast {
            CoastPolicy::Roll => 0.0,
            CoastPolicy::FixedDeceleration { rate_mps2 } => rate_mps2,
            CoastPolicy::ExponentialDrag { per_second } => per_second,
        };
        if !(coast_rate.is_finite() && coast_rate >= 0.0) {
            return Err(ConfigError::Invalid(format!("coast rate must be >= 0, got {coast_rate}")));
        }
        if !(self.steer_rate_deg_per_s.is_finite() && self.steer_rate_deg_per_s >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "steer rate must be >= 0, got {}",
                self.steer_rate_deg_per_s
            )));
        }
        Ok(())
    }
}

/// Per-controller actuation state, mutated once per fixed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuationState {
    pub current_gear: usize,
    pub desired_direction: Vec3,
    pub current_velocity: Vec3,
}

impl ActuationState {
    pub fn new() -> Self {
        Self {
            current_gear: 0,
            desired_direction: Vec3::X,
            current_velocity: Vec3::ZERO,
        }
    }

    /// Returns true if the gear changed.
    pub fn shift_up(&mut self, gears: &GearTable) -> bool {
        if self.current_gear < gears.top_gear() {
            self.current_gear += 1;
            true
        } else {
            false
        }
    }

    /// Returns true if the gear changed.
    pub fn shift_down(&mut self) -> bool {
        if self.current_gear > 0 {
            self.current_gear -= 1;
            true
        } else {
            false
        }
    }
}

impl Default for ActuationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one actuation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuationStep {
    pub velocity: Vec3,
    pub regime: Regime,
    /// Speed along the desired direction before the step; negative when reversing.
    pub signed_speed_mps: f32,
}

/// Turns one tick of forward/reverse intent into a new velocity for the body.
///
/// Stateless apart from the drive train; the gear and observed velocity live
/// in [`ActuationState`] so the same model can be stepped from tests.
pub struct ActuationModel {
    drive_train: DriveTrain,
}

impl ActuationModel {
    pub fn new(drive_train: DriveTrain) -> Self {
        Self { drive_train }
    }

    pub fn drive_train(&self) -> &DriveTrain {
        &self.drive_train
    }

    /// Yaw rate in rad/s around world up for a steering input.
    ///
    /// Positive `steer` turns left (counter-clockwise seen from above). The
    /// turn flips while reversing, and a car at rest does not turn.
    pub fn yaw_rate(&self, steer: f32, signed_speed_mps: f32) -> f32 {
        if steer == 0.0 || signed_speed_mps.abs() < STEER_MIN_SPEED_MPS {
            return 0.0;
        }
        let rate = self.drive_train.steer_rate_deg_per_s.to_radians() * steer;
        if signed_speed_mps < 0.0 {
            -rate
        } else {
            rate
        }
    }

    /// Compute the velocity to apply for the upcoming tick.
    ///
    /// `state.current_velocity` must already hold the body's observed velocity.
    /// A desired direction with no horizontal component is treated as "no
    /// movement": the velocity is returned untouched.
    ///
    /// # Panics
    ///
    /// If `state.current_gear` is outside the gear table.
    pub fn step(&self, state: &ActuationState, actuation: f32, tick_rate: TickRate) -> ActuationStep {
        let velocity = state.current_velocity;
        let flat = Vec3::new(state.desired_direction.x, 0.0, state.desired_direction.z);
        if flat.length_squared() < 1e-12 {
            warn!(direction = ?state.desired_direction, "desired direction has no horizontal component, holding velocity");
            return ActuationStep { velocity, regime: Regime::Coast, signed_speed_mps: 0.0 };
        }
        let direction = flat.normalize();

        let speed = velocity.dot(direction);
        let regime = Regime::classify(speed, actuation);
        let tps = tick_rate.ticks_per_second();

        let new_speed = match regime {
            Regime::ForwardAcceleration => {
                let gear = self.drive_train.gears.gear(state.current_gear);
                accelerate(speed, gear, actuation, tps)
            }
            Regime::ReverseAcceleration => accelerate(speed, &self.drive_train.reverse, actuation, tps),
            Regime::ForwardBrake | Regime::ReverseBrake => {
                toward_rest(speed, self.drive_train.brake_rate_mps2 / tps)
            }
            Regime::Coast => match self.drive_train.coast {
                CoastPolicy::Roll => speed,
                CoastPolicy::FixedDeceleration { rate_mps2 } => toward_rest(speed, rate_mps2 / tps),
                CoastPolicy::ExponentialDrag { per_second } => speed * (-per_second / tps).exp(),
            },
        };

        trace!(?regime, gear = state.current_gear, speed, new_speed, "actuation step");

        if new_speed == speed {
            return ActuationStep { velocity, regime, signed_speed_mps: speed };
        }
        // direction.y is exactly zero, so the vertical component is not perturbed
        ActuationStep {
            velocity: velocity + direction * (new_speed - speed),
            regime,
            signed_speed_mps: speed,
        }
    }
}

/// One tick of acceleration along the actuation sign, hard-capped at the gear's top speed.
fn accelerate(speed: f32, gear: &GearInformation, actuation: f32, tps: f32) -> f32 {
    let max_speed = gear.max_speed_mps();
    if speed.abs() >= max_speed {
        return speed;
    }
    // Velocity change one second from now, realized over one tick
    let per_tick = gear.acceleration_rate_mps2 * actuation / tps;
    (speed + per_tick).clamp(-max_speed, max_speed)
}

/// Reduce |speed| by `amount` without crossing zero.
fn toward_rest(speed: f32, amount: f32) -> f32 {
    if speed > 0.0 {
        (speed - amount).max(0.0)
    } else if speed < 0.0 {
        (speed + amount).min(0.0)
    } else {
        speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tps(v: f32) -> TickRate {
        TickRate::from_ticks_per_second(v).unwrap()
    }

    fn single_gear(accel: f32, max_kph: f32) -> DriveTrain {
        DriveTrain {
            gears: GearTable::new(vec![GearInformation::new(accel, max_kph).unwrap()]).unwrap(),
            ..DriveTrain::default()
        }
    }

    #[test]
    fn test_actuation_amount() {
        assert_eq!(actuation_amount(true, false), 1.0);
        assert_eq!(actuation_amount(false, true), -1.0);
        assert_eq!(actuation_amount(true, true), 0.0);
        assert_eq!(actuation_amount(false, false), 0.0);
    }

    #[test]
    fn test_regime_classification() {
        assert_eq!(Regime::classify(0.0, 1.0), Regime::ForwardAcceleration);
        assert_eq!(Regime::classify(3.0, 1.0), Regime::ForwardAcceleration);
        assert_eq!(Regime::classify(3.0, -1.0), Regime::ForwardBrake);
        assert_eq!(Regime::classify(0.0, -1.0), Regime::ReverseAcceleration);
        assert_eq!(Regime::classify(-2.0, -1.0), Regime::ReverseAcceleration);
        assert_eq!(Regime::classify(-2.0, 1.0), Regime::ReverseBrake);
        assert_eq!(Regime::classify(5.0, 0.0), Regime::Coast);
        assert_eq!(Regime::classify(0.0, 0.0), Regime::Coast);
    }

    #[test]
    fn test_first_tick_delta() {
        let model = ActuationModel::new(single_gear(10.0, 54.0));
        let state = ActuationState::new();
        let step = model.step(&state, 1.0, tps(60.0));
        assert!((step.velocity.x - 10.0 / 60.0).abs() < 1e-6);
        assert_eq!(step.regime, Regime::ForwardAcceleration);
    }

    #[test]
    fn test_per_tick_delta_scales_inversely_with_tick_rate() {
        let model = ActuationModel::new(single_gear(10.0, 54.0));
        let state = ActuationState::new();
        let at_60 = model.step(&state, 1.0, tps(60.0)).velocity.x;
        let at_120 = model.step(&state, 1.0, tps(120.0)).velocity.x;
        assert!((at_60 - 2.0 * at_120).abs() < 1e-6, "{at_60} vs {at_120}");

        // One second of ticks lands on the same velocity regardless of rate
        let mut slow = ActuationState::new();
        for _ in 0..60 {
            slow.current_velocity = model.step(&slow, 1.0, tps(60.0)).velocity;
        }
        let mut fast = ActuationState::new();
        for _ in 0..120 {
            fast.current_velocity = model.step(&fast, 1.0, tps(120.0)).velocity;
        }
        assert!((slow.current_velocity.x - 10.0).abs() < 1e-3);
        assert!((fast.current_velocity.x - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_acceleration_is_monotonic_and_capped() {
        let model = ActuationModel::new(single_gear(10.0, 54.0));
        let mut state = ActuationState::new();
        let mut last = 0.0;
        for _ in 0..600 {
            state.current_velocity = model.step(&state, 1.0, tps(60.0)).velocity;
            let speed = state.current_velocity.x;
            assert!(speed >= last, "speed went down: {last} -> {speed}");
            assert!(speed <= 15.0 + 1e-4, "speed {speed} passed the cap");
            last = speed;
        }
        assert!((last - 15.0).abs() < 1e-4, "should settle on the cap, got {last}");
    }

    #[test]
    fn test_already_over_cap_is_untouched() {
        let model = ActuationModel::new(single_gear(10.0, 54.0));
        let mut state = ActuationState::new();
        state.current_velocity = Vec3::new(20.0, -1.0, 0.0);
        let step = model.step(&state, 1.0, tps(60.0));
        assert_eq!(step.velocity, state.current_velocity);
    }

    #[test]
    fn test_vertical_component_preserved() {
        let model = ActuationModel::new(DriveTrain {
            coast: CoastPolicy::FixedDeceleration { rate_mps2: 2.0 },
            ..single_gear(10.0, 54.0)
        });
        let mut state = ActuationState::new();
        state.current_velocity = Vec3::new(3.0, -4.2, 0.5);
        for actuation in [1.0, -1.0, 0.0] {
            let step = model.step(&state, actuation, tps(60.0));
            assert_eq!(step.velocity.y, -4.2, "actuation {actuation} touched vertical velocity");
        }
    }

    #[test]
    fn test_roll_leaves_velocity_unchanged() {
        let model = ActuationModel::new(DriveTrain::default());
        let mut state = ActuationState::new();
        state.current_velocity = Vec3::new(2.5, 0.3, -0.1);
        let step = model.step(&state, 0.0, tps(60.0));
        assert_eq!(step.regime, Regime::Coast);
        assert_eq!(step.velocity, state.current_velocity);
    }

    #[test]
    fn test_brake_stops_at_rest() {
        let model = ActuationModel::new(DriveTrain { brake_rate_mps2: 6.0, ..DriveTrain::default() });
        let mut state = ActuationState::new();
        state.current_velocity = Vec3::new(1.0, 0.0, 0.0);
        let mut ticks = 0;
        while state.current_velocity.x > 0.0 {
            let step = model.step(&state, -1.0, tps(60.0));
            assert_eq!(step.regime, Regime::ForwardBrake);
            state.current_velocity = step.velocity;
            assert!(state.current_velocity.x >= 0.0, "brake reversed the car");
            ticks += 1;
            assert!(ticks < 100);
        }
        // 1 m/s at 6 m/s^2 -> 1/6 s -> 10 ticks, one more if rounding leaves a sliver
        assert!((10..=11).contains(&ticks), "took {ticks} ticks");
        // Holding reverse from rest now backs up
        let step = model.step(&state, -1.0, tps(60.0));
        assert_eq!(step.regime, Regime::ReverseAcceleration);
        assert!(step.velocity.x < 0.0);
    }

    #[test]
    fn test_reverse_brake_and_cap() {
        let model = ActuationModel::new(DriveTrain::default());
        let reverse_cap = model.drive_train().reverse.max_speed_mps();
        let mut state = ActuationState::new();
        for _ in 0..10_000 {
            state.current_velocity = model.step(&state, -1.0, tps(60.0)).velocity;
        }
        assert!((state.current_velocity.x + reverse_cap).abs() < 1e-4);

        let step = model.step(&state, 1.0, tps(60.0));
        assert_eq!(step.regime, Regime::ReverseBrake);
        assert!(step.velocity.x > state.current_velocity.x && step.velocity.x <= 0.0);
    }

    #[test]
    fn test_coast_policies() {
        let mut state = ActuationState::new();
        state.current_velocity = Vec3::new(10.0, 0.0, 0.0);

        let fixed = ActuationModel::new(DriveTrain {
            coast: CoastPolicy::FixedDeceleration { rate_mps2: 6.0 },
            ..DriveTrain::default()
        });
        assert!((fixed.step(&state, 0.0, tps(60.0)).velocity.x - 9.9).abs() < 1e-5);

        let drag = ActuationModel::new(DriveTrain {
            coast: CoastPolicy::ExponentialDrag { per_second: 0.5 },
            ..DriveTrain::default()
        });
        let mut s = state.clone();
        for _ in 0..60 {
            s.current_velocity = drag.step(&s, 0.0, tps(60.0)).velocity;
        }
        assert!((s.current_velocity.x - 10.0 * (-0.5f32).exp()).abs() < 1e-3);
    }

    #[test]
    fn test_zero_direction_holds_velocity() {
        let model = ActuationModel::new(DriveTrain::default());
        let mut state = ActuationState::new();
        state.desired_direction = Vec3::Y;
        state.current_velocity = Vec3::new(1.0, 2.0, 3.0);
        let step = model.step(&state, 1.0, tps(60.0));
        assert_eq!(step.velocity, state.current_velocity);
        assert!(step.velocity.is_finite());
    }

    #[test]
    fn test_sideways_velocity_passes_through() {
        let model = ActuationModel::new(single_gear(10.0, 54.0));
        let mut state = ActuationState::new();
        state.current_velocity = Vec3::new(0.0, 0.0, 2.0);
        let step = model.step(&state, 1.0, tps(60.0));
        assert_eq!(step.velocity.z, 2.0);
        assert!(step.velocity.x > 0.0);
    }

    #[test]
    fn test_steering_yaw_rate() {
        let model = ActuationModel::new(DriveTrain { steer_rate_deg_per_s: 90.0, ..DriveTrain::default() });
        let quarter = std::f32::consts::FRAC_PI_2;
        assert!((model.yaw_rate(steer_amount(true, false), 5.0) - quarter).abs() < 1e-6);
        assert!((model.yaw_rate(steer_amount(false, true), 5.0) + quarter).abs() < 1e-6);
        // Backing up with left held swings the nose right
        assert!((model.yaw_rate(steer_amount(true, false), -2.0) + quarter).abs() < 1e-6);
        assert_eq!(model.yaw_rate(steer_amount(true, true), 5.0), 0.0);
        assert_eq!(model.yaw_rate(steer_amount(true, false), 0.0), 0.0);
    }

    #[test]
    fn test_turn_horizontal_matches_body_rotation() {
        let angle = 0.3;
        let velocity = Vec3::new(4.0, -1.5, 1.0);
        let turned = turn_horizontal(velocity, angle);
        let expected = glam::Quat::from_rotation_y(angle) * velocity;
        assert!((turned - expected).length() < 1e-5, "{turned} vs {expected}");
        assert_eq!(turned.y, -1.5);
        assert_eq!(turn_horizontal(velocity, 0.0), velocity);
    }

    #[test]
    fn test_negative_steer_rate_rejected() {
        let drive_train = DriveTrain { steer_rate_deg_per_s: -1.0, ..DriveTrain::default() };
        assert!(drive_train.validate().is_err());
        assert!(DriveTrain::default().validate().is_ok());
    }

    #[test]
    fn test_gear_shift_saturates() {
        let gears = GearTable::default();
        let mut state = ActuationState::new();
        assert!(!state.shift_down());
        assert!(state.shift_up(&gears));
        assert!(state.shift_up(&gears));
        assert!(!state.shift_up(&gears));
        assert_eq!(state.current_gear, 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_bad_gear_index_fails_fast() {
        let model = ActuationModel::new(DriveTrain::default());
        let mut state = ActuationState::new();
        state.current_gear = 7;
        let _ = model.step(&state, 1.0, tps(60.0));
    }
}
