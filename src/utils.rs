use crate::error::ControlError;

/// Kilometers per hour to meters per second.
pub fn kph_to_mps(kph: f32) -> f32 {
    kph * 1000.0 / 3600.0
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(deg: f32) -> f32 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Fixed simulation rate, stored canonically as ticks per second.
///
/// Hosts that hand out a tick delta instead convert once at the boundary with
/// [`TickRate::from_tick_delta`]; everything downstream divides by
/// [`TickRate::ticks_per_second`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRate(f32);

impl TickRate {
    pub fn from_ticks_per_second(tps: f32) -> Result<Self, ControlError> {
        if tps.is_finite() && tps > 0.0 {
            Ok(Self(tps))
        } else {
            Err(ControlError::InvalidTickRate(tps))
        }
    }

    pub fn from_tick_delta(seconds: f32) -> Result<Self, ControlError> {
        if seconds.is_finite() && seconds > 0.0 {
            Self::from_ticks_per_second(1.0 / seconds)
        } else {
            Err(ControlError::InvalidTickRate(seconds))
        }
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.0
    }

    pub fn tick_delta(&self) -> f32 {
        1.0 / self.0
    }
}
