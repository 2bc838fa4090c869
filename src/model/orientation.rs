use serde::{Deserialize, Serialize};

use crate::utils::wrap_degrees;

/// Pitch limit in degrees. Kept strictly inside 90 so the look direction is
/// never parallel to world up.
pub const PITCH_LIMIT_DEG: f32 = 89.5;

/// Accumulated camera angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOrientation {
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
}

impl CameraOrientation {
    /// Build an orientation, normalizing yaw and clamping pitch.
    pub fn new(yaw_deg: f32, pitch_deg: f32, roll_deg: f32) -> Self {
        Self {
            yaw_deg: wrap_degrees(yaw_deg),
            pitch_deg: pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG),
            roll_deg,
        }
    }

    /// Apply one frame of mouse movement.
    ///
    /// Horizontal movement is subtracted from yaw so a positive `dx` turns the
    /// view the way the screen suggests; pitch is clamped, never wrapped.
    pub fn apply_look_delta(&mut self, dx: f32, dy: f32, sensitivity_deg: f32) {
        self.pitch_deg = (self.pitch_deg + dy * sensitivity_deg).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.yaw_deg = wrap_degrees(self.yaw_deg - dx * sensitivity_deg);
    }
}

impl Default for CameraOrientation {
    fn default() -> Self {
        Self { yaw_deg: 0.0, pitch_deg: -15.0, roll_deg: 0.0 }
    }
}

/// Orbit distance from the focal point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraZoom {
    distance: f32,
    min: f32,
    max: f32,
}

impl CameraZoom {
    /// `min <= max` is checked by config validation before this is built.
    pub fn new(distance: f32, min: f32, max: f32) -> Self {
        debug_assert!(min <= max, "zoom range inverted: {min} > {max}");
        Self { distance: distance.clamp(min, max), min, max }
    }

    /// Scroll up/forward (positive delta) pulls the camera closer.
    pub fn apply_scroll(&mut self, scroll_delta: f32, distance_sensitivity: f32) {
        self.distance = (self.distance + scroll_delta * -distance_sensitivity).clamp(self.min, self.max);
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_wraps_below_zero() {
        let mut o = CameraOrientation::new(10.0, 0.0, 0.0);
        // +20 degrees of dx with sensitivity 1 subtracts 20
        o.apply_look_delta(20.0, 0.0, 1.0);
        assert!((o.yaw_deg - 350.0).abs() < 1e-4);
    }

    #[test]
    fn test_yaw_wrap_examples() {
        let mut left = CameraOrientation::new(350.0, 0.0, 0.0);
        left.apply_look_delta(20.0, 0.0, 1.0);
        assert!((left.yaw_deg - 330.0).abs() < 1e-4, "got {}", left.yaw_deg);

        let mut right = CameraOrientation::new(350.0, 0.0, 0.0);
        right.apply_look_delta(-20.0, 0.0, 1.0);
        assert!((right.yaw_deg - 10.0).abs() < 1e-4, "got {}", right.yaw_deg);
    }

    #[test]
    fn test_yaw_stays_in_range_for_any_sequence() {
        let mut o = CameraOrientation::default();
        let deltas = [1234.5, -98765.0, 359.999, -0.0001, 720.0, -360.0, 1e6, -1e6, 0.5];
        for (i, dx) in deltas.iter().cycle().take(500).enumerate() {
            o.apply_look_delta(*dx * (i as f32 * 0.37).sin(), 0.0, 0.15);
            assert!(o.yaw_deg >= 0.0 && o.yaw_deg < 360.0, "yaw {} escaped", o.yaw_deg);
        }
    }

    #[test]
    fn test_pitch_is_clamped_not_wrapped() {
        let mut o = CameraOrientation::default();
        o.apply_look_delta(0.0, 1e7, 0.15);
        assert_eq!(o.pitch_deg, PITCH_LIMIT_DEG);
        o.apply_look_delta(0.0, -1e7, 0.15);
        assert_eq!(o.pitch_deg, -PITCH_LIMIT_DEG);
        o.apply_look_delta(0.0, 10.0, 1.0);
        assert!((o.pitch_deg - (-79.5)).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let mut zoom = CameraZoom::new(10.0, 1.0, 200.0);
        zoom.apply_scroll(3.0, 1.0);
        assert!((zoom.distance() - 7.0).abs() < 1e-5, "scroll up moves closer");
        zoom.apply_scroll(1000.0, 1.0);
        assert_eq!(zoom.distance(), 1.0);
        zoom.apply_scroll(-1e9, 1.0);
        assert_eq!(zoom.distance(), 200.0);
    }

    #[test]
    fn test_zoom_initial_distance_clamped() {
        let zoom = CameraZoom::new(500.0, 1.0, 200.0);
        assert_eq!(zoom.distance(), 200.0);
        assert_eq!(zoom.range(), (1.0, 200.0));
    }
}
