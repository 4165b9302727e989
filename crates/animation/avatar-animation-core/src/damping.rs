//! Frame-rate independent exponential smoothing.

use serde::{Deserialize, Serialize};

/// Move `current` toward `target` by the fraction `1 - e^(-lambda * dt)`.
///
/// The same total convergence is reached whether a span of time is covered in
/// one large step or many small ones.
#[inline]
pub fn damp(current: f32, target: f32, lambda: f32, dt: f32) -> f32 {
    if !(lambda.is_finite() && dt.is_finite()) || lambda <= 0.0 || dt <= 0.0 {
        return current;
    }
    current + (target - current) * (1.0 - (-lambda * dt).exp())
}

/// Smoothed gaze angles for one joint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeSmoothing {
    pub yaw: f32,
    pub pitch: f32,
}

impl GazeSmoothing {
    pub fn step(&mut self, target_yaw: f32, target_pitch: f32, lambda: f32, dt: f32) {
        self.yaw = damp(self.yaw, target_yaw, lambda, dt);
        self.pitch = damp(self.pitch, target_pitch, lambda, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn split_steps_match_single_step() {
        let one = damp(0.0, 1.0, 10.0, 0.1);
        let mut many = 0.0;
        for _ in 0..10 {
            many = damp(many, 1.0, 10.0, 0.01);
        }
        assert_relative_eq!(one, many, epsilon = 1e-5);
    }

    #[test]
    fn zero_dt_holds_value() {
        assert_eq!(damp(0.3, 1.0, 10.0, 0.0), 0.3);
        assert_eq!(damp(0.3, 1.0, 10.0, f32::NAN), 0.3);
    }

    #[test]
    fn never_overshoots() {
        let v = damp(0.0, 0.55, 10.0, 10.0);
        assert!(v <= 0.55);
    }
}
