//! Mood overlay tables.
//!
//! Each non-idle [`AnimationMode`] maps to a short list of [`OverlayTerm`]s.
//! A term drives one channel of one joint role with
//! `bias + amplitude * sin(2π * frequency_hz * t + phase)`, optionally
//! rectified so the wave never goes below `bias`.

use std::f64::consts::TAU;

use avatar_rig_core::JointRole;
use serde::{Deserialize, Serialize};

use crate::mode::AnimationMode;

/// Which local degree of freedom a term drives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Rotation about local X; positive tips forward.
    Pitch,
    /// Rotation about local Y.
    Yaw,
    /// Rotation about local Z.
    Roll,
    /// Translation along the parent's +Y, in meters.
    Lift,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayTerm {
    pub role: JointRole,
    pub channel: Channel,
    pub amplitude: f32,
    pub frequency_hz: f32,
    #[serde(default)]
    pub bias: f32,
    #[serde(default)]
    pub phase: f32,
    #[serde(default)]
    pub rectified: bool,
}

impl OverlayTerm {
    pub fn wave(role: JointRole, channel: Channel, amplitude: f32, frequency_hz: f32) -> Self {
        Self {
            role,
            channel,
            amplitude,
            frequency_hz,
            bias: 0.0,
            phase: 0.0,
            rectified: false,
        }
    }

    pub fn constant(role: JointRole, channel: Channel, value: f32) -> Self {
        Self {
            bias: value,
            ..Self::wave(role, channel, 0.0, 0.0)
        }
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    pub fn rectified(mut self) -> Self {
        self.rectified = true;
        self
    }

    /// Value of this term at `elapsed` seconds.
    pub fn sample(&self, elapsed: f64) -> f32 {
        let s = (TAU * self.frequency_hz as f64 * elapsed + self.phase as f64).sin() as f32;
        let s = if self.rectified { s.abs() } else { s };
        self.bias + self.amplitude * s
    }
}

/// Overlay terms per mood. Idle has none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeOverlays {
    pub happy: Vec<OverlayTerm>,
    pub thinking: Vec<OverlayTerm>,
    pub dance: Vec<OverlayTerm>,
    pub talk: Vec<OverlayTerm>,
}

impl Default for ModeOverlays {
    fn default() -> Self {
        use Channel::*;
        use JointRole::*;
        Self {
            happy: vec![
                OverlayTerm::wave(Chest, Pitch, 0.06, 3.2).with_bias(-0.10),
                OverlayTerm::wave(Hips, Lift, 0.04, 3.2).rectified(),
            ],
            thinking: vec![
                OverlayTerm::wave(Head, Roll, 0.12, 1.4),
                OverlayTerm::constant(Head, Pitch, 0.10),
                OverlayTerm::wave(Hips, Yaw, 0.08, 1.2),
            ],
            dance: vec![
                OverlayTerm::wave(Hips, Yaw, 0.18, 5.0),
                OverlayTerm::wave(Chest, Yaw, 0.12, 6.0),
            ],
            talk: vec![
                OverlayTerm::wave(Head, Pitch, 0.06, 10.0),
                OverlayTerm::wave(Chest, Pitch, 0.03, 6.0),
            ],
        }
    }
}

impl ModeOverlays {
    pub fn terms(&self, mode: AnimationMode) -> &[OverlayTerm] {
        match mode {
            AnimationMode::Idle => &[],
            AnimationMode::Happy => &self.happy,
            AnimationMode::Thinking => &self.thinking,
            AnimationMode::Dance => &self.dance,
            AnimationMode::Talk => &self.talk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rectified_wave_never_dips_below_bias() {
        let term = OverlayTerm::wave(JointRole::Hips, Channel::Lift, 0.04, 3.2).rectified();
        for i in 0..500 {
            let v = term.sample(i as f64 * 0.0137);
            assert!((0.0..=0.04 + 1e-6).contains(&v), "{v}");
        }
    }

    #[test]
    fn constant_term_ignores_time() {
        let term = OverlayTerm::constant(JointRole::Head, Channel::Pitch, 0.10);
        assert_relative_eq!(term.sample(0.0), 0.10);
        assert_relative_eq!(term.sample(123.456), 0.10);
    }

    #[test]
    fn frequency_is_in_hertz() {
        let term = OverlayTerm::wave(JointRole::Hips, Channel::Yaw, 0.18, 5.0);
        // Quarter period of a 5 Hz wave is 50 ms.
        assert_relative_eq!(term.sample(0.05), 0.18, epsilon = 1e-5);
    }

    #[test]
    fn idle_has_no_overlay() {
        assert!(ModeOverlays::default().terms(AnimationMode::Idle).is_empty());
        assert_eq!(ModeOverlays::default().terms(AnimationMode::Thinking).len(), 3);
    }
}
