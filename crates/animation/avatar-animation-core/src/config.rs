//! Configuration for the procedural animation driver.

use serde::{Deserialize, Serialize};

use crate::overlay::ModeOverlays;

/// Idle breathing on the spine and chest (pitch, radians).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathingConfig {
    pub spine_amplitude: f32,
    pub chest_amplitude: f32,
    /// Angular rate in rad/s shared by both joints.
    pub rate: f32,
    /// Phase lead of the chest over the spine, radians.
    pub chest_phase: f32,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            spine_amplitude: 0.04,
            chest_amplitude: 0.03,
            rate: 2.0,
            chest_phase: 0.7,
        }
    }
}

/// Pointer-following head gaze.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    pub yaw_gain: f32,
    pub yaw_limit: f32,
    pub pitch_gain: f32,
    pub pitch_limit: f32,
    /// Exponential damping rate, 1/s.
    pub damping: f32,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            yaw_gain: 0.55,
            yaw_limit: 0.7,
            pitch_gain: 0.25,
            pitch_limit: 0.45,
            damping: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralConfig {
    pub breathing: BreathingConfig,
    pub gaze: GazeConfig,
    pub overlays: ModeOverlays,
    /// Keep layering procedural offsets while baked clips play.
    pub hybrid: bool,
    /// Used by `set_mode` when the caller passes no duration.
    pub default_mode_duration_ms: f64,
    /// Upper bound applied to `dt` before any rate-scaled computation.
    pub max_dt: f32,
}

impl Default for ProceduralConfig {
    fn default() -> Self {
        Self {
            breathing: BreathingConfig::default(),
            gaze: GazeConfig::default(),
            overlays: ModeOverlays::default(),
            hybrid: false,
            default_mode_duration_ms: 1200.0,
            max_dt: 0.05,
        }
    }
}

/// Clamp a host-supplied frame delta into `[0, max_dt]`; non-finite reads as 0.
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, max_dt.max(0.0))
    } else {
        0.0
    }
}
