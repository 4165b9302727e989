//! Top-level runtime configuration.
//!
//! One document configures every subsystem. All sections default, so a
//! partial JSON document only needs the values it changes.

use avatar_animation_core::ProceduralConfig;
use avatar_interaction_core::InteractionConfig;
use avatar_rig_core::RigConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::DiagnosticsCfg;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field `{field}` {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub rig: RigConfig,
    pub procedural: ProceduralConfig,
    pub interaction: InteractionConfig,
    /// Upper bound for a single frame's dt, seconds. Overrides
    /// `procedural.max_dt` so every subsystem clamps the same way.
    pub max_dt: f32,
    /// Viewer height above the player origin when the host sends no head pose.
    pub eye_height: f32,
    /// Smallest bounding radius given to a registered avatar, meters.
    pub min_avatar_radius: f32,
    pub diagnostics: DiagnosticsCfg,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            rig: RigConfig::default(),
            procedural: ProceduralConfig::default(),
            interaction: InteractionConfig::default(),
            max_dt: 0.05,
            eye_height: 1.6,
            min_avatar_radius: 0.25,
            diagnostics: DiagnosticsCfg::default(),
        }
    }
}

fn check(ok: bool, field: &'static str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        })
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

impl OrchestratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check(positive(self.max_dt), "max_dt", "must be a positive number of seconds")?;
        check(non_negative(self.eye_height), "eye_height", "must be >= 0")?;
        check(positive(self.min_avatar_radius), "min_avatar_radius", "must be > 0")?;
        check(self.rig.arm_rest_angle.is_finite(), "rig.arm_rest_angle", "must be finite")?;

        let p = &self.procedural;
        check(
            p.default_mode_duration_ms.is_finite() && p.default_mode_duration_ms >= 0.0,
            "procedural.default_mode_duration_ms",
            "must be >= 0",
        )?;
        check(non_negative(p.gaze.damping), "procedural.gaze.damping", "must be >= 0")?;
        check(non_negative(p.gaze.yaw_limit), "procedural.gaze.yaw_limit", "must be >= 0")?;
        check(non_negative(p.gaze.pitch_limit), "procedural.gaze.pitch_limit", "must be >= 0")?;

        let i = &self.interaction;
        check(
            i.locomotion.deadzone.is_finite() && (0.0..1.0).contains(&i.locomotion.deadzone),
            "interaction.locomotion.deadzone",
            "must be in [0, 1)",
        )?;
        check(non_negative(i.locomotion.move_speed), "interaction.locomotion.move_speed", "must be >= 0")?;
        check(
            non_negative(i.locomotion.vertical_speed),
            "interaction.locomotion.vertical_speed",
            "must be >= 0",
        )?;
        check(non_negative(i.locomotion.turn_speed), "interaction.locomotion.turn_speed", "must be >= 0")?;
        check(i.drag.rotate_gain.is_finite(), "interaction.drag.rotate_gain", "must be finite")?;
        check(
            positive(i.drag.min_panel_distance),
            "interaction.drag.min_panel_distance",
            "must be > 0",
        )?;
        check(
            i.drag.max_panel_distance.is_finite()
                && i.drag.max_panel_distance >= i.drag.min_panel_distance,
            "interaction.drag.max_panel_distance",
            "must be >= min_panel_distance",
        )?;
        check(positive(i.raycast.max_distance), "interaction.raycast.max_distance", "must be > 0")?;
        Ok(())
    }
}
