//! Tunables for locomotion, drag sessions and raycasting.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Per-axis magnitude below which stick input reads as zero.
    pub deadzone: f32,
    /// Planar speed in m/s.
    pub move_speed: f32,
    /// Fly speed in m/s.
    pub vertical_speed: f32,
    /// Turn rate in rad/s.
    pub turn_speed: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            deadzone: 0.15,
            move_speed: 1.8,
            vertical_speed: 1.2,
            turn_speed: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Yaw radians per meter of lateral controller travel.
    pub rotate_gain: f32,
    pub min_panel_distance: f32,
    pub max_panel_distance: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            rotate_gain: 5.5,
            min_panel_distance: 0.2,
            max_panel_distance: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycastConfig {
    pub max_distance: f32,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self { max_distance: 10.0 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub locomotion: LocomotionConfig,
    pub drag: DragConfig,
    pub raycast: RaycastConfig,
}
