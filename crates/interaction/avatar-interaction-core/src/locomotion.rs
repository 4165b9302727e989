//! Stick-driven player movement.
//!
//! Left stick moves on the ground plane relative to where the head looks;
//! right stick X turns and Y flies. Every delta is `stick * speed * dt`, so
//! motion per second is the same at any frame rate.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::LocomotionConfig;

/// The player rig the viewer camera and controllers hang off.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPose {
    pub position: Vec3,
    /// Radians about +Y.
    pub yaw: f32,
}

impl PlayerPose {
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::NEG_Z
    }

    pub fn apply(&mut self, delta: &LocomotionDelta) {
        if !delta.is_zero() {
            self.position += delta.translation;
            self.yaw += delta.yaw;
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LocomotionDelta {
    pub translation: Vec3,
    pub yaw: f32,
}

impl LocomotionDelta {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.translation == Vec3::ZERO && self.yaw == 0.0
    }
}

/// Zero out magnitudes under `deadzone`; non-finite input reads as zero.
#[inline]
pub fn deadzone(value: f32, deadzone: f32) -> f32 {
    if !value.is_finite() || value.abs() < deadzone {
        0.0
    } else {
        value
    }
}

fn planar_forward(head_forward: Option<Vec3>, player: &PlayerPose) -> Vec3 {
    head_forward
        .and_then(|f| Vec3::new(f.x, 0.0, f.z).try_normalize())
        .unwrap_or_else(|| player.forward())
}

/// Movement for one tick. `left` and `right` are the stick values of the
/// connected hands; a disconnected hand passes `None` and contributes nothing.
pub fn locomotion_delta(
    cfg: &LocomotionConfig,
    player: &PlayerPose,
    head_forward: Option<Vec3>,
    left: Option<Vec2>,
    right: Option<Vec2>,
    dt: f32,
) -> LocomotionDelta {
    let mut delta = LocomotionDelta::default();
    if dt.is_nan() || dt <= 0.0 {
        return delta;
    }

    if let Some(stick) = left {
        let strafe = deadzone(stick.x, cfg.deadzone);
        let advance = -deadzone(stick.y, cfg.deadzone);
        if strafe != 0.0 || advance != 0.0 {
            let forward = planar_forward(head_forward, player);
            let right = forward.cross(Vec3::Y);
            delta.translation += (forward * advance + right * strafe) * cfg.move_speed * dt;
        }
    }

    if let Some(stick) = right {
        let turn = deadzone(stick.x, cfg.deadzone);
        let fly = deadzone(stick.y, cfg.deadzone);
        if turn != 0.0 {
            delta.yaw -= turn * cfg.turn_speed * dt;
        }
        if fly != 0.0 {
            delta.translation.y += -fly * cfg.vertical_speed * dt;
        }
    }
    delta
}
