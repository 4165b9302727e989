//! Floating UI panels and their hit regions.

use glam::{Mat3, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionRole {
    /// Selecting fires the region's click action.
    #[default]
    Click,
    /// Selecting starts a panel move while the panel is unpinned.
    MoveHandle,
}

/// Hit-testable proxy for one UI element. The payload is opaque here and is
/// handed to the click handler untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiRegion {
    pub key: String,
    #[serde(default)]
    pub payload: Value,
    /// Center in panel-local XY, meters.
    pub center: Vec2,
    pub half_extents: Vec2,
    #[serde(default)]
    pub role: RegionRole,
}

impl UiRegion {
    pub fn click(key: impl Into<String>, center: Vec2, half_extents: Vec2) -> Self {
        Self {
            key: key.into(),
            payload: Value::Null,
            center,
            half_extents,
            role: RegionRole::Click,
        }
    }

    pub fn handle(key: impl Into<String>, center: Vec2, half_extents: Vec2) -> Self {
        Self {
            role: RegionRole::MoveHandle,
            ..Self::click(key, center, half_extents)
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelPlacement {
    pub position: Vec3,
    #[serde(default = "identity")]
    pub orientation: Quat,
    #[serde(default)]
    pub pinned: bool,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

impl PanelPlacement {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            pinned: false,
        }
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub placement: PanelPlacement,
    #[serde(default)]
    pub regions: Vec<UiRegion>,
}

impl Panel {
    pub fn new(placement: PanelPlacement, regions: Vec<UiRegion>) -> Self {
        Self { placement, regions }
    }
}

/// Orientation whose +Z points from `position` toward `viewer` while keeping
/// the panel's X axis level. Falls back to `current` when the two coincide or
/// the viewer is straight above or below.
pub fn face_viewer(position: Vec3, viewer: Vec3, current: Quat) -> Quat {
    let Some(z) = (viewer - position).try_normalize() else {
        return current;
    };
    let Some(x) = Vec3::Y.cross(z).try_normalize() else {
        return current;
    };
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn faces_viewer_and_stays_level() {
        let position = Vec3::new(1.0, 1.5, -1.0);
        let viewer = Vec3::new(0.0, 1.6, 0.0);
        let q = face_viewer(position, viewer, Quat::IDENTITY);
        let normal = q * Vec3::Z;
        let expected = (viewer - position).normalize();
        assert_relative_eq!(normal.dot(expected), 1.0, epsilon = 1e-5);
        assert_relative_eq!((q * Vec3::X).y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_keeps_current() {
        let current = Quat::from_rotation_y(0.3);
        assert_eq!(face_viewer(Vec3::ONE, Vec3::ONE, current), current);
        assert_eq!(face_viewer(Vec3::ZERO, Vec3::Y, current), current);
    }

    #[test]
    fn region_json_defaults() {
        let region: UiRegion = serde_json::from_str(
            r#"{"key":"send","center":[0.0,-0.2],"half_extents":[0.1,0.05]}"#,
        )
        .unwrap();
        assert_eq!(region.role, RegionRole::Click);
        assert_eq!(region.payload, Value::Null);
    }
}
