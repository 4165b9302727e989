//! Rig-level configuration.

use serde::{Deserialize, Serialize};

use crate::roles::RolePatterns;

/// Tunables for role resolution and the one-time rest correction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Pattern table used by [`crate::resolve_roles`].
    pub role_patterns: RolePatterns,
    /// Rotation (radians, about local +Z) applied to each upper arm of a
    /// clip-less rig before its rest pose is captured.
    pub arm_rest_angle: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            role_patterns: RolePatterns::default(),
            arm_rest_angle: 0.9,
        }
    }
}
