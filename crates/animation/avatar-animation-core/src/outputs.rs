//! Output contracts from the procedural driver.
//!
//! Outputs carry the joints written this tick (final local values, already
//! applied to the rig) and a separate list of semantic events. Adapters copy
//! the writes onto their own scene graph.

use avatar_rig_core::{JointId, JointRole};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::mode::{AnimationMode, ModeChangeCause};

/// Final local transform of one joint for this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointWrite {
    pub joint: JointId,
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum AnimationEvent {
    AvatarRegistered {
        joints: usize,
        roles: Vec<JointRole>,
        rest_corrected: bool,
    },
    ModeChanged {
        from: AnimationMode,
        to: AnimationMode,
        cause: ModeChangeCause,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub writes: Vec<JointWrite>,
    #[serde(default)]
    pub events: Vec<AnimationEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.writes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_write(&mut self, write: JointWrite) {
        self.writes.push(write);
    }

    #[inline]
    pub fn push_event(&mut self, event: AnimationEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.events.is_empty()
    }

    pub fn write_for(&self, joint: JointId) -> Option<&JointWrite> {
        self.writes.iter().find(|w| w.joint == joint)
    }
}
