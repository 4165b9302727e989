//! Rest-pose snapshots.
//!
//! The rest pose is the baseline every procedural offset is composed onto.
//! It is captured once per registered avatar and reapplied to each touched
//! joint at the start of every tick so offsets can never accumulate.

use glam::{Quat, Vec3};
use hashbrown::HashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::rig::{JointId, Rig};
use crate::roles::{JointRole, RoleMap};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointRest {
    pub translation: Vec3,
    pub rotation: Quat,
}

#[derive(Clone, Debug, Default)]
pub struct RestPose {
    entries: HashMap<JointId, JointRest>,
}

impl RestPose {
    /// Snapshot the local translation and rotation of every joint in `rig`.
    pub fn capture(rig: &Rig) -> Self {
        let entries = rig
            .depth_first()
            .filter_map(|id| {
                rig.local(id).map(|t| {
                    (
                        id,
                        JointRest {
                            translation: t.translation,
                            rotation: t.rotation,
                        },
                    )
                })
            })
            .collect();
        Self { entries }
    }

    /// Apply the T-pose correction when `arm_correction` is set, then capture
    /// so the corrected pose becomes the baseline.
    pub fn register(rig: &mut Rig, roles: &RoleMap, arm_correction: Option<f32>) -> Self {
        if let Some(angle) = arm_correction {
            let lowered = lower_arms(rig, roles, angle);
            debug!("lowered {lowered} upper-arm joints by {angle} rad before capture");
        }
        Self::capture(rig)
    }

    #[inline]
    pub fn get(&self, joint: JointId) -> Option<&JointRest> {
        self.entries.get(&joint)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reset one joint to its snapshot. Returns `false` when the joint was not
    /// captured or no longer exists.
    pub fn restore(&self, rig: &mut Rig, joint: JointId) -> bool {
        let (Some(rest), Some(target)) = (self.entries.get(&joint), rig.joint_mut(joint)) else {
            return false;
        };
        target.local.translation = rest.translation;
        target.local.rotation = rest.rotation;
        true
    }

    pub fn restore_all(&self, rig: &mut Rig) {
        for joint in self.entries.keys() {
            self.restore(rig, *joint);
        }
    }
}

/// Rotate both upper arms about their local forward (+Z) axis so a T-pose
/// relaxes toward the body. The left arm turns by `-angle`, the right by
/// `+angle`. Returns how many joints were rotated.
pub fn lower_arms(rig: &mut Rig, roles: &RoleMap, angle: f32) -> usize {
    let mut count = 0;
    for (role, sign) in [
        (JointRole::LeftUpperArm, -1.0_f32),
        (JointRole::RightUpperArm, 1.0_f32),
    ] {
        let Some(joint) = roles.get(role).and_then(|id| rig.joint_mut(id)) else {
            continue;
        };
        joint.local.rotation =
            (joint.local.rotation * Quat::from_rotation_z(sign * angle)).normalize();
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::RigDesc;

    #[test]
    fn restore_undoes_mutation() {
        let desc = RigDesc::leaf("Root", Vec3::ZERO)
            .with_children(vec![RigDesc::leaf("Spine", Vec3::new(0.0, 1.0, 0.0))]);
        let mut rig = Rig::from_desc(&desc).unwrap();
        let pose = RestPose::capture(&rig);
        let spine = rig.find("Spine").unwrap();
        {
            let j = rig.joint_mut(spine).unwrap();
            j.local.rotation = Quat::from_rotation_x(0.4);
            j.local.translation.y += 0.3;
        }
        assert!(pose.restore(&mut rig, spine));
        let local = rig.local(spine).unwrap();
        assert_eq!(local.rotation, Quat::IDENTITY);
        assert_eq!(local.translation, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn restore_unknown_joint_is_noop() {
        let mut rig = Rig::from_desc(&RigDesc::leaf("Root", Vec3::ZERO)).unwrap();
        let pose = RestPose::capture(&rig);
        assert!(!pose.restore(&mut rig, JointId(42)));
    }

    #[test]
    fn lower_arms_skips_missing_roles() {
        let mut rig = Rig::from_desc(&RigDesc::leaf("Root", Vec3::ZERO)).unwrap();
        assert_eq!(lower_arms(&mut rig, &RoleMap::default(), 0.9), 0);
    }
}
