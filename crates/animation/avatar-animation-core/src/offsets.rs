//! Per-tick accumulation of additive offsets.
//!
//! Contributions for the same joint are multiplied together in the order they
//! arrive and written once, composed onto the rest pose:
//! `rotation = rest.rotation * offset`, `translation = rest.translation + lift`.

use avatar_rig_core::{JointId, JointRest};
use glam::{Quat, Vec3};
use hashbrown::HashMap;

#[derive(Default, Debug)]
pub struct OffsetAccumulator {
    rotations: HashMap<JointId, Quat>,
    translations: HashMap<JointId, Vec3>,
}

impl OffsetAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.rotations.clear();
        self.translations.clear();
    }

    pub fn rotate(&mut self, joint: JointId, offset: Quat) {
        self.rotations
            .entry(joint)
            .and_modify(|q| *q = *q * offset)
            .or_insert(offset);
    }

    pub fn translate(&mut self, joint: JointId, offset: Vec3) {
        *self.translations.entry(joint).or_insert(Vec3::ZERO) += offset;
    }

    pub fn rotation(&self, joint: JointId) -> Quat {
        self.rotations.get(&joint).copied().unwrap_or(Quat::IDENTITY)
    }

    pub fn translation(&self, joint: JointId) -> Vec3 {
        self.translations.get(&joint).copied().unwrap_or(Vec3::ZERO)
    }

    /// Final local (translation, rotation) for `joint` given its rest pose.
    /// An identity offset leaves the rest values bit-for-bit untouched.
    pub fn compose(&self, joint: JointId, rest: &JointRest) -> (Vec3, Quat) {
        let offset = self.rotation(joint);
        let rotation = if offset == Quat::IDENTITY {
            rest.rotation
        } else {
            (rest.rotation * offset).normalize()
        };
        let lift = self.translation(joint);
        let translation = if lift == Vec3::ZERO {
            rest.translation
        } else {
            rest.translation + lift
        };
        (translation, rotation)
    }
}
