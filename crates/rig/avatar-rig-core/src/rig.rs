//! Arena-backed joint hierarchy.
//!
//! A [`Rig`] owns every [`Joint`] of one loaded avatar. Joints are addressed by
//! dense [`JointId`]s; the root is always `JointId(0)`. Animation and
//! interaction state refer to joints only by id and never hold the joints
//! themselves.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::RigError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointId(pub u32);

impl JointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Local translation/rotation/scale of a joint relative to its parent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Compose `self` (parent) with `child`, yielding the child's transform in
    /// the parent's space.
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }

    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * p)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Debug)]
pub struct Joint {
    pub name: String,
    pub local: Transform,
    pub parent: Option<JointId>,
    pub children: Vec<JointId>,
}

/// Serializable nested description of a rig, as handed over by the asset
/// loader once a model finishes loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigDesc {
    pub name: String,
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub children: Vec<RigDesc>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl RigDesc {
    pub fn leaf(name: impl Into<String>, translation: Vec3) -> Self {
        Self {
            name: name.into(),
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<RigDesc>) -> Self {
        self.children = children;
        self
    }
}

/// Joint hierarchy of one avatar.
#[derive(Clone, Debug)]
pub struct Rig {
    joints: Vec<Joint>,
}

impl Rig {
    /// Create a rig holding only a root joint.
    pub fn new(root_name: impl Into<String>, root_local: Transform) -> Self {
        Self {
            joints: vec![Joint {
                name: root_name.into(),
                local: root_local,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    #[inline]
    pub fn root(&self) -> JointId {
        JointId(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Append a joint under `parent`.
    pub fn add_joint(
        &mut self,
        parent: JointId,
        name: impl Into<String>,
        local: Transform,
    ) -> Result<JointId, RigError> {
        if parent.index() >= self.joints.len() {
            return Err(RigError::UnknownJoint(parent));
        }
        let name = name.into();
        check_transform(&name, &local)?;
        let id = JointId(self.joints.len() as u32);
        self.joints.push(Joint {
            name,
            local: Transform {
                rotation: local.rotation.normalize(),
                ..local
            },
            parent: Some(parent),
            children: Vec::new(),
        });
        self.joints[parent.index()].children.push(id);
        Ok(id)
    }

    #[inline]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index())
    }

    #[inline]
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.index())
    }

    pub fn name(&self, id: JointId) -> Option<&str> {
        self.joint(id).map(|j| j.name.as_str())
    }

    pub fn local(&self, id: JointId) -> Option<Transform> {
        self.joint(id).map(|j| j.local)
    }

    /// Exact-name lookup.
    pub fn find(&self, name: &str) -> Option<JointId> {
        self.depth_first()
            .find(|id| self.joints[id.index()].name == name)
    }

    /// Pre-order walk from the root, children in insertion order.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            rig: self,
            stack: if self.joints.is_empty() {
                Vec::new()
            } else {
                vec![self.root()]
            },
        }
    }

    /// Model-space transform of a joint (root's parent space).
    pub fn world_transform(&self, id: JointId) -> Option<Transform> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let joint = self.joint(current)?;
            chain.push(joint.local);
            cursor = joint.parent;
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(Transform::IDENTITY, |acc, local| acc.mul_transform(local)),
        )
    }

    /// Axis-aligned bounds over all joint origins in model space.
    pub fn joint_bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for id in self.depth_first() {
            if let Some(t) = self.world_transform(id) {
                min = min.min(t.translation);
                max = max.max(t.translation);
            }
        }
        if min.x > max.x {
            (Vec3::ZERO, Vec3::ZERO)
        } else {
            (min, max)
        }
    }

    pub fn from_desc(desc: &RigDesc) -> Result<Self, RigError> {
        let root_local = Transform {
            translation: desc.translation,
            rotation: desc.rotation,
            scale: desc.scale,
        };
        check_transform(&desc.name, &root_local)?;
        let mut rig = Rig::new(
            desc.name.clone(),
            Transform {
                rotation: root_local.rotation.normalize(),
                ..root_local
            },
        );
        let root = rig.root();
        for child in &desc.children {
            rig.append_desc(root, child)?;
        }
        Ok(rig)
    }

    fn append_desc(&mut self, parent: JointId, desc: &RigDesc) -> Result<(), RigError> {
        let id = self.add_joint(
            parent,
            desc.name.clone(),
            Transform {
                translation: desc.translation,
                rotation: desc.rotation,
                scale: desc.scale,
            },
        )?;
        for child in &desc.children {
            self.append_desc(id, child)?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, RigError> {
        let desc: RigDesc = serde_json::from_str(json)?;
        Self::from_desc(&desc)
    }

    pub fn to_desc(&self) -> RigDesc {
        self.desc_of(self.root())
    }

    fn desc_of(&self, id: JointId) -> RigDesc {
        let joint = &self.joints[id.index()];
        RigDesc {
            name: joint.name.clone(),
            translation: joint.local.translation,
            rotation: joint.local.rotation,
            scale: joint.local.scale,
            children: joint.children.iter().map(|c| self.desc_of(*c)).collect(),
        }
    }
}

fn check_transform(name: &str, t: &Transform) -> Result<(), RigError> {
    let finite = t.translation.is_finite() && t.rotation.is_finite() && t.scale.is_finite();
    if !finite || t.rotation.length_squared() < 1e-12 {
        return Err(RigError::InvalidTransform {
            joint: name.to_string(),
        });
    }
    Ok(())
}

pub struct DepthFirst<'a> {
    rig: &'a Rig,
    stack: Vec<JointId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = JointId;

    fn next(&mut self) -> Option<JointId> {
        let id = self.stack.pop()?;
        if let Some(joint) = self.rig.joint(id) {
            self.stack.extend(joint.children.iter().rev().copied());
        }
        Some(id)
    }
}
