//! Canonical joint roles and heuristic role resolution.
//!
//! Rigs coming out of different pipelines (VRM, Mixamo, Blender metarig,
//! three-vrm normalized bones) name their bones differently. Resolution is a
//! pure function of the hierarchy and an injectable [`RolePatterns`] table:
//!
//! - roles are resolved one at a time in [`JointRole::RESOLVE_ORDER`];
//! - for a role, its patterns are tried in priority order, and for each pattern
//!   the hierarchy is walked depth-first; the first joint whose lowercase name
//!   contains the pattern (and is not already claimed) wins;
//! - a pattern written `=name` must equal the whole lowercase name instead;
//! - `chest` falls back to the `spine` joint when nothing matches.
//!
//! A role that matches nothing is simply absent from the [`RoleMap`].

use hashbrown::HashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rig::{JointId, Rig};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointRole {
    Head,
    Neck,
    Spine,
    Chest,
    Hips,
    LeftUpperArm,
    RightUpperArm,
}

impl JointRole {
    pub const ALL: [JointRole; 7] = [
        JointRole::Head,
        JointRole::Neck,
        JointRole::Spine,
        JointRole::Chest,
        JointRole::Hips,
        JointRole::LeftUpperArm,
        JointRole::RightUpperArm,
    ];

    /// Specific roles claim joints before generic ones so that e.g. `chest`
    /// can take `Spine2` before `spine` settles on `Spine`.
    pub const RESOLVE_ORDER: [JointRole; 7] = [
        JointRole::Hips,
        JointRole::Chest,
        JointRole::Neck,
        JointRole::Head,
        JointRole::LeftUpperArm,
        JointRole::RightUpperArm,
        JointRole::Spine,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JointRole::Head => "head",
            JointRole::Neck => "neck",
            JointRole::Spine => "spine",
            JointRole::Chest => "chest",
            JointRole::Hips => "hips",
            JointRole::LeftUpperArm => "left_upper_arm",
            JointRole::RightUpperArm => "right_upper_arm",
        }
    }
}

impl fmt::Display for JointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority-ordered substring patterns per role. Patterns are compared
/// against lowercased joint names; they are lowercased on use as well. A
/// leading `=` turns a pattern into a whole-name match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePatterns {
    pub head: Vec<String>,
    pub neck: Vec<String>,
    pub spine: Vec<String>,
    pub chest: Vec<String>,
    pub hips: Vec<String>,
    pub left_upper_arm: Vec<String>,
    pub right_upper_arm: Vec<String>,
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

impl Default for RolePatterns {
    fn default() -> Self {
        Self {
            head: owned(&["head", "spine.006"]),
            neck: owned(&["neck", "spine.004"]),
            spine: owned(&["spine"]),
            chest: owned(&["chest", "spine2", "spine.003"]),
            // The metarig's root `spine` bone is its pelvis.
            hips: owned(&["hips", "pelvis", "hip", "=spine"]),
            left_upper_arm: owned(&[
                "leftupperarm",
                "left_upper_arm",
                "l_upperarm",
                "upperarm_l",
                "upper_arm.l",
                "upperarm.l",
                "leftarm",
            ]),
            right_upper_arm: owned(&[
                "rightupperarm",
                "right_upper_arm",
                "r_upperarm",
                "upperarm_r",
                "upper_arm.r",
                "upperarm.r",
                "rightarm",
            ]),
        }
    }
}

impl RolePatterns {
    pub fn patterns_for(&self, role: JointRole) -> &[String] {
        match role {
            JointRole::Head => &self.head,
            JointRole::Neck => &self.neck,
            JointRole::Spine => &self.spine,
            JointRole::Chest => &self.chest,
            JointRole::Hips => &self.hips,
            JointRole::LeftUpperArm => &self.left_upper_arm,
            JointRole::RightUpperArm => &self.right_upper_arm,
        }
    }
}

/// Best-effort role → joint assignment for one rig.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleMap {
    map: HashMap<JointRole, JointId>,
}

impl RoleMap {
    #[inline]
    pub fn get(&self, role: JointRole) -> Option<JointId> {
        self.map.get(&role).copied()
    }

    pub fn insert(&mut self, role: JointRole, joint: JointId) {
        self.map.insert(role, joint);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Roles in [`JointRole::ALL`] order with their joints.
    pub fn iter(&self) -> impl Iterator<Item = (JointRole, JointId)> + '_ {
        JointRole::ALL
            .iter()
            .filter_map(move |r| self.get(*r).map(|j| (*r, j)))
    }

    /// Distinct joints referenced by any role, in [`JointRole::ALL`] order.
    pub fn joints(&self) -> Vec<JointId> {
        let mut out: Vec<JointId> = Vec::with_capacity(self.map.len());
        for (_, joint) in self.iter() {
            if !out.contains(&joint) {
                out.push(joint);
            }
        }
        out
    }
}

fn name_matches(name: &str, pattern: &str) -> bool {
    match pattern.strip_prefix('=') {
        Some(exact) => name == exact,
        None => name.contains(pattern),
    }
}

/// Resolve canonical roles in `rig` using `patterns`.
pub fn resolve_roles(rig: &Rig, patterns: &RolePatterns) -> RoleMap {
    let lowered: Vec<(JointId, String)> = rig
        .depth_first()
        .filter_map(|id| rig.name(id).map(|n| (id, n.to_lowercase())))
        .collect();

    let mut roles = RoleMap::default();
    let mut claimed: Vec<JointId> = Vec::new();

    for role in JointRole::RESOLVE_ORDER {
        let found = patterns.patterns_for(role).iter().find_map(|pattern| {
            let pattern = pattern.to_lowercase();
            if pattern.trim_start_matches('=').is_empty() {
                return None;
            }
            lowered
                .iter()
                .find(|(id, name)| name_matches(name, &pattern) && !claimed.contains(id))
                .map(|(id, _)| *id)
        });
        if let Some(joint) = found {
            claimed.push(joint);
            roles.insert(role, joint);
        }
    }

    if roles.get(JointRole::Chest).is_none() {
        if let Some(spine) = roles.get(JointRole::Spine) {
            roles.insert(JointRole::Chest, spine);
        }
    }

    if roles.is_empty() {
        warn!(
            "no joint roles resolved for rig '{}' ({} joints)",
            rig.name(rig.root()).unwrap_or_default(),
            rig.len()
        );
    } else {
        debug!(
            "resolved {} joint roles: {:?}",
            roles.len(),
            roles
                .iter()
                .map(|(r, j)| (r.as_str(), rig.name(j).unwrap_or_default()))
                .collect::<Vec<_>>()
        );
    }
    roles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::RigDesc;
    use glam::Vec3;

    fn leaf(name: &str) -> RigDesc {
        RigDesc::leaf(name, Vec3::new(0.0, 0.1, 0.0))
    }

    #[test]
    fn chest_falls_back_to_spine() {
        let desc = leaf("Armature").with_children(vec![
            leaf("Hips").with_children(vec![leaf("Spine").with_children(vec![leaf("Neck")])])
        ]);
        let rig = Rig::from_desc(&desc).unwrap();
        let roles = resolve_roles(&rig, &RolePatterns::default());
        assert_eq!(roles.get(JointRole::Chest), rig.find("Spine"));
        assert_eq!(roles.get(JointRole::Spine), rig.find("Spine"));
        assert_eq!(roles.get(JointRole::Head), None);
        // Shared joint is listed once.
        assert_eq!(roles.joints().len(), 3);
    }

    #[test]
    fn matching_is_case_insensitive_and_priority_ordered() {
        let desc = leaf("ROOT").with_children(vec![
            leaf("upper_arm.L"),
            leaf("LEFTUPPERARM"),
        ]);
        let rig = Rig::from_desc(&desc).unwrap();
        let roles = resolve_roles(&rig, &RolePatterns::default());
        // "leftupperarm" outranks "upper_arm.l" even though it comes later in the walk.
        assert_eq!(roles.get(JointRole::LeftUpperArm), rig.find("LEFTUPPERARM"));
        assert_eq!(roles.get(JointRole::RightUpperArm), None);
    }

    #[test]
    fn custom_table_is_honoured() {
        let desc = leaf("root").with_children(vec![leaf("Kopf")]);
        let rig = Rig::from_desc(&desc).unwrap();
        let patterns = RolePatterns {
            head: vec!["kopf".into()],
            ..RolePatterns::default()
        };
        let roles = resolve_roles(&rig, &patterns);
        assert_eq!(roles.get(JointRole::Head), rig.find("Kopf"));
    }

    #[test]
    fn exact_pattern_needs_the_whole_name() {
        let desc = leaf("root").with_children(vec![
            leaf("spine.001").with_children(vec![leaf("spine")]),
        ]);
        let rig = Rig::from_desc(&desc).unwrap();
        let roles = resolve_roles(&rig, &RolePatterns::default());
        assert_eq!(roles.get(JointRole::Hips), rig.find("spine"));
        assert_eq!(roles.get(JointRole::Spine), rig.find("spine.001"));

        let patterns = RolePatterns {
            head: vec!["=".into(), "=hea".into()],
            ..RolePatterns::default()
        };
        let rig = Rig::from_desc(&leaf("root").with_children(vec![leaf("Head")])).unwrap();
        assert_eq!(resolve_roles(&rig, &patterns).get(JointRole::Head), None);
    }

    #[test]
    fn empty_rig_resolves_nothing() {
        let rig = Rig::from_desc(&leaf("Mesh")).unwrap();
        assert!(resolve_roles(&rig, &RolePatterns::default()).is_empty());
    }
}
