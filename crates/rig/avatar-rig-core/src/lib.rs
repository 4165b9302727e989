//! Avatar Rig Core
//!
//! Shared skeletal data model for the avatar runtime: an arena-backed joint
//! hierarchy, heuristic resolution of canonical joint roles, and the rest-pose
//! store procedural animation composes onto.

pub mod config;
pub mod error;
pub mod rest_pose;
pub mod rig;
pub mod roles;

pub use config::RigConfig;
pub use error::RigError;
pub use rest_pose::{lower_arms, JointRest, RestPose};
pub use rig::{Joint, JointId, Rig, RigDesc, Transform};
pub use roles::{resolve_roles, JointRole, RoleMap, RolePatterns};

pub use glam::{Quat, Vec2, Vec3};
