use bevy::prelude::*;
use std::collections::HashMap;

use avatar_orchestrator::{FrameInput, Orchestrator, OrchestratorFrame};
use avatar_rig_core::JointId;

/// The orchestrator itself. Stored as a non-send resource because click
/// handlers are not required to be `Send`.
pub struct AvatarRuntime(pub Orchestrator);

/// Maps rig joints of the registered avatar to the entities they were
/// built from.
#[derive(Resource, Default, Debug)]
pub struct JointEntityIndex {
    pub root: Option<Entity>,
    pub joints: HashMap<JointId, Entity>,
    /// Local rotation of the root at registration; avatar yaw composes onto it.
    pub root_rest: Quat,
}

impl JointEntityIndex {
    pub fn entity(&self, joint: JointId) -> Option<Entity> {
        self.joints.get(&joint).copied()
    }
}

/// Controller and head input for the next step. Hosts overwrite it each
/// frame; it is consumed by the step.
#[derive(Resource, Default, Debug)]
pub struct PendingFrameInput(pub FrameInput);

/// The most recent frame produced by the runtime.
#[derive(Resource, Default, Debug)]
pub struct LastFrame(pub Option<OrchestratorFrame>);
