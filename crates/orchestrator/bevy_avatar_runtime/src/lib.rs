//! Bevy integration for the avatar runtime.
//!
//! Add [`AvatarRuntimePlugin`], spawn a hierarchy of named entities with
//! `Transform`s under an [`AvatarRoot`], and the plugin registers it, steps
//! the orchestrator every `Update` and writes the procedural pose back.

use bevy::prelude::*;

pub mod components;
pub mod resources;
pub mod systems;

pub use components::AvatarRoot;
pub use resources::{AvatarRuntime, JointEntityIndex, LastFrame, PendingFrameInput};

use avatar_orchestrator::{Orchestrator, OrchestratorConfig};

#[derive(Default)]
pub struct AvatarRuntimePlugin {
    pub config: OrchestratorConfig,
}

impl Plugin for AvatarRuntimePlugin {
    fn build(&self, app: &mut App) {
        app.insert_non_send_resource(AvatarRuntime(Orchestrator::new(self.config.clone())))
            .init_resource::<JointEntityIndex>()
            .init_resource::<PendingFrameInput>()
            .init_resource::<LastFrame>()
            .add_systems(
                Update,
                (
                    systems::register_avatar_system,
                    systems::step_runtime_system,
                    systems::apply_frame_system,
                )
                    .chain(),
            );
    }
}
