use bevy::prelude::*;

/// Marks the root entity of an avatar hierarchy. The hierarchy is registered
/// with the runtime the frame this component is added.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AvatarRoot {
    /// The host plays authored clips on this avatar; procedural writes are
    /// suppressed unless hybrid mode is on.
    pub has_baked_clips: bool,
}
