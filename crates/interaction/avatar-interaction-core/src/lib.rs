//! Spatial interaction for VR avatar scenes.
//!
//! Turns tracked controller poses into player locomotion, raycast
//! hit-testing against UI panels and grabbable objects, and drag sessions
//! (avatar spin, panel move). Engine-agnostic: hosts feed input frames and
//! read back the player pose, panel placements and events.

pub mod config;
pub mod drag;
pub mod engine;
pub mod events;
pub mod hover;
pub mod ids;
pub mod input;
pub mod locomotion;
pub mod panel;
pub mod ray;
pub mod raycast;
pub mod registry;

pub use config::{DragConfig, InteractionConfig, LocomotionConfig, RaycastConfig};
pub use drag::{clamp_panel_distance, rotate_step, DragKind, DragManager, DragRejected, DragSession};
pub use engine::InteractionEngine;
pub use events::{DragEndCause, InteractionEvent};
pub use hover::{HoverTarget, HoverTracker};
pub use ids::{DragTarget, GrabbableId, PanelId};
pub use input::{
    ControllerState, Handedness, InputPoller, InputSourceFrame, PollReport, Pose, SELECT_BUTTON,
};
pub use locomotion::{deadzone, locomotion_delta, LocomotionDelta, PlayerPose};
pub use panel::{face_viewer, Panel, PanelPlacement, RegionRole, UiRegion};
pub use ray::{ray_rect, ray_sphere, Ray, RectHit};
pub use raycast::{hit_ui, hit_world, resolve_select, SelectOutcome, UiHit, WorldHit};
pub use registry::{Grabbable, InteractableRegistry};

pub use glam::{Quat, Vec2, Vec3};
