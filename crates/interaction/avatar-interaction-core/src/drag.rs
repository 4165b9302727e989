//! Drag sessions: avatar spin and panel repositioning.
//!
//! At most one session per hand and one per target. A session lives from the
//! select-start that created it until select-end on its hand or that hand's
//! disconnect; whatever it moved stays where it was last put.

use glam::Vec3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DragConfig;
use crate::ids::{DragTarget, GrabbableId, PanelId};
use crate::input::{Handedness, InputPoller};
use crate::panel::face_viewer;
use crate::registry::InteractableRegistry;

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragRejected {
    #[error("{hand} hand already owns a drag session")]
    HandBusy { hand: Handedness },
    #[error("{target:?} is already being dragged by the {owner} hand")]
    TargetOwned {
        target: DragTarget,
        owner: Handedness,
    },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DragKind {
    AvatarRotate {
        /// Controller world X at the previous tick.
        anchor_x: f32,
    },
    PanelMove {
        /// Panel position minus the grab point.
        offset: Vec3,
        /// Distance along the controller ray recorded at grab time.
        hit_distance: f32,
        /// Last viewer-to-panel direction, reused when the new one degenerates.
        last_direction: Vec3,
    },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragSession {
    pub hand: Handedness,
    pub target: DragTarget,
    pub kind: DragKind,
}

impl DragSession {
    pub fn avatar_rotate(hand: Handedness, grabbable: GrabbableId, controller_x: f32) -> Self {
        Self {
            hand,
            target: DragTarget::Grabbable(grabbable),
            kind: DragKind::AvatarRotate {
                anchor_x: controller_x,
            },
        }
    }

    pub fn panel_move(
        hand: Handedness,
        panel: PanelId,
        panel_position: Vec3,
        hit_point: Vec3,
        hit_distance: f32,
        viewer: Vec3,
    ) -> Self {
        Self {
            hand,
            target: DragTarget::Panel(panel),
            kind: DragKind::PanelMove {
                offset: panel_position - hit_point,
                hit_distance,
                last_direction: (panel_position - viewer)
                    .try_normalize()
                    .unwrap_or(Vec3::NEG_Z),
            },
        }
    }
}

/// Yaw change for one avatar-rotate tick; returns `(yaw_delta, new_anchor)`.
#[inline]
pub fn rotate_step(anchor_x: f32, controller_x: f32, gain: f32) -> (f32, f32) {
    ((controller_x - anchor_x) * gain, controller_x)
}

/// Keep `target` within `[min, max]` of `viewer` by sliding it along the
/// viewer-to-target line. Returns the realized position and the direction
/// used; a degenerate direction is replaced by `fallback`.
pub fn clamp_panel_distance(
    viewer: Vec3,
    target: Vec3,
    min: f32,
    max: f32,
    fallback: Vec3,
) -> (Vec3, Vec3) {
    let offset = target - viewer;
    let distance = offset.length();
    let Some(direction) = offset.try_normalize() else {
        return (viewer + fallback * min, fallback);
    };
    if (min..=max).contains(&distance) {
        return (target, direction);
    }
    (viewer + direction * distance.clamp(min, max), direction)
}

#[derive(Debug, Default)]
pub struct DragManager {
    sessions: Vec<DragSession>,
}

impl DragManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `session` unless its hand or its target is already busy. A
    /// rejection leaves existing sessions untouched.
    pub fn begin(&mut self, session: DragSession) -> Result<(), DragRejected> {
        if self.session(session.hand).is_some() {
            warn!("rejected drag on {:?}: {} hand busy", session.target, session.hand);
            return Err(DragRejected::HandBusy { hand: session.hand });
        }
        if let Some(owner) = self.owner_of(session.target) {
            warn!("rejected drag on {:?}: owned by {owner} hand", session.target);
            return Err(DragRejected::TargetOwned {
                target: session.target,
                owner,
            });
        }
        debug!("drag started: {} hand -> {:?}", session.hand, session.target);
        self.sessions.push(session);
        Ok(())
    }

    pub fn end(&mut self, hand: Handedness) -> Option<DragSession> {
        let idx = self.sessions.iter().position(|s| s.hand == hand)?;
        let session = self.sessions.remove(idx);
        debug!("drag ended: {hand} hand released {:?}", session.target);
        Some(session)
    }

    /// End whichever session owns `target`.
    pub fn end_target(&mut self, target: DragTarget) -> Option<DragSession> {
        let idx = self.sessions.iter().position(|s| s.target == target)?;
        let session = self.sessions.remove(idx);
        debug!("drag on {target:?} ended by the host ({} hand)", session.hand);
        Some(session)
    }

    #[inline]
    pub fn session(&self, hand: Handedness) -> Option<&DragSession> {
        self.sessions.iter().find(|s| s.hand == hand)
    }

    pub fn owner_of(&self, target: DragTarget) -> Option<Handedness> {
        self.sessions
            .iter()
            .find(|s| s.target == target)
            .map(|s| s.hand)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.sessions.is_empty()
    }

    pub fn sessions(&self) -> &[DragSession] {
        &self.sessions
    }

    /// Advance every session from its hand's current pose. Sessions whose hand
    /// is not connected are left alone; the poll that saw the disconnect ends
    /// them.
    pub fn update(
        &mut self,
        poller: &InputPoller,
        registry: &mut InteractableRegistry,
        viewer: Vec3,
        cfg: &DragConfig,
    ) {
        for session in &mut self.sessions {
            let Some(controller) = poller.get(session.hand) else {
                continue;
            };
            match (&mut session.kind, session.target) {
                (DragKind::AvatarRotate { anchor_x }, DragTarget::Grabbable(id)) => {
                    let (delta, anchor) =
                        rotate_step(*anchor_x, controller.pose.position.x, cfg.rotate_gain);
                    *anchor_x = anchor;
                    if let Some(g) = registry.grabbable_mut(id).filter(|g| g.rotatable) {
                        g.yaw += delta;
                    }
                }
                (
                    DragKind::PanelMove {
                        offset,
                        hit_distance,
                        last_direction,
                    },
                    DragTarget::Panel(id),
                ) => {
                    let Some(panel) = registry.panel_mut(id) else {
                        continue;
                    };
                    if panel.placement.pinned {
                        continue;
                    }
                    let ray_hit = controller.ray().at(*hit_distance);
                    let (position, direction) = clamp_panel_distance(
                        viewer,
                        ray_hit + *offset,
                        cfg.min_panel_distance,
                        cfg.max_panel_distance,
                        *last_direction,
                    );
                    *last_direction = direction;
                    let placement = &mut panel.placement;
                    placement.position = position;
                    placement.orientation = face_viewer(position, viewer, placement.orientation);
                }
                _ => {}
            }
        }
    }
}
