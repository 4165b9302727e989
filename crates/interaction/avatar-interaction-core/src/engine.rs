//! Interaction engine: owns input, player, interactables, drags and hover.
//!
//! Per tick the host calls, in order:
//! 1. [`InteractionEngine::poll`]: read controllers, end drags of hands that
//!    went away (also clears the previous tick's events and reports those
//!    raised by host calls since then)
//! 2. [`InteractionEngine::locomote`]: stick movement of the player rig
//! 3. [`InteractionEngine::update_interactions`]: select edges, drag updates,
//!    then the hover pass

use glam::Vec3;
use log::debug;

use crate::config::InteractionConfig;
use crate::drag::{DragManager, DragSession};
use crate::events::{DragEndCause, InteractionEvent};
use crate::ids::{DragTarget, GrabbableId, PanelId};
use crate::panel::Panel;
use crate::hover::HoverTracker;
use crate::input::{Handedness, InputPoller, InputSourceFrame, PollReport};
use crate::locomotion::{locomotion_delta, LocomotionDelta, PlayerPose};
use crate::raycast::{hit_ui, resolve_select, SelectOutcome};
use crate::registry::{Grabbable, InteractableRegistry};

#[derive(Debug)]
pub struct InteractionEngine {
    cfg: InteractionConfig,
    poller: InputPoller,
    player: PlayerPose,
    registry: InteractableRegistry,
    drags: DragManager,
    hover: HoverTracker,
    /// Hand that most recently issued select-start.
    acting_hand: Handedness,
    events: Vec<InteractionEvent>,
    /// Raised between ticks; delivered by the next poll.
    deferred: Vec<InteractionEvent>,
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionEngine {
    pub fn new(cfg: InteractionConfig) -> Self {
        Self {
            cfg,
            poller: InputPoller::new(),
            player: PlayerPose::default(),
            registry: InteractableRegistry::new(),
            drags: DragManager::new(),
            hover: HoverTracker::default(),
            acting_hand: Handedness::Right,
            events: Vec::new(),
            deferred: Vec::new(),
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.cfg
    }

    pub fn player(&self) -> &PlayerPose {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerPose {
        &mut self.player
    }

    pub fn registry(&self) -> &InteractableRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut InteractableRegistry {
        &mut self.registry
    }

    pub fn poller(&self) -> &InputPoller {
        &self.poller
    }

    pub fn drags(&self) -> &DragManager {
        &self.drags
    }

    pub fn hover(&self) -> &HoverTracker {
        &self.hover
    }

    #[inline]
    pub fn acting_hand(&self) -> Handedness {
        self.acting_hand
    }

    /// Events raised since the last [`poll`](Self::poll).
    pub fn events(&self) -> &[InteractionEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pin or unpin a panel. Pinning ends a drag that is moving it. Returns
    /// `false` for unknown panels.
    pub fn set_panel_pinned(&mut self, id: PanelId, pinned: bool) -> bool {
        if !self.registry.set_pinned(id, pinned) {
            return false;
        }
        if pinned {
            self.end_drag_on(DragTarget::Panel(id), DragEndCause::Pinned);
        }
        true
    }

    pub fn remove_panel(&mut self, id: PanelId) -> Option<Panel> {
        let panel = self.registry.remove_panel(id)?;
        self.end_drag_on(DragTarget::Panel(id), DragEndCause::Removed);
        if self.hover.current().is_some_and(|h| h.panel == id) {
            self.hover.clear(&mut self.deferred);
        }
        Some(panel)
    }

    pub fn remove_grabbable(&mut self, id: GrabbableId) -> Option<Grabbable> {
        let grabbable = self.registry.remove_grabbable(id)?;
        self.end_drag_on(DragTarget::Grabbable(id), DragEndCause::Removed);
        Some(grabbable)
    }

    fn end_drag_on(&mut self, target: DragTarget, cause: DragEndCause) {
        if let Some(session) = self.drags.end_target(target) {
            self.deferred.push(InteractionEvent::DragEnded {
                hand: session.hand,
                target,
                cause,
            });
        }
    }

    pub fn poll(&mut self, sources: &[InputSourceFrame]) -> PollReport {
        self.events.clear();
        self.events.append(&mut self.deferred);
        let report = self.poller.poll(sources);
        for hand in &report.connected {
            self.events
                .push(InteractionEvent::ControllerConnected { hand: *hand });
        }
        for hand in &report.disconnected {
            if let Some(session) = self.drags.end(*hand) {
                debug!("{hand} hand disconnected mid-drag");
                self.events.push(InteractionEvent::DragEnded {
                    hand: *hand,
                    target: session.target,
                    cause: DragEndCause::Disconnected,
                });
            }
            self.events
                .push(InteractionEvent::ControllerDisconnected { hand: *hand });
        }
        report
    }

    /// Apply stick locomotion. `head_forward` is the viewer's world-space
    /// forward vector, if known.
    pub fn locomote(&mut self, head_forward: Option<Vec3>, dt: f32) -> LocomotionDelta {
        let stick = |hand| self.poller.get(hand).map(|c| c.stick());
        let delta = locomotion_delta(
            &self.cfg.locomotion,
            &self.player,
            head_forward,
            stick(Handedness::Left),
            stick(Handedness::Right),
            dt,
        );
        self.player.apply(&delta);
        delta
    }

    /// Select edges, drag updates and hover for this tick. `viewer` is the
    /// world-space head position panels are kept in range of and aimed at.
    pub fn update_interactions(&mut self, viewer: Vec3) {
        for hand in Handedness::BOTH {
            let ended = self.poller.get(hand).is_some_and(|c| c.select_ended());
            if ended {
                if let Some(session) = self.drags.end(hand) {
                    self.events.push(InteractionEvent::DragEnded {
                        hand,
                        target: session.target,
                        cause: DragEndCause::Released,
                    });
                }
            }
        }

        for hand in Handedness::BOTH {
            let Some(controller) = self.poller.get(hand) else {
                continue;
            };
            if !controller.select_started() {
                continue;
            }
            self.acting_hand = hand;
            let controller_x = controller.pose.position.x;
            let ray = controller.ray();
            let session = match resolve_select(&ray, &self.registry, self.cfg.raycast.max_distance) {
                SelectOutcome::Click {
                    panel,
                    key,
                    payload,
                } => {
                    debug!("{hand} hand clicked '{key}'");
                    self.events.push(InteractionEvent::Click {
                        panel,
                        key,
                        payload,
                    });
                    None
                }
                SelectOutcome::BeginPanelMove(hit) => {
                    self.registry.panel(hit.panel).map(|panel| {
                        DragSession::panel_move(
                            hand,
                            hit.panel,
                            panel.placement.position,
                            hit.point,
                            hit.distance,
                            viewer,
                        )
                    })
                }
                SelectOutcome::BeginRotate(hit) => Some(DragSession::avatar_rotate(
                    hand,
                    hit.grabbable,
                    controller_x,
                )),
                SelectOutcome::Miss => None,
            };
            if let Some(session) = session {
                let target = session.target;
                match self.drags.begin(session) {
                    Ok(()) => self
                        .events
                        .push(InteractionEvent::DragStarted { hand, target }),
                    Err(reason) => self.events.push(InteractionEvent::DragRejected {
                        hand,
                        target,
                        reason,
                    }),
                }
            }
        }

        self.drags
            .update(&self.poller, &mut self.registry, viewer, &self.cfg.drag);

        self.update_hover();
    }

    fn update_hover(&mut self) {
        if self.drags.is_active() {
            return;
        }
        let hover_hand = self.acting_hand.other();
        match self.poller.get(hover_hand) {
            Some(controller) => {
                let hit = hit_ui(
                    &controller.ray(),
                    &self.registry,
                    self.cfg.raycast.max_distance,
                );
                self.hover.update(hit.as_ref(), &mut self.events);
            }
            None => self.hover.clear(&mut self.events),
        }
    }
}
