//! Semantic events raised by the interaction engine during one tick.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::drag::DragRejected;
use crate::ids::{DragTarget, PanelId};
use crate::input::Handedness;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragEndCause {
    Released,
    Disconnected,
    /// The dragged panel was pinned by the host.
    Pinned,
    /// The target left the registry.
    Removed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum InteractionEvent {
    ControllerConnected {
        hand: Handedness,
    },
    ControllerDisconnected {
        hand: Handedness,
    },
    Click {
        panel: PanelId,
        key: String,
        payload: Value,
    },
    HoverEnter {
        panel: PanelId,
        key: String,
    },
    HoverExit {
        panel: PanelId,
        key: String,
    },
    DragStarted {
        hand: Handedness,
        target: DragTarget,
    },
    DragEnded {
        hand: Handedness,
        target: DragTarget,
        cause: DragEndCause,
    },
    DragRejected {
        hand: Handedness,
        target: DragTarget,
        reason: DragRejected,
    },
}
