//! Per-tick controller polling with edge detection.
//!
//! The host hands over the raw input-source list every frame. A hand that is
//! missing from the list, or listed without a pose, counts as disconnected.
//! Button edges are computed against the previous poll of the same hand; the
//! tick a controller connects only seeds the history, so a trigger already
//! held at connect time never reads as "just pressed".

use glam::{Quat, Vec2, Vec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ray::Ray;

/// Button index of the primary trigger.
pub const SELECT_BUTTON: usize = 0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const BOTH: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    #[inline]
    pub fn other(self) -> Self {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            Handedness::Left => 0,
            Handedness::Right => 1,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        })
    }
}

/// World-space 6-DOF pose. Local forward is -Z.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    #[serde(default = "identity")]
    pub orientation: Quat,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn ray(&self) -> Ray {
        Ray::new(self.position, self.forward())
    }

    fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

/// One entry of the host's input-source list for this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputSourceFrame {
    pub handedness: Handedness,
    #[serde(default)]
    pub pose: Option<Pose>,
    #[serde(default)]
    pub axes: Vec<f32>,
    #[serde(default)]
    pub buttons: Vec<bool>,
}

impl InputSourceFrame {
    pub fn new(handedness: Handedness, pose: Pose) -> Self {
        Self {
            handedness,
            pose: Some(pose),
            axes: Vec::new(),
            buttons: Vec::new(),
        }
    }

    pub fn with_stick(mut self, x: f32, y: f32) -> Self {
        self.axes = vec![0.0, 0.0, x, y];
        self
    }

    pub fn with_select(mut self, pressed: bool) -> Self {
        if self.buttons.is_empty() {
            self.buttons.push(pressed);
        } else {
            self.buttons[SELECT_BUTTON] = pressed;
        }
        self
    }
}

/// Snapshot of one connected hand after the latest poll.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerState {
    pub handedness: Handedness,
    pub pose: Pose,
    pub axes: [f32; 4],
    axis_count: usize,
    buttons: Vec<bool>,
    previous: Vec<bool>,
}

impl ControllerState {
    fn connect(frame: &InputSourceFrame, pose: Pose) -> Self {
        let mut state = Self {
            handedness: frame.handedness,
            pose,
            axes: [0.0; 4],
            axis_count: 0,
            buttons: Vec::new(),
            previous: Vec::new(),
        };
        state.read(frame, pose);
        state.previous = state.buttons.clone();
        state
    }

    fn read(&mut self, frame: &InputSourceFrame, pose: Pose) {
        self.pose = pose;
        self.axis_count = frame.axes.len().min(4);
        self.axes = [0.0; 4];
        for (slot, v) in self.axes.iter_mut().zip(frame.axes.iter()) {
            *slot = if v.is_finite() { *v } else { 0.0 };
        }
        std::mem::swap(&mut self.previous, &mut self.buttons);
        self.buttons.clear();
        self.buttons.extend_from_slice(&frame.buttons);
    }

    #[inline]
    pub fn pressed(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }

    #[inline]
    fn was_pressed(&self, button: usize) -> bool {
        self.previous.get(button).copied().unwrap_or(false)
    }

    /// Released on the previous poll, pressed on this one.
    #[inline]
    pub fn just_pressed(&self, button: usize) -> bool {
        self.pressed(button) && !self.was_pressed(button)
    }

    #[inline]
    pub fn just_released(&self, button: usize) -> bool {
        !self.pressed(button) && self.was_pressed(button)
    }

    #[inline]
    pub fn select_started(&self) -> bool {
        self.just_pressed(SELECT_BUTTON)
    }

    #[inline]
    pub fn select_ended(&self) -> bool {
        self.just_released(SELECT_BUTTON)
    }

    /// Thumbstick: axes (2, 3) on four-axis gamepads, else (0, 1).
    pub fn stick(&self) -> Vec2 {
        if self.axis_count >= 4 {
            Vec2::new(self.axes[2], self.axes[3])
        } else {
            Vec2::new(self.axes[0], self.axes[1])
        }
    }

    pub fn ray(&self) -> Ray {
        self.pose.ray()
    }
}

/// Connect and disconnect edges observed by one poll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub connected: Vec<Handedness>,
    pub disconnected: Vec<Handedness>,
}

#[derive(Debug, Default)]
pub struct InputPoller {
    hands: [Option<ControllerState>; 2],
}

impl InputPoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, sources: &[InputSourceFrame]) -> PollReport {
        let mut report = PollReport::default();
        let mut seen = [false; 2];

        for frame in sources {
            let slot = frame.handedness.slot();
            if seen[slot] {
                warn!("duplicate {} input source ignored", frame.handedness);
                continue;
            }
            let Some(pose) = frame.pose.filter(Pose::is_finite) else {
                continue;
            };
            seen[slot] = true;
            if let Some(state) = self.hands[slot].as_mut() {
                state.read(frame, pose);
            } else {
                debug!("{} controller connected", frame.handedness);
                self.hands[slot] = Some(ControllerState::connect(frame, pose));
                report.connected.push(frame.handedness);
            }
        }

        for hand in Handedness::BOTH {
            if !seen[hand.slot()] && self.hands[hand.slot()].take().is_some() {
                debug!("{hand} controller disconnected");
                report.disconnected.push(hand);
            }
        }
        report
    }

    #[inline]
    pub fn get(&self, hand: Handedness) -> Option<&ControllerState> {
        self.hands[hand.slot()].as_ref()
    }

    #[inline]
    pub fn is_connected(&self, hand: Handedness) -> bool {
        self.get(hand).is_some()
    }
}
