//! Procedural driver: data ownership and the per-tick update.
//!
//! The driver never owns the rig. It owns everything derived from it at
//! registration time (role map, rest pose, per-joint gaze smoothing) and
//! writes one final local transform per tracked joint each tick.
//!
//! Tick order:
//! 1. advance the mode clock (may emit an expiry event)
//! 2. restore every tracked joint to its rest pose
//! 3. stop here when the avatar plays baked clips and hybrid is off
//! 4. breathing, gaze, then mood overlay offsets are accumulated
//! 5. offsets compose onto rest and are written back to the rig

use avatar_rig_core::{JointId, JointRole, RestPose, Rig, RigConfig, RoleMap};
use glam::{Quat, Vec2, Vec3};
use hashbrown::HashMap;
use log::{debug, warn};

use crate::config::{clamp_dt, ProceduralConfig};
use crate::damping::GazeSmoothing;
use crate::mode::{AnimationMode, ModeError, ModeMachine, ModeTransition};
use crate::offsets::OffsetAccumulator;
use crate::outputs::{AnimationEvent, JointWrite, Outputs};
use crate::overlay::Channel;

#[derive(Debug)]
pub struct ProceduralDriver {
    cfg: ProceduralConfig,
    rig_cfg: RigConfig,

    // Derived from the registered rig
    roles: RoleMap,
    rest: RestPose,
    has_baked_clips: bool,
    registered: bool,

    // Runtime state
    mode: ModeMachine,
    pointer: Vec2,
    hybrid: bool,
    smoothing: HashMap<JointId, GazeSmoothing>,

    // Per-tick scratch and outputs
    acc: OffsetAccumulator,
    outputs: Outputs,
    pending_events: Vec<AnimationEvent>,
}

impl Default for ProceduralDriver {
    fn default() -> Self {
        Self::new(ProceduralConfig::default(), RigConfig::default())
    }
}

impl ProceduralDriver {
    pub fn new(cfg: ProceduralConfig, rig_cfg: RigConfig) -> Self {
        let hybrid = cfg.hybrid;
        Self {
            cfg,
            rig_cfg,
            roles: RoleMap::default(),
            rest: RestPose::default(),
            has_baked_clips: false,
            registered: false,
            mode: ModeMachine::new(),
            pointer: Vec2::ZERO,
            hybrid,
            smoothing: HashMap::new(),
            acc: OffsetAccumulator::new(),
            outputs: Outputs::default(),
            pending_events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ProceduralConfig {
        &self.cfg
    }

    /// Bind the driver to `rig`, replacing any previous registration.
    ///
    /// Clip-less rigs get their upper arms lowered out of the T-pose before
    /// the rest pose is captured, so the corrected pose is what every later
    /// restore returns to.
    pub fn register(&mut self, rig: &mut Rig, has_baked_clips: bool) {
        let roles = avatar_rig_core::resolve_roles(rig, &self.rig_cfg.role_patterns);
        let correction = (!has_baked_clips).then_some(self.rig_cfg.arm_rest_angle);
        let rest = RestPose::register(rig, &roles, correction);

        self.smoothing.clear();
        for joint in roles.joints() {
            self.smoothing.insert(joint, GazeSmoothing::default());
        }
        self.acc.clear();

        debug!(
            "registered avatar: {} joints, {} roles, baked clips: {has_baked_clips}",
            rig.len(),
            roles.len()
        );
        self.pending_events.push(AnimationEvent::AvatarRegistered {
            joints: rig.len(),
            roles: roles.iter().map(|(r, _)| r).collect(),
            rest_corrected: correction.is_some(),
        });

        self.roles = roles;
        self.rest = rest;
        self.has_baked_clips = has_baked_clips;
        self.registered = true;
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    #[inline]
    pub fn has_baked_clips(&self) -> bool {
        self.has_baked_clips
    }

    /// Activate `mode`; `None` uses the configured default duration.
    pub fn set_mode(&mut self, mode: AnimationMode, duration_ms: Option<f64>) {
        let duration = duration_ms.unwrap_or(self.cfg.default_mode_duration_ms);
        let transition = self.mode.set(mode, duration);
        self.push_transition(transition);
    }

    pub fn set_mode_by_name(&mut self, name: &str, duration_ms: Option<f64>) -> Result<(), ModeError> {
        let mode = name.parse::<AnimationMode>()?;
        self.set_mode(mode, duration_ms);
        Ok(())
    }

    /// Normalised pointer position in `[-1, 1]`. Non-finite input is ignored.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        if !(x.is_finite() && y.is_finite()) {
            warn!("ignoring non-finite pointer ({x}, {y})");
            return;
        }
        self.pointer = Vec2::new(x, y);
    }

    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn set_hybrid(&mut self, hybrid: bool) {
        self.hybrid = hybrid;
    }

    #[inline]
    pub fn hybrid(&self) -> bool {
        self.hybrid
    }

    #[inline]
    pub fn mode(&self) -> AnimationMode {
        self.mode.active()
    }

    #[inline]
    pub fn mode_machine(&self) -> &ModeMachine {
        &self.mode
    }

    #[inline]
    pub fn roles(&self) -> &RoleMap {
        &self.roles
    }

    #[inline]
    pub fn rest_pose(&self) -> &RestPose {
        &self.rest
    }

    /// Smoothed gaze state of `joint`, if it is tracked.
    pub fn gaze(&self, joint: JointId) -> Option<GazeSmoothing> {
        self.smoothing.get(&joint).copied()
    }

    /// Advance only the mode clock. Used when no rig is registered; the
    /// full [`update`](Self::update) calls this itself.
    pub fn tick_clock(&mut self, elapsed: f64) -> &Outputs {
        self.begin_frame(elapsed);
        &self.outputs
    }

    /// Run one procedural tick against `rig` at `elapsed` seconds.
    pub fn update(&mut self, rig: &mut Rig, elapsed: f64, dt: f32) -> &Outputs {
        self.begin_frame(elapsed);
        if !self.registered {
            return &self.outputs;
        }
        let dt = clamp_dt(dt, self.cfg.max_dt);
        let tracked = self.roles.joints();

        // 1) Restore to rest
        for joint in &tracked {
            self.rest.restore(rig, *joint);
        }

        // 2) Authored motion owns the skeleton
        if self.has_baked_clips && !self.hybrid {
            return &self.outputs;
        }

        // 3) Accumulate offsets
        self.acc.clear();
        self.apply_breathing(elapsed);
        self.apply_gaze(dt);
        self.apply_overlay(elapsed);

        // 4) Compose and write
        for joint in tracked {
            let Some(rest) = self.rest.get(joint) else {
                continue;
            };
            let (translation, rotation) = self.acc.compose(joint, rest);
            let Some(target) = rig.joint_mut(joint) else {
                continue;
            };
            target.local.translation = translation;
            target.local.rotation = rotation;
            self.outputs.push_write(JointWrite {
                joint,
                name: target.name.clone(),
                translation,
                rotation,
            });
        }
        &self.outputs
    }

    /// Outputs of the most recent tick.
    #[inline]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    fn begin_frame(&mut self, elapsed: f64) {
        self.outputs.clear();
        self.outputs.events.append(&mut self.pending_events);
        if let Some(transition) = self.mode.tick(elapsed) {
            self.push_transition(transition);
            self.outputs.events.append(&mut self.pending_events);
        }
    }

    fn push_transition(&mut self, t: ModeTransition) {
        self.pending_events.push(AnimationEvent::ModeChanged {
            from: t.from,
            to: t.to,
            cause: t.cause,
        });
    }

    fn apply_breathing(&mut self, elapsed: f64) {
        let b = &self.cfg.breathing;
        let phase = b.rate as f64 * elapsed;
        if let Some(spine) = self.roles.get(JointRole::Spine) {
            let angle = b.spine_amplitude * phase.sin() as f32;
            self.acc.rotate(spine, Quat::from_rotation_x(angle));
        }
        if let Some(chest) = self.roles.get(JointRole::Chest) {
            let angle = b.chest_amplitude * (phase + b.chest_phase as f64).sin() as f32;
            self.acc.rotate(chest, Quat::from_rotation_x(angle));
        }
    }

    fn apply_gaze(&mut self, dt: f32) {
        let Some(head) = self.roles.get(JointRole::Head) else {
            return;
        };
        let g = &self.cfg.gaze;
        let target_yaw = (self.pointer.x * g.yaw_gain).clamp(-g.yaw_limit, g.yaw_limit);
        let target_pitch = (self.pointer.y * g.pitch_gain).clamp(-g.pitch_limit, g.pitch_limit);
        let state = self.smoothing.entry(head).or_default();
        state.step(target_yaw, target_pitch, g.damping, dt);
        let offset = Quat::from_rotation_y(state.yaw) * Quat::from_rotation_x(-state.pitch);
        self.acc.rotate(head, offset);
    }

    fn apply_overlay(&mut self, elapsed: f64) {
        for term in self.cfg.overlays.terms(self.mode.active()) {
            let Some(joint) = self.roles.get(term.role) else {
                continue;
            };
            let value = term.sample(elapsed);
            match term.channel {
                Channel::Pitch => self.acc.rotate(joint, Quat::from_rotation_x(value)),
                Channel::Yaw => self.acc.rotate(joint, Quat::from_rotation_y(value)),
                Channel::Roll => self.acc.rotate(joint, Quat::from_rotation_z(value)),
                Channel::Lift => self.acc.translate(joint, Vec3::Y * value),
            }
        }
    }
}
