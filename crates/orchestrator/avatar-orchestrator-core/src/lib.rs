//! avatar-orchestrator
//!
//! Composition root for the avatar runtime. An [`Orchestrator`] owns the
//! loaded rig, the procedural animation driver and the interaction engine,
//! and steps them in a fixed order once per host frame. There is no global
//! state; hosts may run as many independent orchestrators as they like.

pub mod config;
pub mod diagnostics;
pub mod scheduler;

use std::fmt;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use avatar_animation_core::{AnimationEvent, AnimationMode, JointWrite, ProceduralDriver};
use avatar_interaction_core::{
    Grabbable, GrabbableId, InputSourceFrame, InteractionEngine, InteractionEvent, Panel, PanelId,
    PanelPlacement, PlayerPose, Pose,
};
use avatar_rig_core::{Rig, RigDesc};

pub use crate::config::{ConfigError, OrchestratorConfig};
pub use crate::diagnostics::DiagnosticsCfg;
pub use crate::scheduler::Phase;

/// Receives `(key, payload)` whenever a UI region is clicked.
pub trait ClickHandler {
    fn on_click(&mut self, key: &str, payload: &Value) -> Result<()>;
}

impl<F> ClickHandler for F
where
    F: FnMut(&str, &Value) -> Result<()>,
{
    fn on_click(&mut self, key: &str, payload: &Value) -> Result<()> {
        self(key, payload)
    }
}

/// Host input for one frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(default)]
    pub sources: Vec<InputSourceFrame>,
    /// Viewer head pose in world space, when tracked.
    #[serde(default)]
    pub head: Option<Pose>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "snake_case")]
pub enum FrameEvent {
    Animation(AnimationEvent),
    Interaction(InteractionEvent),
}

/// A click the handler rejected. The rest of the frame is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickFailure {
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelFrame {
    pub id: PanelId,
    pub placement: PanelPlacement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorFrame {
    pub epoch: u64,
    /// dt after clamping.
    pub dt: f32,
    /// Driver clock, seconds.
    pub elapsed: f64,
    pub mode: AnimationMode,
    /// Final local transforms of the joints written this frame.
    pub joint_writes: Vec<JointWrite>,
    pub player: PlayerPose,
    pub avatar_yaw: f32,
    pub panels: Vec<PanelFrame>,
    /// Animation events first, then interaction events, each in raise order.
    pub events: Vec<FrameEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub click_failures: Vec<ClickFailure>,
    pub timings_ms: IndexMap<String, f32>,
}

pub struct Orchestrator {
    cfg: OrchestratorConfig,
    pub epoch: u64,
    elapsed: f64,
    rig: Option<Rig>,
    /// Grabbable proxy of the registered avatar root.
    avatar: Option<GrabbableId>,
    driver: ProceduralDriver,
    interaction: InteractionEngine,
    click_handler: Option<Box<dyn ClickHandler>>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("epoch", &self.epoch)
            .field("elapsed", &self.elapsed)
            .field("rig", &self.rig.as_ref().map(Rig::len))
            .field("avatar", &self.avatar)
            .field("mode", &self.driver.mode())
            .field("click_handler", &self.click_handler.is_some())
            .finish()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

impl Orchestrator {
    /// The top-level `max_dt` also bounds the procedural driver's own clamp.
    pub fn new(mut cfg: OrchestratorConfig) -> Self {
        cfg.procedural.max_dt = cfg.max_dt;
        let driver = ProceduralDriver::new(cfg.procedural.clone(), cfg.rig.clone());
        let interaction = InteractionEngine::new(cfg.interaction.clone());
        Self {
            cfg,
            epoch: 0,
            elapsed: 0.0,
            rig: None,
            avatar: None,
            driver,
            interaction,
            click_handler: None,
        }
    }

    /// Parse, validate and build.
    pub fn from_json_config(json: &str) -> Result<Self> {
        let cfg = OrchestratorConfig::from_json_str(json).context("loading orchestrator config")?;
        Ok(Self::new(cfg))
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.cfg
    }

    /// Replace the current avatar. Roles, rest pose and gaze state are
    /// rebuilt from `rig`; the grabbable proxy is re-fitted to its joints and
    /// a drag on the previous proxy ends with `DragEnded { cause: Removed }`.
    pub fn register_avatar(&mut self, mut rig: Rig, has_baked_clips: bool) {
        self.driver.register(&mut rig, has_baked_clips);

        let (min, max) = rig.joint_bounds();
        let center = (min + max) * 0.5;
        let radius = ((max - min).length() * 0.5).max(self.cfg.min_avatar_radius);
        if let Some(previous) = self.avatar.take() {
            self.interaction.remove_grabbable(previous);
        }
        let key = rig.name(rig.root()).unwrap_or("avatar").to_string();
        let proxy = Grabbable::new(key, center, radius);
        self.avatar = Some(self.interaction.registry_mut().add_grabbable(proxy));
        debug!("avatar proxy at {center:?} r={radius:.2}");
        self.rig = Some(rig);
    }

    /// Parse a [`RigDesc`] JSON document and register it.
    pub fn register_avatar_json(&mut self, json: &str, has_baked_clips: bool) -> Result<()> {
        let desc: RigDesc = serde_json::from_str(json).context("parsing rig JSON")?;
        let rig = Rig::from_desc(&desc).context("building rig")?;
        self.register_avatar(rig, has_baked_clips);
        Ok(())
    }

    pub fn rig(&self) -> Option<&Rig> {
        self.rig.as_ref()
    }

    pub fn driver(&self) -> &ProceduralDriver {
        &self.driver
    }

    pub fn interaction(&self) -> &InteractionEngine {
        &self.interaction
    }

    pub fn avatar(&self) -> Option<GrabbableId> {
        self.avatar
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Activate a mood by name. `None` uses the configured default duration.
    pub fn set_mode(&mut self, name: &str, duration_ms: Option<f64>) -> Result<()> {
        self.driver
            .set_mode_by_name(name, duration_ms)
            .with_context(|| format!("set_mode('{name}')"))
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.driver.set_pointer(x, y);
    }

    pub fn set_hybrid(&mut self, hybrid: bool) {
        self.driver.set_hybrid(hybrid);
    }

    pub fn add_panel(&mut self, panel: Panel) -> PanelId {
        self.interaction.registry_mut().add_panel(panel)
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.interaction.registry().panel(id)
    }

    /// Pinning ends any drag moving the panel. Returns `false` for unknown
    /// panels.
    pub fn set_panel_pinned(&mut self, id: PanelId, pinned: bool) -> bool {
        self.interaction.set_panel_pinned(id, pinned)
    }

    pub fn set_click_handler(&mut self, handler: Box<dyn ClickHandler>) {
        self.click_handler = Some(handler);
    }

    pub fn clear_click_handler(&mut self) {
        self.click_handler = None;
    }

    /// Advance the runtime by `dt` seconds and return the frame. Click
    /// handler errors are reported in [`OrchestratorFrame::click_failures`].
    pub fn step(&mut self, dt: f32, input: FrameInput) -> OrchestratorFrame {
        self.epoch = self.epoch.wrapping_add(1);
        crate::scheduler::run_frame(self, dt, input)
    }
}
