use avatar_animation_core::clamp_dt;
use avatar_interaction_core::{InteractionEvent, Vec3};
use log::warn;

use crate::diagnostics::PhaseTimer;
use crate::{ClickFailure, FrameEvent, FrameInput, Orchestrator, OrchestratorFrame, PanelFrame};

/// Frame phases in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Locomotion,
    Procedural,
    Interaction,
}

impl Phase {
    pub const ORDER: [Phase; 4] = [
        Phase::Input,
        Phase::Locomotion,
        Phase::Procedural,
        Phase::Interaction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Input => "input",
            Phase::Locomotion => "locomotion",
            Phase::Procedural => "procedural",
            Phase::Interaction => "interaction",
        }
    }
}

/// Run one frame:
///   clamp dt -> input poll -> locomotion -> procedural -> raycast/drag -> frame
pub fn run_frame(orchestrator: &mut Orchestrator, dt: f32, input: FrameInput) -> OrchestratorFrame {
    let mut timer = PhaseTimer::start(&orchestrator.cfg.diagnostics);
    if !dt.is_finite() {
        warn!("non-finite dt {dt} treated as 0");
    }
    let dt = clamp_dt(dt, orchestrator.cfg.max_dt);
    orchestrator.elapsed += dt as f64;
    let elapsed = orchestrator.elapsed;
    let mut events: Vec<FrameEvent> = Vec::new();

    // Input phase
    orchestrator.interaction.poll(&input.sources);
    timer.lap(Phase::Input.as_str());

    // Locomotion phase
    let head_forward = input.head.map(|h| h.forward());
    orchestrator.interaction.locomote(head_forward, dt);
    timer.lap(Phase::Locomotion.as_str());

    // Procedural phase
    let outputs = match orchestrator.rig.as_mut() {
        Some(rig) => orchestrator.driver.update(rig, elapsed, dt),
        None => orchestrator.driver.tick_clock(elapsed),
    };
    let joint_writes = outputs.writes.clone();
    events.extend(outputs.events.iter().cloned().map(FrameEvent::Animation));
    timer.lap(Phase::Procedural.as_str());

    // Interaction phase
    let player = *orchestrator.interaction.player();
    let viewer = input
        .head
        .map(|h| h.position)
        .unwrap_or(player.position + Vec3::Y * orchestrator.cfg.eye_height);
    orchestrator.interaction.update_interactions(viewer);
    let interaction_events = orchestrator.interaction.take_events();
    let mut click_failures = Vec::new();
    if let Some(handler) = orchestrator.click_handler.as_mut() {
        for event in &interaction_events {
            let InteractionEvent::Click { key, payload, .. } = event else {
                continue;
            };
            if let Err(err) = handler.on_click(key, payload) {
                warn!("click handler failed for '{key}': {err:#}");
                click_failures.push(ClickFailure {
                    key: key.clone(),
                    message: format!("{err:#}"),
                });
            }
        }
    }
    events.extend(interaction_events.into_iter().map(FrameEvent::Interaction));
    timer.lap(Phase::Interaction.as_str());

    let registry = orchestrator.interaction.registry();
    let panels = registry
        .panels()
        .map(|(id, panel)| PanelFrame {
            id,
            placement: panel.placement,
        })
        .collect();
    let avatar_yaw = orchestrator
        .avatar
        .and_then(|id| registry.grabbable(id))
        .map(|g| g.yaw)
        .unwrap_or(0.0);

    OrchestratorFrame {
        epoch: orchestrator.epoch,
        dt,
        elapsed,
        mode: orchestrator.driver.mode(),
        joint_writes,
        player: *orchestrator.interaction.player(),
        avatar_yaw,
        panels,
        events,
        click_failures,
        timings_ms: timer.finish(),
    }
}
