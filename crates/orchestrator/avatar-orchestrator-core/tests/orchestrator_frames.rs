use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use approx::assert_relative_eq;
use avatar_animation_core::{AnimationEvent, AnimationMode, ModeChangeCause};
use avatar_interaction_core::{
    DragEndCause, DragTarget, Handedness, InputSourceFrame, InteractionEvent, Panel,
    PanelPlacement, Pose, Quat, UiRegion, Vec2, Vec3,
};
use avatar_orchestrator::{FrameEvent, FrameInput, Orchestrator, OrchestratorConfig};
use avatar_rig_core::{JointRole, Rig, RigDesc};
use serde_json::{json, Value};

const TICK: f32 = 1.0 / 90.0;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rig(name: &str) -> Rig {
    let desc: RigDesc = avatar_test_fixtures::rigs::load(name).expect("fixture loads");
    Rig::from_desc(&desc).expect("valid rig")
}

fn with_avatar(name: &str, baked: bool) -> Orchestrator {
    init_logs();
    let mut orch = Orchestrator::default();
    orch.register_avatar(rig(name), baked);
    orch
}

fn sources(frames: Vec<InputSourceFrame>) -> FrameInput {
    FrameInput {
        sources: frames,
        head: None,
    }
}

fn controller(hand: Handedness, at: Vec3, select: bool) -> InputSourceFrame {
    InputSourceFrame::new(hand, Pose::new(at, Quat::IDENTITY)).with_select(select)
}

#[test]
fn frame_reports_phases_in_order() {
    init_logs();
    let mut orch = Orchestrator::default();
    let frame = orch.step(TICK, FrameInput::default());
    let keys: Vec<&str> = frame.timings_ms.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["input_ms", "locomotion_ms", "procedural_ms", "interaction_ms", "total_ms"]
    );
    assert_eq!(frame.epoch, 1);
}

#[test]
fn stepping_without_avatar_runs_interaction_only() {
    init_logs();
    let mut orch = Orchestrator::default();
    let input = sources(vec![
        InputSourceFrame::new(Handedness::Left, Pose::default()).with_stick(0.0, -1.0)
    ]);
    let frame = orch.step(0.05, input);
    assert!(frame.joint_writes.is_empty());
    assert!(frame.events.contains(&FrameEvent::Interaction(
        InteractionEvent::ControllerConnected {
            hand: Handedness::Left
        }
    )));
    assert_relative_eq!(frame.player.position.z, -0.09, epsilon = 1e-5);
}

#[test]
fn registration_emits_event_and_writes_tracked_joints() {
    let mut orch = with_avatar("vrm-humanoid", false);
    let frame = orch.step(TICK, FrameInput::default());
    let tracked = orch.driver().roles().joints().len();
    assert_eq!(tracked, 7);
    assert_eq!(frame.joint_writes.len(), tracked);
    assert!(frame.events.iter().any(|e| matches!(
        e,
        FrameEvent::Animation(AnimationEvent::AvatarRegistered { rest_corrected: true, .. })
    )));
    assert!(orch.avatar().is_some());
}

#[test]
fn huge_and_invalid_dt_are_clamped() {
    let mut orch = with_avatar("mixamo", false);
    assert_eq!(orch.step(4.0, FrameInput::default()).dt, 0.05);
    assert_eq!(orch.step(f32::NAN, FrameInput::default()).dt, 0.0);
    assert_eq!(orch.step(-1.0, FrameInput::default()).dt, 0.0);
    assert_relative_eq!(orch.elapsed(), 0.05, epsilon = 1e-7);
}

#[test]
fn mode_expires_on_the_driver_clock() {
    let mut orch = with_avatar("mixamo", false);
    orch.set_mode("happy", Some(500.0)).unwrap();
    for _ in 0..49 {
        orch.step(0.01, FrameInput::default());
    }
    assert_eq!(orch.driver().mode(), AnimationMode::Happy);

    let mut expired = false;
    for _ in 0..2 {
        let frame = orch.step(0.01, FrameInput::default());
        expired |= frame.events.iter().any(|e| {
            matches!(
                e,
                FrameEvent::Animation(AnimationEvent::ModeChanged {
                    cause: ModeChangeCause::Expired,
                    ..
                })
            )
        });
    }
    assert!(expired);
    assert_eq!(orch.driver().mode(), AnimationMode::Idle);
}

#[test]
fn unknown_mode_is_an_error() {
    let mut orch = Orchestrator::default();
    let err = orch.set_mode("sulk", None).unwrap_err();
    assert!(format!("{err:#}").contains("sulk"));
}

#[test]
fn pointer_drives_head_writes() {
    let mut orch = with_avatar("vrm-humanoid", false);
    orch.set_pointer(1.0, 0.0);
    let mut last = None;
    for _ in 0..270 {
        last = Some(orch.step(TICK, FrameInput::default()));
    }
    let frame = last.unwrap();
    let head = orch.driver().roles().get(JointRole::Head).unwrap();
    let write = frame.joint_writes.iter().find(|w| w.joint == head).unwrap();
    assert_eq!(write.name, "J_Bip_C_Head");
    let rest = orch.driver().rest_pose().get(head).unwrap().rotation;
    assert_relative_eq!(rest.angle_between(write.rotation), 0.55, epsilon = 1e-3);
    assert_eq!(orch.rig().unwrap().local(head).unwrap().rotation, write.rotation);
}

#[test]
fn baked_clip_avatar_gets_no_writes_until_hybrid() {
    let mut orch = with_avatar("mixamo", true);
    assert!(orch.step(TICK, FrameInput::default()).joint_writes.is_empty());
    orch.set_hybrid(true);
    assert!(!orch.step(TICK, FrameInput::default()).joint_writes.is_empty());
}

#[test]
fn grabbing_the_avatar_spins_it() {
    let mut orch = with_avatar("vrm-humanoid", false);
    let id = orch.avatar().unwrap();
    let center = orch.interaction().registry().grabbable(id).unwrap().center;
    let start = center + Vec3::new(-0.1, 0.0, 3.0);

    orch.step(TICK, sources(vec![controller(Handedness::Right, start, false)]));
    let frame = orch.step(TICK, sources(vec![controller(Handedness::Right, start, true)]));
    assert!(frame.events.iter().any(|e| matches!(
        e,
        FrameEvent::Interaction(InteractionEvent::DragStarted { hand: Handedness::Right, .. })
    )));

    let moved = start + Vec3::new(0.1, 0.0, 0.0);
    let frame = orch.step(TICK, sources(vec![controller(Handedness::Right, moved, true)]));
    assert_relative_eq!(frame.avatar_yaw, 0.55, epsilon = 1e-4);
}

#[test]
fn reregistration_replaces_the_avatar_proxy() {
    let mut orch = with_avatar("vrm-humanoid", false);
    let first = orch.avatar().unwrap();
    orch.register_avatar(rig("mixamo"), true);
    let second = orch.avatar().unwrap();
    assert_ne!(first, second);
    assert_eq!(orch.interaction().registry().grabbables().count(), 1);
    assert_eq!(orch.rig().unwrap().name(orch.rig().unwrap().root()), Some("Armature"));
}

#[test]
fn avatar_switch_ends_a_drag_on_the_old_proxy() {
    let mut orch = with_avatar("vrm-humanoid", false);
    let first = orch.avatar().unwrap();
    let center = orch.interaction().registry().grabbable(first).unwrap().center;
    let at = center + Vec3::new(-0.1, 0.0, 3.0);
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, false)]));
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, true)]));
    assert_eq!(orch.interaction().drags().sessions().len(), 1);

    orch.register_avatar(rig("mixamo"), false);
    assert!(orch.interaction().drags().sessions().is_empty());

    let frame = orch.step(TICK, sources(vec![controller(Handedness::Right, at, true)]));
    assert!(frame.events.contains(&FrameEvent::Interaction(InteractionEvent::DragEnded {
        hand: Handedness::Right,
        target: DragTarget::Grabbable(first),
        cause: DragEndCause::Removed,
    })));
    assert_eq!(frame.avatar_yaw, 0.0);
}

fn chat_panel() -> Panel {
    Panel::new(
        PanelPlacement::new(Vec3::new(0.0, 1.5, -1.0), Quat::IDENTITY),
        vec![
            UiRegion::handle("chat.title", Vec2::new(0.0, 0.2), Vec2::new(0.3, 0.05)),
            UiRegion::click("chat.send", Vec2::new(0.0, -0.1), Vec2::new(0.1, 0.05))
                .with_payload(json!({ "message": "hello" })),
        ],
    )
}

#[test]
fn clicks_reach_the_handler() {
    init_logs();
    let mut orch = Orchestrator::default();
    orch.add_panel(chat_panel());
    let seen: Rc<RefCell<Vec<(String, Value)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    orch.set_click_handler(Box::new(move |key: &str, payload: &Value| -> anyhow::Result<()> {
        sink.borrow_mut().push((key.to_string(), payload.clone()));
        Ok(())
    }));

    let at = Vec3::new(0.0, 1.4, 0.0);
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, false)]));
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, true)]));
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, true)]));

    assert_eq!(
        seen.borrow().as_slice(),
        [("chat.send".to_string(), json!({ "message": "hello" }))]
    );
}

#[test]
fn failing_click_handler_keeps_the_rest_of_the_frame() {
    let mut orch = with_avatar("vrm-humanoid", false);
    orch.add_panel(chat_panel());
    orch.set_click_handler(Box::new(|_: &str, _: &Value| -> anyhow::Result<()> {
        Err(anyhow!("chat offline"))
    }));
    let avatar = orch.avatar().unwrap();
    let center = orch.interaction().registry().grabbable(avatar).unwrap().center;
    let grab_at = center + Vec3::new(-0.1, 0.0, 3.0);
    let click_at = Vec3::new(0.0, 1.4, 0.0);

    orch.step(TICK, sources(vec![controller(Handedness::Left, grab_at, false)]));
    orch.step(TICK, sources(vec![controller(Handedness::Left, grab_at, true)]));
    assert_eq!(orch.interaction().drags().sessions().len(), 1);
    orch.step(TICK, sources(vec![
        controller(Handedness::Left, grab_at, true),
        controller(Handedness::Right, click_at, false),
    ]));

    // Left hand drops out while the right clicks into a failing handler.
    let frame = orch.step(TICK, sources(vec![controller(Handedness::Right, click_at, true)]));
    assert_eq!(frame.click_failures.len(), 1);
    assert_eq!(frame.click_failures[0].key, "chat.send");
    assert!(frame.click_failures[0].message.contains("chat offline"));
    assert!(frame.events.contains(&FrameEvent::Interaction(InteractionEvent::DragEnded {
        hand: Handedness::Left,
        target: DragTarget::Grabbable(avatar),
        cause: DragEndCause::Disconnected,
    })));
    assert!(frame.events.contains(&FrameEvent::Interaction(
        InteractionEvent::ControllerDisconnected {
            hand: Handedness::Left
        }
    )));
    assert_eq!(frame.joint_writes.len(), 7);
    assert!(orch.interaction().drags().sessions().is_empty());

    let value = serde_json::to_value(&frame).unwrap();
    assert_eq!(value["click_failures"][0]["key"], json!("chat.send"));
}

#[test]
fn pinning_mid_drag_ends_the_panel_move() {
    init_logs();
    let mut orch = Orchestrator::default();
    let panel = orch.add_panel(chat_panel());
    let at = Vec3::new(0.0, 1.7, -0.2);
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, false)]));
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, true)]));
    assert!(orch.interaction().drags().is_active());

    assert!(orch.set_panel_pinned(panel, true));
    let shifted = at + Vec3::new(0.5, 0.0, 0.0);
    let frame = orch.step(TICK, sources(vec![controller(Handedness::Right, shifted, true)]));
    assert!(frame.events.contains(&FrameEvent::Interaction(InteractionEvent::DragEnded {
        hand: Handedness::Right,
        target: DragTarget::Panel(panel),
        cause: DragEndCause::Pinned,
    })));
    assert_eq!(frame.panels[0].placement.position, Vec3::new(0.0, 1.5, -1.0));
    assert!(frame.panels[0].placement.pinned);
}

#[test]
fn pinned_panel_stays_put() {
    init_logs();
    let mut orch = Orchestrator::default();
    let panel = orch.add_panel(chat_panel());
    assert!(orch.set_panel_pinned(panel, true));
    let at = Vec3::new(0.0, 1.7, -0.2);
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, false)]));
    orch.step(TICK, sources(vec![controller(Handedness::Right, at, true)]));
    let away = Vec3::new(1.0, 1.7, 2.0);
    let frame = orch.step(TICK, sources(vec![controller(Handedness::Right, away, true)]));
    assert_eq!(frame.panels[0].placement.position, Vec3::new(0.0, 1.5, -1.0));
}

#[test]
fn configs_load_from_fixtures() {
    let text = avatar_test_fixtures::configs::json("orchestrator-default").unwrap();
    let orch = Orchestrator::from_json_config(&text).unwrap();
    assert_relative_eq!(orch.config().max_dt, 0.05);
    assert_relative_eq!(orch.config().interaction.drag.rotate_gain, 5.5);

    let partial: OrchestratorConfig = avatar_test_fixtures::configs::load("orchestrator-partial").unwrap();
    partial.validate().unwrap();
    assert_relative_eq!(partial.max_dt, 0.033);
    assert!(partial.procedural.hybrid);
    assert!(!partial.diagnostics.enabled);
    assert_eq!(partial.procedural.overlays.talk.len(), 1);
    assert_eq!(partial.procedural.overlays.dance.len(), 2);
    assert_relative_eq!(partial.interaction.drag.max_panel_distance, 2.0);

    let mut orch = Orchestrator::new(partial);
    assert_relative_eq!(orch.driver().config().max_dt, 0.033);
    let frame = orch.step(1.0, FrameInput::default());
    assert_relative_eq!(frame.dt, 0.033);
    assert!(frame.timings_ms.is_empty());
}

#[test]
fn frame_serializes_to_json() {
    let mut orch = with_avatar("vrm-humanoid", false);
    let frame = orch.step(TICK, FrameInput::default());
    let value = serde_json::to_value(&frame).unwrap();
    assert_eq!(value["mode"], json!("idle"));
    assert_eq!(value["events"][0]["source"], json!("animation"));
    assert!(value["joint_writes"].as_array().unwrap().len() == 7);

    let input: FrameInput = serde_json::from_value(json!({
        "sources": [{
            "handedness": "left",
            "pose": { "position": [0.0, 1.0, 0.0], "orientation": [0.0, 0.0, 0.0, 1.0] },
            "axes": [0.0, 0.0, 0.5, -0.5],
            "buttons": [true]
        }]
    }))
    .unwrap();
    assert_eq!(input.sources[0].handedness, Handedness::Left);
}
