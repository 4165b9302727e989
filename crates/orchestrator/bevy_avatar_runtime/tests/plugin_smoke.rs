use bevy::prelude::*;
use bevy_avatar_runtime::{
    AvatarRoot, AvatarRuntime, AvatarRuntimePlugin, JointEntityIndex, LastFrame, PendingFrameInput,
};

use avatar_interaction_core::{Handedness, InputSourceFrame, Pose};
use avatar_orchestrator::FrameInput;
use avatar_rig_core::RigDesc;

fn app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(AvatarRuntimePlugin::default());
    app
}

fn spawn_desc(world: &mut World, desc: &RigDesc) -> Entity {
    let entity = world
        .spawn((
            Name::new(desc.name.clone()),
            Transform {
                translation: desc.translation,
                rotation: desc.rotation,
                scale: desc.scale,
            },
            GlobalTransform::default(),
        ))
        .id();
    for child in &desc.children {
        let child = spawn_desc(world, child);
        world.entity_mut(entity).add_child(child);
    }
    entity
}

fn spawn_avatar(app: &mut App, fixture: &str, has_baked_clips: bool) -> Entity {
    let desc: RigDesc = avatar_test_fixtures::rigs::load(fixture).expect("fixture loads");
    let root = spawn_desc(app.world_mut(), &desc);
    app.world_mut()
        .entity_mut(root)
        .insert(AvatarRoot { has_baked_clips });
    root
}

#[test]
fn plugin_inserts_runtime_and_steps_without_avatar() {
    let mut app = app();
    assert!(app.world().get_non_send_resource::<AvatarRuntime>().is_some());
    app.update();
    app.update();
    let runtime = app.world().non_send_resource::<AvatarRuntime>();
    assert_eq!(runtime.0.epoch, 2);
    assert!(runtime.0.rig().is_none());
}

#[test]
fn avatar_hierarchy_is_registered_once() {
    let mut app = app();
    let root = spawn_avatar(&mut app, "vrm-humanoid", false);
    app.update();
    app.update();

    let index = app.world().resource::<JointEntityIndex>();
    assert_eq!(index.root, Some(root));
    let runtime = app.world().non_send_resource::<AvatarRuntime>();
    let rig = runtime.0.rig().expect("registered");
    assert_eq!(index.joints.len(), rig.len());
    assert_eq!(rig.name(rig.root()), Some("Armature"));
    assert!(runtime.0.driver().is_registered());
}

#[test]
fn joint_writes_land_on_entities() {
    let mut app = app();
    spawn_avatar(&mut app, "vrm-humanoid", false);
    app.update();

    let frame = app
        .world()
        .resource::<LastFrame>()
        .0
        .clone()
        .expect("frame produced");
    assert_eq!(frame.joint_writes.len(), 7);
    let index = app.world().resource::<JointEntityIndex>();
    let targets: Vec<(Entity, Quat, Vec3)> = frame
        .joint_writes
        .iter()
        .map(|w| (index.entity(w.joint).unwrap(), w.rotation, w.translation))
        .collect();
    for (entity, rotation, translation) in targets {
        let tf = app.world().get::<Transform>(entity).unwrap();
        assert_eq!(tf.rotation, rotation);
        assert_eq!(tf.translation, translation);
    }
}

#[test]
fn baked_clip_avatar_is_left_alone() {
    let mut app = app();
    let root = spawn_avatar(&mut app, "mixamo", true);
    let before = *app.world().get::<Transform>(root).unwrap();
    app.update();
    let frame = app.world().resource::<LastFrame>().0.clone().unwrap();
    assert!(frame.joint_writes.is_empty());
    assert_eq!(*app.world().get::<Transform>(root).unwrap(), before);
}

#[test]
fn pending_input_is_consumed_by_the_step() {
    let mut app = app();
    app.world_mut().resource_mut::<PendingFrameInput>().0 = FrameInput {
        sources: vec![InputSourceFrame::new(Handedness::Left, Pose::default())],
        head: None,
    };
    app.update();
    assert!(app
        .world()
        .resource::<PendingFrameInput>()
        .0
        .sources
        .is_empty());
    let runtime = app.world().non_send_resource::<AvatarRuntime>();
    assert!(runtime.0.interaction().poller().is_connected(Handedness::Left));
}
