use bevy::prelude::*;

use avatar_orchestrator::FrameInput;
use avatar_rig_core::{JointId, Rig, Transform as RigTransform};

use crate::components::AvatarRoot;
use crate::resources::{AvatarRuntime, JointEntityIndex, LastFrame, PendingFrameInput};

fn rig_transform(tf: &Transform) -> RigTransform {
    RigTransform {
        translation: tf.translation,
        rotation: tf.rotation,
        scale: tf.scale,
    }
}

fn entity_name(entity: Entity, names: &Query<&Name>) -> String {
    names
        .get(entity)
        .map(|n| n.as_str().to_string())
        .unwrap_or_else(|_| format!("{entity:?}"))
}

/// Builds a [`Rig`] from the entity hierarchy under each newly added
/// [`AvatarRoot`] and registers it. Only the latest root stays registered.
pub fn register_avatar_system(
    roots: Query<(Entity, &AvatarRoot), Added<AvatarRoot>>,
    children: Query<&Children>,
    transforms: Query<&Transform>,
    names: Query<&Name>,
    mut runtime: NonSendMut<AvatarRuntime>,
    mut index: ResMut<JointEntityIndex>,
) {
    fn walk(
        entity: Entity,
        parent: JointId,
        rig: &mut Rig,
        index: &mut JointEntityIndex,
        children: &Query<&Children>,
        transforms: &Query<&Transform>,
        names: &Query<&Name>,
    ) {
        let Ok(kids) = children.get(entity) else {
            return;
        };
        for &child in kids.iter() {
            // Entities without a Transform are not part of the skeleton.
            let Ok(tf) = transforms.get(child) else {
                continue;
            };
            match rig.add_joint(parent, entity_name(child, names), rig_transform(tf)) {
                Ok(id) => {
                    index.joints.insert(id, child);
                    walk(child, id, rig, index, children, transforms, names);
                }
                Err(err) => warn!("skipping joint {child:?}: {err}"),
            }
        }
    }

    for (root, marker) in roots.iter() {
        let root_tf = transforms.get(root).copied().unwrap_or_default();
        let mut rig = Rig::new(entity_name(root, &names), rig_transform(&root_tf));
        let mut built = JointEntityIndex {
            root: Some(root),
            root_rest: root_tf.rotation,
            ..default()
        };
        built.joints.insert(rig.root(), root);
        walk(root, rig.root(), &mut rig, &mut built, &children, &transforms, &names);

        debug!("registering avatar {root:?} with {} joints", rig.len());
        runtime.0.register_avatar(rig, marker.has_baked_clips);
        *index = built;
    }
}

/// Advance the runtime by the frame delta and stash the result.
pub fn step_runtime_system(
    time: Res<Time>,
    mut runtime: NonSendMut<AvatarRuntime>,
    mut input: ResMut<PendingFrameInput>,
    mut last: ResMut<LastFrame>,
) {
    let input: FrameInput = std::mem::take(&mut input.0);
    let frame = runtime.0.step(time.delta_seconds(), input);
    for failure in &frame.click_failures {
        warn!("click on '{}' failed: {}", failure.key, failure.message);
    }
    last.0 = Some(frame);
}

/// Copy joint writes onto their entities and spin the root by the avatar yaw.
pub fn apply_frame_system(
    last: Res<LastFrame>,
    index: Res<JointEntityIndex>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(frame) = last.0.as_ref() else {
        return;
    };
    let mut root_base = index.root_rest;
    for write in &frame.joint_writes {
        let Some(entity) = index.entity(write.joint) else {
            continue;
        };
        if Some(entity) == index.root {
            root_base = write.rotation;
        }
        if let Ok(mut tf) = transforms.get_mut(entity) {
            tf.translation = write.translation;
            tf.rotation = write.rotation;
        }
    }
    if let Some(mut tf) = index.root.and_then(|root| transforms.get_mut(root).ok()) {
        tf.rotation = Quat::from_rotation_y(frame.avatar_yaw) * root_base;
    }
}
