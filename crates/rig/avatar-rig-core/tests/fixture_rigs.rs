use approx::assert_relative_eq;
use avatar_rig_core::{
    resolve_roles, JointRole, Quat, RestPose, Rig, RigConfig, RigDesc, RolePatterns,
};

fn load(name: &str) -> Rig {
    let desc: RigDesc = avatar_test_fixtures::rigs::load(name).expect("fixture loads");
    Rig::from_desc(&desc).expect("fixture is a valid rig")
}

fn role_name(rig: &Rig, roles: &avatar_rig_core::RoleMap, role: JointRole) -> Option<String> {
    roles
        .get(role)
        .and_then(|j| rig.name(j))
        .map(str::to_string)
}

#[test]
fn vrm_humanoid_resolves_every_role() {
    let rig = load("vrm-humanoid");
    let roles = resolve_roles(&rig, &RolePatterns::default());
    assert_eq!(role_name(&rig, &roles, JointRole::Hips).as_deref(), Some("J_Bip_C_Hips"));
    assert_eq!(role_name(&rig, &roles, JointRole::Spine).as_deref(), Some("J_Bip_C_Spine"));
    assert_eq!(role_name(&rig, &roles, JointRole::Chest).as_deref(), Some("J_Bip_C_Chest"));
    assert_eq!(role_name(&rig, &roles, JointRole::Neck).as_deref(), Some("J_Bip_C_Neck"));
    assert_eq!(role_name(&rig, &roles, JointRole::Head).as_deref(), Some("J_Bip_C_Head"));
    assert_eq!(
        role_name(&rig, &roles, JointRole::LeftUpperArm).as_deref(),
        Some("J_Bip_L_UpperArm")
    );
    assert_eq!(
        role_name(&rig, &roles, JointRole::RightUpperArm).as_deref(),
        Some("J_Bip_R_UpperArm")
    );
}

#[test]
fn mixamo_prefers_spine2_for_chest_and_arm_over_forearm() {
    let rig = load("mixamo");
    let roles = resolve_roles(&rig, &RolePatterns::default());
    assert_eq!(
        role_name(&rig, &roles, JointRole::Chest).as_deref(),
        Some("mixamorig:Spine2")
    );
    assert_eq!(
        role_name(&rig, &roles, JointRole::Spine).as_deref(),
        Some("mixamorig:Spine")
    );
    assert_eq!(
        role_name(&rig, &roles, JointRole::Head).as_deref(),
        Some("mixamorig:Head")
    );
    assert_eq!(
        role_name(&rig, &roles, JointRole::LeftUpperArm).as_deref(),
        Some("mixamorig:LeftArm")
    );
    assert_eq!(
        role_name(&rig, &roles, JointRole::RightUpperArm).as_deref(),
        Some("mixamorig:RightArm")
    );
}

#[test]
fn blender_metarig_maps_numbered_spine_chain() {
    let rig = load("blender-metarig");
    let roles = resolve_roles(&rig, &RolePatterns::default());
    // Root `spine` parents both thighs, so it is the pelvis.
    assert_eq!(role_name(&rig, &roles, JointRole::Hips).as_deref(), Some("spine"));
    assert_eq!(role_name(&rig, &roles, JointRole::Spine).as_deref(), Some("spine.001"));
    assert_eq!(role_name(&rig, &roles, JointRole::Chest).as_deref(), Some("spine.003"));
    assert_eq!(role_name(&rig, &roles, JointRole::Neck).as_deref(), Some("spine.004"));
    assert_eq!(role_name(&rig, &roles, JointRole::Head).as_deref(), Some("spine.006"));
    assert_eq!(
        role_name(&rig, &roles, JointRole::LeftUpperArm).as_deref(),
        Some("upper_arm.L")
    );
    assert_eq!(
        role_name(&rig, &roles, JointRole::RightUpperArm).as_deref(),
        Some("upper_arm.R")
    );
}

#[test]
fn metarig_spine_role_does_not_parent_the_legs() {
    let rig = load("blender-metarig");
    let roles = resolve_roles(&rig, &RolePatterns::default());
    let spine = roles.get(JointRole::Spine).unwrap();
    let thigh = rig.find("thigh.L").unwrap();
    let mut ancestor = rig.joint(thigh).and_then(|j| j.parent);
    while let Some(id) = ancestor {
        assert_ne!(id, spine, "thigh.L hangs under the spine role");
        ancestor = rig.joint(id).and_then(|j| j.parent);
    }
}

#[test]
fn prop_without_skeleton_has_no_roles() {
    let rig = load("unrigged-prop");
    assert!(resolve_roles(&rig, &RolePatterns::default()).is_empty());
}

#[test]
fn clipless_registration_lowers_arms_and_rebaselines() {
    let mut rig = load("vrm-humanoid");
    let cfg = RigConfig::default();
    let roles = resolve_roles(&rig, &cfg.role_patterns);
    let left = roles.get(JointRole::LeftUpperArm).unwrap();
    let right = roles.get(JointRole::RightUpperArm).unwrap();
    let loaded_left = rig.local(left).unwrap().rotation;
    let loaded_right = rig.local(right).unwrap().rotation;

    let pose = RestPose::register(&mut rig, &roles, Some(cfg.arm_rest_angle));

    let corrected_left = rig.local(left).unwrap().rotation;
    let corrected_right = rig.local(right).unwrap().rotation;
    assert_relative_eq!(loaded_left.angle_between(corrected_left), 0.9, epsilon = 1e-3);
    assert_relative_eq!(loaded_right.angle_between(corrected_right), 0.9, epsilon = 1e-3);

    // Mutate and restore: the corrected pose comes back, not the loaded one.
    rig.joint_mut(left).unwrap().local.rotation = Quat::from_rotation_y(1.0);
    rig.joint_mut(right).unwrap().local.rotation = Quat::IDENTITY;
    pose.restore_all(&mut rig);
    assert_eq!(rig.local(left).unwrap().rotation, corrected_left);
    assert_eq!(rig.local(right).unwrap().rotation, corrected_right);
}

#[test]
fn registration_with_clips_keeps_loaded_pose() {
    let mut rig = load("mixamo");
    let roles = resolve_roles(&rig, &RolePatterns::default());
    let left = roles.get(JointRole::LeftUpperArm).unwrap();
    let before = rig.local(left).unwrap();
    let pose = RestPose::register(&mut rig, &roles, None);
    assert_eq!(rig.local(left).unwrap(), before);
    assert_eq!(pose.len(), rig.len());
}

#[test]
fn rig_parses_from_raw_json() {
    let text = avatar_test_fixtures::rigs::json("unrigged-prop").unwrap();
    let rig = Rig::from_json_str(&text).unwrap();
    assert_eq!(rig.len(), 3);
    assert!(Rig::from_json_str("{\"children\": 3}").is_err());
}
