use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::{Quat, Vec3};

use avatar_swap::assets::material::{MaterialDescriptor, SHADER_GLTF_PBR};
use avatar_swap::assets::{AssetLoader, ImportError, TextureData};
use avatar_swap::config::AvatarSettings;
use avatar_swap::host::{
    Hand, HostApi, HostError, HostIdentity, HostPose, RagdollId, SubPartKind,
};
use avatar_swap::scene::graph::{MeshData, MeshKind, MeshNode};
use avatar_swap::scene::{Rgba, SceneGraph, Transform};
use avatar_swap::substitution::{AvatarSystem, SyncState, HIDDEN_REFERENCE_POINT};

fn sample_graph() -> SceneGraph {
    let mut graph = SceneGraph::empty("sample");

    graph
        .textures
        .push(Arc::new(TextureData::solid(4, 4, [200, 180, 160, 255])));

    let mut material = MaterialDescriptor::new("body", SHADER_GLTF_PBR);
    material.base_color = Some(Rgba::WHITE);
    material.base_texture = Some(0);
    graph.materials.push(material);

    graph.meshes.push(MeshNode {
        name: "body".to_string(),
        kind: MeshKind::Skinned,
        material: Some(0),
        geometry: Arc::new(MeshData::default()),
    });

    let hips = graph.skeleton.add_bone("Hips", None, Transform::IDENTITY);
    let spine = graph.skeleton.add_bone(
        "Spine",
        Some(hips),
        Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)),
    );
    graph.skeleton.add_bone(
        "Head",
        Some(spine),
        Transform::from_translation(Vec3::new(0.0, 0.4, 0.0)),
    );
    graph.skeleton.add_bone(
        "TailExtra",
        Some(hips),
        Transform::from_translation(Vec3::new(0.0, -0.2, 0.0)),
    );

    graph
}

struct StubLoader {
    calls: Arc<AtomicUsize>,
}

impl AssetLoader<SceneGraph> for StubLoader {
    fn load(&self, _path: &Path) -> Result<SceneGraph, ImportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(sample_graph())
    }
}

struct FailingLoader;

impl AssetLoader<SceneGraph> for FailingLoader {
    fn load(&self, path: &Path) -> Result<SceneGraph, ImportError> {
        Err(ImportError::NotFound(path.display().to_string()))
    }
}

#[derive(Default)]
struct MockHost {
    names: HashMap<HostIdentity, String>,
    poses: HashMap<HostIdentity, HostPose>,
    ragdoll_poses: HashMap<RagdollId, HostPose>,
    hidden_parts: Vec<(HostIdentity, SubPartKind)>,
    held_item_resets: usize,
    native_suppressed: HashSet<HostIdentity>,
    always_evaluate: HashSet<HostIdentity>,
    prepared_ragdolls: Vec<RagdollId>,
    evaluators: Vec<(RagdollId, HostIdentity)>,
    eye_positions: Vec<(HostIdentity, Vec3)>,
}

impl HostApi for MockHost {
    fn character_name(&self, identity: HostIdentity) -> Option<String> {
        self.names.get(&identity).cloned()
    }

    fn attached_sub_parts(&self, _identity: HostIdentity) -> Vec<SubPartKind> {
        vec![
            SubPartKind::HeadHair,
            SubPartKind::FacialHair,
            SubPartKind::ChestGear,
            SubPartKind::LegGear,
            SubPartKind::ShoulderGear,
            SubPartKind::UtilityGear,
            SubPartKind::Helmet,
        ]
    }

    fn set_sub_part_visible(&mut self, identity: HostIdentity, part: SubPartKind, visible: bool) {
        if !visible {
            self.hidden_parts.push((identity, part));
        }
    }

    fn reset_held_item_offset(&mut self, _identity: HostIdentity, _hand: Hand) {
        self.held_item_resets += 1;
    }

    fn suppress_native_rendering(&mut self, identity: HostIdentity) {
        self.native_suppressed.insert(identity);
    }

    fn force_animator_always_evaluate(&mut self, identity: HostIdentity) {
        self.always_evaluate.insert(identity);
    }

    fn character_pose(&self, identity: HostIdentity) -> Result<HostPose, HostError> {
        self.poses
            .get(&identity)
            .cloned()
            .ok_or_else(|| HostError::MissingHostData(format!("no pose for {identity}")))
    }

    fn prepare_ragdoll_meshes(&mut self, ragdoll: RagdollId) {
        self.prepared_ragdolls.push(ragdoll);
    }

    fn attach_ragdoll_evaluator(
        &mut self,
        ragdoll: RagdollId,
        source: HostIdentity,
    ) -> Result<(), HostError> {
        self.evaluators.push((ragdoll, source));
        Ok(())
    }

    fn ragdoll_pose(&self, ragdoll: RagdollId) -> Result<HostPose, HostError> {
        self.ragdoll_poses
            .get(&ragdoll)
            .cloned()
            .ok_or_else(|| HostError::MissingHostData(format!("no pose for {ragdoll}")))
    }

    fn set_eye_position(&mut self, identity: HostIdentity, position: Vec3) {
        self.eye_positions.push((identity, position));
    }
}

fn settings() -> AvatarSettings {
    AvatarSettings {
        avatars: [("alice".to_string(), "knight".to_string())]
            .into_iter()
            .collect(),
        ..AvatarSettings::default()
    }
}

fn system_with_stub(settings: AvatarSettings) -> (AvatarSystem, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let system = AvatarSystem::with_loader(
        settings,
        Box::new(StubLoader {
            calls: calls.clone(),
        }),
    );
    (system, calls)
}

fn host_with(identity: HostIdentity, name: &str) -> MockHost {
    let mut host = MockHost::default();
    host.names.insert(identity, name.to_string());
    host
}

fn pose_with(root: Transform, bones: &[(&str, Transform)]) -> HostPose {
    HostPose {
        root,
        bones: bones
            .iter()
            .map(|(name, transform)| (name.to_string(), *transform))
            .collect(),
    }
}

#[test]
fn spawn_substitutes_and_hides_host_geometry() {
    let (mut system, calls) = system_with_stub(settings());
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");

    system.on_character_spawn(id, &mut host);

    let record = system.record(id).expect("record registered");
    assert_eq!(record.asset_name, "knight");
    assert!(record.instance.active);
    assert_eq!(record.state, SyncState::Alive);
    assert_eq!(host.hidden_parts.len(), 7);
    assert!(host.native_suppressed.contains(&id));
    assert!(host.always_evaluate.contains(&id));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unmapped_character_falls_back_to_default_model() {
    let (mut system, _calls) = system_with_stub(settings());
    let id = HostIdentity::new();
    let mut host = host_with(id, "Bob");

    system.on_character_spawn(id, &mut host);

    assert_eq!(system.record(id).unwrap().asset_name, "default");
}

#[test]
fn missing_asset_keeps_native_rendering() {
    let mut system = AvatarSystem::with_loader(settings(), Box::new(FailingLoader));
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");

    system.on_character_spawn(id, &mut host);

    assert!(system.record(id).is_none());
    // native geometry must not have been touched
    assert!(host.hidden_parts.is_empty());
    assert!(host.native_suppressed.is_empty());
}

#[test]
fn frame_copies_matching_bones_and_keeps_bind_for_the_rest() {
    let (mut system, _calls) = system_with_stub(settings());
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");
    system.on_character_spawn(id, &mut host);

    let hips = Transform {
        translation: Vec3::new(1.0, 2.0, 3.0),
        rotation: Quat::from_rotation_y(0.5),
        scale: Vec3::ONE,
    };
    host.poses.insert(
        id,
        pose_with(
            Transform::from_translation(Vec3::new(10.0, 0.0, -4.0)),
            &[("Hips", hips), ("HostOnlyBone", Transform::IDENTITY)],
        ),
    );

    system.on_frame(id, &mut host);

    let record = system.record(id).unwrap();
    let skeleton = &record.instance.skeleton;

    let hips_index = skeleton.bone_index("Hips").unwrap();
    assert_eq!(skeleton.bone(hips_index).unwrap().local, hips);

    let tail_index = skeleton.bone_index("TailExtra").unwrap();
    let tail = skeleton.bone(tail_index).unwrap();
    assert_eq!(tail.local, tail.bind);

    assert_eq!(record.instance.root.translation, Vec3::new(10.0, 0.0, -4.0));
    // scale baked in by the transform pipeline survives root pinning
    assert_eq!(record.instance.root.scale, Vec3::splat(1.1));
    assert_eq!(host.held_item_resets, 2);
}

#[test]
fn missing_pose_skips_the_frame() {
    let (mut system, _calls) = system_with_stub(settings());
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");
    system.on_character_spawn(id, &mut host);

    // no pose registered for the identity
    system.on_frame(id, &mut host);

    let record = system.record(id).unwrap();
    for bone in record.instance.skeleton.bones() {
        assert_eq!(bone.local, bone.bind);
    }
}

#[test]
fn ragdoll_transition_is_one_way_and_terminal() {
    let (mut system, _calls) = system_with_stub(settings());
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");
    system.on_character_spawn(id, &mut host);

    let ragdoll = RagdollId(7);
    system.on_ragdoll_created(id, ragdoll, &mut host);

    assert_eq!(system.record(id).unwrap().state, SyncState::Ragdoll(ragdoll));
    assert_eq!(host.prepared_ragdolls, vec![ragdoll]);
    assert_eq!(host.evaluators, vec![(ragdoll, id)]);

    // a duplicate event never re-transitions
    system.on_ragdoll_created(id, RagdollId(8), &mut host);
    assert_eq!(system.record(id).unwrap().state, SyncState::Ragdoll(ragdoll));
    assert_eq!(host.prepared_ragdolls.len(), 1);
}

#[test]
fn ragdoll_frames_sample_the_ragdoll_pose() {
    let (mut system, _calls) = system_with_stub(settings());
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");
    system.on_character_spawn(id, &mut host);

    let ragdoll = RagdollId(3);
    system.on_ragdoll_created(id, ragdoll, &mut host);

    // the live animator pose must be ignored from now on
    host.poses.insert(
        id,
        pose_with(
            Transform::from_translation(Vec3::new(50.0, 50.0, 50.0)),
            &[],
        ),
    );
    let slumped = Transform {
        translation: Vec3::new(0.1, 0.0, 0.2),
        rotation: Quat::from_rotation_x(1.2),
        scale: Vec3::ONE,
    };
    host.ragdoll_poses.insert(
        ragdoll,
        pose_with(
            Transform::from_translation(Vec3::new(2.0, 0.0, 2.0)),
            &[("Hips", slumped)],
        ),
    );

    system.on_frame(id, &mut host);

    let record = system.record(id).unwrap();
    assert_eq!(record.instance.root.translation, Vec3::new(2.0, 0.0, 2.0));
    let hips_index = record.instance.skeleton.bone_index("Hips").unwrap();
    assert_eq!(record.instance.skeleton.bone(hips_index).unwrap().local, slumped);
}

#[test]
fn visibility_toggle_restores_the_captured_reference_point() {
    let (mut system, _calls) = system_with_stub(settings());
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");
    system.on_character_spawn(id, &mut host);

    let original = system.record(id).unwrap().original_lod_ref;

    system.on_visibility_changed(id, false);
    let hidden = system.record(id).unwrap();
    assert_eq!(
        hidden.instance.lod.as_ref().unwrap().reference_point,
        HIDDEN_REFERENCE_POINT
    );

    system.on_visibility_changed(id, true);
    let shown = system.record(id).unwrap();
    assert_eq!(shown.instance.lod.as_ref().unwrap().reference_point, original);
}

#[test]
fn identities_sharing_an_asset_get_independent_clones() {
    let (mut system, calls) = system_with_stub(settings());
    let first = HostIdentity::new();
    let second = HostIdentity::new();
    let mut host = host_with(first, "Alice");
    host.names.insert(second, "alice".to_string());

    system.on_character_spawn(first, &mut host);
    system.on_character_spawn(second, &mut host);

    // one template load serves both records
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        system.record(first).unwrap().instance,
        system.record(second).unwrap().instance
    );

    // driving one identity's pose must not leak into the other
    host.poses.insert(
        first,
        pose_with(Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)), &[]),
    );
    system.on_frame(first, &mut host);

    assert_eq!(
        system.record(first).unwrap().instance.root.translation,
        Vec3::new(5.0, 0.0, 0.0)
    );
    assert_eq!(
        system.record(second).unwrap().instance.root.translation,
        Vec3::ZERO
    );
}

#[test]
fn removal_releases_the_record() {
    let (mut system, _calls) = system_with_stub(settings());
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");
    system.on_character_spawn(id, &mut host);
    assert!(system.record(id).is_some());

    system.on_character_removed(id);
    assert!(system.record(id).is_none());

    // a stray frame after removal is a no-op
    system.on_frame(id, &mut host);
}

#[test]
fn eye_sync_publishes_positions_until_ragdoll() {
    let mut settings = settings();
    settings.fix_camera_height = true;
    let (mut system, _calls) = system_with_stub(settings);

    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");
    system.on_character_spawn(id, &mut host);

    // sample graph has no LeftEye; Head is the fallback
    assert_eq!(system.record(id).unwrap().eye.as_ref().unwrap().bone, "Head");

    host.poses
        .insert(id, pose_with(Transform::IDENTITY, &[]));
    system.on_frame(id, &mut host);
    assert_eq!(host.eye_positions.len(), 1);

    let ragdoll = RagdollId(1);
    system.on_ragdoll_created(id, ragdoll, &mut host);
    assert!(system.record(id).unwrap().eye.is_none());

    host.ragdoll_poses
        .insert(ragdoll, pose_with(Transform::IDENTITY, &[]));
    system.on_frame(id, &mut host);
    assert_eq!(host.eye_positions.len(), 1);
}

#[test]
fn preload_loads_every_configured_model_once() {
    let (mut system, calls) = system_with_stub(settings());

    // "knight" plus the implicit "default"
    assert_eq!(system.preload(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // spawning afterwards hits the cache only
    let id = HostIdentity::new();
    let mut host = host_with(id, "Alice");
    system.on_character_spawn(id, &mut host);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
