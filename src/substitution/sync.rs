use tracing::{debug, warn};

use crate::host::{Hand, HostApi, HostPose, RagdollId};
use crate::scene::graph::SceneGraph;
use crate::substitution::registry::{SubstitutionRecord, SyncState};

/// Copy the host's resolved pose for this frame onto the substitute,
/// sourcing from the live animator or the ragdoll evaluator depending on the
/// record's state. A missing pose skips the frame; a missing bone skips that
/// bone. Neither aborts the pass.
pub fn sync_frame(record: &mut SubstitutionRecord, host: &mut dyn HostApi) {
    let pose = match record.state {
        SyncState::Alive => host.character_pose(record.identity),
        SyncState::Ragdoll(ragdoll) => host.ragdoll_pose(ragdoll),
    };
    let pose = match pose {
        Ok(pose) => pose,
        Err(err) => {
            debug!(identity = %record.identity, error = %err, "No host pose this frame; sync skipped");
            return;
        }
    };

    apply_pose(&mut record.instance, &pose);

    if record.state == SyncState::Alive {
        // The substitute carries its own hand attachments.
        host.reset_held_item_offset(record.identity, Hand::Left);
        host.reset_held_item_offset(record.identity, Hand::Right);

        if let Some(eye) = &record.eye {
            if let Some(index) = record.instance.skeleton.bone_index(&eye.bone) {
                if let Some(world) = record
                    .instance
                    .skeleton
                    .world_transform(index, &record.instance.root)
                {
                    host.set_eye_position(record.identity, world.translation);
                }
            }
        }
    }
}

/// One-way transition into the ragdoll state, triggered by the host's
/// ragdoll-creation event. Duplicate events are ignored; there is no way
/// back to `Alive`.
pub fn enter_ragdoll(record: &mut SubstitutionRecord, ragdoll: RagdollId, host: &mut dyn HostApi) {
    if let SyncState::Ragdoll(existing) = record.state {
        warn!(
            identity = %record.identity,
            ragdoll = %existing,
            "Ragdoll transition repeated; ignored"
        );
        return;
    }

    host.prepare_ragdoll_meshes(ragdoll);
    if let Err(err) = host.attach_ragdoll_evaluator(ragdoll, record.identity) {
        // The transition still happens; per-frame sync just skips frames
        // until the host can serve a ragdoll pose.
        warn!(identity = %record.identity, error = %err, "Ragdoll evaluator unavailable");
    }

    record.state = SyncState::Ragdoll(ragdoll);
    // Look-at has no meaning post-ragdoll.
    record.eye = None;

    debug!(identity = %record.identity, ragdoll = %ragdoll, "Entered ragdoll state");
}

/// Bone-name retargeting: every bone present in both skeletons takes the
/// host transform; substitute-only bones keep their bind pose; host-only
/// bones are ignored. The root is pinned to the host root, preserving the
/// scale baked in at transform time.
fn apply_pose(instance: &mut SceneGraph, pose: &HostPose) {
    instance.root.translation = pose.root.translation;
    instance.root.rotation = pose.root.rotation;

    for (name, transform) in &pose.bones {
        if let Some(index) = instance.skeleton.bone_index(name) {
            instance.skeleton.set_local(index, *transform);
        }
    }
}
