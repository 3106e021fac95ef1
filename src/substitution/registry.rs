use std::collections::HashMap;

use glam::Vec3;
use tracing::warn;

use crate::host::{HostIdentity, RagdollId};
use crate::scene::graph::SceneGraph;

/// Pose source for a substituted character. `Ragdoll` is terminal: once a
/// record transitions, it never returns to `Alive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Pose copied from the live gameplay animator.
    Alive,
    /// Pose copied from the ragdoll's physics evaluator; the handle is also
    /// the attachment parent of the substitute from this point on.
    Ragdoll(RagdollId),
}

/// Eye look-at sync target within the substitute's skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EyeSync {
    pub bone: String,
}

/// Everything owned for one substituted identity: the private scene-graph
/// clone, its sync state, and the LOD reference point captured at creation
/// so visibility toggles can restore it exactly.
#[derive(Debug, Clone)]
pub struct SubstitutionRecord {
    pub identity: HostIdentity,
    pub asset_name: String,
    pub instance: SceneGraph,
    pub state: SyncState,
    pub original_lod_ref: Vec3,
    pub eye: Option<EyeSync>,
}

/// Identity → substitution record store. At most one record per live
/// identity; owned by the [`crate::substitution::AvatarSystem`], never
/// ambient state.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    records: HashMap<HostIdentity, SubstitutionRecord>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A record already live for the identity is released
    /// synchronously; re-registration without an explicit unregister is
    /// tolerated but logged.
    pub fn register(&mut self, record: SubstitutionRecord) {
        let identity = record.identity;
        if self.records.insert(identity, record).is_some() {
            warn!(
                identity = %identity,
                "Replaced a live substitution record; prior instance released"
            );
        }
    }

    pub fn lookup(&self, identity: HostIdentity) -> Option<&SubstitutionRecord> {
        self.records.get(&identity)
    }

    pub fn lookup_mut(&mut self, identity: HostIdentity) -> Option<&mut SubstitutionRecord> {
        self.records.get_mut(&identity)
    }

    /// Remove the record for an identity; dropping the returned value
    /// releases the clone's resources.
    pub fn unregister(&mut self, identity: HostIdentity) -> Option<SubstitutionRecord> {
        self.records.remove(&identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = HostIdentity> + '_ {
        self.records.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
