//! Narrow, typed accessor surface onto the host engine.
//!
//! The core never reaches into host internals; everything it needs from the
//! running game (names, sub-part visibility, pose snapshots, ragdoll
//! plumbing) comes through [`HostApi`]. The integration layer that owns the
//! actual engine objects implements this trait and wires the hook entry
//! points in [`crate::substitution::AvatarSystem`] to host lifecycle events.

use std::collections::HashMap;
use std::fmt;

use glam::Vec3;
use uuid::Uuid;

use crate::scene::graph::Transform;

/// Stable identifier of a host character subject to substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostIdentity(pub Uuid);

impl HostIdentity {
    /// Fresh identity, for integration layers that mint their own ids.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HostIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a host-created ragdoll object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RagdollId(pub u64);

impl fmt::Display for RagdollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ragdoll#{}", self.0)
    }
}

/// Host-side renderable sub-parts that hang off a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubPartKind {
    HeadHair,
    FacialHair,
    ChestGear,
    LegGear,
    ShoulderGear,
    UtilityGear,
    Helmet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

/// Read-only snapshot of the host's resolved skeletal pose for one frame.
/// Built by the integration layer; the core only samples it.
#[derive(Debug, Clone, Default)]
pub struct HostPose {
    pub root: Transform,
    pub bones: HashMap<String, Transform>,
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("unknown host identity {0}")]
    UnknownIdentity(HostIdentity),
    #[error("missing host data: {0}")]
    MissingHostData(String),
}

/// Accessors the host integration layer must provide.
///
/// All methods are called from the host's simulation thread, synchronously,
/// inside hook callbacks or the per-frame tick.
pub trait HostApi {
    /// Display name used for avatar mapping lookups.
    fn character_name(&self, identity: HostIdentity) -> Option<String>;

    /// Renderable equipment/body sub-parts currently attached.
    fn attached_sub_parts(&self, identity: HostIdentity) -> Vec<SubPartKind>;

    /// Enable or disable rendering of one sub-part without destroying it.
    fn set_sub_part_visible(&mut self, identity: HostIdentity, part: SubPartKind, visible: bool);

    /// Zero a held item's local offset so the substitute's own hand
    /// attachment is not visually duplicated.
    fn reset_held_item_offset(&mut self, identity: HostIdentity, hand: Hand);

    /// Hide the character's own skinned meshes while keeping them evaluating
    /// off-screen; the substitute needs fresh bone data even when the host
    /// geometry is not rendered.
    fn suppress_native_rendering(&mut self, identity: HostIdentity);

    /// Keep the character's animator evaluating when culled and preserve its
    /// state while disabled.
    fn force_animator_always_evaluate(&mut self, identity: HostIdentity);

    /// This frame's resolved pose of the live character rig.
    fn character_pose(&self, identity: HostIdentity) -> Result<HostPose, HostError>;

    /// Force the ragdoll's skinned sub-meshes to keep evaluating off-screen,
    /// hidden.
    fn prepare_ragdoll_meshes(&mut self, ragdoll: RagdollId);

    /// Attach a pose evaluator to the ragdoll, seeded with the same skeletal
    /// rig the character was using; configured to never cull and to keep its
    /// state while disabled.
    fn attach_ragdoll_evaluator(
        &mut self,
        ragdoll: RagdollId,
        source: HostIdentity,
    ) -> Result<(), HostError>;

    /// This frame's pose of the ragdoll's physics-driven rig.
    fn ragdoll_pose(&self, ragdoll: RagdollId) -> Result<HostPose, HostError>;

    /// Publish the substitute's eye position for camera placement.
    fn set_eye_position(&mut self, identity: HostIdentity, position: Vec3);
}
