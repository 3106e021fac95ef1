use glam::Vec3;
use tracing::debug;

use crate::host::{HostApi, HostIdentity};
use crate::substitution::registry::SubstitutionRecord;

/// Reference point far outside any camera frustum; parking the substitute's
/// LOD group here makes the host cull it.
pub const HIDDEN_REFERENCE_POINT: Vec3 = Vec3::new(999_999.0, 999_999.0, 999_999.0);

/// Disable rendering of every host-side sub-part attached to the identity:
/// head hair, facial hair, chest/leg/shoulder/utility attachments, helmet.
/// The host still owns them and may re-enable them independently; this
/// system only ever disables.
pub fn hide_host_geometry(host: &mut dyn HostApi, identity: HostIdentity) {
    let parts = host.attached_sub_parts(identity);
    debug!(identity = %identity, parts = parts.len(), "Hiding host geometry");
    for part in parts {
        host.set_sub_part_visible(identity, part, false);
    }
}

/// Show or hide the substitute by moving its LOD reference point. The host
/// keys visibility off distance from that point, not a render flag; showing
/// restores the exact point captured at substitution time.
pub fn set_substitute_visible(record: &mut SubstitutionRecord, visible: bool) {
    let Some(lod) = record.instance.lod.as_mut() else {
        debug!(identity = %record.identity, "Substitute has no LOD group; visibility toggle ignored");
        return;
    };
    lod.reference_point = if visible {
        record.original_lod_ref
    } else {
        HIDDEN_REFERENCE_POINT
    };
}
