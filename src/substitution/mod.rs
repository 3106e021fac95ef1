pub mod hooks;
pub mod registry;
pub mod sync;
pub mod visibility;

pub use hooks::AvatarSystem;
pub use registry::{EyeSync, IdentityRegistry, SubstitutionRecord, SyncState};
pub use visibility::HIDDEN_REFERENCE_POINT;
