// Avatar Swap: replace a host game's native character rendering with
// externally supplied VRM avatars, driven through narrow host accessors.

pub mod assets;
pub mod config;
pub mod host;
pub mod scene;
pub mod substitution;
pub mod utils;

// Re-export commonly used types for convenience
pub use assets::{AvatarCache, ImportError, TransformOptions, VrmImporter};
pub use config::{AvatarSettings, DEFAULT_MODEL};
pub use host::{HostApi, HostIdentity, HostPose, RagdollId};
pub use substitution::{AvatarSystem, SubstitutionRecord, SyncState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
