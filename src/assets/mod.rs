pub mod cache;
pub mod importer;
pub mod material;
pub mod shader;
pub mod texture;
pub mod transform;

pub use cache::{AssetCache, AvatarCache, AVATAR_EXT};
pub use importer::{AssetLoader, ImportError, VrmImporter};
pub use material::{MaterialDescriptor, ShaderSlots};
pub use shader::{ShaderHandle, ShaderRegistry};
pub use texture::{TextureData, TextureError};
pub use transform::TransformOptions;
